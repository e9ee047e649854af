//! Menu navigation between the course list and course details.
//!
//! No state is kept between events: each inbound event alone decides the next
//! view. Telegram itself remembers which message is being edited.

use crate::catalog::{find_course, Course};

use super::actions::Action;
use super::ui_builder::{render_detail, render_fallback, render_list, render_not_found, View};

/// Which screen a rendered view belongs to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    List,
    Detail,
}

/// Inbound events the menu reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `/start` or `/cursos`
    ShowCatalog,
    /// A menu button press
    Press(Action),
    /// Any other text
    Text,
}

impl Inbound {
    /// Whether answering this event needs a catalog snapshot
    pub fn reads_catalog(&self) -> bool {
        !matches!(self, Inbound::Text)
    }
}

/// How a view reaches the user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    NewMessage,
    EditInPlace,
}

/// What the bot answers with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Menu {
        view: View,
        delivery: Delivery,
        state: MenuState,
    },
    /// Plain-text instructions, no state change
    Instructions(String),
}

/// Decide the reply for an inbound event. `load` is only called when the
/// event needs a fresh catalog snapshot.
pub fn transition<F>(inbound: &Inbound, load: F, language_code: Option<&str>) -> Reply
where
    F: FnOnce() -> Vec<Course>,
{
    match inbound {
        Inbound::ShowCatalog => Reply::Menu {
            view: render_list(&load(), language_code),
            delivery: Delivery::NewMessage,
            state: MenuState::List,
        },
        Inbound::Press(Action::ShowList) => Reply::Menu {
            view: render_list(&load(), language_code),
            delivery: Delivery::EditInPlace,
            state: MenuState::List,
        },
        Inbound::Press(Action::ShowCourse(id)) => {
            let courses = load();
            let view = match find_course(&courses, id) {
                Some(course) => render_detail(course, language_code),
                None => render_not_found(language_code),
            };
            Reply::Menu {
                view,
                delivery: Delivery::EditInPlace,
                state: MenuState::Detail,
            }
        }
        Inbound::Text => Reply::Instructions(render_fallback(language_code)),
    }
}
