//! UI Builder module for rendering menu views and keyboards
//!
//! Rendering is pure: a snapshot (or a single course) goes in, a [`View`]
//! comes out. Conversion to Telegram keyboards happens at the edge in
//! [`build_keyboard`].

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::markdown::{bold, escape};
use tracing::warn;

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::catalog::Course;

use super::actions::Action;

/// Where a button leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonTarget {
    /// Routed back into the bot as callback data
    Action(Action),
    /// External link, handled by the client
    Link(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub target: ButtonTarget,
}

impl MenuButton {
    pub fn action(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Action(action),
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Link(url.into()),
        }
    }
}

/// A MarkdownV2 body plus its ordered buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub text: String,
    pub buttons: Vec<MenuButton>,
}

fn course_title(course: &Course, language_code: Option<&str>) -> String {
    let title = course.title.trim();
    if title.is_empty() {
        t_lang("course-fallback-title", language_code)
    } else {
        title.to_string()
    }
}

fn back_button(language_code: Option<&str>) -> MenuButton {
    MenuButton::action(t_lang("course-back", language_code), Action::ShowList)
}

/// Catalog menu: one button per course, or a single retry button when empty
pub fn render_list(courses: &[Course], language_code: Option<&str>) -> View {
    let text = bold(&escape(&t_lang("list-header", language_code)));

    let buttons = if courses.is_empty() {
        vec![MenuButton::action(
            t_lang("list-retry", language_code),
            Action::ShowList,
        )]
    } else {
        courses
            .iter()
            .map(|course| {
                MenuButton::action(
                    course_title(course, language_code),
                    Action::show_course(course.id.as_str()),
                )
            })
            .collect()
    };

    View { text, buttons }
}

/// Course detail: bold title, then only the non-empty fields
pub fn render_detail(course: &Course, language_code: Option<&str>) -> View {
    let mut lines = vec![bold(&escape(&course_title(course, language_code)))];

    let description = course.short_description.trim();
    if !description.is_empty() {
        lines.push(escape(description));
    }

    let duration = course.duration.trim();
    if !duration.is_empty() {
        lines.push(escape(&t_args_lang(
            "course-duration",
            &[("value", duration)],
            language_code,
        )));
    }

    let price = course.price.trim();
    if !price.is_empty() {
        lines.push(escape(&t_args_lang(
            "course-price",
            &[("value", price)],
            language_code,
        )));
    }

    let mut buttons = Vec::with_capacity(2);
    if let Some(link) = &course.enrollment_link {
        buttons.push(MenuButton::link(t_lang("course-enroll", language_code), link));
    }
    buttons.push(back_button(language_code));

    View {
        text: lines.join("\n").trim_end().to_string(),
        buttons,
    }
}

/// Shown when a pressed course id is not in the current snapshot
pub fn render_not_found(language_code: Option<&str>) -> View {
    View {
        text: escape(&t_lang("course-not-found", language_code)),
        buttons: vec![back_button(language_code)],
    }
}

/// Plain-text reply for anything that is not a command or button
pub fn render_fallback(language_code: Option<&str>) -> String {
    t_lang("fallback-instructions", language_code)
}

/// Create an inline keyboard with one button per row
pub fn build_keyboard(view: &View) -> InlineKeyboardMarkup {
    let rows = view
        .buttons
        .iter()
        .filter_map(|button| match &button.target {
            ButtonTarget::Action(action) => Some(InlineKeyboardButton::callback(
                button.label.clone(),
                action.encode(),
            )),
            ButtonTarget::Link(link) => match reqwest::Url::parse(link) {
                Ok(url) => Some(InlineKeyboardButton::url(button.label.clone(), url)),
                Err(e) => {
                    warn!(link = %link, error = %e, "Dropping button with invalid link");
                    None
                }
            },
        })
        .map(|button| vec![button]);

    InlineKeyboardMarkup::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, title: &str) -> Course {
        Course {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_list_offers_retry() {
        let view = render_list(&[], Some("es"));
        assert_eq!(view.buttons.len(), 1);
        assert_eq!(view.buttons[0].label, "🔄 Reintentar");
        assert_eq!(view.buttons[0].target, ButtonTarget::Action(Action::ShowList));
    }

    #[test]
    fn test_list_has_one_button_per_course_in_order() {
        let courses = vec![course("c1", "Intro"), course("c2", ""), course("c3", "SQL")];
        let view = render_list(&courses, Some("es"));
        let labels: Vec<_> = view.buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Intro", "Curso", "SQL"]);
        assert_eq!(
            view.buttons[2].target,
            ButtonTarget::Action(Action::ShowCourse("c3".into()))
        );
    }

    #[test]
    fn test_detail_omits_empty_fields() {
        let mut c = course("c1", "Intro");
        c.price = "$100".into();
        let view = render_detail(&c, Some("es"));
        assert_eq!(view.text, "*Intro*\nPrecio: $100");
        assert_eq!(view.buttons.len(), 1);
        assert_eq!(view.buttons[0].target, ButtonTarget::Action(Action::ShowList));
    }

    #[test]
    fn test_detail_escapes_markup() {
        let mut c = course("c1", "C++ (intro)");
        c.short_description = "Learn *fast*.".into();
        let view = render_detail(&c, Some("en"));
        assert_eq!(view.text, "*C\\+\\+ \\(intro\\)*\nLearn \\*fast\\*\\.");
    }

    #[test]
    fn test_detail_is_deterministic() {
        let mut c = course("c1", "Intro");
        c.short_description = "Basics".into();
        c.duration = "4 semanas".into();
        c.enrollment_link = Some("https://x/y".into());
        assert_eq!(render_detail(&c, None), render_detail(&c, None));
    }

    #[test]
    fn test_keyboard_drops_invalid_links() {
        let view = View {
            text: String::new(),
            buttons: vec![
                MenuButton::link("enroll", "not a url"),
                MenuButton::action("back", Action::ShowList),
            ],
        };
        let keyboard = build_keyboard(&view);
        assert_eq!(keyboard.inline_keyboard.len(), 1);
    }
}
