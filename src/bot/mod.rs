//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `actions`: Callback data codec for menu buttons
//! - `ui_builder`: Renders course list and detail views, builds keyboards
//! - `navigation`: Decides the next view for each inbound event
//! - `sink`: Sends and edits messages, tolerating no-op edits
//! - `message_handler`: Handles commands and free text
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `session`: Startup reset, handler tree and the receive loop

pub mod actions;
pub mod callback_handler;
pub mod message_handler;
pub mod navigation;
pub mod session;
pub mod sink;
pub mod ui_builder;

// Re-export main handler functions for use by the session
pub use callback_handler::callback_handler;
pub use message_handler::{command_handler, text_handler, Command};

pub use actions::Action;
pub use navigation::{transition, Delivery, Inbound, MenuState, Reply};
pub use sink::{deliver, edit_in_place, respond, ActionSink, Origin, TransportError};
pub use ui_builder::{render_detail, render_list, render_not_found, ButtonTarget, MenuButton, View};
