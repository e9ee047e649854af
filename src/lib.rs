//! # Course Catalog Telegram Bot
//!
//! A Telegram bot that lists courses from a JSON file as inline buttons and
//! shows each course's details with an enrollment link, alongside a small
//! HTTP health endpoint.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod health;
pub mod localization;
pub mod retry;
pub mod supervisor;
