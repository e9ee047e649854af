//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::{BotCommands, ParseError};
use tracing::{debug, info};

use crate::catalog::CatalogLoader;

use super::navigation::Inbound;
use super::sink::{respond, Origin};

/// Commands that open the course menu
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    Start,
    Cursos,
}

fn language_code(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_deref())
}

/// Whether a text message gets the usage reply. Commands addressed to
/// another bot, like `/cursos@otherbot` in a group, are not for us.
pub fn wants_instructions(text: &str, bot_username: &str) -> bool {
    let other_bot = text.starts_with('/')
        && matches!(
            Command::parse(text, bot_username),
            Err(ParseError::WrongBotName(_))
        );
    !other_bot
}

/// Handle `/start` and `/cursos`
pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    loader: Arc<CatalogLoader>,
) -> Result<()> {
    info!(user_id = %msg.chat.id, command = ?cmd, "Received catalog command");

    let origin = Origin {
        chat_id: msg.chat.id,
        message_id: None,
    };
    respond(&bot, &loader, origin, &Inbound::ShowCatalog, language_code(&msg)).await?;
    Ok(())
}

/// Handle any other text with usage instructions
pub async fn text_handler(bot: Bot, msg: Message, loader: Arc<CatalogLoader>) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received free text, replying with instructions");

    let origin = Origin {
        chat_id: msg.chat.id,
        message_id: None,
    };
    respond(&bot, &loader, origin, &Inbound::Text, language_code(&msg)).await?;
    Ok(())
}
