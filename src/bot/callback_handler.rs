//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::MaybeInaccessibleMessage;
use tracing::{debug, info, warn};

use crate::catalog::CatalogLoader;

use super::actions::Action;
use super::navigation::Inbound;
use super::sink::{respond, Origin};

/// Resolve where the answer to a button press goes. Inaccessible or inline
/// messages cannot be edited, so the view goes to the user's private chat.
fn callback_origin(q: &CallbackQuery) -> Origin {
    match &q.message {
        Some(MaybeInaccessibleMessage::Regular(message)) => Origin {
            chat_id: message.chat.id,
            message_id: Some(message.id),
        },
        Some(MaybeInaccessibleMessage::Inaccessible(_)) | None => Origin {
            chat_id: q.from.id.into(),
            message_id: None,
        },
    }
}

/// Handle callback queries from the course menu keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    loader: Arc<CatalogLoader>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    // Answer the callback query to remove the loading state
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let Some(action) = q.data.as_deref().and_then(Action::decode) else {
        debug!(user_id = %q.from.id, "Ignoring unrecognized callback data");
        return Ok(());
    };

    info!(user_id = %q.from.id, action = ?action, "Handling menu action");

    let origin = callback_origin(&q);
    respond(
        &bot,
        &loader,
        origin,
        &Inbound::Press(action),
        q.from.language_code.as_deref(),
    )
    .await?;

    Ok(())
}
