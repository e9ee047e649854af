//! Outbound side of the bot: sending and editing menu messages
//!
//! [`ActionSink`] is implemented for [`Bot`] and can be replaced by an
//! in-memory recorder in tests.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};
use teloxide::{ApiError, RequestError};
use thiserror::Error;
use tracing::debug;

use crate::catalog::CatalogLoader;

use super::navigation::{transition, Delivery, Inbound, Reply};
use super::ui_builder::{build_keyboard, View};

/// Errors from the outbound transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The edit would leave the message exactly as it is
    #[error("message content is unchanged")]
    ContentUnchanged,
    #[error(transparent)]
    Request(RequestError),
}

impl From<RequestError> for TransportError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::MessageNotModified) => TransportError::ContentUnchanged,
            other => TransportError::Request(other),
        }
    }
}

/// Outbound actions the menu needs from the chat platform
#[async_trait]
pub trait ActionSink: Send + Sync {
    /// Send a menu view as a new message
    async fn send_view(&self, chat_id: ChatId, view: &View) -> Result<(), TransportError>;

    /// Send plain text as a new message
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError>;

    /// Replace text and buttons of an existing message
    async fn edit_view(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        view: &View,
    ) -> Result<(), TransportError>;

    /// Replace only the buttons of an existing message
    async fn edit_buttons(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        view: &View,
    ) -> Result<(), TransportError>;
}

#[async_trait]
impl ActionSink for Bot {
    async fn send_view(&self, chat_id: ChatId, view: &View) -> Result<(), TransportError> {
        self.send_message(chat_id, view.text.clone())
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(build_keyboard(view))
            .await?;
        Ok(())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn edit_view(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        view: &View,
    ) -> Result<(), TransportError> {
        self.edit_message_text(chat_id, message_id, view.text.clone())
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(build_keyboard(view))
            .await?;
        Ok(())
    }

    async fn edit_buttons(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        view: &View,
    ) -> Result<(), TransportError> {
        self.edit_message_reply_markup(chat_id, message_id)
            .reply_markup(build_keyboard(view))
            .await?;
        Ok(())
    }
}

/// Where an inbound event came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin {
    pub chat_id: ChatId,
    /// Message carrying the pressed button, when it is still editable
    pub message_id: Option<MessageId>,
}

/// Edit a message, treating "content unchanged" as success. When the full
/// edit is rejected as a no-op, the buttons alone are re-applied.
pub async fn edit_in_place<S>(
    sink: &S,
    chat_id: ChatId,
    message_id: MessageId,
    view: &View,
) -> Result<(), TransportError>
where
    S: ActionSink + ?Sized,
{
    match sink.edit_view(chat_id, message_id, view).await {
        Err(TransportError::ContentUnchanged) => {
            debug!(chat_id = %chat_id, "Message unchanged, refreshing buttons only");
            if let Err(e) = sink.edit_buttons(chat_id, message_id, view).await {
                debug!(chat_id = %chat_id, error = %e, "Button refresh skipped");
            }
            Ok(())
        }
        other => other,
    }
}

/// Deliver a reply to its origin
pub async fn deliver<S>(sink: &S, origin: Origin, reply: &Reply) -> Result<(), TransportError>
where
    S: ActionSink + ?Sized,
{
    match reply {
        Reply::Instructions(text) => sink.send_text(origin.chat_id, text).await,
        Reply::Menu { view, delivery, .. } => match (delivery, origin.message_id) {
            (Delivery::EditInPlace, Some(message_id)) => {
                edit_in_place(sink, origin.chat_id, message_id, view).await
            }
            _ => sink.send_view(origin.chat_id, view).await,
        },
    }
}

/// Run one inbound event through the menu and deliver the result
pub async fn respond<S>(
    sink: &S,
    loader: &CatalogLoader,
    origin: Origin,
    inbound: &Inbound,
    language_code: Option<&str>,
) -> Result<Reply, TransportError>
where
    S: ActionSink + ?Sized,
{
    let courses = if inbound.reads_catalog() {
        loader.snapshot().await
    } else {
        Vec::new()
    };
    let reply = transition(inbound, move || courses, language_code);
    deliver(sink, origin, &reply).await?;
    Ok(reply)
}
