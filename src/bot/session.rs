//! Bot session lifecycle: startup reset, handler registration and the
//! long-polling receive loop.

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::error_handlers::{ErrorHandler, LoggingErrorHandler};
use teloxide::prelude::*;
use teloxide::types::{BotCommand, Me};
use teloxide::update_listeners::Polling;
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, info, warn};

use crate::catalog::CatalogLoader;
use crate::config::RetryPolicy;
use crate::localization::t_lang;
use crate::retry::retry_with_jitter;

use super::callback_handler::callback_handler;
use super::message_handler::{command_handler, text_handler, wants_instructions, Command};

/// Run one event's handling inside a fault boundary. Errors and panics are
/// logged and swallowed so the receive loop keeps going.
pub async fn isolate<F>(event: &'static str, handling: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(handling).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(event, error = ?e, "Event handling failed"),
        Err(panic) => error!(event, panic = panic_message(panic.as_ref()), "Event handler panicked"),
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Build the teloxide update handler tree
pub fn build_handler() -> UpdateHandler<anyhow::Error> {
    let command_branch = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(
            |bot: Bot, msg: Message, cmd: Command, loader: Arc<CatalogLoader>| async move {
                isolate("command", command_handler(bot, msg, cmd, loader)).await
            },
        );

    let callback_branch = Update::filter_callback_query().endpoint(
        |bot: Bot, q: CallbackQuery, loader: Arc<CatalogLoader>| async move {
            isolate("callback", callback_handler(bot, q, loader)).await
        },
    );

    let text_branch = Update::filter_message()
        .filter(|msg: Message, me: Me| {
            msg.text()
                .is_some_and(|text| wants_instructions(text, me.username()))
        })
        .endpoint(
            |bot: Bot, msg: Message, loader: Arc<CatalogLoader>| async move {
                isolate("text", text_handler(bot, msg, loader)).await
            },
        );

    dptree::entry()
        .branch(command_branch)
        .branch(callback_branch)
        .branch(text_branch)
}

/// Clear any webhook and pending updates, then cut off a competing
/// long-poll. Failures are logged; startup continues regardless.
pub async fn reset_session(bot: &Bot, policy: &RetryPolicy) {
    match retry_with_jitter(policy, "delete_webhook", || {
        bot.delete_webhook().drop_pending_updates(true).send()
    })
    .await
    {
        Ok(_) => info!("Cleared webhook and pending updates"),
        Err(e) => warn!(error = %e, "Failed to clear webhook, continuing"),
    }

    // A zero-timeout getUpdates terminates any other long-poll on this token
    match retry_with_jitter(policy, "get_updates", || {
        bot.get_updates().offset(-1).timeout(0).send()
    })
    .await
    {
        Ok(_) => info!("Terminated stale polling sessions"),
        Err(e) => warn!(error = %e, "Failed to terminate stale polling session, continuing"),
    }
}

/// Publish the command list shown in the client's menu
pub async fn register_commands(bot: &Bot, policy: &RetryPolicy) {
    let commands = vec![
        BotCommand::new("start", t_lang("command-start", None)),
        BotCommand::new("cursos", t_lang("command-cursos", None)),
    ];

    match retry_with_jitter(policy, "set_my_commands", || {
        bot.set_my_commands(commands.clone()).send()
    })
    .await
    {
        Ok(_) => debug!("Registered bot commands"),
        Err(e) => warn!(error = %e, "Failed to register bot commands, continuing"),
    }
}

/// Logs errors from the update listener. A 409 conflict means another
/// session is polling with the same token; polling keeps retrying.
struct ListenerErrorHandler;

impl ErrorHandler<RequestError> for ListenerErrorHandler {
    fn handle_error(self: Arc<Self>, error: RequestError) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            match &error {
                RequestError::Api(ApiError::TerminatedByOtherGetUpdates) => {
                    warn!("Update delivery conflict with another session, retrying");
                }
                _ => error!(error = %error, "Error receiving updates"),
            }
        })
    }
}

/// Run the receive loop. Only returns if the dispatcher stops.
pub async fn run(bot: Bot, loader: Arc<CatalogLoader>, policy: RetryPolicy) -> Result<()> {
    reset_session(&bot, &policy).await;
    register_commands(&bot, &policy).await;

    let listener = Polling::builder(bot.clone())
        .drop_pending_updates()
        .build();

    let mut deps = DependencyMap::new();
    deps.insert(loader);

    info!("Bot started (long polling)");

    Dispatcher::builder(bot, build_handler())
        .dependencies(deps)
        .default_handler(|update| async move {
            debug!(update_id = ?update.id, "Ignoring unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .build()
        .dispatch_with_listener(listener, Arc::new(ListenerErrorHandler))
        .await;

    warn!("Update dispatcher stopped");
    Ok(())
}
