//! Runs the bot receive loop and the health endpoint side by side.

use anyhow::{anyhow, Result};
use std::future::Future;
use std::sync::Arc;
use teloxide::Bot;
use tracing::{error, info};

use crate::bot::session;
use crate::catalog::CatalogLoader;
use crate::config::Config;
use crate::health;

/// Start both tasks and return the first termination as an error
pub async fn run(config: Config) -> Result<()> {
    let loader = Arc::new(CatalogLoader::new(config.courses_file.clone()));
    info!(path = %loader.path().display(), port = config.port, "Starting bot and health endpoint");

    let bot = Bot::new(config.bot_token.clone());

    run_until_either_fails(
        session::run(bot, Arc::clone(&loader), config.retry.clone()),
        health::serve(config.port, loader),
    )
    .await
}

/// Spawn both futures and wait for whichever ends first. Neither is expected
/// to finish, so a clean exit is reported as an error too. The survivor is
/// aborted.
pub async fn run_until_either_fails<B, H>(bot: B, http: H) -> Result<()>
where
    B: Future<Output = Result<()>> + Send + 'static,
    H: Future<Output = Result<()>> + Send + 'static,
{
    let mut bot_task = tokio::spawn(bot);
    let mut http_task = tokio::spawn(http);

    let (task, outcome) = tokio::select! {
        outcome = &mut bot_task => ("bot", outcome),
        outcome = &mut http_task => ("http", outcome),
    };

    bot_task.abort();
    http_task.abort();

    let err = match outcome {
        Ok(Ok(())) => anyhow!("{task} task exited unexpectedly"),
        Ok(Err(e)) => e.context(format!("{task} task failed")),
        Err(join_error) => anyhow!(join_error).context(format!("{task} task crashed")),
    };
    error!(task, error = ?err, "Task terminated, shutting down");
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;

    #[tokio::test]
    async fn test_first_failure_is_propagated() {
        let result = run_until_either_fails(
            pending(),
            async { Err::<(), _>(anyhow!("address in use")) },
        )
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "http task failed");
        assert_eq!(err.root_cause().to_string(), "address in use");
    }

    #[tokio::test]
    async fn test_clean_exit_is_a_failure() {
        let result = run_until_either_fails(async { Ok::<(), anyhow::Error>(()) }, pending()).await;
        assert_eq!(result.unwrap_err().to_string(), "bot task exited unexpectedly");
    }

    #[tokio::test]
    async fn test_panic_is_a_failure() {
        let result = run_until_either_fails(
            async {
                if true {
                    panic!("listener died");
                }
                Ok::<(), anyhow::Error>(())
            },
            pending(),
        )
        .await;
        assert_eq!(result.unwrap_err().to_string(), "bot task crashed");
    }
}
