use crate::core::safety::is_safe;
use crate::services::openrouter::{AiError, OpenRouterClient};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Run secondary work after a primary result has been produced.
///
/// The task is detached: no handle is returned, nobody awaits it, and a
/// failure is only logged. Must be called from inside a tokio runtime.
pub fn spawn_best_effort<F, E>(label: &'static str, task: F)
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        match task.await {
            Ok(()) => tracing::debug!("Background task '{}' finished", label),
            Err(e) => tracing::warn!("Background task '{}' failed: {}", label, e),
        }
    });
}

/// Errors raised by the post-send message review.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("inappropriate content detected in match {0}")]
    Unsafe(String),

    #[error("conversation analysis failed: {0}")]
    Analysis(#[from] AiError),
}

/// Second look at a message that was already accepted.
///
/// When a language model is available, logs an analysis of the message.
/// The HTTP handler filters messages before accepting them, so the
/// [`ReviewError::Unsafe`] branch only fires for direct callers that skip
/// that check.
pub async fn review_message(
    match_id: String,
    message: String,
    ai: Option<Arc<OpenRouterClient>>,
) -> Result<(), ReviewError> {
    if !is_safe(&message) {
        return Err(ReviewError::Unsafe(match_id));
    }

    if let Some(ai) = ai {
        let analysis = ai.chat_analysis(std::slice::from_ref(&message)).await?;
        tracing::info!(
            "Match {} message analysis: score {}, interests {:?}",
            match_id,
            analysis.compatibility_score,
            analysis.common_interests
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_task_runs_detached() {
        let (tx, rx) = oneshot::channel();

        spawn_best_effort("signal", async move {
            tx.send(42).map_err(|_| "receiver dropped")?;
            Ok::<(), &'static str>(())
        });

        let value = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let (tx, rx) = oneshot::channel::<()>();

        spawn_best_effort("failing", async move {
            drop(tx);
            Err::<(), _>("boom")
        });

        // the sender is dropped without a value; the caller is unaffected
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_review_flags_unsafe_message() {
        let result = review_message("m1".to_string(), "you idiot".to_string(), None).await;
        assert!(matches!(result, Err(ReviewError::Unsafe(ref id)) if id == "m1"));

        let clean = review_message("m1".to_string(), "see you at eight".to_string(), None).await;
        assert!(clean.is_ok());
    }
}
