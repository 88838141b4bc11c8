//! Pipeline stages for brand-kit generation.
//!
//! Each submodule implements exactly one step so each can be tested on its
//! own and swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! brief ──▶ copy ──▶ postprocess ─┐
//!       └─▶ logo ─────────────────┼─▶ layout ──▶ guide ──▶ archive
//!                        palette ─┘             (pdfium)   (zip)
//! ```
//!
//! 1. [`copy`]: prompt the text backend, with retry/backoff
//! 2. [`postprocess`]: deterministic cleanup of the returned copy
//! 3. [`logo`]: prompt the image backend, decode, re-encode as PNG
//! 4. [`layout`]: pure computation of every drawing operation
//! 5. [`guide`]: draw the layout with pdfium (`spawn_blocking`)
//! 6. [`archive`]: bundle text, logo and guide into a zip

pub mod archive;
pub mod copy;
pub mod guide;
pub mod layout;
pub mod logo;
pub mod pdfium;
pub mod postprocess;

use crate::config::KitConfig;
use crate::error::BackendError;
use crate::progress::Stage;
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Run `call` until it succeeds, fails permanently, or retries run out.
///
/// Returns the last result and the number of retries used. Only errors for
/// which [`BackendError::is_retryable`] holds are retried; the wait doubles
/// each time and honours server hints (`Retry-After`, `estimated_time`).
pub(crate) async fn with_retries<T, F, Fut>(
    stage: Stage,
    config: &KitConfig,
    mut call: F,
) -> (Result<T, BackendError>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Ok(value) => return (Ok(value), attempt),
            Err(err) if !err.is_retryable() || attempt >= config.max_retries => {
                return (Err(err), attempt);
            }
            Err(err) => {
                attempt += 1;
                let backoff = config.backoff_ms(attempt, err.retry_after_ms());
                warn!(
                    "{}: attempt {} failed ({}), retry {}/{} in {}ms",
                    stage, attempt, err, attempt, config.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> KitConfig {
        KitConfig::builder()
            .max_retries(max_retries)
            .retry_backoff_ms(1)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let (result, retries) = with_retries(Stage::Copy, &fast_config(3), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(BackendError::Transport("reset".into()))
            } else {
                Ok("done")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(retries, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let (result, retries) = with_retries(Stage::Logo, &fast_config(3), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(BackendError::Auth {
                provider: "huggingface".into(),
                detail: "bad token".into(),
            })
        })
        .await;
        assert!(matches!(result, Err(BackendError::Auth { .. })));
        assert_eq!(retries, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let (result, retries) = with_retries(Stage::Copy, &fast_config(2), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(BackendError::Http {
                status: 502,
                body: "bad gateway".into(),
            })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(retries, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let calls = AtomicU32::new(0);
        let (result, retries) = with_retries(Stage::Copy, &fast_config(0), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(BackendError::Timeout { secs: 1 })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(retries, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
