//! Shutdown control: one cancellation token per process, tripped by Ctrl-C.
//!
//! On the first Ctrl-C the orchestrator stops launching, the progress reporter
//! exits, and in-flight transfers abort at their next libcurl callback and discard
//! their temp files. Once tokio has registered SIGINT the default handler never
//! comes back, so a second Ctrl-C is handled here too: it exits with status 130.

use tokio_util::sync::CancellationToken;

/// Exit status for a forced stop (128 + SIGINT).
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawns a listener that cancels `token` on the first Ctrl-C (SIGINT) and exits
/// the process with `FORCED_EXIT_CODE` on a second one.
///
/// If `token` is cancelled elsewhere first, the listener returns without waiting.
/// After a Ctrl-C it keeps waiting for the second one, so callers should `abort()`
/// the handle when their work is done rather than await it.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => {
                    tracing::warn!(
                        "interrupt received; stopping after in-flight work ends (Ctrl-C again to exit now)"
                    );
                    token.cancel();
                }
                Err(e) => {
                    tracing::warn!("cannot listen for Ctrl-C: {}", e);
                    return;
                }
            },
            _ = token.cancelled() => return,
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("second interrupt; exiting without waiting");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn listener_exits_when_token_cancelled_elsewhere() {
        let token = CancellationToken::new();
        let handle = cancel_on_ctrl_c(token.clone());
        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("listener should exit")
            .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn first_interrupt_cancels_and_keeps_process_alive() {
        use tokio::signal::unix::{signal, SignalKind};

        // Install tokio's SIGINT handler before raising, so the default action never runs.
        let _sigint = signal(SignalKind::interrupt()).unwrap();
        let token = CancellationToken::new();
        let handle = cancel_on_ctrl_c(token.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(unsafe { libc::raise(libc::SIGINT) }, 0);
        tokio::time::timeout(Duration::from_secs(5), token.cancelled())
            .await
            .expect("first Ctrl-C should cancel the token");

        // Still waiting for a second interrupt.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
