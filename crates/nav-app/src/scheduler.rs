//! Completes view changes after their animation on the tokio runtime

use nav_render::{CompletionScheduler, FinishFn};
use std::time::Duration;
use tokio::runtime::Handle;

pub struct TokioScheduler {
    handle: Handle,
    scale: f64,
}

impl TokioScheduler {
    pub fn new(handle: Handle, scale: f64) -> Self {
        Self {
            handle,
            scale: scale.max(0.0),
        }
    }
}

impl CompletionScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, finish: FinishFn) -> anyhow::Result<()> {
        let delay = delay.mul_f64(self.scale);
        if delay.is_zero() {
            return finish();
        }

        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = finish() {
                tracing::error!("Failed to complete view change: {}", e);
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_zero_delay_runs_inline() {
        let scheduler = TokioScheduler::new(Handle::current(), 1.0);
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        scheduler
            .schedule(
                Duration::ZERO,
                Box::new(move || {
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_delayed_finish_runs_later() {
        let scheduler = TokioScheduler::new(Handle::current(), 0.1);
        let (tx, rx) = tokio::sync::oneshot::channel();
        scheduler
            .schedule(
                Duration::from_millis(100),
                Box::new(move || {
                    let _ = tx.send(());
                    Ok(())
                }),
            )
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), rx).await.unwrap().unwrap();
    }
}
