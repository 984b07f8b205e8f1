use crate::domain_port::RevocationStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Periodically drops expired revocation entries. Correctness never depends
/// on it running: expired entries already read as absent.
pub struct RevocationSweeper {
    store: Arc<dyn RevocationStore>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl RevocationSweeper {
    pub fn new(
        store: Arc<dyn RevocationStore>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            store,
            interval,
            cancellation_token,
        }
    }

    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("revocation sweeper shutting down...");
                    break;
                }
                _ = ticker.tick() => {
                    match self.store.purge_expired().await {
                        Ok(0) => {}
                        Ok(purged) => tracing::debug!(purged, "expired revocations purged"),
                        Err(e) => tracing::error!("revocation sweep failed: {e}"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::TokenId;
    use crate::domain_port::ManualClock;
    use crate::infra_memory::MemoryRevocationStore;
    use chrono::Utc;

    #[tokio::test]
    async fn sweeps_until_cancelled() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(MemoryRevocationStore::new(clock.clone()));
        store
            .revoke(TokenId::generate(), Duration::from_secs(1))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(2));

        let cancel = CancellationToken::new();
        let sweeper = RevocationSweeper::new(store.clone(), Duration::from_millis(10), cancel.clone());
        let handle = tokio::spawn(async move { sweeper.run().await });

        for _ in 0..100 {
            if store.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.is_empty());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
