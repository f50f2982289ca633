//! Deferred and periodic callbacks.
//!
//! Callbacks run on their own tasks and take locks exactly like external
//! callers do. Nothing here ever holds a lock: callers release theirs before
//! scheduling.
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

/// Runs `task` once after `delay`.
pub fn after<F>(delay: Duration, task: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task.await;
    })
}

/// Runs `tick` every `period`, first after one full period,
/// until a tick reports false.
pub fn every<F, T>(period: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> T + Send + 'static,
    T: Future<Output = bool> + Send,
{
    tokio::spawn(async move {
        let Some(first) = Instant::now().checked_add(period) else {
            log::warn!("ticker period {:?} is out of range, never ticking", period);
            return;
        };
        let mut clock = tokio::time::interval_at(first, period);
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            clock.tick().await;
            if !tick().await {
                break;
            }
        }
    })
}
