//! Background loop announcing timer ticks and expiry.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use super::{TimerNotice, TimerRegistry};
use crate::events::{EventBus, ServerEvent};

/// Spawn the scheduler loop. It runs until the returned handle is aborted.
///
/// Ticks and finish notices go to every connected client.
pub fn spawn(registry: Arc<TimerRegistry>, events: EventBus) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match registry.next_wakeup().await {
                Some(at) => {
                    tokio::select! {
                        () = tokio::time::sleep_until(at) => {
                            for notice in registry.fire_due(Instant::now()).await {
                                events.broadcast(notice.into());
                            }
                        }
                        () = registry.schedule_changed() => {
                            debug!("timer schedule changed");
                        }
                    }
                }
                None => registry.schedule_changed().await,
            }
        }
    })
}

impl From<TimerNotice> for ServerEvent {
    fn from(notice: TimerNotice) -> Self {
        match notice {
            TimerNotice::Tick(tick) => Self::TimerUpdate(tick),
            TimerNotice::Finished(finished) => Self::TimerFinished(finished),
        }
    }
}
