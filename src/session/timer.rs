use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { seconds_remaining: u64 },
    Expired,
}

/// Single-shot countdown. Emits one `Tick` per interval with the decremented
/// remaining count and exactly one terminal `Expired`, then stops. At the
/// default interval of one second the remaining count is remaining seconds.
///
/// `cancel` is idempotent; once the cancel flag is observed no further events
/// are emitted. The race between the final tick and a concurrent manual
/// submit is settled by the submission latch, not by cancellation timing.
#[derive(Debug)]
pub struct CountdownTimer {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    pub fn start(
        total_seconds: u64,
        tick_interval: Duration,
        events: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        let (cancel, mut cancelled) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut remaining = total_seconds;
            if remaining == 0 {
                let _ = events.send(TimerEvent::Expired);
                return;
            }

            let mut interval = tokio::time::interval(tick_interval);
            // The first interval tick completes immediately; the countdown
            // starts after one full period.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if *cancelled.borrow() {
                            break;
                        }
                        remaining -= 1;
                        if remaining == 0 {
                            let _ = events.send(TimerEvent::Expired);
                            break;
                        }
                        if events.send(TimerEvent::Tick { seconds_remaining: remaining }).is_err() {
                            break;
                        }
                    }
                    _ = cancelled.changed() => {
                        if *cancelled.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { cancel, handle }
    }

    /// Stop the countdown. Safe to call any number of times, before or after
    /// expiry.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
