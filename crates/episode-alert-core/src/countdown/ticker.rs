use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::time_left::{calculate_time_left, TimeLeft};

/// Default refresh period for a live countdown.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A live countdown to an air date.
///
/// The background task is aborted when the handle is cancelled or dropped,
/// so a view that owns a `Countdown` cannot leak its timer.
pub struct Countdown {
    receiver: watch::Receiver<Option<TimeLeft>>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// Start ticking every `period` against the system clock.
    /// Must be called from within a tokio runtime.
    pub fn start(air_date: impl Into<String>, period: Duration) -> Self {
        Self::start_with_clock(air_date, period, Arc::new(Utc::now))
    }

    pub fn start_with_clock(air_date: impl Into<String>, period: Duration, clock: Clock) -> Self {
        let air_date = air_date.into();
        let (sender, receiver) = watch::channel(calculate_time_left(&air_date, clock()));

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let left = calculate_time_left(&air_date, clock());
                if sender.send(left).is_err() {
                    debug!(air_date = %air_date, "Countdown has no listeners, stopping");
                    break;
                }
            }
        });

        Self { receiver, task }
    }

    /// The most recently computed value.
    pub fn current(&self) -> Option<TimeLeft> {
        *self.receiver.borrow()
    }

    /// A receiver that is notified on every tick.
    pub fn subscribe(&self) -> watch::Receiver<Option<TimeLeft>> {
        self.receiver.clone()
    }

    /// Stop the countdown. Subscribers see the channel close.
    pub fn cancel(self) {
        // Drop aborts the task
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}
