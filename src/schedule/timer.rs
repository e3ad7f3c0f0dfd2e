use spool_dispatch::{Dispatcher, Summary, run_once};
use spool_process::CancellationToken;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Repeats the whole print job every `period`.
///
/// Runs never overlap: a tick that comes due while a run is still going is
/// delayed until it finishes.
#[derive(Debug)]
pub struct TimerTask {
    dispatcher: Arc<Dispatcher>,
    period: Duration,
}
impl TimerTask {
    pub fn new(dispatcher: Arc<Dispatcher>, period: Duration) -> Self {
        Self { dispatcher, period }
    }

    /// Runs until cancelled. The first run is one period from now.
    pub async fn run(self, cancel: CancellationToken) -> Summary {
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(seconds = self.period.as_secs(), "Timer started, press Enter or Ctrl-C to stop");

        let mut summary = Summary::default();
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let outcomes = run_once(&self.dispatcher).await;
                    tracing::debug!(files = outcomes.len(), "Timer run complete");
                    summary.extend(&outcomes);
                },
            }
        }
        tracing::info!("Timer stopped");
        summary
    }
}
