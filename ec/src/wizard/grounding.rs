//! Grounding exercise timers
//!
//! Three tasks start together and share one cancellation token: the
//! completion timer, the inhale/exhale toggle and the once-per-second
//! countdown. Stopping the exercise (or dropping it) cancels all three.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::GroundingConfig;

/// Which half of the breath the user should be in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breath {
    Inhale,
    Exhale,
}

impl Breath {
    fn toggled(self) -> Self {
        match self {
            Breath::Inhale => Breath::Exhale,
            Breath::Exhale => Breath::Inhale,
        }
    }
}

/// What the timers report to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundingTick {
    Breath(Breath),
    /// Whole steps remaining
    Countdown(u64),
    /// The full duration elapsed; sent once
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundingTiming {
    pub total: Duration,
    pub breath: Duration,
    /// Countdown step
    pub step: Duration,
}

impl GroundingTiming {
    fn countdown_steps(&self) -> u64 {
        let step = self.step.as_millis().max(1);
        (self.total.as_millis() / step) as u64
    }
}

impl Default for GroundingTiming {
    fn default() -> Self {
        Self::from(&GroundingConfig::default())
    }
}

impl From<&GroundingConfig> for GroundingTiming {
    fn from(config: &GroundingConfig) -> Self {
        Self {
            total: config.duration(),
            breath: config.breath(),
            step: Duration::from_secs(1),
        }
    }
}

/// A running breathing exercise
pub struct BreathingExercise {
    cancel_token: CancellationToken,
}

impl BreathingExercise {
    /// Start all three timers; ticks arrive on the returned receiver
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(timing: GroundingTiming) -> (Self, mpsc::UnboundedReceiver<GroundingTick>) {
        info!(total = ?timing.total, breath = ?timing.breath, "Starting grounding exercise");
        let cancel_token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(completion(timing.total, tx.clone(), cancel_token.clone()));
        tokio::spawn(breathing(timing.breath, tx.clone(), cancel_token.clone()));
        tokio::spawn(countdown(timing.step, timing.countdown_steps(), tx, cancel_token.clone()));

        (Self { cancel_token }, rx)
    }

    /// Cancel every timer
    pub fn stop(&mut self) {
        if !self.cancel_token.is_cancelled() {
            debug!("BreathingExercise::stop: cancelling timers");
            self.cancel_token.cancel();
        }
    }
}

impl Drop for BreathingExercise {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

fn send(tx: &mpsc::UnboundedSender<GroundingTick>, token: &CancellationToken, tick: GroundingTick) -> bool {
    if token.is_cancelled() {
        return false;
    }
    tx.send(tick).is_ok()
}

async fn completion(total: Duration, tx: mpsc::UnboundedSender<GroundingTick>, token: CancellationToken) {
    tokio::select! {
        biased;
        _ = token.cancelled() => debug!("completion: cancelled"),
        _ = tokio::time::sleep(total) => {
            send(&tx, &token, GroundingTick::Finished);
            info!("Grounding exercise finished");
            token.cancel();
        }
    }
}

async fn breathing(every: Duration, tx: mpsc::UnboundedSender<GroundingTick>, token: CancellationToken) {
    let mut breath = Breath::Inhale;
    if !send(&tx, &token, GroundingTick::Breath(breath)) {
        return;
    }
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                breath = breath.toggled();
                if !send(&tx, &token, GroundingTick::Breath(breath)) {
                    break;
                }
            }
        }
    }
    debug!("breathing: stopped");
}

async fn countdown(step: Duration, steps: u64, tx: mpsc::UnboundedSender<GroundingTick>, token: CancellationToken) {
    let mut remaining = steps;
    let mut interval = tokio::time::interval(step);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                if !send(&tx, &token, GroundingTick::Countdown(remaining)) || remaining == 0 {
                    break;
                }
                remaining -= 1;
            }
        }
    }
    debug!("countdown: stopped");
}
