//! Resilient driver: a two-state machine (Running / Backoff) around [`walk`], with an injectable
//! clock so tests can simulate elapsed time.

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::time::{Duration, Instant};

use crate::engine::HarvestContext;
use crate::engine::walker::walk;
use crate::store::Collection;
use crate::utils::config::{BACKOFF_INTERVAL, STATUS_INTERVAL, STATUS_MAX_CHARS};

/// Time source and sleeper used by the driver.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);
}

/// Wall clock with real (blocking) sleeps.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Backoff,
}

/// What one [`Driver::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A walk completed with this many accepted users.
    Walked(usize),
    /// The walk or status emission failed; now in backoff.
    Failed,
    /// Slept out the backoff; back to running.
    Recovered,
}

/// Status summary text, capped to the status length limit.
pub fn format_status(users: u64, posts: u64) -> String {
    let text = format!(
        "{} status:\n Users in the base: {users}\n Posts in the base: {posts}",
        env!("CARGO_PKG_NAME")
    );
    text.chars().take(STATUS_MAX_CHARS).collect()
}

pub struct Driver<'a, C: Clock> {
    ctx: &'a HarvestContext<'a>,
    clock: C,
    quota: usize,
    state: DriverState,
    last_status: Instant,
}

impl<'a, C: Clock> Driver<'a, C> {
    /// New driver in `Running`; the status timer starts now.
    pub fn new(ctx: &'a HarvestContext<'a>, clock: C, quota: usize) -> Self {
        let last_status = clock.now();
        Self {
            ctx,
            clock,
            quota,
            state: DriverState::Running,
            last_status,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Log (and optionally post) store counts once more than an interval has passed since the last one.
    fn emit_status_if_due(&mut self) -> Result<()> {
        let now = self.clock.now();
        if now.saturating_duration_since(self.last_status) <= STATUS_INTERVAL {
            return Ok(());
        }
        let users = self.ctx.store.count(Collection::Users)?;
        let posts = self.ctx.store.count(Collection::Tweets)?;
        let text = format_status(users, posts);
        info!("{}", text.replace('\n', ""));
        if self.ctx.opts.status_updates {
            self.ctx.api.post_status(&text).context("post status")?;
        }
        self.last_status = now;
        Ok(())
    }

    fn run_once(&mut self) -> Result<usize> {
        self.emit_status_if_due()?;
        walk(self.ctx, self.quota)
    }

    /// Advance the state machine by one transition.
    pub fn step(&mut self) -> StepOutcome {
        match self.state {
            DriverState::Running => match self.run_once() {
                Ok(n) => {
                    info!("Walk complete: {n} users accepted");
                    StepOutcome::Walked(n)
                }
                Err(e) => {
                    error!("{e:#}");
                    self.state = DriverState::Backoff;
                    StepOutcome::Failed
                }
            },
            DriverState::Backoff => {
                warn!("Backing off for {}s", BACKOFF_INTERVAL.as_secs());
                self.clock.sleep(BACKOFF_INTERVAL);
                self.state = DriverState::Running;
                StepOutcome::Recovered
            }
        }
    }

    /// Step forever. Only an external signal stops the process.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }
}
