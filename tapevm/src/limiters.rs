use std::time::{Duration, Instant};

use crate::machine::MachineState;

pub enum LimiterResult {
    /// Continue executing
    Continue,
    /// Halt execution and return [`LimiterTriggered`][crate::errors::RuntimeError::LimiterTriggered]
    Halt,
}

/// Decides before every step whether execution may continue
pub trait Limiter {
    fn check(&mut self, state: &MachineState) -> LimiterResult;
}

/// Always returns [`Continue`][LimiterResult::Continue].
pub struct Unlimited;

impl Limiter for Unlimited {
    fn check(&mut self, _state: &MachineState) -> LimiterResult {
        LimiterResult::Continue
    }
}

/// Halts once the configured number of cycles has been executed.
pub struct CycleLimiter(u64);

impl CycleLimiter {
    pub fn new(max_cycles: u64) -> Self {
        CycleLimiter(max_cycles)
    }
}

impl Limiter for CycleLimiter {
    fn check(&mut self, state: &MachineState) -> LimiterResult {
        if state.cycles >= self.0 {
            LimiterResult::Halt
        } else {
            LimiterResult::Continue
        }
    }
}

/// Limits execution to within a given [`Duration`] of time.
pub struct TimeLimiter {
    max_duration: Duration,
    started_at: Option<Instant>,
}

impl TimeLimiter {
    pub fn new(max_duration: Duration) -> Self {
        TimeLimiter {
            max_duration,
            started_at: None,
        }
    }
}

impl Limiter for TimeLimiter {
    fn check(&mut self, _state: &MachineState) -> LimiterResult {
        let started_at = self.started_at.get_or_insert_with(Instant::now);

        if started_at.elapsed() > self.max_duration {
            LimiterResult::Halt
        } else {
            LimiterResult::Continue
        }
    }
}

/// Halts as soon as one of both limiters halts
impl<A: Limiter, B: Limiter> Limiter for (A, B) {
    fn check(&mut self, state: &MachineState) -> LimiterResult {
        match self.0.check(state) {
            LimiterResult::Halt => LimiterResult::Halt,
            LimiterResult::Continue => self.1.check(state),
        }
    }
}
