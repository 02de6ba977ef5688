use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::types::Step;

/// Countdown bookkeeping for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Seconds left on the clock.
    pub time_remaining: u64,
    pub is_paused: bool,
    /// False for steps without a timer.
    pub is_active: bool,
}

impl TimerState {
    pub fn for_step(step: &Step) -> Self {
        let seconds = step.timer_seconds();
        Self {
            time_remaining: seconds,
            is_paused: true,
            is_active: seconds > 0,
        }
    }

    /// Whether the clock should be counting down right now.
    pub fn is_running(&self) -> bool {
        self.is_active && !self.is_paused && self.time_remaining > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("no timer for step {0}")]
    UnknownStep(u32),
}

/// Build fresh timer states for a recipe's steps, keyed by 1-based step
/// number. Pure: the same steps always produce the same map.
pub fn derive_timer_states(steps: &[Step]) -> BTreeMap<u32, TimerState> {
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| (index as u32 + 1, TimerState::for_step(step)))
        .collect()
}

/// All timers for the selected recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerBoard {
    timers: BTreeMap<u32, TimerState>,
}

impl TimerBoard {
    pub fn from_steps(steps: &[Step]) -> Self {
        Self {
            timers: derive_timer_states(steps),
        }
    }

    /// Discard all progress and start over from `steps`.
    pub fn reset(&mut self, steps: &[Step]) {
        self.timers = derive_timer_states(steps);
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn get(&self, step_number: u32) -> Option<&TimerState> {
        self.timers.get(&step_number)
    }

    pub fn states(&self) -> &BTreeMap<u32, TimerState> {
        &self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn pause(&mut self, step_number: u32) -> Result<TimerState, TimerError> {
        self.update(step_number, |t| t.is_paused = true)
    }

    pub fn resume(&mut self, step_number: u32) -> Result<TimerState, TimerError> {
        self.update(step_number, |t| t.is_paused = false)
    }

    /// Overwrite the remaining time. The value is not checked against the
    /// step's declared duration.
    pub fn set_remaining(
        &mut self,
        step_number: u32,
        seconds: u64,
    ) -> Result<TimerState, TimerError> {
        self.update(step_number, |t| t.time_remaining = seconds)
    }

    fn update(
        &mut self,
        step_number: u32,
        f: impl FnOnce(&mut TimerState),
    ) -> Result<TimerState, TimerError> {
        let timer = self
            .timers
            .get_mut(&step_number)
            .ok_or(TimerError::UnknownStep(step_number))?;
        f(timer);
        Ok(*timer)
    }
}
