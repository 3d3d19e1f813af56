// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Converts a native monotonic tick counter into elapsed seconds.

/// Timer state captured once when the library is initialized.
///
/// The frequency never changes after construction. Elapsed time is measured
/// from an epoch that starts at init and can be moved with [`TimerState::rebase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    frequency: u64,
    offset: u64,
}

impl TimerState {
    /// Captures the counter frequency and starts the epoch at `ticks_now`.
    ///
    /// # Panics
    /// Panics if `frequency` is zero: the host counter is broken and no
    /// coherent time value could ever be produced.
    pub fn new(frequency: u64, ticks_now: u64) -> Self {
        if frequency == 0 {
            log::error!("The native monotonic counter reports a frequency of zero.");
            panic!("native timer frequency is zero");
        }
        Self {
            frequency,
            offset: ticks_now,
        }
    }

    /// Returns the counter frequency in ticks per second.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    /// Returns the ticks elapsed since the epoch for a raw counter value.
    pub fn ticks_since_epoch(&self, raw_ticks: u64) -> u64 {
        raw_ticks.wrapping_sub(self.offset)
    }

    /// Returns the seconds elapsed since the epoch for a raw counter value.
    pub fn seconds(&self, raw_ticks: u64) -> f64 {
        self.ticks_since_epoch(raw_ticks) as f64 / self.frequency as f64
    }

    /// Moves the epoch so that `raw_ticks` corresponds to `seconds`.
    pub fn rebase(&mut self, raw_ticks: u64, seconds: f64) {
        let ticks = (seconds.max(0.0) * self.frequency as f64) as u64;
        self.offset = raw_ticks.wrapping_sub(ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn seconds_divide_ticks_by_frequency() {
        let timer = TimerState::new(1_000, 500);
        assert_relative_eq!(timer.seconds(500), 0.0);
        assert_relative_eq!(timer.seconds(2_000), 1.5);
    }

    #[test]
    fn seconds_are_non_decreasing() {
        let timer = TimerState::new(1_000_000_000, 42);
        let mut last = 0.0;
        for raw in (42..1_000_042).step_by(997) {
            let now = timer.seconds(raw);
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn rebase_moves_the_epoch() {
        let mut timer = TimerState::new(100, 1_000);
        timer.rebase(1_000, 25.0);
        assert_relative_eq!(timer.seconds(1_000), 25.0);
        assert_relative_eq!(timer.seconds(1_100), 26.0);
        assert_eq!(timer.frequency(), 100);
    }

    #[test]
    fn rebase_past_the_counter_origin_wraps_consistently() {
        let mut timer = TimerState::new(10, 5);
        timer.rebase(5, 100.0);
        assert_relative_eq!(timer.seconds(15), 101.0);
    }

    #[test]
    #[should_panic(expected = "frequency is zero")]
    fn zero_frequency_is_fatal() {
        let _ = TimerState::new(0, 0);
    }
}
