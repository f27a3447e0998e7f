// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! TCU Channel
//!
//! One hardware counting unit and the gating state of its two clocks.
//!
//! # Gating State
//!
//! | State     | Tick clock | Count clock | Meaning                         |
//! |-----------|------------|-------------|---------------------------------|
//! | `Free`    | gated      | gated       | unallocated, power-safe default |
//! | `Ticking` | live       | gated       | transient, during acquisition   |
//! | `Primed`  | gated      | live        | allocated, idle, re-armable     |
//! | `Armed`   | live       | live        | counting toward the deadline    |
//!
//! The state is one atomic byte. Every transition flips a single bit with an
//! atomic read-modify-write and gates the matching clock only when the bit
//! actually changed, so racing callers (an interrupt and a shutdown, say)
//! never issue a clock enable/disable pair twice.

use core::sync::atomic::{AtomicU8, Ordering};

use super::clock::{Clock, PreparedClock};

/// Tick clock live
const ENABLED: u8 = 1 << 0;

/// Count-enable clock live
const COUNTING: u8 = 1 << 1;

/// Channel gating state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Both clocks gated
    Free = 0,

    /// Tick clock live, not counting
    Ticking = ENABLED,

    /// Counting clock live, tick clock gated
    Primed = COUNTING,

    /// Both clocks live
    Armed = ENABLED | COUNTING,
}

impl ChannelState {
    /// Create from raw value
    pub const fn from_raw(raw: u8) -> Self {
        match raw & (ENABLED | COUNTING) {
            ENABLED => Self::Ticking,
            COUNTING => Self::Primed,
            3 => Self::Armed,
            _ => Self::Free,
        }
    }

    /// Get raw value
    pub const fn into_raw(self) -> u8 {
        self as u8
    }

    /// Whether the tick clock is powered
    pub const fn is_enabled(self) -> bool {
        self.into_raw() & ENABLED != 0
    }

    /// Whether the count-enable clock is gated
    pub const fn is_stopped(self) -> bool {
        self.into_raw() & COUNTING == 0
    }
}

/// One TCU channel
pub struct Channel<C: Clock> {
    /// Position in the pool
    index: usize,

    /// Raw [`ChannelState`]
    state: AtomicU8,

    /// Tick clock, `timerN`
    tick_clock: PreparedClock<C>,

    /// Count-enable clock, `counterN`
    count_clock: PreparedClock<C>,
}

impl<C: Clock> Channel<C> {
    /// Create a channel in the `Free` state
    pub(crate) fn new(index: usize, tick_clock: PreparedClock<C>, count_clock: PreparedClock<C>) -> Self {
        Self {
            index,
            state: AtomicU8::new(ChannelState::Free.into_raw()),
            tick_clock,
            count_clock,
        }
    }

    /// Position in the pool
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current gating state
    pub fn state(&self) -> ChannelState {
        ChannelState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Whether the tick clock is powered
    pub fn is_enabled(&self) -> bool {
        self.state().is_enabled()
    }

    /// Whether the channel is not counting
    pub fn is_stopped(&self) -> bool {
        self.state().is_stopped()
    }

    /// Rate of the tick clock in Hz
    pub fn tick_rate(&self) -> u64 {
        self.tick_clock.rate()
    }

    /// Power the tick clock
    ///
    /// Returns `true` if the clock was gated before the call.
    pub(crate) fn enable(&self) -> bool {
        let prev = self.state.fetch_or(ENABLED, Ordering::AcqRel);
        if prev & ENABLED != 0 {
            return false;
        }
        self.tick_clock.enable();
        true
    }

    /// Gate the tick clock
    ///
    /// Returns `true` if the clock was live before the call.
    pub(crate) fn disable(&self) -> bool {
        let prev = self.state.fetch_and(!ENABLED, Ordering::AcqRel);
        if prev & ENABLED == 0 {
            return false;
        }
        self.tick_clock.disable();
        true
    }

    /// Power the count-enable clock
    ///
    /// Returns `true` if the channel was stopped before the call.
    pub(crate) fn start(&self) -> bool {
        let prev = self.state.fetch_or(COUNTING, Ordering::AcqRel);
        if prev & COUNTING != 0 {
            return false;
        }
        self.count_clock.enable();
        true
    }

    /// Gate the count-enable clock
    ///
    /// Returns `true` if the channel was counting before the call.
    pub(crate) fn stop(&self) -> bool {
        let prev = self.state.fetch_and(!COUNTING, Ordering::AcqRel);
        if prev & COUNTING == 0 {
            return false;
        }
        self.count_clock.disable();
        true
    }

    /// Claim a stopped channel and leave it `Primed`
    ///
    /// Runs enable, start, disable: the tick clock has to be live at least
    /// once for the hardware to latch the following control register write.
    /// The stopped check and the start are one atomic step, so two claimers
    /// can never both win the same channel.
    pub(crate) fn claim(&self) -> bool {
        let mut cur = self.state.load(Ordering::Acquire);
        loop {
            if cur & COUNTING != 0 {
                return false;
            }
            match self.state.compare_exchange_weak(
                cur,
                cur | ENABLED | COUNTING,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }

        if cur & ENABLED == 0 {
            self.tick_clock.enable();
        }
        self.count_clock.enable();
        self.disable();
        true
    }
}

impl<C: Clock> Drop for Channel<C> {
    fn drop(&mut self) {
        self.disable();
        self.stop();
    }
}
