// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Channel Clock Handles
//!
//! Each TCU channel is gated by two clocks owned by the platform clock
//! manager: the tick clock (`timerN`) powering the channel's timebase
//! logic, and the count-enable clock (`counterN`) that lets the counter
//! increment. The driver only takes references, prepares them, and gates
//! them; rates and parents stay with the clock manager.

use alloc::format;

use crate::err::{ResourceKind, Result, TcuError};

/// A clock handle handed out by the clock manager
///
/// Dropping the handle releases the reference.
pub trait Clock: Send + Sync {
    /// Prepare the clock for gating; may sleep, boot-time only
    fn prepare(&self) -> Result;

    /// Undo [`Clock::prepare`]
    fn unprepare(&self);

    /// Ungate the clock; safe in interrupt context
    fn enable(&self);

    /// Gate the clock; safe in interrupt context
    fn disable(&self);

    /// Current rate in Hz, 0 if unknown
    fn rate(&self) -> u64;
}

/// Clock manager lookup service
pub trait ClockProvider {
    type Clock: Clock;

    /// Resolve a clock by name
    fn get(&self, name: &str) -> Option<Self::Clock>;
}

/// The two clocks gating a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRole {
    /// Tick clock, `timerN`
    Timer,

    /// Count-enable clock, `counterN`
    Counter,
}

impl ClockRole {
    /// Clock name prefix used by the clock manager
    pub const fn prefix(self) -> &'static str {
        match self {
            ClockRole::Timer => "timer",
            ClockRole::Counter => "counter",
        }
    }
}

/// A clock reference held in the prepared state
///
/// Unprepared when dropped, before the reference itself is released.
pub struct PreparedClock<C: Clock> {
    clk: C,
}

impl<C: Clock> PreparedClock<C> {
    /// Look up `<role><channel>` and prepare it
    pub fn acquire<P>(provider: &P, role: ClockRole, channel: usize) -> Result<Self>
    where
        P: ClockProvider<Clock = C>,
    {
        let name = format!("{}{}", role.prefix(), channel);
        let unavailable = TcuError::Resource(ResourceKind::Clock { role, channel });

        let clk = provider.get(&name).ok_or(unavailable)?;
        clk.prepare().map_err(|_| unavailable)?;

        Ok(Self { clk })
    }

    #[inline]
    pub fn enable(&self) {
        self.clk.enable();
    }

    #[inline]
    pub fn disable(&self) {
        self.clk.disable();
    }

    #[inline]
    pub fn rate(&self) -> u64 {
        self.clk.rate()
    }
}

impl<C: Clock> Drop for PreparedClock<C> {
    fn drop(&mut self) {
        self.clk.unprepare();
    }
}
