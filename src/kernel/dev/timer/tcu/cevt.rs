// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! TCU Clock-Event Channel
//!
//! Drives one allocated channel as a one-shot clock-event source. The
//! scheduler asks for "notify me after N ticks"; the channel counts to N,
//! interrupts, and the handler reports back through the registered callback.
//!
//! # States
//!
//! - **Idle**: tick clock gated, counter holds still (channel `Primed`)
//! - **Armed**: tick clock live, counting toward the deadline (channel `Armed`)
//!
//! The count-enable clock stays live for the whole lifetime of the event
//! source, so ungating the tick clock is what starts the count.
//!
//! # Delivery
//!
//! The callback runs at most once per arming. The interrupt handler gates the
//! tick clock first and only reports the event when that actually moved the
//! channel out of `Armed`; a spurious interrupt, or one that lost the race
//! against [`ClockEventChannel::shutdown`], finds the channel idle and stays
//! quiet.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;

use super::channel::{Channel, ChannelState};
use super::clock::Clock;
use super::regs::{full_match_bit, ChannelReg, TcuReg, TcuRegs};
use super::Tcu;
use crate::err::{Result, TcuError};
use crate::kernel::dev::interrupt::{IrqHandler, IrqReturn};
use crate::{log_debug, log_trace};

/// Smallest deadline the hardware can reliably hit, in ticks
pub const MIN_DELTA_TICKS: u64 = 10;

/// Largest deadline, the width of the 16-bit counter
pub const MAX_DELTA_TICKS: u64 = 0xffff;

/// Preference among competing clock-event sources
pub const CLOCK_EVENT_RATING: u32 = 200;

const NSEC_PER_SEC: u128 = 1_000_000_000;

/// Expiry notification, run in interrupt context
pub type EventCallback = Box<dyn Fn() + Send + Sync>;

bitflags::bitflags! {
    /// Capabilities advertised to the scheduler
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClockEventFeatures: u32 {
        /// Can fire once at a programmed deadline
        const ONESHOT = 1 << 1;
    }
}

/// Clock-event state
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEventState {
    /// Not counting
    Idle = 0,

    /// Counting toward a deadline
    Armed = 1,
}

/// A one-shot clock-event source backed by one TCU channel
pub struct ClockEventChannel<R: TcuRegs, C: Clock> {
    /// Owning pool, for register access
    tcu: Arc<Tcu<R, C>>,

    /// Allocated channel
    index: usize,

    /// `tcu-chanN`
    name: String,

    /// Interrupt line
    irq: u32,

    /// CPU this source is bound to
    cpu: u32,

    /// Tick clock rate, read once at registration
    tick_rate: u64,

    /// Scheduler re-entry point
    callback: EventCallback,
}

impl<R: TcuRegs, C: Clock> ClockEventChannel<R, C> {
    /// Wrap an allocated channel
    ///
    /// # Returns
    ///
    /// - Err(TcuError::InvalidChannel) if `index` is outside the pool, or the
    ///   channel was not left `Primed` by [`Tcu::request_channel`]
    /// - Err(TcuError::ZeroRate) if the tick clock reports no rate
    pub(crate) fn new(
        tcu: Arc<Tcu<R, C>>,
        index: usize,
        irq: u32,
        cpu: u32,
        callback: EventCallback,
    ) -> Result<Self> {
        let channel = tcu.channel(index).ok_or(TcuError::InvalidChannel)?;
        if channel.state() != ChannelState::Primed {
            return Err(TcuError::InvalidChannel);
        }

        let tick_rate = channel.tick_rate();
        if tick_rate == 0 {
            return Err(TcuError::ZeroRate);
        }

        Ok(Self {
            tcu,
            index,
            name: format!("tcu-chan{}", index),
            irq,
            cpu,
            tick_rate,
            callback,
        })
    }

    /// The driven channel
    pub fn channel(&self) -> &Channel<C> {
        // `new` checked the index and the pool never shrinks
        &self.tcu.channels()[self.index]
    }

    /// Owning pool
    pub fn tcu(&self) -> &Arc<Tcu<R, C>> {
        &self.tcu
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn irq(&self) -> u32 {
        self.irq
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }

    /// Counter rate in Hz
    pub fn tick_rate(&self) -> u64 {
        self.tick_rate
    }

    pub fn rating(&self) -> u32 {
        CLOCK_EVENT_RATING
    }

    pub fn features(&self) -> ClockEventFeatures {
        ClockEventFeatures::ONESHOT
    }

    pub fn min_delta_ticks(&self) -> u64 {
        MIN_DELTA_TICKS
    }

    pub fn max_delta_ticks(&self) -> u64 {
        MAX_DELTA_TICKS
    }

    /// [`MIN_DELTA_TICKS`] in nanoseconds at this source's rate, rounded up
    pub fn min_delta_ns(&self) -> u64 {
        ticks_to_ns_ceil(MIN_DELTA_TICKS, self.tick_rate)
    }

    /// [`MAX_DELTA_TICKS`] in nanoseconds at this source's rate, rounded down
    pub fn max_delta_ns(&self) -> u64 {
        ticks_to_ns_floor(MAX_DELTA_TICKS, self.tick_rate)
    }

    /// Current state
    pub fn state(&self) -> ClockEventState {
        if self.channel().is_enabled() {
            ClockEventState::Armed
        } else {
            ClockEventState::Idle
        }
    }

    /// Stop counting without reporting an event
    ///
    /// Safe to race with the interrupt for this channel: both end with the
    /// tick clock gated, and whichever gets there first decides whether the
    /// callback runs.
    pub fn shutdown(&self) {
        if self.channel().disable() {
            log_debug!("{}: shutdown", self.name);
        }
    }

    /// Fire once after `deadline_ticks` ticks
    ///
    /// # Returns
    ///
    /// - Ok(()) once the channel is counting
    /// - Err(TcuError::OutOfRange) if the deadline does not fit the 16-bit
    ///   counter; nothing is written to the hardware
    pub fn arm(&self, deadline_ticks: u64) -> Result {
        if deadline_ticks > MAX_DELTA_TICKS {
            return Err(TcuError::OutOfRange);
        }

        let regs = self.tcu.regs();
        // Each write is fenced by the register block before the next one
        regs.write_channel(ChannelReg::Tdfr, self.index, deadline_ticks as u32);
        regs.write_channel(ChannelReg::Tcnt, self.index, 0);

        self.channel().enable();

        log_trace!("{}: armed for {} ticks", self.name, deadline_ticks);
        Ok(())
    }

    /// Unmask the channel's compare interrupt, discarding a stale one
    pub(crate) fn unmask_irq(&self) {
        let regs = self.tcu.regs();
        regs.write_global(TcuReg::Tfcr, full_match_bit(self.index));
        regs.write_global(TcuReg::Tmcr, full_match_bit(self.index));
    }

    /// Mask the channel's compare interrupt
    pub(crate) fn mask_irq(&self) {
        self.tcu
            .regs()
            .write_global(TcuReg::Tmsr, full_match_bit(self.index));
    }

    /// Service a compare-match interrupt
    pub fn handle_irq(&self) -> IrqReturn {
        // Ack first so a deadline re-armed from the callback can interrupt again
        self.tcu
            .regs()
            .write_global(TcuReg::Tfcr, full_match_bit(self.index));

        if !self.channel().disable() {
            log_trace!("{}: spurious interrupt", self.name);
            return IrqReturn::None;
        }

        (self.callback)();
        IrqReturn::Handled
    }
}

impl<R: TcuRegs, C: Clock> IrqHandler for ClockEventChannel<R, C> {
    fn handle_irq(&self, _irq: u32) -> IrqReturn {
        ClockEventChannel::handle_irq(self)
    }
}

fn ticks_to_ns_floor(ticks: u64, rate: u64) -> u64 {
    (ticks as u128 * NSEC_PER_SEC / rate as u128) as u64
}

fn ticks_to_ns_ceil(ticks: u64, rate: u64) -> u64 {
    let rate = rate as u128;
    ((ticks as u128 * NSEC_PER_SEC + rate - 1) / rate) as u64
}
