// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Timer/Counter Unit Driver
//!
//! The TCU is one register block exposing up to eight independent counting
//! channels. Each channel counts from zero toward a programmed compare value
//! and raises an interrupt on the match. This driver:
//!
//! - Owns the channel pool and hands channels out at bring-up
//! - Gates each channel's tick and count-enable clocks so idle channels draw
//!   no power
//! - Runs allocated channels as one-shot clock-event sources
//!
//! # Bring-up
//!
//! ```rust,ignore
//! let topology = TcuTopology::parse("tcu.interrupts=27,26,25 tcu.timers=0")?;
//! let regs = unsafe { topology.map_registers()? };
//! let device = tcu_init(&topology, regs, &clocks, &irqs, |_| Box::new(tick))?;
//! device.clock_event(0).unwrap().arm(1000)?;
//! ```

pub mod cevt;
pub mod channel;
pub mod clock;
pub mod init;
pub mod regs;

use alloc::vec::Vec;

use crate::err::{Result, TcuError};
use crate::{log_debug, log_error};

use channel::Channel;
use clock::{Clock, ClockProvider, ClockRole, PreparedClock};
use regs::{ChannelReg, TcuRegs, TCSR_RESET_MASK};

pub use cevt::{ClockEventChannel, ClockEventFeatures, ClockEventState, EventCallback};
pub use channel::ChannelState;
pub use init::{tcu_init, TcuDevice, TcuTopology, TCU_COMPATIBLE, TCU_IRQ_NAMES};

/// Maximum number of channels in one TCU
pub const MAX_CHANNELS: usize = 8;

/// Which channel to allocate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelect {
    /// First stopped channel, lowest index first
    Auto,

    /// Exactly this channel
    Index(usize),
}

/// The channel pool
pub struct Tcu<R: TcuRegs, C: Clock> {
    /// Register block
    regs: R,

    /// Fixed after construction
    channels: Vec<Channel<C>>,
}

impl<R: TcuRegs, C: Clock> Tcu<R, C> {
    /// Build a pool of `num_channels` stopped channels
    ///
    /// Takes and prepares, but does not enable, `timerN` and `counterN` for
    /// every channel. On failure every clock taken so far is unprepared and
    /// released before returning.
    pub fn new<P>(regs: R, num_channels: usize, clocks: &P) -> Result<Self>
    where
        P: ClockProvider<Clock = C>,
    {
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            log_error!("TCU: unsupported channel count {}", num_channels);
            return Err(TcuError::InvalidTopology);
        }

        let mut channels = Vec::with_capacity(num_channels);
        for index in 0..num_channels {
            let tick = PreparedClock::acquire(clocks, ClockRole::Timer, index);
            let count = tick.and_then(|tick| {
                PreparedClock::acquire(clocks, ClockRole::Counter, index).map(|count| (tick, count))
            });

            match count {
                Ok((tick, count)) => channels.push(Channel::new(index, tick, count)),
                Err(err) => {
                    log_error!("TCU: channel {}: {}", index, err);
                    // `channels` drops here, releasing every clock taken so far
                    return Err(err);
                }
            }
        }

        log_debug!("TCU: pool of {} channels", num_channels);
        Ok(Self { regs, channels })
    }

    /// Number of channels in the pool
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Channel `index`, if it exists
    pub fn channel(&self, index: usize) -> Option<&Channel<C>> {
        self.channels.get(index)
    }

    /// All channels, in index order
    pub fn channels(&self) -> &[Channel<C>] {
        &self.channels
    }

    /// Register block
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Allocate a channel and leave it primed
    ///
    /// # Returns
    ///
    /// - The channel, primed and with its control register cleared
    /// - Err(TcuError::Busy) if the requested channel is already counting
    /// - Err(TcuError::InvalidChannel) if the index is outside the pool
    /// - Err(TcuError::NoChannelAvailable) if auto-allocation found nothing
    pub fn request_channel(&self, select: ChannelSelect) -> Result<&Channel<C>> {
        let channel = match select {
            ChannelSelect::Index(index) => {
                let channel = self.channel(index).ok_or(TcuError::InvalidChannel)?;
                if !channel.claim() {
                    return Err(TcuError::Busy);
                }
                channel
            }
            ChannelSelect::Auto => self
                .channels
                .iter()
                .find(|channel| channel.is_stopped() && channel.claim())
                .ok_or(TcuError::NoChannelAvailable)?,
        };

        self.regs
            .update_channel(ChannelReg::Tcsr, channel.index(), TCSR_RESET_MASK, 0);

        log_debug!("TCU: allocated channel {}", channel.index());
        Ok(channel)
    }

    /// Return a channel to the pool, gating both clocks
    ///
    /// Only bring-up unwinding calls this: a channel driving a registered
    /// clock-event source stays allocated for the life of the pool.
    pub(crate) fn release_channel(&self, channel: &Channel<C>) {
        channel.disable();
        channel.stop();
        log_debug!("TCU: released channel {}", channel.index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::ResourceKind;
    use crate::kernel::testing::{FakeClockProvider, FakeRegs};
    use regs::ChannelControl;

    fn make_tcu(n: usize) -> (Tcu<FakeRegs, crate::kernel::testing::FakeClock>, FakeClockProvider) {
        let provider = FakeClockProvider::new(n, 1000);
        let tcu = Tcu::new(FakeRegs::new(), n, &provider).unwrap();
        (tcu, provider)
    }

    #[test]
    fn test_new_pool_is_stopped() {
        let (tcu, provider) = make_tcu(4);
        assert_eq!(tcu.num_channels(), 4);
        for channel in tcu.channels() {
            assert!(!channel.is_enabled());
            assert!(channel.is_stopped());
        }
        for i in 0..4 {
            assert_eq!(provider.stats(&format!("timer{}", i)).prepare_count(), 1);
            assert_eq!(provider.stats(&format!("counter{}", i)).enable_count(), 0);
        }
    }

    #[test]
    fn test_channel_count_bounds() {
        let provider = FakeClockProvider::new(9, 1000);
        assert_eq!(
            Tcu::new(FakeRegs::new(), 0, &provider).err(),
            Some(TcuError::InvalidTopology)
        );
        assert_eq!(
            Tcu::new(FakeRegs::new(), 9, &provider).err(),
            Some(TcuError::InvalidTopology)
        );
        assert!(Tcu::new(FakeRegs::new(), 8, &provider).is_ok());
    }

    #[test]
    fn test_missing_clock_unwinds() {
        let provider = FakeClockProvider::new(3, 1000);
        provider.remove("counter2");

        let err = Tcu::new(FakeRegs::new(), 3, &provider).err();
        assert_eq!(
            err,
            Some(TcuError::Resource(ResourceKind::Clock {
                role: ClockRole::Counter,
                channel: 2,
            }))
        );

        for name in ["timer0", "counter0", "timer1", "counter1", "timer2"] {
            let stats = provider.stats(name);
            assert_eq!(stats.prepare_count(), 0, "{} left prepared", name);
            assert!(stats.released(), "{} leaked", name);
        }
    }

    #[test]
    fn test_auto_allocation_exhausts_pool() {
        let (tcu, _provider) = make_tcu(3);
        let mut seen = Vec::new();
        for _ in 0..3 {
            let channel = tcu.request_channel(ChannelSelect::Auto).unwrap();
            assert_eq!(channel.state(), ChannelState::Primed);
            seen.push(channel.index());
        }
        assert_eq!(seen, [0, 1, 2]);
        assert_eq!(
            tcu.request_channel(ChannelSelect::Auto).err(),
            Some(TcuError::NoChannelAvailable)
        );
    }

    #[test]
    fn test_auto_skips_explicitly_taken() {
        let (tcu, _provider) = make_tcu(3);
        tcu.request_channel(ChannelSelect::Index(0)).unwrap();
        let channel = tcu.request_channel(ChannelSelect::Auto).unwrap();
        assert_eq!(channel.index(), 1);
    }

    #[test]
    fn test_explicit_request_busy() {
        let (tcu, provider) = make_tcu(2);
        tcu.channel(1).unwrap().start();
        let before = tcu.channel(1).unwrap().state();
        let counter = provider.stats("counter1").enable_count();

        assert_eq!(
            tcu.request_channel(ChannelSelect::Index(1)).err(),
            Some(TcuError::Busy)
        );
        assert_eq!(tcu.channel(1).unwrap().state(), before);
        assert_eq!(provider.stats("counter1").enable_count(), counter);
        assert_eq!(provider.stats("timer1").enable_count(), 0);
    }

    #[test]
    fn test_explicit_request_out_of_pool() {
        let (tcu, _provider) = make_tcu(2);
        assert_eq!(
            tcu.request_channel(ChannelSelect::Index(2)).err(),
            Some(TcuError::InvalidChannel)
        );
    }

    #[test]
    fn test_request_clears_control_register() {
        let (tcu, _provider) = make_tcu(2);
        let dirty = ChannelControl::PCK_EN | ChannelControl::PRESCALE | ChannelControl::PWM_EN;
        tcu.regs().write_channel(ChannelReg::Tcsr, 1, dirty.bits());

        tcu.request_channel(ChannelSelect::Index(1)).unwrap();
        assert_eq!(tcu.regs().read_channel(ChannelReg::Tcsr, 1), 0);
    }

    #[test]
    fn test_release_returns_channel() {
        let (tcu, provider) = make_tcu(1);
        let channel = tcu.request_channel(ChannelSelect::Auto).unwrap();
        tcu.release_channel(channel);

        assert_eq!(tcu.channel(0).unwrap().state(), ChannelState::Free);
        assert_eq!(provider.stats("counter0").enable_count(), 0);
        assert!(tcu.request_channel(ChannelSelect::Auto).is_ok());
    }

    #[test]
    fn test_drop_releases_everything() {
        let (tcu, provider) = make_tcu(2);
        tcu.request_channel(ChannelSelect::Auto).unwrap().enable();
        drop(tcu);

        for name in ["timer0", "counter0", "timer1", "counter1"] {
            let stats = provider.stats(name);
            assert_eq!(stats.enable_count(), 0);
            assert_eq!(stats.prepare_count(), 0);
            assert!(stats.released());
        }
    }
}
