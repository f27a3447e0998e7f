// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Host Test Doubles
//!
//! Stand-ins for the hardware and platform services the TCU driver talks
//! to, so driver logic runs under `cargo test` on the build host:
//!
//! - [`FakeRegs`]: a register file backed by atomics that logs every write
//! - [`FakeClockProvider`]: a clock manager counting prepare/enable calls
//!   per clock, with failure injection
//!
//! Interrupts are delivered through the real
//! [`IrqTable`](crate::kernel::dev::interrupt::IrqTable).

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};

use spin::Mutex;

use crate::err::{Result, TcuError};
use crate::kernel::dev::timer::tcu::clock::{Clock, ClockProvider};
use crate::kernel::dev::timer::tcu::regs::TcuRegs;

// ============================================================================
// Registers
// ============================================================================

/// Size of the emulated register block in bytes
const FAKE_BLOCK_SIZE: usize = 0x100;

/// In-memory TCU register block
pub struct FakeRegs {
    words: [AtomicU32; FAKE_BLOCK_SIZE / 4],
    writes: Mutex<Vec<(usize, u32)>>,
}

impl FakeRegs {
    pub fn new() -> Self {
        Self {
            words: core::array::from_fn(|_| AtomicU32::new(0)),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Every write since creation or the last [`FakeRegs::clear_writes`],
    /// as `(offset, value)` in program order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.lock().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().clear();
    }
}

impl TcuRegs for FakeRegs {
    fn read(&self, offset: usize) -> u32 {
        self.words[offset / 4].load(Ordering::SeqCst)
    }

    fn write(&self, offset: usize, value: u32) {
        self.words[offset / 4].store(value, Ordering::SeqCst);
        self.writes.lock().push((offset, value));
    }
}

// ============================================================================
// Clocks
// ============================================================================

/// A call made on a fake clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOp {
    Prepare,
    Unprepare,
    Enable,
    Disable,
    /// Reference released
    Put,
}

struct ClockState {
    name: String,
    rate: AtomicU64,
    prepare_count: AtomicI32,
    enable_count: AtomicI32,
    /// Handles handed out and not yet dropped
    refs: AtomicI32,
    fail_prepare: AtomicBool,
    removed: AtomicBool,
}

/// Counters of one fake clock, live across handle drops
#[derive(Clone)]
pub struct ClockStats(Arc<ClockState>);

impl ClockStats {
    pub fn prepare_count(&self) -> i32 {
        self.0.prepare_count.load(Ordering::SeqCst)
    }

    pub fn enable_count(&self) -> i32 {
        self.0.enable_count.load(Ordering::SeqCst)
    }

    /// Whether every handle to this clock has been dropped
    pub fn released(&self) -> bool {
        self.0.refs.load(Ordering::SeqCst) == 0
    }
}

type OpLog = Arc<Mutex<Vec<(String, ClockOp)>>>;

/// A handle to a fake clock
pub struct FakeClock {
    state: Arc<ClockState>,
    ops: OpLog,
}

impl FakeClock {
    fn record(&self, op: ClockOp) {
        self.ops.lock().push((self.state.name.clone(), op));
    }
}

impl Clock for FakeClock {
    fn prepare(&self) -> Result {
        if self.state.fail_prepare.load(Ordering::SeqCst) {
            return Err(TcuError::Busy);
        }
        self.state.prepare_count.fetch_add(1, Ordering::SeqCst);
        self.record(ClockOp::Prepare);
        Ok(())
    }

    fn unprepare(&self) {
        self.state.prepare_count.fetch_sub(1, Ordering::SeqCst);
        self.record(ClockOp::Unprepare);
    }

    fn enable(&self) {
        self.state.enable_count.fetch_add(1, Ordering::SeqCst);
        self.record(ClockOp::Enable);
    }

    fn disable(&self) {
        self.state.enable_count.fetch_sub(1, Ordering::SeqCst);
        self.record(ClockOp::Disable);
    }

    fn rate(&self) -> u64 {
        self.state.rate.load(Ordering::SeqCst)
    }
}

impl Drop for FakeClock {
    fn drop(&mut self) {
        self.state.refs.fetch_sub(1, Ordering::SeqCst);
        self.record(ClockOp::Put);
    }
}

/// A clock manager exposing `timerN` and `counterN` for each channel
pub struct FakeClockProvider {
    clocks: Vec<Arc<ClockState>>,
    ops: OpLog,
}

impl FakeClockProvider {
    /// Clocks for channels `0..channels`, all at `rate` Hz
    pub fn new(channels: usize, rate: u64) -> Self {
        let mut clocks = Vec::new();
        for index in 0..channels {
            for prefix in ["timer", "counter"] {
                clocks.push(Arc::new(ClockState {
                    name: alloc::format!("{}{}", prefix, index),
                    rate: AtomicU64::new(rate),
                    prepare_count: AtomicI32::new(0),
                    enable_count: AtomicI32::new(0),
                    refs: AtomicI32::new(0),
                    fail_prepare: AtomicBool::new(false),
                    removed: AtomicBool::new(false),
                }));
            }
        }
        Self {
            clocks,
            ops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn state(&self, name: &str) -> &Arc<ClockState> {
        self.clocks
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no fake clock {}", name))
    }

    /// Counters for `name`
    pub fn stats(&self, name: &str) -> ClockStats {
        ClockStats(self.state(name).clone())
    }

    /// Make `name` unresolvable
    pub fn remove(&self, name: &str) {
        self.state(name).removed.store(true, Ordering::SeqCst);
    }

    /// Make every prepare of `name` fail
    pub fn fail_prepare(&self, name: &str) {
        self.state(name).fail_prepare.store(true, Ordering::SeqCst);
    }

    pub fn set_rate(&self, name: &str, rate: u64) {
        self.state(name).rate.store(rate, Ordering::SeqCst);
    }

    /// Every clock call since creation or the last [`FakeClockProvider::clear_ops`]
    pub fn ops(&self) -> Vec<(String, ClockOp)> {
        self.ops.lock().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().clear();
    }
}

impl ClockProvider for FakeClockProvider {
    type Clock = FakeClock;

    fn get(&self, name: &str) -> Option<FakeClock> {
        let state = self
            .clocks
            .iter()
            .find(|c| c.name == name && !c.removed.load(Ordering::SeqCst))?;
        state.refs.fetch_add(1, Ordering::SeqCst);
        Some(FakeClock {
            state: state.clone(),
            ops: self.ops.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_regs_log_writes() {
        let regs = FakeRegs::new();
        regs.write(0x40, 7);
        regs.write(0xf8, 1);
        assert_eq!(regs.read(0x40), 7);
        assert_eq!(regs.writes(), [(0x40, 7), (0xf8, 1)]);

        regs.clear_writes();
        assert!(regs.writes().is_empty());
        assert_eq!(regs.read(0xf8), 1);
    }

    #[test]
    fn test_fake_clock_counts() {
        let provider = FakeClockProvider::new(1, 32768);
        let clk = provider.get("timer0").unwrap();
        let stats = provider.stats("timer0");
        assert!(!stats.released());

        clk.prepare().unwrap();
        clk.enable();
        assert_eq!(stats.prepare_count(), 1);
        assert_eq!(stats.enable_count(), 1);
        assert_eq!(clk.rate(), 32768);

        drop(clk);
        assert!(stats.released());
        assert_eq!(
            provider.ops().last(),
            Some(&("timer0".to_string(), ClockOp::Put))
        );
    }

    #[test]
    fn test_fake_clock_injection() {
        let provider = FakeClockProvider::new(1, 1000);
        provider.remove("counter0");
        assert!(provider.get("counter0").is_none());

        provider.fail_prepare("timer0");
        assert!(provider.get("timer0").unwrap().prepare().is_err());
    }
}
