// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! TCU Register Interface
//!
//! # Register Map
//!
//! | Offset | Name  | Description                          |
//! |--------|-------|--------------------------------------|
//! | 0x10   | TER   | Counter enable                       |
//! | 0x14   | TESR  | Counter enable set                   |
//! | 0x18   | TECR  | Counter enable clear                 |
//! | 0x1C   | TSR   | Timer stop                           |
//! | 0x20   | TFR   | Interrupt flag                       |
//! | 0x24   | TFSR  | Interrupt flag set                   |
//! | 0x28   | TFCR  | Interrupt flag clear                 |
//! | 0x2C   | TSSR  | Timer stop set                       |
//! | 0x30   | TMR   | Interrupt mask                       |
//! | 0x34   | TMSR  | Interrupt mask set                   |
//! | 0x38   | TMCR  | Interrupt mask clear                 |
//! | 0x3C   | TSCR  | Timer stop clear                     |
//! | 0x40+n | TDFRn | Full data (compare) value            |
//! | 0x44+n | TDHRn | Half data value                      |
//! | 0x48+n | TCNTn | Counter                              |
//! | 0x4C+n | TCSRn | Channel control                      |
//! | 0xF0   | TSTR  | Status                               |
//! | 0xF4   | TSTSR | Status set                           |
//! | 0xF8   | TSTCR | Status clear                         |
//!
//! Per-channel registers repeat every [`CHANNEL_STRIDE`] bytes. The data and
//! counter registers are 16 bits wide; callers must not write wider values.

use crate::err::{ResourceKind, Result, TcuError};
use crate::reg::{read_reg32, wmb, write_reg32};

/// Distance between consecutive channels' register banks
pub const CHANNEL_STRIDE: usize = 0x10;

/// Bits of TCSR that the acquisition sequence resets
pub const TCSR_RESET_MASK: u32 = 0xffff;

// ============================================================================
// Register Offsets
// ============================================================================

/// Global TCU registers
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcuReg {
    Ter = 0x10,
    Tesr = 0x14,
    Tecr = 0x18,
    Tsr = 0x1c,
    Tfr = 0x20,
    Tfsr = 0x24,
    Tfcr = 0x28,
    Tssr = 0x2c,
    Tmr = 0x30,
    Tmsr = 0x34,
    Tmcr = 0x38,
    Tscr = 0x3c,
    Tstr = 0xf0,
    Tstsr = 0xf4,
    Tstcr = 0xf8,
}

impl TcuReg {
    /// Byte offset from the block base
    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// Per-channel registers, at their channel 0 offsets
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelReg {
    Tdfr = 0x40,
    Tdhr = 0x44,
    Tcnt = 0x48,
    Tcsr = 0x4c,
}

impl ChannelReg {
    /// Byte offset of this register for `channel`
    pub const fn offset(self, channel: usize) -> usize {
        self as usize + channel * CHANNEL_STRIDE
    }
}

bitflags::bitflags! {
    /// Channel control register (TCSR) bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChannelControl: u32 {
        /// Count the peripheral clock
        const PCK_EN = 1 << 0;

        /// Count the RTC clock
        const RTC_EN = 1 << 1;

        /// Count the external oscillator
        const EXT_EN = 1 << 2;

        /// Input prescaler, divide by 4^n
        const PRESCALE = 0b111 << 3;

        /// PWM output enable
        const PWM_EN = 1 << 7;

        /// PWM output initial level high
        const PWM_INITL_HIGH = 1 << 8;

        /// Abrupt PWM shutdown
        const PWM_SD = 1 << 9;
    }
}

/// Full-match interrupt bit for `channel` in TFR/TMR and their set/clear twins
#[inline]
pub const fn full_match_bit(channel: usize) -> u32 {
    1 << channel
}

// ============================================================================
// Register Block Access
// ============================================================================

/// Accessor over a TCU register block
///
/// Implementations perform no validation. Every write must reach the device
/// before any later access through the same block.
pub trait TcuRegs: Send + Sync {
    /// Read the register at byte offset `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write the register at byte offset `offset`
    fn write(&self, offset: usize, value: u32);

    #[inline]
    fn read_global(&self, reg: TcuReg) -> u32 {
        self.read(reg.offset())
    }

    #[inline]
    fn write_global(&self, reg: TcuReg, value: u32) {
        self.write(reg.offset(), value)
    }

    #[inline]
    fn read_channel(&self, reg: ChannelReg, channel: usize) -> u32 {
        self.read(reg.offset(channel))
    }

    #[inline]
    fn write_channel(&self, reg: ChannelReg, channel: usize, value: u32) {
        self.write(reg.offset(channel), value)
    }

    /// Read-modify-write of the bits selected by `mask`
    fn update_channel(&self, reg: ChannelReg, channel: usize, mask: u32, value: u32) {
        let old = self.read_channel(reg, channel);
        self.write_channel(reg, channel, (old & !mask) | (value & mask));
    }
}

/// Memory-mapped TCU register block
#[derive(Debug)]
pub struct MmioRegs {
    base: usize,
}

impl MmioRegs {
    /// Wrap an already mapped register block
    ///
    /// # Safety
    ///
    /// `base` must be the virtual address of a mapped TCU register block that
    /// stays mapped for the lifetime of the returned value, and no other
    /// driver may program the same channels.
    pub unsafe fn new(base: usize) -> Result<Self> {
        if base == 0 || base % 4 != 0 {
            return Err(TcuError::Resource(ResourceKind::Registers));
        }
        Ok(Self { base })
    }

    /// Base address of the block
    pub fn base(&self) -> usize {
        self.base
    }
}

impl TcuRegs for MmioRegs {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` requires `base` to map the whole block
        unsafe { read_reg32(self.base + offset) }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: as for `read`
        unsafe { write_reg32(self.base + offset, value) };
        wmb();
    }
}
