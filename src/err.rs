// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Driver Error Codes
//!
//! This module provides the error type returned by every fallible TCU
//! operation, plus the kernel status codes those errors map onto.

use core::fmt;

use crate::kernel::dev::timer::tcu::clock::ClockRole;

/// Kernel status code (negative values indicate errors)
pub type Status = i32;

/// Busy error
pub const RX_ERR_BUSY: Status = -1;

/// Not found error
pub const RX_ERR_NOT_FOUND: Status = -3;

/// Invalid arguments error
pub const RX_ERR_INVALID_ARGS: Status = -10;

/// Out of range error
pub const RX_ERR_OUT_OF_RANGE: Status = -33;

/// No resources error
pub const RX_ERR_NO_RESOURCES: Status = -15;

/// Result type for TCU operations
pub type Result<T = ()> = core::result::Result<T, TcuError>;

/// Which resource could not be acquired during bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// The register block could not be mapped
    Registers,

    /// A named channel clock could not be resolved or prepared
    Clock { role: ClockRole, channel: usize },

    /// An interrupt line could not be requested
    Irq { line: u32 },
}

/// TCU error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcuError {
    /// Clock, register or interrupt unavailable at construction
    Resource(ResourceKind),

    /// The explicitly requested channel is already allocated
    Busy,

    /// Auto-allocation found no stopped channel
    NoChannelAvailable,

    /// Deadline exceeds the 16-bit counter width
    OutOfRange,

    /// Channel index outside the pool
    InvalidChannel,

    /// Malformed topology description
    InvalidTopology,

    /// The tick clock reports a rate of zero
    ZeroRate,
}

impl TcuError {
    /// Convert error to kernel status code
    pub const fn to_status(self) -> Status {
        match self {
            TcuError::Resource(ResourceKind::Clock { .. }) => RX_ERR_NOT_FOUND,
            TcuError::Resource(_) => RX_ERR_NO_RESOURCES,
            TcuError::Busy => RX_ERR_BUSY,
            TcuError::NoChannelAvailable => RX_ERR_NOT_FOUND,
            TcuError::OutOfRange => RX_ERR_OUT_OF_RANGE,
            TcuError::InvalidChannel | TcuError::InvalidTopology | TcuError::ZeroRate => {
                RX_ERR_INVALID_ARGS
            }
        }
    }
}

impl From<TcuError> for Status {
    fn from(err: TcuError) -> Self {
        err.to_status()
    }
}

impl fmt::Display for TcuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TcuError::Resource(ResourceKind::Registers) => f.write_str("register block unavailable"),
            TcuError::Resource(ResourceKind::Clock { role, channel }) => {
                write!(f, "clock {}{} unavailable", role.prefix(), channel)
            }
            TcuError::Resource(ResourceKind::Irq { line }) => {
                write!(f, "interrupt line {} unavailable", line)
            }
            TcuError::Busy => f.write_str("channel busy"),
            TcuError::NoChannelAvailable => f.write_str("no free channel"),
            TcuError::OutOfRange => f.write_str("deadline out of range"),
            TcuError::InvalidChannel => f.write_str("invalid channel index"),
            TcuError::InvalidTopology => f.write_str("invalid topology"),
            TcuError::ZeroRate => f.write_str("tick clock rate is zero"),
        }
    }
}
