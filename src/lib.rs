// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux TCU Clock-Event Driver
//!
//! Channel allocation and one-shot clock-event support for the Ingenic
//! Timer/Counter Unit. The driver needs an allocator and three platform
//! services, expressed as traits:
//!
//! - a clock manager ([`ClockProvider`]) resolving `timerN`/`counterN`
//! - an interrupt controller ([`IrqController`]) binding named handlers
//! - a register block ([`TcuRegs`]), normally [`MmioRegs`]
//!
//! Bring-up goes through [`tcu_init`]; the scheduler then drives each
//! [`ClockEventChannel`] with `arm` and `shutdown`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

// Error codes
pub mod err;

// MMIO register access
pub mod reg;

// Kernel services and drivers
pub mod kernel;

pub use err::{Result, Status, TcuError};
pub use kernel::dev::interrupt::{IrqController, IrqHandler, IrqReturn, IrqTable};
pub use kernel::dev::timer::tcu::clock::{Clock, ClockProvider};
pub use kernel::dev::timer::tcu::regs::{MmioRegs, TcuRegs};
pub use kernel::dev::timer::tcu::{
    tcu_init, ChannelSelect, ChannelState, ClockEventChannel, ClockEventFeatures,
    ClockEventState, EventCallback, Tcu, TcuDevice, TcuTopology,
};
