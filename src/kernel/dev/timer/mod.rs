// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Hardware Timers
//!
//! This module contains drivers for hardware timer peripherals used as
//! scheduler clock-event sources.
//!
//! # Supported Timers
//!
//! - **Ingenic TCU**: Timer/Counter Unit of the JZ47xx SoC family, up to
//!   eight 16-bit channels, each run as a one-shot event source

pub mod tcu;

// Re-exports
pub use tcu::{
    tcu_init, ChannelSelect, ClockEventChannel, Tcu, TcuDevice, TcuTopology,
};
