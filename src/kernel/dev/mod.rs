// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Device Drivers
//!
//! Drivers are organized by category. Each one reaches the platform only
//! through the service traits of the category it plugs into.

// Interrupt dispatch
pub mod interrupt;

// Hardware timers
pub mod timer;

// Re-exports
pub use interrupt::{IrqController, IrqHandler, IrqReturn, IrqTable};
