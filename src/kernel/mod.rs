// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Services
//!
//! The slice of kernel infrastructure the TCU driver runs on: logging, boot
//! command line parsing, and the device layer.

// Boot arguments
pub mod cmdline;

// Logging macros
pub mod debug;

// Device drivers
pub mod dev;

// Host test doubles
#[cfg(test)]
pub mod testing;
