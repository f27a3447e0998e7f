// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Interrupt Dispatch
//!
//! Interrupt lines are claimed by drivers at bring-up with a name and a
//! handler object. The platform's top-level interrupt entry calls
//! [`IrqTable::dispatch`] with the line it decoded; the table looks the
//! handler up and runs it to completion.
//!
//! The table lock is only held while looking up or editing registrations,
//! never while a handler runs, so handlers may re-arm their device (or touch
//! the table) from interrupt context.

use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::Mutex;

use crate::err::{ResourceKind, Result, TcuError};
use crate::log_debug;

/// Interrupt handler outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// The interrupt was not for this handler, or carried no event
    None,

    /// The interrupt was serviced
    Handled,
}

/// A driver-side interrupt handler
pub trait IrqHandler: Send + Sync {
    /// Service `irq`; runs in interrupt context and must not block
    fn handle_irq(&self, irq: u32) -> IrqReturn;
}

/// Interrupt line allocation service
pub trait IrqController {
    /// Claim `irq` for `handler`
    fn request_irq(&self, irq: u32, name: &'static str, handler: Arc<dyn IrqHandler>) -> Result;

    /// Release `irq`; no-op if it was never requested
    fn free_irq(&self, irq: u32);
}

/// One claimed line
struct IrqAction {
    irq: u32,
    name: &'static str,
    handler: Arc<dyn IrqHandler>,
}

/// Software interrupt dispatch table
pub struct IrqTable {
    /// Number of lines the controller exposes
    max_irq: u32,

    actions: Mutex<Vec<IrqAction>>,
}

impl IrqTable {
    /// Create an empty table for lines `1..max_irq`
    ///
    /// Line 0 is reserved as "no mapping".
    pub const fn new(max_irq: u32) -> Self {
        Self {
            max_irq,
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Deliver `irq` to its handler
    pub fn dispatch(&self, irq: u32) -> IrqReturn {
        let handler = {
            let actions = self.actions.lock();
            match actions.iter().find(|a| a.irq == irq) {
                Some(action) => action.handler.clone(),
                None => return IrqReturn::None,
            }
        };
        handler.handle_irq(irq)
    }

    /// Name given when `irq` was requested
    pub fn name_of(&self, irq: u32) -> Option<&'static str> {
        self.actions.lock().iter().find(|a| a.irq == irq).map(|a| a.name)
    }

    /// Whether `irq` currently has a handler
    pub fn is_requested(&self, irq: u32) -> bool {
        self.name_of(irq).is_some()
    }
}

impl IrqController for IrqTable {
    fn request_irq(&self, irq: u32, name: &'static str, handler: Arc<dyn IrqHandler>) -> Result {
        if irq == 0 || irq >= self.max_irq {
            return Err(TcuError::Resource(ResourceKind::Irq { line: irq }));
        }

        let mut actions = self.actions.lock();
        if actions.iter().any(|a| a.irq == irq) {
            return Err(TcuError::Resource(ResourceKind::Irq { line: irq }));
        }
        actions.push(IrqAction { irq, name, handler });

        log_debug!("irq {} requested by {}", irq, name);
        Ok(())
    }

    fn free_irq(&self, irq: u32) {
        self.actions.lock().retain(|a| a.irq != irq);
    }
}
