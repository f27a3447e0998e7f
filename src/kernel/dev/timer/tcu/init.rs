// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! TCU Bring-up
//!
//! Builds the channel pool from a board topology, then turns each listed
//! timer into a clock-event source: allocate the channel, bind its interrupt
//! line, unmask its compare interrupt. Every step that fails undoes the steps
//! before it for that timer; a failure while building the pool itself
//! releases every clock taken so far.

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::cevt::{ClockEventChannel, EventCallback};
use super::clock::{Clock, ClockProvider};
use super::regs::{MmioRegs, TcuRegs};
use super::{ChannelSelect, Tcu, MAX_CHANNELS};
use crate::err::{Result, TcuError};
use crate::kernel::cmdline::{parse_uint, Cmdline};
use crate::kernel::dev::interrupt::IrqController;
use crate::{log_error, log_info, log_warn};

/// Interrupt line names, indexed by channel
pub const TCU_IRQ_NAMES: [&str; MAX_CHANNELS] = [
    "TCU0", "TCU1", "TCU2", "TCU3", "TCU4", "TCU5", "TCU6", "TCU7",
];

/// Device-tree compatible strings this driver binds to
pub const TCU_COMPATIBLE: &[&str] = &[
    "ingenic,jz4740-tcu",
    "ingenic,jz4770-tcu",
    "ingenic,jz4780-tcu",
];

/// Board description of one TCU
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TcuTopology {
    /// Compatible string, if the board names one
    pub compatible: Option<String>,

    /// Physical base of the register block
    pub base: usize,

    /// Interrupt line of each channel; its length is the channel count
    pub interrupts: Vec<u32>,

    /// Channels to run as clock-event sources
    pub timers: Vec<usize>,

    /// CPU the clock-event sources are bound to
    pub cpu: u32,
}

impl TcuTopology {
    /// Parse `tcu.*` keys out of a boot command line
    ///
    /// | Key              | Value                          |
    /// |------------------|--------------------------------|
    /// | `tcu.compatible` | compatible string              |
    /// | `tcu.base`       | register block base            |
    /// | `tcu.interrupts` | comma separated lines, per channel |
    /// | `tcu.timers`     | comma separated channel indices |
    /// | `tcu.cpu`        | boot CPU id, default 0         |
    ///
    /// The result is validated before it is returned.
    pub fn parse(text: &str) -> Result<Self> {
        let cmdline = Cmdline::new(text);

        let base = match cmdline.get("tcu.base") {
            Some(v) => parse_uint(v)
                .and_then(|v| usize::try_from(v).ok())
                .ok_or(TcuError::InvalidTopology)?,
            None => 0,
        };

        let interrupts = cmdline
            .get_list("tcu.interrupts")
            .map(|v| v.and_then(|v| u32::try_from(v).ok()))
            .collect::<Option<Vec<_>>>()
            .ok_or(TcuError::InvalidTopology)?;

        let timers = cmdline
            .get_list("tcu.timers")
            .map(|v| v.and_then(|v| usize::try_from(v).ok()))
            .collect::<Option<Vec<_>>>()
            .ok_or(TcuError::InvalidTopology)?;

        let topology = Self {
            compatible: cmdline.get("tcu.compatible").map(|s| s.to_string()),
            base,
            interrupts,
            timers,
            cpu: cmdline.get_uint32("tcu.cpu", 0),
        };
        topology.validate()?;
        Ok(topology)
    }

    /// Number of channels the block exposes
    pub fn num_channels(&self) -> usize {
        self.interrupts.len()
    }

    /// Check the description is one this driver can bring up
    pub fn validate(&self) -> Result {
        let num_channels = self.num_channels();
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            log_error!("TCU: {} interrupt lines, need 1..={}", num_channels, MAX_CHANNELS);
            return Err(TcuError::InvalidTopology);
        }

        if self.interrupts.contains(&0) {
            log_error!("TCU: unresolved interrupt line");
            return Err(TcuError::InvalidTopology);
        }

        for (i, &timer) in self.timers.iter().enumerate() {
            if timer >= num_channels || self.timers[..i].contains(&timer) {
                log_error!("TCU: bad timer {}", timer);
                return Err(TcuError::InvalidTopology);
            }
        }

        if let Some(compatible) = &self.compatible {
            if !TCU_COMPATIBLE.contains(&compatible.as_str()) {
                log_error!("TCU: unsupported device {}", compatible);
                return Err(TcuError::InvalidTopology);
            }
        }

        Ok(())
    }

    /// Wrap the register block at [`TcuTopology::base`]
    ///
    /// # Safety
    ///
    /// `base` must be mapped at the same virtual address, as required by
    /// [`MmioRegs::new`].
    pub unsafe fn map_registers(&self) -> Result<MmioRegs> {
        MmioRegs::new(self.base)
    }
}

/// A brought-up TCU and its clock-event sources
pub struct TcuDevice<R: TcuRegs, C: Clock> {
    tcu: Arc<Tcu<R, C>>,
    events: Vec<Arc<ClockEventChannel<R, C>>>,
}

impl<R: TcuRegs, C: Clock> TcuDevice<R, C> {
    /// The channel pool
    pub fn tcu(&self) -> &Arc<Tcu<R, C>> {
        &self.tcu
    }

    /// Clock-event source running on channel `timer`
    pub fn clock_event(&self, timer: usize) -> Option<&Arc<ClockEventChannel<R, C>>> {
        self.events.iter().find(|cevt| cevt.channel().index() == timer)
    }

    /// Every registered clock-event source
    pub fn clock_events(&self) -> &[Arc<ClockEventChannel<R, C>>] {
        &self.events
    }
}

/// Bring up a TCU
///
/// Builds the pool, then registers one clock-event source per entry in
/// `topology.timers`, asking `make_callback` for each source's expiry
/// callback.
///
/// # Returns
///
/// - The device, with every listed timer primed, bound and unmasked
/// - Err if the topology is invalid or any resource is unavailable; sources
///   registered before the failure are torn down
pub fn tcu_init<R, P, I, F>(
    topology: &TcuTopology,
    regs: R,
    clocks: &P,
    irqs: &I,
    mut make_callback: F,
) -> Result<TcuDevice<R, P::Clock>>
where
    R: TcuRegs + 'static,
    P: ClockProvider,
    P::Clock: 'static,
    I: IrqController,
    F: FnMut(usize) -> EventCallback,
{
    topology.validate()?;

    let tcu = Arc::new(Tcu::new(regs, topology.num_channels(), clocks)?);
    let mut device = TcuDevice {
        tcu,
        events: Vec::with_capacity(topology.timers.len()),
    };

    for &timer in &topology.timers {
        match setup_clock_event(&device.tcu, topology, timer, irqs, make_callback(timer)) {
            Ok(cevt) => device.events.push(cevt),
            Err(err) => {
                log_error!("TCU: timer {}: {}", timer, err);
                teardown(&device, irqs);
                return Err(err);
            }
        }
    }

    log_info!(
        "TCU: {} channels, {} clock event source(s)",
        device.tcu.num_channels(),
        device.events.len()
    );
    Ok(device)
}

fn setup_clock_event<R, C, I>(
    tcu: &Arc<Tcu<R, C>>,
    topology: &TcuTopology,
    timer: usize,
    irqs: &I,
    callback: EventCallback,
) -> Result<Arc<ClockEventChannel<R, C>>>
where
    R: TcuRegs + 'static,
    C: Clock + 'static,
    I: IrqController,
{
    let channel = tcu.request_channel(ChannelSelect::Index(timer))?;

    let irq = topology.interrupts[timer];
    let cevt = match ClockEventChannel::new(tcu.clone(), timer, irq, topology.cpu, callback) {
        Ok(cevt) => Arc::new(cevt),
        Err(err) => {
            tcu.release_channel(channel);
            return Err(err);
        }
    };

    if let Err(err) = irqs.request_irq(irq, TCU_IRQ_NAMES[timer], cevt.clone()) {
        tcu.release_channel(channel);
        return Err(err);
    }

    cevt.unmask_irq();

    log_info!(
        "{}: {} Hz, irq {} ({}), cpu {}",
        cevt.name(),
        cevt.tick_rate(),
        irq,
        TCU_IRQ_NAMES[timer],
        cevt.cpu()
    );
    Ok(cevt)
}

/// Undo every registered source in reverse order
fn teardown<R, C, I>(device: &TcuDevice<R, C>, irqs: &I)
where
    R: TcuRegs,
    C: Clock,
    I: IrqController,
{
    for cevt in device.events.iter().rev() {
        log_warn!("{}: unregistering", cevt.name());
        cevt.mask_irq();
        irqs.free_irq(cevt.irq());
        cevt.shutdown();
        device.tcu.release_channel(cevt.channel());
    }
}
