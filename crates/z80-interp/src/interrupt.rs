//! Maskable and non-maskable interrupt handling, including the Z80 daisy
//! chain.

use emu_core::LineState;
use log::{debug, warn};

use crate::bus::Z80Bus;
use crate::cpu::{BlockRepeat, Z80};
use crate::cycles::CycleTable;

/// Most peripherals a daisy chain can hold.
pub const MAX_DAISY: usize = 4;

/// Device state bit: the device is requesting an interrupt.
pub const INT_REQ: u8 = 0x01;

/// Device state bit: the device is under service and blocks the devices
/// below it (interrupt enable out low).
pub const INT_IEO: u8 = 0x02;

/// A daisy-chained peripheral.
pub trait DaisyDevice {
    /// Interrupt acknowledged. Returns the vector (IM 2) or the opcode word
    /// (IM 0) the device places on the bus.
    fn entry(&mut self, param: i32) -> u32;

    /// The CPU executed RETI while this device was under service.
    fn reti(&mut self, param: i32);

    /// CPU reset.
    fn reset(&mut self, param: i32);
}

/// One chain position. Earlier entries have lower priority.
pub struct DaisyChainEntry {
    pub param: i32,
    pub device: Box<dyn DaisyDevice>,
}

impl DaisyChainEntry {
    pub fn new(device: impl DaisyDevice + 'static, param: i32) -> Self {
        Self {
            param,
            device: Box::new(device),
        }
    }
}

/// Chain arbitration state.
pub(crate) struct DaisyChain {
    entries: Vec<DaisyChainEntry>,
    pub(crate) int_state: [u8; MAX_DAISY],
    /// Device whose request wins arbitration.
    pub(crate) request: Option<usize>,
    /// Device currently under service.
    pub(crate) service: Option<usize>,
}

impl DaisyChain {
    pub(crate) fn new(mut entries: Vec<DaisyChainEntry>) -> Self {
        if entries.len() > MAX_DAISY {
            warn!(
                "daisy chain has {} entries, keeping the first {MAX_DAISY}",
                entries.len()
            );
            entries.truncate(MAX_DAISY);
        }
        Self {
            entries,
            int_state: [0; MAX_DAISY],
            request: None,
            service: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.entries.is_empty()
    }

    pub(crate) fn reset(&mut self) {
        self.int_state = [0; MAX_DAISY];
        self.request = None;
        self.service = None;
        for entry in &mut self.entries {
            entry.device.reset(entry.param);
        }
    }

    /// Record a device's new state and re-arbitrate.
    ///
    /// Returns true when the state changed and some device now requests.
    pub(crate) fn update(&mut self, device: usize, state: u8) -> bool {
        if device >= self.entries.len() {
            warn!(
                "interrupt acknowledge named daisy device {device}, chain has {}",
                self.len()
            );
            return false;
        }
        if self.int_state[device] == state {
            return false;
        }
        self.int_state[device] = state;
        self.rescan();
        self.request.is_some()
    }

    /// Walk the chain from lowest to highest priority. A device under
    /// service masks every request below it.
    pub(crate) fn rescan(&mut self) {
        self.request = None;
        self.service = None;
        for (i, &state) in self.int_state[..self.entries.len()].iter().enumerate() {
            if state & INT_IEO != 0 {
                self.request = None;
                self.service = Some(i);
            }
            if state & INT_REQ != 0 {
                self.request = Some(i);
            }
        }
        debug!(
            "daisy chain rescan: request {:?} service {:?}",
            self.request, self.service
        );
    }

    /// Hand the bus to the winning device and take its vector.
    fn acknowledge(&mut self) -> Option<u32> {
        let device = self.request.take()?;
        let entry = self.entries.get_mut(device)?;
        Some(entry.device.entry(entry.param))
    }

    fn return_from_interrupt(&mut self) {
        if let Some(entry) = self.service.and_then(|d| self.entries.get_mut(d)) {
            entry.device.reti(entry.param);
        }
    }
}

impl<B: Z80Bus> Z80<B> {
    /// Drive the maskable interrupt line.
    ///
    /// With a daisy chain, asserting the line first asks the bus which
    /// device moved and what its state is now.
    pub fn set_irq_line(&mut self, line: u8, state: LineState) {
        self.irq_state = state;
        if !state.is_asserted() {
            return;
        }

        if self.daisy.is_active() {
            let ack = self.bus.irq_acknowledge(line);
            let device = (ack >> 8) as usize;
            let device_state = ack as u8;
            if !self.daisy.update(device, device_state) {
                return;
            }
        }

        self.take_interrupt();
    }

    /// Drive the NMI line. Only a clear-to-assert edge does anything.
    pub fn set_nmi_line(&mut self, state: LineState) {
        if self.nmi_state == state {
            return;
        }
        self.nmi_state = state;
        if !state.is_asserted() {
            return;
        }

        self.regs.prev_pc = 0xFFFF;
        self.leave_halt();
        self.repeat = BlockRepeat::Idle;
        self.regs.iff1 = false;
        let return_pc = self.regs.pc;
        self.push(return_pc);
        self.jump(0x0066);
        self.extra_cycles += 11;
        debug!("NMI taken, return address {return_pc:04X}");
    }

    pub(crate) fn irq_pending(&self) -> bool {
        self.irq_state.is_asserted() || self.daisy.request.is_some()
    }

    /// Accept a maskable interrupt if IFF1 allows it.
    pub(crate) fn take_interrupt(&mut self) {
        if !self.regs.iff1 {
            return;
        }

        self.regs.prev_pc = 0xFFFF;
        self.leave_halt();
        self.repeat = BlockRepeat::Idle;

        let vector = if self.daisy.is_active() {
            if self.daisy.request.is_none() {
                return;
            }
            self.regs.iff1 = false;
            self.regs.iff2 = false;
            match self.daisy.acknowledge() {
                Some(vector) => vector,
                None => return,
            }
        } else {
            self.regs.iff1 = false;
            self.regs.iff2 = false;
            self.bus.irq_acknowledge(0)
        };

        let return_pc = self.regs.pc;
        match self.regs.im {
            2 => {
                let table = u16::from_le_bytes([vector as u8, self.regs.i]);
                self.push(return_pc);
                let target = self.read16(table);
                self.regs.pc = target;
                self.extra_cycles += self.cost(CycleTable::Op, 0xCD);
            }
            1 => {
                self.push(return_pc);
                self.regs.pc = 0x0038;
                self.extra_cycles +=
                    self.cost(CycleTable::Op, 0xFF) + self.cost(CycleTable::Ex, 0xFF);
            }
            _ => match vector & 0x00FF_0000 {
                // CALL nn
                0x00CD_0000 => {
                    self.push(return_pc);
                    self.regs.pc = vector as u16;
                    self.extra_cycles +=
                        self.cost(CycleTable::Op, 0xCD) + self.cost(CycleTable::Ex, 0xFF);
                }
                // JP nn
                0x00C3_0000 => {
                    self.regs.pc = vector as u16;
                    self.extra_cycles +=
                        self.cost(CycleTable::Op, 0xC3) + self.cost(CycleTable::Ex, 0xFF);
                }
                // Anything else runs as RST
                _ => {
                    self.push(return_pc);
                    let target = (vector & 0x38) as u8;
                    self.regs.pc = u16::from(target);
                    self.extra_cycles +=
                        self.cost(CycleTable::Op, target) + self.cost(CycleTable::Ex, target);
                }
            },
        }

        debug!(
            "IRQ taken in IM {}: vector {vector:06X}, {return_pc:04X} -> {:04X}",
            self.regs.im, self.regs.pc
        );
        self.bus.pc_changed(self.regs.pc);
    }

    /// RETN. If IFF2 re-enables interrupts and one is waiting, it is taken
    /// straight away.
    pub(crate) fn retn(&mut self) {
        let pc = self.pop();
        self.jump(pc);
        if !self.regs.iff1 && self.regs.iff2 {
            self.regs.iff1 = true;
            if self.irq_pending() {
                self.take_interrupt();
            }
        } else {
            self.regs.iff1 = self.regs.iff2;
        }
    }

    /// RETI. Tells the device under service; IFF1 is left alone.
    pub(crate) fn reti(&mut self) {
        let pc = self.pop();
        self.jump(pc);
        if let Some(device) = self.daisy.service {
            debug!("RETI to {pc:04X}, daisy device {device} serviced");
        }
        self.daisy.return_from_interrupt();
    }
}
