//! Shared test bus.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use z80_interp::{Bus, Z80, Z80Bus, Z80Config};

/// Flat 64 KiB RAM with scripted I/O.
pub struct TestBus {
    pub ram: Box<[u8; 0x10000]>,
    /// Values returned by port reads, keyed by the full 16-bit port.
    pub io_read_values: HashMap<u16, VecDeque<u8>>,
    /// Every port write, in order.
    pub io_writes: Vec<(u16, u8)>,
    /// Every PC notification, in order.
    pub pc_changes: Vec<u16>,
    /// Values handed out on interrupt acknowledge, in order.
    pub acknowledge: VecDeque<u32>,
    pub acknowledged_lines: Vec<u8>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            io_read_values: HashMap::new(),
            io_writes: Vec::new(),
            pc_changes: Vec::new(),
            acknowledge: VecDeque::new(),
            acknowledged_lines: Vec::new(),
        }
    }

    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.ram[address.wrapping_add(i as u16) as usize] = byte;
        }
    }

    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    pub fn peek16(&self, address: u16) -> u16 {
        u16::from_le_bytes([self.peek(address), self.peek(address.wrapping_add(1))])
    }

    pub fn queue_io(&mut self, port: u16, values: &[u8]) {
        self.io_read_values
            .entry(port)
            .or_default()
            .extend(values.iter().copied());
    }
}

impl Bus for TestBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }

    fn io_read(&mut self, port: u16) -> u8 {
        self.io_read_values
            .get_mut(&port)
            .and_then(VecDeque::pop_front)
            .unwrap_or(0xFF)
    }

    fn io_write(&mut self, port: u16, value: u8) {
        self.io_writes.push((port, value));
    }
}

impl Z80Bus for TestBus {
    fn pc_changed(&mut self, pc: u16) {
        self.pc_changes.push(pc);
    }

    fn irq_acknowledge(&mut self, line: u8) -> u32 {
        self.acknowledged_lines.push(line);
        self.acknowledge.pop_front().unwrap_or(0xFF)
    }
}

/// Route `log` output through the test harness. Set `RUST_LOG=trace` to
/// see block suspensions and skipped loops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// CPU with `program` loaded at 0 and SP at 0xF000.
pub fn cpu_with(program: &[u8]) -> Z80<TestBus> {
    cpu_with_config(program, Z80Config::default())
}

pub fn cpu_with_config(program: &[u8], config: Z80Config) -> Z80<TestBus> {
    init_logging();
    let mut bus = TestBus::new();
    bus.load(0x0000, program);
    let mut cpu = Z80::with_config(bus, config);
    cpu.set_sp(0xF000);
    cpu
}

/// Execute exactly one instruction.
///
/// A budget of 1 always stops after the first instruction because every
/// opcode costs at least 4 T-states.
pub fn step(cpu: &mut Z80<TestBus>) -> i32 {
    cpu.execute(1)
}

/// Step until HALT, returning the total T-states used.
pub fn run_until_halt(cpu: &mut Z80<TestBus>) -> i32 {
    let mut total = 0;
    let mut count = 0;
    while !cpu.regs().halted && count < 100_000 {
        total += step(cpu);
        count += 1;
    }
    total
}
