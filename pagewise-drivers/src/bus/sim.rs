//! Simulated open-drain bus for host tests
//!
//! Models the two wires as wired-AND lines shared between the master
//! pins and a single 7-bit device. The device decodes start/stop from
//! data edges while the clock is high, samples bits on rising clock edges
//! and changes its own output on falling edges, like real silicon.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use pagewise_hal::{I2cConfig, OpenDrainPin};

use super::SoftI2c;

/// What the device observed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    Start,
    Stop,
    /// Any byte clocked in by the device, address bytes included
    Byte(u8),
}

/// Behaviour of the simulated device
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    address: u8,
    /// NACK data bytes from this index on (per transaction)
    nack_from: Option<usize>,
    response: VecDeque<u8>,
}

impl DeviceConfig {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            nack_from: None,
            response: VecDeque::new(),
        }
    }

    pub fn nack_from(mut self, index: usize) -> Self {
        self.nack_from = Some(index);
        self
    }

    pub fn respond_with(mut self, bytes: &[u8]) -> Self {
        self.response.extend(bytes.iter().copied());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Address,
    AddressAck { read: bool },
    Receive,
    DataAck,
    Send,
    MasterAck,
    Ignore,
}

pub struct Wire {
    scl: bool,
    /// `None` while the master has released the line
    sda_master: Option<bool>,
    device_low: bool,
    phase: Phase,
    shift: u8,
    bits: u8,
    sending: u8,
    data_count: usize,
    master_acked: bool,
    device: DeviceConfig,
    pub events: Vec<WireEvent>,
    /// Data bytes the device acked or nacked, address bytes excluded
    pub received: Vec<u8>,
    /// Ack bits sent by the master after each byte it read
    pub master_acks: Vec<bool>,
    pub delay_ns: u64,
}

impl Wire {
    fn new(device: DeviceConfig) -> Self {
        Self {
            scl: true,
            sda_master: None,
            device_low: false,
            phase: Phase::Idle,
            shift: 0,
            bits: 0,
            sending: 0,
            data_count: 0,
            master_acked: false,
            device,
            events: Vec::new(),
            received: Vec::new(),
            master_acks: Vec::new(),
            delay_ns: 0,
        }
    }

    fn sda_level(&self) -> bool {
        self.sda_master.unwrap_or(true) && !self.device_low
    }

    fn set_sda(&mut self, level: Option<bool>) {
        let before = self.sda_level();
        self.sda_master = level;
        let after = self.sda_level();
        if self.scl && before != after {
            if after {
                self.on_stop();
            } else {
                self.on_start();
            }
        }
    }

    fn set_scl(&mut self, high: bool) {
        if high == self.scl {
            return;
        }
        self.scl = high;
        if high {
            self.on_rise();
        } else {
            self.on_fall();
        }
    }

    fn on_start(&mut self) {
        self.events.push(WireEvent::Start);
        self.phase = Phase::Address;
        self.shift = 0;
        self.bits = 0;
        self.data_count = 0;
        self.device_low = false;
    }

    fn on_stop(&mut self) {
        self.events.push(WireEvent::Stop);
        self.phase = Phase::Idle;
        self.device_low = false;
    }

    fn on_rise(&mut self) {
        let level = self.sda_level();
        match self.phase {
            Phase::Address | Phase::Receive => {
                self.shift = (self.shift << 1) | u8::from(level);
                self.bits += 1;
            }
            Phase::MasterAck => {
                self.master_acked = !level;
                self.master_acks.push(!level);
            }
            _ => {}
        }
    }

    fn on_fall(&mut self) {
        match self.phase {
            Phase::Address if self.bits == 8 => {
                let byte = self.shift;
                self.events.push(WireEvent::Byte(byte));
                self.bits = 0;
                self.shift = 0;
                if byte >> 1 == self.device.address {
                    self.device_low = true;
                    self.phase = Phase::AddressAck {
                        read: byte & 1 == 1,
                    };
                } else {
                    self.phase = Phase::Ignore;
                }
            }
            Phase::Receive if self.bits == 8 => {
                let byte = self.shift;
                self.events.push(WireEvent::Byte(byte));
                self.received.push(byte);
                self.bits = 0;
                self.shift = 0;
                let ack = self
                    .device
                    .nack_from
                    .map_or(true, |limit| self.data_count < limit);
                self.data_count += 1;
                if ack {
                    self.device_low = true;
                    self.phase = Phase::DataAck;
                } else {
                    self.phase = Phase::Ignore;
                }
            }
            Phase::AddressAck { read } => {
                self.device_low = false;
                if read {
                    self.load_next_byte();
                } else {
                    self.phase = Phase::Receive;
                }
            }
            Phase::DataAck => {
                self.device_low = false;
                self.phase = Phase::Receive;
            }
            Phase::Send => {
                self.bits += 1;
                if self.bits == 8 {
                    self.device_low = false;
                    self.phase = Phase::MasterAck;
                } else {
                    self.device_low = (self.sending << self.bits) & 0x80 == 0;
                }
            }
            Phase::MasterAck => {
                if self.master_acked {
                    self.load_next_byte();
                } else {
                    self.device_low = false;
                    self.phase = Phase::Ignore;
                }
            }
            _ => {}
        }
    }

    fn load_next_byte(&mut self) {
        self.sending = self.device.response.pop_front().unwrap_or(0xFF);
        self.bits = 0;
        self.phase = Phase::Send;
        self.device_low = self.sending & 0x80 == 0;
    }
}

pub type SharedWire = Rc<RefCell<Wire>>;

#[derive(Clone, Copy)]
enum Line {
    Sda,
    Scl,
}

pub struct SimPin {
    wire: SharedWire,
    line: Line,
}

impl OpenDrainPin for SimPin {
    fn drive_high(&mut self) {
        let mut wire = self.wire.borrow_mut();
        match self.line {
            Line::Sda => wire.set_sda(Some(true)),
            Line::Scl => wire.set_scl(true),
        }
    }

    fn drive_low(&mut self) {
        let mut wire = self.wire.borrow_mut();
        match self.line {
            Line::Sda => wire.set_sda(Some(false)),
            Line::Scl => wire.set_scl(false),
        }
    }

    fn release(&mut self) {
        let mut wire = self.wire.borrow_mut();
        match self.line {
            Line::Sda => wire.set_sda(None),
            Line::Scl => wire.set_scl(true),
        }
    }

    fn is_high(&mut self) -> bool {
        let wire = self.wire.borrow();
        match self.line {
            Line::Sda => wire.sda_level(),
            Line::Scl => wire.scl,
        }
    }
}

/// Delay that only accumulates the requested time
pub struct SimDelay {
    wire: SharedWire,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.wire.borrow_mut().delay_ns += u64::from(ns);
    }
}

pub fn sim_parts(device: DeviceConfig) -> (SimPin, SimPin, SimDelay, SharedWire) {
    let wire = Rc::new(RefCell::new(Wire::new(device)));
    let sda = SimPin {
        wire: wire.clone(),
        line: Line::Sda,
    };
    let scl = SimPin {
        wire: wire.clone(),
        line: Line::Scl,
    };
    let delay = SimDelay { wire: wire.clone() };
    (sda, scl, delay, wire)
}

/// 400 kHz master wired to one simulated device
pub fn sim_bus(device: DeviceConfig) -> (SoftI2c<SimPin, SimPin, SimDelay>, SharedWire) {
    let (sda, scl, delay, wire) = sim_parts(device);
    let bus = SoftI2c::new(sda, scl, delay, I2cConfig::FAST).unwrap();
    (bus, wire)
}
