//! Legacy 8259 cascade: remapping, masking and end of interrupt.

use bitvec::order::Lsb0;
use bitvec::view::BitView as _;
use derive_more::derive::Display;

use super::{IrqLine, Vector};
use crate::common::pmio::{Port, PortIo};
use crate::config::{LINES_PER_PIC, RESERVED_VECTORS, VECTOR_BASE};

pub const PIC1_CMD_PORT: Port = Port(0x20);
pub const PIC1_DATA_PORT: Port = Port(0x21);
pub const PIC2_CMD_PORT: Port = Port(0xA0);
pub const PIC2_DATA_PORT: Port = Port(0xA1);

// Initialization Control Words

// Initialize and send ICW4 later
const ICW1: u8 = 0b0001_0001;

// Slave hangs off IR2 of the master.
const ICW3_PIC1: u8 = 0b100;

// Slave cascade identity is 2.
const ICW3_PIC2: u8 = 2;

// Operate in 80x86 mode
const ICW4: u8 = 0b0000_0001;

// Mask nothing.
const OCW1_UNMASK_ALL: u8 = 0;

pub const EOI: u8 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RemapError {
    #[display("vector base {_0:#x} overlaps cpu exception vectors")]
    OverlapsExceptions(Vector),
    #[display("vector base {_0:#x} is not a multiple of 8")]
    Misaligned(Vector),
    #[display("slave base {slave:#x} does not follow master base {master:#x}")]
    SlaveNotAdjacent { master: Vector, slave: Vector },
}

impl core::error::Error for RemapError {}

/// Vector bases of the two controllers.
///
/// Always valid: both ranges clear of the cpu exceptions, 8-aligned, with
/// the slave directly after the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapConfig {
    master: Vector,
    slave: Vector,
}

impl RemapConfig {
    pub const DEFAULT: Self = Self {
        master: VECTOR_BASE,
        slave: VECTOR_BASE + LINES_PER_PIC,
    };

    pub const fn new(master: Vector, slave: Vector) -> Result<Self, RemapError> {
        if master < RESERVED_VECTORS {
            return Err(RemapError::OverlapsExceptions(master));
        }
        if master % LINES_PER_PIC != 0 {
            return Err(RemapError::Misaligned(master));
        }
        match master.checked_add(LINES_PER_PIC) {
            Some(expected) if expected == slave => Ok(Self { master, slave }),
            _ => Err(RemapError::SlaveNotAdjacent { master, slave }),
        }
    }

    pub const fn master(self) -> Vector { self.master }

    pub const fn slave(self) -> Vector { self.slave }

    pub const fn vector_of(self, line: IrqLine) -> Vector {
        if line.is_slave() {
            self.slave + line.pic_offset()
        } else {
            self.master + line.pic_offset()
        }
    }

    /// Line raising `vector`, if it is one of the sixteen remapped vectors.
    pub fn line_of(self, vector: Vector) -> Option<IrqLine> {
        let offset = vector.checked_sub(self.master)?;
        IrqLine::from_repr(offset)
    }
}

impl Default for RemapConfig {
    fn default() -> Self { Self::DEFAULT }
}

/// Runs the four word initialization handshake on both controllers and
/// unmasks every line. The order of the writes is part of the protocol.
pub fn remap(ports: &dyn PortIo, config: RemapConfig) {
    ports.write(PIC1_CMD_PORT, ICW1);
    ports.write(PIC2_CMD_PORT, ICW1);

    ports.write(PIC1_DATA_PORT, config.master());
    ports.write(PIC2_DATA_PORT, config.slave());

    ports.write(PIC1_DATA_PORT, ICW3_PIC1);
    ports.write(PIC2_DATA_PORT, ICW3_PIC2);

    ports.write(PIC1_DATA_PORT, ICW4);
    ports.write(PIC2_DATA_PORT, ICW4);

    ports.write(PIC1_DATA_PORT, OCW1_UNMASK_ALL);
    ports.write(PIC2_DATA_PORT, OCW1_UNMASK_ALL);
}

/// Acknowledges `line`. The slave must hear its EOI before the master.
pub fn eoi(ports: &dyn PortIo, line: IrqLine) {
    if line.is_slave() {
        ports.write(PIC2_CMD_PORT, EOI);
    }
    ports.write(PIC1_CMD_PORT, EOI);
}

pub fn mask_all(ports: &dyn PortIo) {
    ports.write(PIC1_DATA_PORT, 0xff);
    ports.write(PIC2_DATA_PORT, 0xff);
}

pub fn mask(ports: &dyn PortIo, line: IrqLine) { set_masked(ports, line, true) }

pub fn unmask(ports: &dyn PortIo, line: IrqLine) { set_masked(ports, line, false) }

fn set_masked(ports: &dyn PortIo, line: IrqLine, masked: bool) {
    let pic = if line.is_slave() { PIC2_DATA_PORT } else { PIC1_DATA_PORT };

    let mut mask = ports.read(pic);
    mask.view_bits_mut::<Lsb0>()
        .set(line.pic_offset() as usize, masked);
    ports.write(pic, mask);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::RecordingPorts;

    #[test]
    fn remap_writes_handshake_in_order() {
        let ports = RecordingPorts::new();
        remap(&ports, RemapConfig::new(0x20, 0x28).unwrap());

        let expected = [
            (0x20, 0x11),
            (0xA0, 0x11),
            (0x21, 0x20),
            (0xA1, 0x28),
            (0x21, 0x04),
            (0xA1, 0x02),
            (0x21, 0x01),
            (0xA1, 0x01),
            (0x21, 0x00),
            (0xA1, 0x00),
        ]
        .map(|(port, value)| (Port(port), value));
        assert_eq!(ports.writes(), expected);
    }

    #[test]
    fn config_keeps_clear_of_exceptions_and_pairs_slave() {
        let config = RemapConfig::new(0x20, 0x28).unwrap();
        assert_eq!(config.slave() - config.master(), 8);
        assert!(config.master() >= 32);
        assert_eq!(RemapConfig::DEFAULT, config);

        assert_eq!(RemapConfig::new(0x08, 0x10), Err(RemapError::OverlapsExceptions(0x08)));
        assert_eq!(RemapConfig::new(0x24, 0x2c), Err(RemapError::Misaligned(0x24)));
        assert_eq!(
            RemapConfig::new(0x20, 0x70),
            Err(RemapError::SlaveNotAdjacent {
                master: 0x20,
                slave: 0x70
            })
        );
        assert!(matches!(
            RemapConfig::new(0xf8, 0x00),
            Err(RemapError::SlaveNotAdjacent { .. })
        ));
    }

    #[test]
    fn vectors_and_lines_map_both_ways() {
        let config = RemapConfig::new(0x30, 0x38).unwrap();
        for line in IrqLine::all() {
            let vector = config.vector_of(line);
            assert_eq!(vector, 0x30 + line as u8);
            assert_eq!(config.line_of(vector), Some(line));
        }
        assert_eq!(config.line_of(0x2f), None);
        assert_eq!(config.line_of(0x40), None);
    }

    #[test]
    fn eoi_reaches_slave_before_master() {
        let ports = RecordingPorts::new();
        eoi(&ports, IrqLine::Keyboard);
        assert_eq!(ports.writes(), [(PIC1_CMD_PORT, EOI)]);

        let ports = RecordingPorts::new();
        eoi(&ports, IrqLine::Acpi);
        assert_eq!(ports.writes(), [(PIC2_CMD_PORT, EOI), (PIC1_CMD_PORT, EOI)]);
    }

    #[test]
    fn masking_touches_only_the_owning_bit() {
        let ports = RecordingPorts::new();
        ports.write(PIC1_DATA_PORT, 0b0000_0001);
        ports.write(PIC2_DATA_PORT, 0b1000_0000);

        mask(&ports, IrqLine::Keyboard);
        mask(&ports, IrqLine::Mouse);
        assert_eq!(ports.read(PIC1_DATA_PORT), 0b0000_0011);
        assert_eq!(ports.read(PIC2_DATA_PORT), 0b1001_0000);

        unmask(&ports, IrqLine::Timer);
        assert_eq!(ports.read(PIC1_DATA_PORT), 0b0000_0010);

        mask_all(&ports);
        assert_eq!(ports.read(PIC1_DATA_PORT), 0xff);
        assert_eq!(ports.read(PIC2_DATA_PORT), 0xff);
    }
}
