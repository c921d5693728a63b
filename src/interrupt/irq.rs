use strum::VariantArray as _;

use super::TrapContext;
use crate::config::LINES_PER_PIC;

pub type Vector = u8;

/// Hardware interrupt line behind the 8259 cascade.
///
/// Lines 0..8 are wired to the master, 8..16 to the slave.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(strum_macros::VariantArray, strum_macros::FromRepr)]
pub enum IrqLine {
    Timer = 0,
    Keyboard = 1,
    /// Slave controller; never raised on its own.
    Cascade = 2,
    Com2 = 3,
    Com1 = 4,
    Lpt2 = 5,
    Floppy = 6,
    Lpt1 = 7,
    Rtc = 8,
    Acpi = 9,
    Free10 = 10,
    Free11 = 11,
    Mouse = 12,
    Fpu = 13,
    PrimaryAta = 14,
    SecondaryAta = 15,
}

impl IrqLine {
    /// All lines, lowest first.
    pub fn all() -> impl Iterator<Item = IrqLine> { Self::VARIANTS.iter().copied() }

    pub const fn index(self) -> usize { self as usize }

    pub const fn is_slave(self) -> bool { self as u8 >= LINES_PER_PIC }

    /// Bit of this line within its controller's mask register.
    pub const fn pic_offset(self) -> u8 { self as u8 % LINES_PER_PIC }
}

/// Top-half irq routine.
///
/// Runs with interrupts disabled and must not wait for another interrupt.
pub trait IrqHandler: Sync {
    fn handle(&self, ctx: &TrapContext);
}

impl<F> IrqHandler for F
where
    F: Fn(&TrapContext) + Sync,
{
    fn handle(&self, ctx: &TrapContext) { self(ctx) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LINE_COUNT;

    #[test]
    fn lines_cover_both_controllers_in_order() {
        let lines: Vec<_> = IrqLine::all().collect();
        assert_eq!(lines.len(), LINE_COUNT);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.index(), i);
            assert_eq!(IrqLine::from_repr(i as u8), Some(*line));
            assert_eq!(line.is_slave(), i >= 8);
            assert_eq!(line.pic_offset() as usize, i % 8);
        }
        assert_eq!(IrqLine::from_repr(16), None);
    }
}
