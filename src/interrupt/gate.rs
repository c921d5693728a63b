use bitflags::bitflags;

use super::trampoline::ENTRY_POINTS;
use super::{IrqLine, RemapConfig, Vector};
use crate::common::Privilege;
use crate::config::KERNEL_CODE_SELECTOR;

/// Address of a raw interrupt entry routine.
#[repr(transparent)]
#[derive(Debug, Clone, Copy)]
pub struct EntryPoint(pub unsafe extern "C" fn());

impl EntryPoint {
    pub fn addr(self) -> usize { self.0 as usize }
}

/// Access byte of a 32-bit IDT gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateFlags(u8);

bitflags! {
impl GateFlags: u8 {
    const PRESENT = 0b1000_0000;
    const DPL_LOW = 0b0010_0000;
    const DPL_HIGH = 0b0100_0000;
    /// 32-bit gate size.
    const GATE_32 = 0b0000_1000;
    /// Interrupt gate type; entry clears IF.
    const INTERRUPT = 0b0000_0110;
    /// Turns an interrupt gate into a trap gate.
    const TRAP = 0b0000_0001;
}}

impl GateFlags {
    /// Present, ring 0, 32-bit interrupt gate (`0x8E`).
    pub const KERNEL_INTERRUPT: Self = Self::interrupt_gate(Privilege::Kernel);

    pub const fn interrupt_gate(dpl: Privilege) -> Self {
        Self(Self::PRESENT.0 | Self::GATE_32.0 | Self::INTERRUPT.0 | (dpl as u8) << 5)
    }

    pub const fn dpl(self) -> u8 { (self.0 >> 5) & 0b11 }
}

/// Writer of single IDT entries, provided by the kernel's descriptor code.
pub trait TrapGateInstaller {
    fn install_trap_gate(&mut self, vector: Vector, entry: EntryPoint, selector: u16, flags: GateFlags);
}

impl<F> TrapGateInstaller for F
where
    F: FnMut(Vector, EntryPoint, u16, GateFlags),
{
    fn install_trap_gate(&mut self, vector: Vector, entry: EntryPoint, selector: u16, flags: GateFlags) {
        self(vector, entry, selector, flags)
    }
}

/// Points every remapped irq vector at its trampoline.
pub fn install_gates(installer: &mut dyn TrapGateInstaller, config: RemapConfig) {
    for line in IrqLine::all() {
        installer.install_trap_gate(
            config.vector_of(line),
            ENTRY_POINTS[line.index()],
            KERNEL_CODE_SELECTOR,
            GateFlags::KERNEL_INTERRUPT,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_interrupt_gate_is_0x8e() {
        assert_eq!(GateFlags::KERNEL_INTERRUPT.bits(), 0x8e);
        assert_eq!(GateFlags::KERNEL_INTERRUPT.dpl(), 0);
        assert_eq!(GateFlags::interrupt_gate(Privilege::User).bits(), 0xee);
    }

    #[test]
    fn every_line_gets_its_trampoline_once_in_order() {
        let mut installed = Vec::new();
        let mut record = |vector: Vector, entry: EntryPoint, selector: u16, flags: GateFlags| {
            installed.push((vector, entry.addr(), selector, flags));
        };
        install_gates(&mut record, RemapConfig::DEFAULT);

        assert_eq!(installed.len(), 16);
        for (line, (vector, addr, selector, flags)) in installed.into_iter().enumerate() {
            assert_eq!(vector as usize, 0x20 + line);
            assert_eq!(addr, ENTRY_POINTS[line].addr());
            assert_eq!(selector, 0x08);
            assert_eq!(flags, GateFlags::KERNEL_INTERRUPT);
        }
    }

    #[test]
    fn trampolines_are_distinct() {
        for (i, a) in ENTRY_POINTS.iter().enumerate() {
            for b in &ENTRY_POINTS[i + 1..] {
                assert_ne!(a.addr(), b.addr());
            }
        }
    }
}
