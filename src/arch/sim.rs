//! Simulated CPU for hosted builds.
//!
//! Each thread owns one CPU: an interrupt flag (clear at start), a latch of
//! pending vectors and an IDT. Raising a vector while the flag is clear
//! latches it; re-enabling interrupts delivers latched vectors in order,
//! the way a held PIC line fires as soon as `sti` retires.

use std::cell::{Cell, RefCell};

use arrayvec::ArrayVec;

use crate::interrupt::gate::{EntryPoint, GateFlags, TrapGateInstaller};
use crate::interrupt::handler::irq_sr;
use crate::interrupt::{TrapContext, Vector};

const IDT_LEN: usize = 256;
const PENDING_LEN: usize = 32;

#[derive(Debug, Clone, Copy)]
pub struct Gate {
    pub entry: EntryPoint,
    pub selector: u16,
    pub flags: GateFlags,
}

struct Cpu {
    interrupts: Cell<bool>,
    pending: RefCell<ArrayVec<Vector, PENDING_LEN>>,
    idt: RefCell<[Option<Gate>; IDT_LEN]>,
}

thread_local! {
    static CPU: Cpu = const {
        Cpu {
            interrupts: Cell::new(false),
            pending: RefCell::new(ArrayVec::new_const()),
            idt: RefCell::new([None; IDT_LEN]),
        }
    };
}

pub fn enable_interrupt() {
    CPU.with(|cpu| cpu.interrupts.set(true));
    while interrupts_enabled() {
        let Some(vector) = CPU.with(|cpu| cpu.pending.borrow_mut().pop_at(0)) else {
            break;
        };
        deliver(vector);
    }
}

pub fn disable_interrupt() { CPU.with(|cpu| cpu.interrupts.set(false)); }

pub fn interrupts_enabled() -> bool { CPU.with(|cpu| cpu.interrupts.get()) }

/// Asserts `vector` on this thread's CPU.
pub fn raise(vector: Vector) {
    if interrupts_enabled() {
        deliver(vector);
        return;
    }
    CPU.with(|cpu| {
        let mut pending = cpu.pending.borrow_mut();
        if !pending.contains(&vector) {
            pending.push(vector);
        }
    });
}

pub fn pending() -> ArrayVec<Vector, PENDING_LEN> { CPU.with(|cpu| cpu.pending.borrow().clone()) }

pub fn gate(vector: Vector) -> Option<Gate> { CPU.with(|cpu| cpu.idt.borrow()[vector as usize]) }

fn deliver(vector: Vector) {
    let Some(gate) = gate(vector) else {
        panic!("vector {vector:#x} raised without a gate");
    };
    assert!(gate.flags.contains(GateFlags::PRESENT), "vector {vector:#x} gate not present");
    // SAFETY: simulated entry points are plain rust functions.
    unsafe { (gate.entry.0)() };
}

/// This thread's IDT.
#[derive(Debug, Default)]
pub struct Idt;

impl TrapGateInstaller for Idt {
    fn install_trap_gate(&mut self, vector: Vector, entry: EntryPoint, selector: u16, flags: GateFlags) {
        CPU.with(|cpu| {
            cpu.idt.borrow_mut()[vector as usize] = Some(Gate {
                entry,
                selector,
                flags,
            })
        });
    }
}

/// Common path as seen from a simulated trampoline: the context already
/// carries kernel segments, so this dispatches and then `sti`s.
pub fn irq_common(ctx: &TrapContext) {
    irq_sr(ctx);
    enable_interrupt();
}

macro_rules! trampoline {
    ($name:ident, $line:literal) => {
        extern "C" fn $name() {
            $crate::arch::disable_interrupt();
            let ctx = $crate::interrupt::TrapContext::for_vector(
                $crate::config::VECTOR_BASE as u32 + $line,
            );
            $crate::arch::sim::irq_common(&ctx);
        }
    };
}
pub(crate) use trampoline;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_with_interrupts_disabled_latches_once() {
        disable_interrupt();
        raise(0x21);
        raise(0x21);
        raise(0x2c);

        assert_eq!(pending().as_slice(), &[0x21, 0x2c]);
        CPU.with(|cpu| cpu.pending.borrow_mut().clear());
    }
}
