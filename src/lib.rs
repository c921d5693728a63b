//! Hardware IRQ dispatch for a protected-mode x86 kernel.
//!
//! Remaps the legacy 8259 cascade, wires sixteen entry trampolines into the
//! IDT and routes every hardware interrupt to a registered [`IrqHandler`].
//!
//! [`IrqHandler`]: interrupt::IrqHandler
#![cfg_attr(target_os = "none", no_std)]

#[cfg(all(target_os = "none", not(target_arch = "x86")))]
compile_error!("bare-metal builds of the irq core target 32-bit x86 only");

pub mod arch;
pub mod common;
pub mod config;
pub mod interrupt;


pub use interrupt::{initialize, IntrptGuard, IrqDispatcher, IrqHandler, IrqLine, TrapContext};
