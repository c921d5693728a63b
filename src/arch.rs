//! CPU-specific pieces: the interrupt flag, the trampolines and the common
//! entry path.
//!
//! Bare-metal builds run on the real 32-bit x86 implementation. Hosted
//! builds get a simulated CPU with one interrupt flag, pending latch and
//! IDT per thread, so the whole delivery chain can run in-process.

#[cfg(all(target_arch = "x86", target_os = "none"))]
mod x86;
#[cfg(all(target_arch = "x86", target_os = "none"))]
pub(crate) use x86::trampoline;
#[cfg(all(target_arch = "x86", target_os = "none"))]
pub use x86::{disable_interrupt, enable_interrupt, interrupts_enabled};

#[cfg(not(target_os = "none"))]
pub mod sim;
#[cfg(not(target_os = "none"))]
pub(crate) use sim::trampoline;
#[cfg(not(target_os = "none"))]
pub use sim::{disable_interrupt, enable_interrupt, interrupts_enabled};
