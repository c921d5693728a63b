//! Entry stubs for the sixteen irq lines.
//!
//! Every stub disables interrupts, pushes a zero error code and its vector
//! (`VECTOR_BASE + line`) and falls into the common path. The vector is the
//! only thing that differs between stubs.

use super::gate::EntryPoint;
use crate::arch::trampoline;
use crate::config::LINE_COUNT;

macro_rules! trampolines {
    ($($line:literal => $name:ident),* $(,)?) => {
        $( trampoline!($name, $line); )*

        /// Entry stubs indexed by irq line.
        pub static ENTRY_POINTS: [EntryPoint; LINE_COUNT] = [$(EntryPoint($name)),*];
    };
}

trampolines! {
    0 => irq_entry_0,
    1 => irq_entry_1,
    2 => irq_entry_2,
    3 => irq_entry_3,
    4 => irq_entry_4,
    5 => irq_entry_5,
    6 => irq_entry_6,
    7 => irq_entry_7,
    8 => irq_entry_8,
    9 => irq_entry_9,
    10 => irq_entry_10,
    11 => irq_entry_11,
    12 => irq_entry_12,
    13 => irq_entry_13,
    14 => irq_entry_14,
    15 => irq_entry_15,
}
