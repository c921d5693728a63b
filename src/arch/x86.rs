use core::arch::{asm, global_asm};

use crate::config::KERNEL_DATA_SELECTOR;
use crate::interrupt::handler::irq_sr;

const EFLAGS_IF: u32 = 1 << 9;
/// Stack alignment at the call into rust code.
const CALL_ALIGN: u32 = 16;

const _: () = assert!(CALL_ALIGN.is_power_of_two() && CALL_ALIGN >= 4);

pub fn enable_interrupt() {
    // SAFETY: enabling interrupt is safe.
    unsafe { asm!("sti", options(nomem, nostack)) };
}

pub fn disable_interrupt() {
    // SAFETY: disabling interrupt is safe.
    unsafe { asm!("cli", options(nomem, nostack)) };
}

pub fn interrupts_enabled() -> bool {
    let eflags: u32;
    // SAFETY: reading eflags is safe.
    unsafe { asm!("pushfd", "pop {}", out(reg) eflags, options(nomem, preserves_flags)) };
    eflags & EFLAGS_IF != 0
}

// Common path shared by every irq trampoline. On entry the stack holds the
// cpu frame (eip, cs, eflags), the error code placeholder and the vector.
// The frame built here is `TrapContext`.
global_asm!(
    ".global irq_common",
    "irq_common:",
    "    pushad",
    "    push ds",
    "    push es",
    "    push fs",
    "    push gs",
    "    mov ax, {kernel_data}",
    "    mov ds, ax",
    "    mov es, ax",
    "    mov fs, ax",
    "    mov gs, ax",
    "    cld",
    // The interrupted code may leave esp at any 4 byte boundary. Call
    // `irq_sr` on a 16 byte aligned stack; ebx is callee saved and was
    // already pushed by pushad.
    "    mov ebx, esp",
    "    and esp, {align_mask}",
    "    sub esp, {arg_pad}",
    "    push ebx",
    "    call {dispatch}",
    "    mov esp, ebx",
    "    pop gs",
    "    pop fs",
    "    pop es",
    "    pop ds",
    "    popad",
    // Drop the vector and the error code.
    "    add esp, 8",
    "    sti",
    "    iretd",
    kernel_data = const KERNEL_DATA_SELECTOR,
    align_mask = const -(CALL_ALIGN as i32),
    arg_pad = const CALL_ALIGN - 4,
    dispatch = sym irq_sr,
);

/// Emits one irq entry stub. Stubs differ only in the vector they push.
macro_rules! trampoline {
    ($name:ident, $line:literal) => {
        core::arch::global_asm!(
            concat!(".global ", stringify!($name)),
            concat!(stringify!($name), ":"),
            "    cli",
            "    push 0",
            "    push {vector}",
            "    jmp irq_common",
            vector = const $crate::config::VECTOR_BASE as u32 + $line,
        );
        extern "C" {
            fn $name();
        }
    };
}
pub(crate) use trampoline;
