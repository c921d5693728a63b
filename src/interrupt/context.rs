use bytemuck::Zeroable;

use super::Vector;
use crate::config::{KERNEL_CODE_SELECTOR, KERNEL_DATA_SELECTOR};

/// Machine state saved on irq entry, lowest stack address first.
///
/// The trampoline pushes `error_code` and `vector`; the common path pushes
/// the general purpose registers (`pushad` order) and the data segments.
/// `eip`, `cs` and `eflags` are the cpu's own frame. No stack switch happens
/// for ring 0 irqs, so there is no `esp`/`ss` pair after `eflags`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapContext {
    pub gs: u32,
    pub fs: u32,
    pub es: u32,
    pub ds: u32,
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    /// `esp` as seen by `pushad`; ignored by `popad`.
    pub esp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
    pub vector: u32,
    /// Always 0. Hardware interrupts carry no error code.
    pub error_code: u32,
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
}

// SAFETY: all fields are integers.
unsafe impl Zeroable for TrapContext {}

const _: () = assert!(size_of::<TrapContext>() == 17 * 4);

impl TrapContext {
    /// Context as a trampoline would build it from kernel mode.
    pub fn for_vector(vector: u32) -> Self {
        let data = KERNEL_DATA_SELECTOR as u32;
        Self {
            gs: data,
            fs: data,
            es: data,
            ds: data,
            vector,
            cs: KERNEL_CODE_SELECTOR as u32,
            ..Self::zeroed()
        }
    }

    /// The pushed vector, or `None` if the word does not fit a vector.
    pub fn vector(&self) -> Option<Vector> { Vector::try_from(self.vector).ok() }
}

#[cfg(test)]
mod tests {
    use core::mem::offset_of;

    use super::*;

    #[test]
    fn trampoline_words_sit_between_pushad_and_cpu_frame() {
        assert_eq!(offset_of!(TrapContext, eax), 11 * 4);
        assert_eq!(offset_of!(TrapContext, vector), 12 * 4);
        assert_eq!(offset_of!(TrapContext, error_code), 13 * 4);
        assert_eq!(offset_of!(TrapContext, eip), 14 * 4);
    }

    #[test]
    fn synthetic_context_runs_on_kernel_segments() {
        let ctx = TrapContext::for_vector(0x2c);
        assert_eq!(ctx.vector(), Some(0x2c));
        assert_eq!(ctx.error_code, 0);
        assert_eq!(ctx.ds, 0x10);
        assert_eq!(ctx.cs, 0x08);
    }

    #[test]
    fn oversized_vector_word_is_not_a_vector() {
        assert_eq!(TrapContext::for_vector(0xff).vector(), Some(0xff));
        assert_eq!(TrapContext::for_vector(0x121).vector(), None);
        assert_eq!(TrapContext::for_vector(u32::MAX).vector(), None);
    }
}
