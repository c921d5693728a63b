//! Boot-time constants shared by the trampolines, the common path and the
//! dispatcher.

/// First vector raised by the master PIC. Baked into the trampolines.
pub const VECTOR_BASE: u8 = 0x20;

/// Vectors 0..32 belong to CPU exceptions.
pub const RESERVED_VECTORS: u8 = 32;

/// Hardware lines behind the two cascaded controllers.
pub const LINE_COUNT: usize = 16;

/// Lines served by a single controller.
pub const LINES_PER_PIC: u8 = 8;

/// Ring 0 flat code segment in the kernel GDT.
pub const KERNEL_CODE_SELECTOR: u16 = 0x08;

/// Ring 0 flat data segment in the kernel GDT.
pub const KERNEL_DATA_SELECTOR: u16 = 0x10;

const _: () = assert!(VECTOR_BASE >= RESERVED_VECTORS);
const _: () = assert!(VECTOR_BASE % LINES_PER_PIC == 0);
