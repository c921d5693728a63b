#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port(pub u16);

/// Byte-wide port I/O as seen by the irq core.
///
/// Writes never fail observably; the controller does not report errors.
pub trait PortIo: Sync {
    fn write(&self, port: Port, value: u8);
    fn read(&self, port: Port) -> u8;
}

/// Port I/O through the `in`/`out` instructions.
#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct Pmio;

#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
impl PortIo for Pmio {
    fn write(&self, port: Port, value: u8) { outb(port, value) }

    fn read(&self, port: Port) -> u8 { inb(port) }
}

#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
#[inline(always)]
pub fn outb(port: Port, value: u8) {
    // SAFETY: callers only address ports owned by the irq core.
    unsafe {
        core::arch::asm!(
            "out dx, al",
            in("dx") port.0,
            in("al") value,
            options(nomem, nostack, preserves_flags),
        )
    };
}

#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
#[inline(always)]
pub fn inb(port: Port) -> u8 {
    let value: u8;
    // SAFETY: see outb.
    unsafe {
        core::arch::asm!(
            "in al, dx",
            in("dx") port.0,
            out("al") value,
            options(nomem, nostack, preserves_flags),
        )
    };
    value
}
