use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use spin::{Mutex, MutexGuard};

use super::{pic, IntrptGuard, IrqHandler, IrqLine, RemapConfig, TrapContext};
use crate::common::log::{error, info};
use crate::common::pmio::PortIo;
use crate::config::LINE_COUNT;

pub type Handler = Option<&'static dyn IrqHandler>;

/// One optional handler per irq line.
///
/// A slot lock is only ever held with interrupts disabled, so the irq that
/// owns the slot cannot arrive while it is held and the lock never spins.
pub struct HandlerTable([Mutex<Handler>; LINE_COUNT]);

impl HandlerTable {
    pub const fn new() -> Self { Self([const { Mutex::new(None) }; LINE_COUNT]) }

    /// Locks the slot of `line` with interrupts disabled until the returned
    /// guard drops.
    pub fn slot(&self, line: IrqLine) -> SlotGuard<'_> {
        let intrpt = IntrptGuard::new();
        SlotGuard {
            slot: self.0[line.index()].lock(),
            _intrpt: intrpt,
        }
    }

    /// Replaces whatever occupies `line`.
    pub fn install(&self, line: IrqLine, handler: &'static dyn IrqHandler) { *self.slot(line) = Some(handler); }

    pub fn uninstall(&self, line: IrqLine) { *self.slot(line) = None; }

    pub fn get(&self, line: IrqLine) -> Handler { *self.slot(line) }
}

impl Default for HandlerTable {
    fn default() -> Self { Self::new() }
}

/// A locked handler slot. The lock is released before interrupts are
/// restored.
pub struct SlotGuard<'a> {
    slot: MutexGuard<'a, Handler>,
    _intrpt: IntrptGuard,
}

impl Deref for SlotGuard<'_> {
    type Target = Handler;

    fn deref(&self) -> &Handler { &self.slot }
}

impl DerefMut for SlotGuard<'_> {
    fn deref_mut(&mut self) -> &mut Handler { &mut self.slot }
}

/// Per line dispatch counters.
///
/// They outlive individual dispatches, which are otherwise stateless.
pub struct DispatchStats {
    dispatched: [AtomicU32; LINE_COUNT],
    unhandled: [AtomicU32; LINE_COUNT],
}

impl DispatchStats {
    const fn new() -> Self {
        Self {
            dispatched: [const { AtomicU32::new(0) }; LINE_COUNT],
            unhandled: [const { AtomicU32::new(0) }; LINE_COUNT],
        }
    }

    /// Interrupts dispatched on `line`, handled or not.
    pub fn dispatched(&self, line: IrqLine) -> u32 { self.dispatched[line.index()].load(Ordering::Relaxed) }

    /// Interrupts on `line` that found no handler.
    pub fn unhandled(&self, line: IrqLine) -> u32 { self.unhandled[line.index()].load(Ordering::Relaxed) }

    fn record(&self, line: IrqLine, handled: bool) {
        self.dispatched[line.index()].fetch_add(1, Ordering::Relaxed);
        if !handled {
            self.unhandled[line.index()].fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Routes remapped irq vectors to their handlers and acknowledges the PIC.
pub struct IrqDispatcher {
    config: RemapConfig,
    ports: &'static dyn PortIo,
    handlers: HandlerTable,
    stats: DispatchStats,
    dispatching: AtomicBool,
}

impl IrqDispatcher {
    pub const fn new(config: RemapConfig, ports: &'static dyn PortIo) -> Self {
        Self {
            config,
            ports,
            handlers: HandlerTable::new(),
            stats: DispatchStats::new(),
            dispatching: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> RemapConfig { self.config }

    pub fn stats(&self) -> &DispatchStats { &self.stats }

    /// Registers `handler` for `line`, silently replacing the previous one.
    pub fn install(&self, line: IrqLine, handler: &'static dyn IrqHandler) { self.handlers.install(line, handler) }

    /// Clears `line`. Clearing an empty line is a no-op.
    pub fn uninstall(&self, line: IrqLine) { self.handlers.uninstall(line) }

    pub fn handler(&self, line: IrqLine) -> Handler { self.handlers.get(line) }

    pub fn mask_line(&self, line: IrqLine) {
        let _intrpt = IntrptGuard::new();
        pic::mask(self.ports, line);
        info!("irq line {:?} masked", line);
    }

    pub fn unmask_line(&self, line: IrqLine) {
        let _intrpt = IntrptGuard::new();
        pic::unmask(self.ports, line);
        info!("irq line {:?} unmasked", line);
    }

    /// Runs the handler for the line that raised `ctx.vector`, then sends
    /// EOI whether or not a handler ran.
    ///
    /// # Panics
    /// If called while another dispatch is still running on this
    /// dispatcher. Irq entry keeps interrupts disabled until the common path
    /// returns, so this only happens if a handler re-enables them.
    pub fn dispatch(&self, ctx: &TrapContext) {
        let Some(line) = ctx.vector().and_then(|vector| self.config.line_of(vector)) else {
            error!("vector {:#x} is not a remapped irq vector", ctx.vector);
            return;
        };

        let _active = ActiveDispatch::enter(&self.dispatching);
        // The slot lock is released before the call so a handler may
        // (un)install handlers itself.
        let handler = self.handlers.get(line);
        if let Some(handler) = handler {
            handler.handle(ctx);
        }
        self.stats.record(line, handler.is_some());

        pic::eoi(self.ports, line);
    }
}

struct ActiveDispatch<'a>(&'a AtomicBool);

impl<'a> ActiveDispatch<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        let nested = flag.swap(true, Ordering::Acquire);
        assert!(!nested, "irq dispatch re-entered");
        Self(flag)
    }
}

impl Drop for ActiveDispatch<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}

/// Called by the common path with the context it built on the stack.
pub(crate) extern "C" fn irq_sr(ctx: &TrapContext) {
    match super::dispatcher() {
        Some(irq) => irq.dispatch(ctx),
        None => error!("irq vector {:#x} raised before initialization", ctx.vector),
    }
}
