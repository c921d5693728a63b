use core::marker::PhantomData;

use derive_more::derive::{Display, From};

use crate::arch;
use crate::common::log::ok;
use crate::common::pmio::PortIo;
use crate::config::{LINE_COUNT, VECTOR_BASE};

pub mod context;
pub mod gate;
pub mod handler;
pub mod irq;
pub mod pic;
pub mod trampoline;


pub use context::TrapContext;
pub use gate::{EntryPoint, GateFlags, TrapGateInstaller};
pub use handler::{DispatchStats, IrqDispatcher};
pub use irq::{IrqHandler, IrqLine, Vector};
pub use pic::{RemapConfig, RemapError};

/// Keeps interrupts disabled while alive.
///
/// Restores the interrupt flag observed at creation on drop, so guards nest
/// and a guard taken inside an irq handler leaves interrupts disabled.
pub struct IntrptGuard {
    was_enabled: bool,
    // Interrupt state belongs to the current CPU.
    _not_send: PhantomData<*const ()>,
}

impl IntrptGuard {
    pub fn new() -> Self {
        let was_enabled = arch::interrupts_enabled();
        arch::disable_interrupt();
        Self {
            was_enabled,
            _not_send: PhantomData,
        }
    }
}

impl Default for IntrptGuard {
    fn default() -> Self { Self::new() }
}

impl Drop for IntrptGuard {
    fn drop(&mut self) {
        if self.was_enabled {
            arch::enable_interrupt();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, From)]
pub enum InitError {
    #[display("invalid remap configuration: {_0}")]
    Remap(RemapError),
    #[display("trampolines push vectors from {expected:#x}, remap asks for {found:#x}")]
    #[from(skip)]
    TrampolineBase { expected: Vector, found: Vector },
    #[display("hardware interrupts are already initialized")]
    #[from(skip)]
    AlreadyInitialized,
}

impl core::error::Error for InitError {}

static DISPATCHER: spin::Once<IrqDispatcher> = spin::Once::new();

/// Remaps the PIC cascade to `master_base`/`slave_base` and installs the
/// sixteen irq gates.
///
/// Must run exactly once during boot, before interrupts are enabled. The
/// returned handle is the only way to register handlers.
pub fn initialize(
    master_base: Vector,
    slave_base: Vector,
    ports: &'static dyn PortIo,
    gates: &mut dyn TrapGateInstaller,
) -> Result<&'static IrqDispatcher, InitError> {
    let config = RemapConfig::new(master_base, slave_base)?;
    if config.master() != VECTOR_BASE {
        return Err(InitError::TrampolineBase {
            expected: VECTOR_BASE,
            found: config.master(),
        });
    }
    if DISPATCHER.is_completed() {
        return Err(InitError::AlreadyInitialized);
    }

    let _intrpt = IntrptGuard::new();
    let irq = DISPATCHER.call_once(|| IrqDispatcher::new(config, ports));
    pic::remap(ports, config);
    gate::install_gates(gates, config);

    ok!(
        "irq lines routed to vectors {:#x}..{:#x}",
        config.master(),
        config.master() as usize + LINE_COUNT
    );
    Ok(irq)
}

/// The dispatcher created by [`initialize`], if it ran.
pub fn dispatcher() -> Option<&'static IrqDispatcher> { DISPATCHER.get() }
