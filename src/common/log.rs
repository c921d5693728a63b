use core::fmt::{Arguments, Write};

pub(crate) use mac::*;

use crate::interrupt::IntrptGuard;

pub mod mac {
    macro_rules! ok {
        ($($arg:tt)*) => {
            $crate::common::log::ok(format_args!($($arg)*))
        };
    }
    pub(crate) use ok;
    macro_rules! error {
        ($($arg:tt)*) => {
            $crate::common::log::error(format_args!($($arg)*))
        };
    }
    pub(crate) use error;
    macro_rules! info {
        ($($arg:tt)*) => {
            $crate::common::log::info(format_args!($($arg)*))
        };
    }
    pub(crate) use info;
}

pub type Sink = &'static mut (dyn Write + Send);

static SINK: spin::Mutex<Option<Sink>> = spin::Mutex::new(None);

/// Routes log lines to `sink`, returning the previous one.
///
/// Until a sink is set, log lines are dropped.
pub fn set_sink(sink: Sink) -> Option<Sink> {
    let _intrpt = IntrptGuard::new();
    SINK.lock().replace(sink)
}

pub fn ok(msg: Arguments) { log("OK", msg); }
pub fn info(msg: Arguments) { log("INFO", msg); }
pub fn error(msg: Arguments) { log("ERROR!", msg); }

fn log(header: &'static str, msg: Arguments) {
    let _intrpt = IntrptGuard::new();
    let mut sink = SINK.lock();
    let Some(sink) = sink.as_mut() else {
        return;
    };

    // Nothing to report a failed log write to.
    let _ = writeln!(sink, "[{:^6}] {}", header, msg);
}
