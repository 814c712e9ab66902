// Copyright 2025-present Harry Tummalacherla
// SPDX-License-Identifier: Apache-2.0

//! Verbosity-gated diagnostics.
//!
//! Library code never prints on its own; it logs through a [`Logger`]
//! handed in by the caller. The CLI wires this to stderr under `-v`,
//! tests usually pass [`Logger::quiet`].

use std::cell::RefCell;
use std::io::Write;

/// A prefix-stamped line logger. Cheap to clone by reference; the sink is
/// borrowed for the duration of each line.
pub struct Logger<'a> {
    enabled: bool,
    sink: RefCell<Option<&'a mut dyn Write>>,
}

impl<'a> Logger<'a> {
    /// A logger that writes `# <message>` lines to `sink`.
    pub fn new(enabled: bool, sink: &'a mut dyn Write) -> Self {
        Logger {
            enabled,
            sink: RefCell::new(Some(sink)),
        }
    }

    /// A logger that swallows everything.
    pub fn quiet() -> Self {
        Logger {
            enabled: false,
            sink: RefCell::new(None),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Log one line; errors on the sink are ignored (diagnostics must not
    /// fail the pipeline).
    pub fn log(&self, args: std::fmt::Arguments<'_>) {
        if !self.enabled {
            return;
        }
        if let Some(sink) = self.sink.borrow_mut().as_mut() {
            let _ = writeln!(sink, "# {}", args);
        }
    }
}

/// `log!(logger, "widthofpart[{}]={}", part, width)`
#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log(format_args!($($arg)*))
    };
}
