// Diagnostic reporting.
//
// The teacher writes error/warning text straight to stderr via free functions
// (`report_error`/`report_warning` in `alap_gen_ng/src/grammar.rs`) behind a
// `ReportError<T>` marker trait. That pattern doesn't give tests anything to
// intercept, so here the same two-line messages are produced through a
// `DiagnosticSink` trait instead: `StderrSink` keeps the teacher's exact
// stderr behaviour, `CollectingSink` is the test-facing alternative.

use std::fmt;
use std::io::{stderr, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    GrammarInconsistent { symbol: String },
    UnknownProduction { non_terminal: String },
    FirstOfTerminal { terminal: String },
    ShiftReduceConflict {
        state: u32,
        terminal: String,
        previous: String,
        written: String,
    },
    ReduceReduceConflict {
        state: u32,
        terminal: String,
        previous: String,
        written: String,
    },
    EmptyRightHandSide { lhs: String, line: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::GrammarInconsistent { symbol } => write!(
                f,
                "symbol \"{}\" used as both a terminal and a non-terminal",
                symbol
            ),
            Diagnostic::UnknownProduction { non_terminal } => write!(
                f,
                "non-terminal \"{}\" has no productions; skipping its closure",
                non_terminal
            ),
            Diagnostic::FirstOfTerminal { terminal } => {
                write!(f, "first() called with terminal \"{}\"", terminal)
            }
            Diagnostic::ShiftReduceConflict {
                state,
                terminal,
                previous,
                written,
            } => write!(
                f,
                "shift/reduce conflict in state {} on \"{}\": {} overwritten by {}",
                state, terminal, previous, written
            ),
            Diagnostic::ReduceReduceConflict {
                state,
                terminal,
                previous,
                written,
            } => write!(
                f,
                "reduce/reduce conflict in state {} on \"{}\": {} overwritten by {}",
                state, terminal, previous, written
            ),
            Diagnostic::EmptyRightHandSide { lhs, line } => write!(
                f,
                "rule for \"{}\" has an empty right-hand side, skipped: {}",
                lhs, line
            ),
        }
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Writes one line per diagnostic to stderr, matching the teacher's
/// `report_error`/`report_warning` style.
#[derive(Debug, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        writeln!(stderr(), "{}", diagnostic).expect("stderr write failed");
    }
}

/// Collects diagnostics in emission order, for tests to assert against.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink::default()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
