// FIRST-set computation.
//
// Grounded on the worklist shape of `lr1_parser.py`'s `first()` (see
// original_source/gb_compiler/grammar_parser/lr1_parser.py): seed with the
// requested non-terminal, fold in terminals met at the head of each of its
// productions, enqueue non-terminals met there, and memoize only under the
// symbol that was originally requested. Intermediate non-terminals visited
// along the way are deliberately left uncached, reproducing that prototype's
// quirk rather than "fixing" it (see the Open Questions in the design
// notes).

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotANonTerminal;

/// FIRST-set cache, keyed by non-terminal name, populated one entry per
/// top-level `first()` call.
#[derive(Debug, Default)]
pub struct FirstSets {
    cache: IndexMap<Symbol, IndexSet<Symbol>>,
}

impl FirstSets {
    pub fn new() -> Self {
        FirstSets::default()
    }

    pub fn cached(&self, non_terminal: &Symbol) -> Option<&IndexSet<Symbol>> {
        self.cache.get(non_terminal)
    }

    /// Computes FIRST(`non_terminal`), consulting and then populating the
    /// cache under `non_terminal`'s own name.
    pub fn first(
        &mut self,
        non_terminal: &Symbol,
        grammar: &Grammar,
        sink: &mut impl DiagnosticSink,
    ) -> Result<IndexSet<Symbol>, NotANonTerminal> {
        if non_terminal.is_terminal() {
            sink.report(Diagnostic::FirstOfTerminal {
                terminal: non_terminal.name().to_string(),
            });
            return Err(NotANonTerminal);
        }
        if let Some(cached) = self.cache.get(non_terminal) {
            return Ok(cached.clone());
        }

        let mut result = IndexSet::new();
        let mut enqueued = IndexSet::new();
        let mut pending = vec![non_terminal.clone()];
        enqueued.insert(non_terminal.clone());

        while let Some(current) = pending.pop() {
            if let Some(cached) = self.cache.get(&current) {
                result.extend(cached.iter().cloned());
                continue;
            }
            let productions = grammar.productions_for(&current);
            if productions.is_empty() {
                sink.report(Diagnostic::UnknownProduction {
                    non_terminal: current.name().to_string(),
                });
                continue;
            }
            for production in productions {
                let head = &production.rhs()[0];
                if head.is_terminal() {
                    result.insert(head.clone());
                } else if enqueued.insert(head.clone()) {
                    pending.push(head.clone());
                }
            }
        }

        self.cache.insert(non_terminal.clone(), result.clone());
        Ok(result)
    }
}
