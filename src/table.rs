// Table assembly (§4.7).
//
// Grounded on `lr1_parser.py`'s `calculateActionGoto` loop over every item
// of every state, reproducing its final-write-wins conflict policy exactly
// (spec.md §9 names this as preserved-for-fidelity, not "fixed"): a second
// write to the same ACTION cell is reported as a conflict and then
// overwrites the previous value, rather than being rejected.

use crate::collection::CanonicalCollection;
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(u32),
    Reduce(u32),
    Accept,
}

impl Action {
    fn label(&self) -> String {
        match self {
            Action::Shift(state) => format!("shift({})", state),
            Action::Reduce(index) => format!("reduce({})", index),
            Action::Accept => "accept".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Tables {
    pub action: IndexMap<(u32, Symbol), Action>,
    pub goto: IndexMap<(u32, Symbol), u32>,
}

/// Walks every state of `collection` and every item within it, emitting
/// ACTION and GOTO entries (§4.7). Non-terminal dot symbols are skipped in
/// ACTION (GOTO already carries the transition, mirrored in from the
/// collection builder's transition table). Every conflict is reported
/// through `sink` before the new value overwrites the old one.
pub fn assemble(
    collection: &CanonicalCollection,
    grammar: &Grammar,
    sink: &mut impl DiagnosticSink,
) -> Tables {
    let mut tables = Tables::default();
    let goal = grammar.symbol_table().goal();
    let end = grammar.symbol_table().end();

    for (state_index, state) in collection.states().iter().enumerate() {
        let state_number = state_index as u32;
        for item in state {
            if item.is_reducible() {
                if item.lhs() == &goal && item.lookahead() == &end {
                    write_action(&mut tables, state_number, end.clone(), Action::Accept, sink);
                } else {
                    let action = Action::Reduce(item.production().index());
                    write_action(&mut tables, state_number, item.lookahead().clone(), action, sink);
                }
                continue;
            }
            let symbol = item.next_symbol().expect("non-reducible item has a next symbol");
            if symbol.is_terminal() {
                if let Some(&target) = collection.transitions.get(&(state_index, symbol.clone())) {
                    write_action(
                        &mut tables,
                        state_number,
                        symbol.clone(),
                        Action::Shift(target as u32),
                        sink,
                    );
                }
            }
        }
        for symbol in grammar.symbol_table().iter() {
            if symbol.is_terminal() {
                continue;
            }
            if let Some(&target) = collection.transitions.get(&(state_index, symbol.clone())) {
                tables
                    .goto
                    .insert((state_number, symbol.clone()), target as u32);
            }
        }
    }
    tables
}

fn write_action(
    tables: &mut Tables,
    state: u32,
    terminal: Symbol,
    action: Action,
    sink: &mut impl DiagnosticSink,
) {
    let key = (state, terminal.clone());
    if let Some(previous) = tables.action.get(&key) {
        if previous != &action {
            let diagnostic = match (previous, &action) {
                (Action::Reduce(_), Action::Reduce(_)) => Diagnostic::ReduceReduceConflict {
                    state,
                    terminal: terminal.name().to_string(),
                    previous: previous.label(),
                    written: action.label(),
                },
                _ => Diagnostic::ShiftReduceConflict {
                    state,
                    terminal: terminal.name().to_string(),
                    previous: previous.label(),
                    written: action.label(),
                },
            };
            sink.report(diagnostic);
        }
    }
    tables.action.insert(key, action);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CanonicalCollection;
    use crate::diagnostic::CollectingSink;
    use crate::first::FirstSets;
    use crate::grammar::Grammar;

    fn build_tables(grammar: &Grammar) -> (Tables, CollectingSink) {
        let mut first_sets = FirstSets::new();
        let mut sink = CollectingSink::new();
        let collection = CanonicalCollection::build(grammar, &mut first_sets, &mut sink).unwrap();
        let tables = assemble(&collection, grammar, &mut sink);
        (tables, sink)
    }

    #[test]
    fn minimal_grammar_shifts_then_reduces_then_accepts() {
        let mut grammar = Grammar::new();
        grammar.add_production("Goal", &[("A", false)]).unwrap();
        grammar.add_production("A", &[("x", true)]).unwrap();
        let (tables, sink) = build_tables(&grammar);
        let x = grammar.symbol_table().get("x").unwrap();
        let end = grammar.symbol_table().end();
        assert_eq!(tables.action.get(&(0, x)), Some(&Action::Shift(1)));
        assert!(tables
            .action
            .values()
            .any(|action| matches!(action, Action::Reduce(0))));
        assert!(tables.action.values().any(|action| action == &Action::Accept));
        assert!(sink.is_empty());
        let _ = end;
    }

    #[test]
    fn ambiguous_expression_grammar_reports_shift_reduce_conflict() {
        let mut grammar = Grammar::new();
        grammar.add_production("Goal", &[("E", false)]).unwrap();
        grammar
            .add_production("E", &[("E", false), ("+", true), ("E", false)])
            .unwrap();
        grammar.add_production("E", &[("n", true)]).unwrap();
        let (_tables, sink) = build_tables(&grammar);
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::ShiftReduceConflict { .. })));
    }

    #[test]
    fn left_linear_list_has_no_conflicts() {
        let mut grammar = Grammar::new();
        grammar.add_production("Goal", &[("L", false)]).unwrap();
        grammar
            .add_production("L", &[("L", false), (",", true), ("x", true)])
            .unwrap();
        grammar.add_production("L", &[("x", true)]).unwrap();
        let (_tables, sink) = build_tables(&grammar);
        assert!(sink.is_empty());
    }
}
