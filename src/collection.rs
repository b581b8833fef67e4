// Closure, goto, and the canonical collection builder (§4.3-4.6).
//
// Grounded on the worklist shape of `lr1_parser.py`'s `closure`/`goTo`/
// `calculateCannonicalCollection` (original_source/gb_compiler/
// grammar_parser/lr1_parser.py), generalized to structural item-set
// equality (BTreeSet<Item>) rather than the source's per-field dict
// comparison, and to a hash-indexed de-duplication step rather than its
// linear `can_collection.index(cc)` scan — the redesign direction spec.md
// §9 names explicitly. State equality here is always *full* item-set
// equality: no kernel-only comparison, so no LALR(1) merging occurs.

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::first::FirstSets;
use crate::grammar::Grammar;
use crate::production::{Item, ItemSet};
use crate::symbol::Symbol;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// The lookahead terminals to propagate when closing over the non-terminal
/// immediately right of the dot in `item` (§4.3). Deliberately uses only the
/// single symbol after that non-terminal, not `FIRST` of the full
/// remaining suffix — a documented divergence from textbook LR(1),
/// preserved from the source prototype (see DESIGN.md).
fn get_look_aheads(
    item: &Item,
    grammar: &Grammar,
    first_sets: &mut FirstSets,
    sink: &mut impl DiagnosticSink,
) -> IndexSet<Symbol> {
    let rhs = item.production().rhs();
    let after_b = item.dot() + 1;
    match rhs.get(after_b) {
        None => {
            let mut result = IndexSet::new();
            result.insert(item.lookahead().clone());
            result
        }
        Some(x) if x.is_terminal() => {
            let mut result = IndexSet::new();
            result.insert(x.clone());
            result
        }
        Some(x) => first_sets.first(x, grammar, sink).unwrap_or_default(),
    }
}

/// The closure of `seeds` (§4.4): a duplicate-free, order-independent item
/// set. Iterates a pending queue rather than recursing, so termination only
/// depends on the finite item universe.
pub fn closure(
    seeds: Vec<Item>,
    grammar: &Grammar,
    first_sets: &mut FirstSets,
    sink: &mut impl DiagnosticSink,
) -> ItemSet {
    let mut result: ItemSet = ItemSet::new();
    let mut pending = seeds;
    while let Some(item) = pending.pop() {
        if result.contains(&item) {
            continue;
        }
        let next_symbol = item.next_symbol().cloned();
        result.insert(item.clone());
        let Some(symbol) = next_symbol else {
            continue;
        };
        if symbol.is_terminal() {
            continue;
        }
        let productions = grammar.productions_for(&symbol);
        if productions.is_empty() {
            sink.report(Diagnostic::UnknownProduction {
                non_terminal: symbol.name().to_string(),
            });
            continue;
        }
        let look_aheads = get_look_aheads(&item, grammar, first_sets, sink);
        for production in productions {
            for lookahead in &look_aheads {
                let new_item = Item::new(production.clone(), 0, lookahead.clone());
                if !result.contains(&new_item) && !pending.contains(&new_item) {
                    pending.push(new_item);
                }
            }
        }
    }
    result
}

/// `goto(I, X)` (§4.5): the closure of every item in `set` whose dot sits
/// immediately before `symbol`, advanced one position.
pub fn goto(
    set: &ItemSet,
    symbol: &Symbol,
    grammar: &Grammar,
    first_sets: &mut FirstSets,
    sink: &mut impl DiagnosticSink,
) -> ItemSet {
    let seeds: Vec<Item> = set
        .iter()
        .filter(|item| item.next_symbol() == Some(symbol))
        .map(Item::shifted)
        .collect();
    if seeds.is_empty() {
        return ItemSet::new();
    }
    closure(seeds, grammar, first_sets, sink)
}

fn hash_item_set(set: &ItemSet) -> u64 {
    let mut hasher = DefaultHasher::new();
    for item in set {
        item.hash(&mut hasher);
    }
    hasher.finish()
}

/// The canonical collection of LR(1) item sets (§4.6), plus the transition
/// relation over (state, symbol) discovered while building it. The
/// transition table is consumed directly by the table assembler.
#[derive(Debug, Default)]
pub struct CanonicalCollection {
    states: Vec<ItemSet>,
    hash_index: HashMap<u64, Vec<usize>>,
    pub transitions: HashMap<(usize, Symbol), usize>,
}

impl CanonicalCollection {
    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    /// Returns the existing state index equal to `set` by full set equality,
    /// consulting the hash index first and falling back to an exact
    /// comparison on any collision.
    fn find(&self, set: &ItemSet) -> Option<usize> {
        let hash = hash_item_set(set);
        self.hash_index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&index| &self.states[index] == set)
    }

    fn insert(&mut self, set: ItemSet) -> usize {
        let hash = hash_item_set(&set);
        let index = self.states.len();
        self.hash_index.entry(hash).or_default().push(index);
        self.states.push(set);
        index
    }

    /// Builds the canonical collection starting from `Goal`'s first
    /// production (§4.6). Iterates states by growing index: newly appended
    /// states are visited as the loop reaches them, never snapshotted.
    pub fn build(
        grammar: &Grammar,
        first_sets: &mut FirstSets,
        sink: &mut impl DiagnosticSink,
    ) -> Option<Self> {
        let goal_production = grammar.goal_production()?.clone();
        let end = grammar.symbol_table().end();
        let start_item = Item::new(goal_production, 0, end);
        let start_set = closure(vec![start_item], grammar, first_sets, sink);

        let mut collection = CanonicalCollection::default();
        collection.insert(start_set);

        let symbols: Vec<Symbol> = grammar.symbol_table().iter().cloned().collect();
        let mut state_index = 0;
        while state_index < collection.states.len() {
            for symbol in &symbols {
                let target_set = goto(&collection.states[state_index], symbol, grammar, first_sets, sink);
                if target_set.is_empty() {
                    continue;
                }
                let target_index = match collection.find(&target_set) {
                    Some(existing) => existing,
                    None => collection.insert(target_set),
                };
                collection
                    .transitions
                    .insert((state_index, symbol.clone()), target_index);
            }
            state_index += 1;
        }
        Some(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::CollectingSink;
    use crate::grammar::Grammar;

    fn minimal_grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar.add_production("Goal", &[("A", false)]).unwrap();
        grammar.add_production("A", &[("x", true)]).unwrap();
        grammar
    }

    #[test]
    fn minimal_grammar_has_two_states() {
        let grammar = minimal_grammar();
        let mut first_sets = FirstSets::new();
        let mut sink = CollectingSink::new();
        let collection = CanonicalCollection::build(&grammar, &mut first_sets, &mut sink).unwrap();
        assert_eq!(collection.states().len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn closure_over_undefined_non_terminal_reports_unknown_production() {
        let mut grammar = Grammar::new();
        grammar.add_production("Goal", &[("B", false)]).unwrap();
        let mut first_sets = FirstSets::new();
        let mut sink = CollectingSink::new();
        let collection = CanonicalCollection::build(&grammar, &mut first_sets, &mut sink).unwrap();
        assert_eq!(collection.states().len(), 1);
        assert_eq!(sink.diagnostics.len(), 1);
        assert!(matches!(
            sink.diagnostics[0],
            crate::diagnostic::Diagnostic::UnknownProduction { .. }
        ));
    }

    #[test]
    fn no_two_states_are_set_equal() {
        let mut grammar = Grammar::new();
        grammar.add_production("Goal", &[("S", false)]).unwrap();
        grammar.add_production("S", &[("a", true)]).unwrap();
        grammar.add_production("S", &[("b", true)]).unwrap();
        let mut first_sets = FirstSets::new();
        let mut sink = CollectingSink::new();
        let collection = CanonicalCollection::build(&grammar, &mut first_sets, &mut sink).unwrap();
        for (i, a) in collection.states().iter().enumerate() {
            for b in collection.states().iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn closure_is_idempotent() {
        let grammar = minimal_grammar();
        let mut first_sets = FirstSets::new();
        let mut sink = CollectingSink::new();
        let goal_production = grammar.goal_production().unwrap().clone();
        let start = Item::new(goal_production, 0, grammar.symbol_table().end());
        let once = closure(vec![start.clone()], &grammar, &mut first_sets, &mut sink);
        let twice = closure(once.iter().cloned().collect(), &grammar, &mut first_sets, &mut sink);
        assert_eq!(once, twice);
    }

    #[test]
    fn goto_is_deterministic() {
        let grammar = minimal_grammar();
        let mut first_sets = FirstSets::new();
        let mut sink = CollectingSink::new();
        let goal_production = grammar.goal_production().unwrap().clone();
        let start = closure(
            vec![Item::new(goal_production, 0, grammar.symbol_table().end())],
            &grammar,
            &mut first_sets,
            &mut sink,
        );
        let a = grammar.symbol_table().get("A").unwrap();
        let first = goto(&start, &a, &grammar, &mut first_sets, &mut sink);
        let second = goto(&start, &a, &grammar, &mut first_sets, &mut sink);
        assert_eq!(first, second);
    }
}
