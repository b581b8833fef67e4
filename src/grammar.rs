// Grammar loading.
//
// Grounded on the teacher's `Specification`/`SymbolTable` pairing
// (alap_gen_ng/src/grammar.rs): a single owner of the symbol table plus an
// insertion-ordered map from left-hand symbol to its productions. The
// teacher's precedence/associativity bookkeeping, preamble text and
// attribute-type fields are dropped — those exist to drive semantic actions
// and conflict resolution by precedence, both out of scope here.

use crate::bnf::{RhsSymbol, RuleRecord};
use crate::production::Production;
use crate::symbol::{GrammarInconsistent, Symbol, SymbolTable};
use indexmap::IndexMap;

/// A loaded grammar: the interned symbol table plus every production,
/// indexed both by insertion order (`all`) and by left-hand symbol
/// (`by_lhs`) for the FIRST engine and the collection builder.
#[derive(Debug)]
pub struct Grammar {
    symbol_table: SymbolTable,
    by_lhs: IndexMap<Symbol, Vec<Production>>,
    all: Vec<Production>,
}

impl Grammar {
    pub fn new() -> Self {
        Grammar {
            symbol_table: SymbolTable::new(),
            by_lhs: IndexMap::new(),
            all: Vec::new(),
        }
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    pub fn productions_for(&self, lhs: &Symbol) -> &[Production] {
        self.by_lhs.get(lhs).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Productions in the order they were first observed, i.e. the order in
    /// which their stable index was assigned. This is the order emitted into
    /// the artifact's rule list (§6.2).
    pub fn productions(&self) -> &[Production] {
        &self.all
    }

    pub fn goal_production(&self) -> Option<&Production> {
        self.by_lhs.get(&self.symbol_table.goal())?.first()
    }

    /// Interns `lhs` and every symbol of `rhs`, then appends a new
    /// production for them. `rhs` entries are `(name, is_terminal)`.
    pub fn add_production(
        &mut self,
        lhs: &str,
        rhs: &[(&str, bool)],
    ) -> Result<Production, GrammarInconsistent> {
        debug_assert!(!rhs.is_empty(), "empty right-hand sides are rejected at load time");
        let lhs_symbol = self.symbol_table.intern(lhs, false)?;
        let mut rhs_symbols = Vec::with_capacity(rhs.len());
        for (name, is_terminal) in rhs {
            rhs_symbols.push(self.symbol_table.intern(name, *is_terminal)?);
        }
        let index = self.all.len() as u32;
        let production = Production::new(index, lhs_symbol.clone(), rhs_symbols);
        self.all.push(production.clone());
        self.by_lhs
            .entry(lhs_symbol)
            .or_default()
            .push(production.clone());
        Ok(production)
    }
}

/// Ingests tokenized rule records into a `Grammar` (§4.1). Contradictory
/// terminal/non-terminal classification of the same name fails the whole
/// load with `GrammarInconsistent`, matching the spec's "fails with" wording
/// rather than the softer skip-and-continue behaviour used for unknown
/// productions.
pub fn load(records: &[RuleRecord]) -> Result<Grammar, GrammarInconsistent> {
    let mut grammar = Grammar::new();
    for record in records {
        let rhs: Vec<(&str, bool)> = record
            .rhs
            .iter()
            .map(|symbol| match symbol {
                RhsSymbol::Terminal(name) => (name.as_str(), true),
                RhsSymbol::NonTerminal(name) => (name.as_str(), false),
            })
            .collect();
        grammar.add_production(&record.lhs, &rhs)?;
    }
    Ok(grammar)
}
