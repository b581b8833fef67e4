// Interned grammar symbols and the symbol table that classifies them.

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug)]
struct SymbolData {
    name: Box<str>,
    is_terminal: bool,
}

/// An interned grammar symbol: a name plus whether it is a terminal.
///
/// Equality, ordering and hashing are all by name, per the data model: two
/// `Symbol`s naming the same text are the same symbol regardless of which
/// handle created them.
#[derive(Debug, Clone)]
pub struct Symbol(Rc<SymbolData>);

impl Symbol {
    fn new(name: &str, is_terminal: bool) -> Self {
        Symbol(Rc::new(SymbolData {
            name: name.into(),
            is_terminal,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_terminal(&self) -> bool {
        self.0.is_terminal
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raised when the same symbol name is sighted as both a terminal and a
/// non-terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarInconsistent {
    pub symbol: String,
}

impl fmt::Display for GrammarInconsistent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "symbol \"{}\" used as both a terminal and a non-terminal",
            self.symbol
        )
    }
}

/// The reserved start non-terminal. The grammar source is expected to define
/// its productions directly (see the BNF examples in the spec's end-to-end
/// scenarios: `<Goal> ::= ...`).
pub const GOAL: &str = "Goal";

/// The reserved end-of-input terminal.
pub const END: &str = "$";

/// Insertion-ordered mapping from symbol name to its interned `Symbol`.
///
/// Insertion order is load-bearing: the canonical collection builder walks
/// symbols in this order to decide transition order, which in turn drives
/// state numbering and therefore byte-level reproducibility of the emitted
/// artifact (see the concurrency & resource model: "An implementation must
/// use insertion-ordered mappings for the symbol table and the grammar").
#[derive(Debug)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = SymbolTable {
            symbols: IndexMap::new(),
        };
        table.intern(GOAL, false).expect("reserved symbols never conflict");
        table.intern(END, true).expect("reserved symbols never conflict");
        table
    }

    /// Interns `name` with the given terminal/non-terminal classification.
    /// A second sighting with a different classification is a
    /// `GrammarInconsistent` error; a second sighting with the same
    /// classification returns the existing symbol.
    pub fn intern(&mut self, name: &str, is_terminal: bool) -> Result<Symbol, GrammarInconsistent> {
        if let Some(existing) = self.symbols.get(name) {
            if existing.is_terminal() != is_terminal {
                return Err(GrammarInconsistent {
                    symbol: name.to_string(),
                });
            }
            Ok(existing.clone())
        } else {
            let symbol = Symbol::new(name, is_terminal);
            self.symbols.insert(name.to_string(), symbol.clone());
            Ok(symbol)
        }
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).cloned()
    }

    pub fn goal(&self) -> Symbol {
        self.get(GOAL).expect("Goal is seeded in SymbolTable::new")
    }

    pub fn end(&self) -> Symbol {
        self.get(END).expect("$ is seeded in SymbolTable::new")
    }

    /// Symbols in insertion (first-sighting) order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_symbols_are_seeded() {
        let table = SymbolTable::new();
        assert_eq!(table.goal().name(), "Goal");
        assert!(!table.goal().is_terminal());
        assert_eq!(table.end().name(), "$");
        assert!(table.end().is_terminal());
    }

    #[test]
    fn repeated_consistent_sighting_returns_same_symbol() {
        let mut table = SymbolTable::new();
        let a = table.intern("x", true).unwrap();
        let b = table.intern("x", true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn contradictory_sighting_is_an_error() {
        let mut table = SymbolTable::new();
        table.intern("A", false).unwrap();
        let err = table.intern("A", true).unwrap_err();
        assert_eq!(err.symbol, "A");
    }

    #[test]
    fn iteration_order_is_insertion_order() {
        let mut table = SymbolTable::new();
        table.intern("B", false).unwrap();
        table.intern("a", true).unwrap();
        let names: Vec<_> = table.iter().map(Symbol::name).collect();
        assert_eq!(names, vec!["Goal", "$", "B", "a"]);
    }
}
