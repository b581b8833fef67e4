// GPF artifact writer/reader (§6.2, boundary contract).
//
// Out of the CORE's tested invariants per spec.md, but specified precisely
// enough to implement as a real boundary: the writer is the contract a
// downstream parser driver (the teacher's `lalr1`/`lalr1_plus` split) would
// consume, and the reader exists only so the round-trip property (§8
// scenario 6) can be asserted without a second crate.

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::table::{Action, Tables};
use std::fmt;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    Truncated,
    Malformed(String),
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArtifactError::Truncated => write!(f, "artifact ended before an expected section"),
            ArtifactError::Malformed(line) => write!(f, "malformed artifact line: {}", line),
        }
    }
}

/// Writes `grammar`/`tables` in the exact section order and line shapes of
/// §6.2, including the rule-symbol flag polarity note: both the rule-symbol
/// flags and the symbol-table flags use `0` for terminal, `1` for
/// non-terminal, per the literal wording of each section — do not cast
/// `is_terminal as u8` for one and negate it for the other.
pub fn write(grammar: &Grammar, tables: &Tables, out: &mut impl Write) -> io::Result<()> {
    let rules = grammar.productions();
    writeln!(out, "{}", rules.len())?;
    for rule in rules {
        write!(out, "{} {}", 1 + rule.rhs().len(), rule.lhs())?;
        for symbol in rule.rhs() {
            write!(out, " {} {}", flag(symbol), symbol)?;
        }
        writeln!(out)?;
    }

    let symbols: Vec<&Symbol> = grammar.symbol_table().iter().collect();
    writeln!(out, "{}", symbols.len())?;
    for symbol in &symbols {
        writeln!(out, "{} {}", flag(symbol), symbol)?;
    }

    writeln!(out, "{}", tables.action.len())?;
    for ((state, terminal), action) in &tables.action {
        let (kind, payload) = match action {
            Action::Shift(next) => ('s', *next),
            Action::Reduce(index) => ('r', *index),
            Action::Accept => ('a', 0),
        };
        writeln!(out, "{} {} {} {}", state, terminal, kind, payload)?;
    }

    writeln!(out, "{}", tables.goto.len())?;
    for ((state, non_terminal), next) in &tables.goto {
        writeln!(out, "{} {} {}", state, non_terminal, next)?;
    }
    Ok(())
}

fn flag(symbol: &Symbol) -> u8 {
    if symbol.is_terminal() {
        0
    } else {
        1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    pub lhs: String,
    pub rhs: Vec<(bool, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub state: u32,
    pub terminal: String,
    pub kind: char,
    pub payload: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGoto {
    pub state: u32,
    pub non_terminal: String,
    pub next: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedArtifact {
    pub rules: Vec<ParsedRule>,
    pub symbols: Vec<(bool, String)>,
    pub actions: Vec<ParsedAction>,
    pub gotos: Vec<ParsedGoto>,
}

fn read_line(input: &mut impl BufRead) -> Result<String, ArtifactError> {
    let mut line = String::new();
    let bytes = input.read_line(&mut line).map_err(|_| ArtifactError::Truncated)?;
    if bytes == 0 {
        return Err(ArtifactError::Truncated);
    }
    Ok(line.trim_end_matches('\n').to_string())
}

fn read_count(input: &mut impl BufRead) -> Result<usize, ArtifactError> {
    let line = read_line(input)?;
    line.trim()
        .parse()
        .map_err(|_| ArtifactError::Malformed(line))
}

/// Parses an artifact written by `write` back into its constituent
/// sections (§6.2), for asserting the round-trip property (§8 scenario 6).
pub fn read(input: &mut impl BufRead) -> Result<ParsedArtifact, ArtifactError> {
    let mut artifact = ParsedArtifact::default();

    let rule_count = read_count(input)?;
    for _ in 0..rule_count {
        let line = read_line(input)?;
        let mut parts = line.split_whitespace();
        let _len: usize = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .parse()
            .map_err(|_| ArtifactError::Malformed(line.clone()))?;
        let lhs = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .to_string();
        let mut rhs = Vec::new();
        loop {
            let Some(flag_str) = parts.next() else { break };
            let is_terminal = flag_str == "0";
            let name = parts
                .next()
                .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
                .to_string();
            rhs.push((is_terminal, name));
        }
        artifact.rules.push(ParsedRule { lhs, rhs });
    }

    let symbol_count = read_count(input)?;
    for _ in 0..symbol_count {
        let line = read_line(input)?;
        let mut parts = line.split_whitespace();
        let flag_str = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?;
        let name = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .to_string();
        artifact.symbols.push((flag_str == "0", name));
    }

    let action_count = read_count(input)?;
    for _ in 0..action_count {
        let line = read_line(input)?;
        let mut parts = line.split_whitespace();
        let state: u32 = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .parse()
            .map_err(|_| ArtifactError::Malformed(line.clone()))?;
        let terminal = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .to_string();
        let kind = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .chars()
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?;
        let payload: u32 = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .parse()
            .map_err(|_| ArtifactError::Malformed(line.clone()))?;
        artifact.actions.push(ParsedAction {
            state,
            terminal,
            kind,
            payload,
        });
    }

    let goto_count = read_count(input)?;
    for _ in 0..goto_count {
        let line = read_line(input)?;
        let mut parts = line.split_whitespace();
        let state: u32 = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .parse()
            .map_err(|_| ArtifactError::Malformed(line.clone()))?;
        let non_terminal = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .to_string();
        let next: u32 = parts
            .next()
            .ok_or_else(|| ArtifactError::Malformed(line.clone()))?
            .parse()
            .map_err(|_| ArtifactError::Malformed(line.clone()))?;
        artifact.gotos.push(ParsedGoto {
            state,
            non_terminal,
            next,
        });
    }

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CanonicalCollection;
    use crate::diagnostic::CollectingSink;
    use crate::first::FirstSets;
    use crate::table::assemble;
    use std::io::BufReader;

    #[test]
    fn round_trip_preserves_rules_symbols_and_tables() {
        let mut grammar = Grammar::new();
        grammar.add_production("Goal", &[("A", false)]).unwrap();
        grammar.add_production("A", &[("x", true)]).unwrap();

        let mut first_sets = FirstSets::new();
        let mut sink = CollectingSink::new();
        let collection = CanonicalCollection::build(&grammar, &mut first_sets, &mut sink).unwrap();
        let tables = assemble(&collection, &grammar, &mut sink);

        let mut buffer = Vec::new();
        write(&grammar, &tables, &mut buffer).unwrap();
        let mut reader = BufReader::new(buffer.as_slice());
        let parsed = read(&mut reader).unwrap();

        assert_eq!(parsed.rules.len(), grammar.productions().len());
        assert_eq!(parsed.symbols.len(), grammar.symbol_table().len());
        assert_eq!(parsed.actions.len(), tables.action.len());
        assert_eq!(parsed.gotos.len(), tables.goto.len());

        let first_rule = &parsed.rules[0];
        assert_eq!(first_rule.lhs, "Goal");
        assert_eq!(first_rule.rhs, vec![(false, "A".to_string())]);
    }
}
