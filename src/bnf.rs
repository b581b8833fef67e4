// BNF line tokenizer (peripheral; §6.1, §4.9).
//
// A thin, non-core concern: turns source lines into `RuleRecord`s so the
// loader never has to see raw text. Grounded directly in the two regexes of
// the original prototype (`automata`, `right_matcher` in
// original_source/gb_compiler/grammar_parser/lr1_parser.py), compiled once
// via `lazy_static`, matching the teacher's own compiled-once-regex pattern
// in `alap_gen_ng/src/production.rs`.

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RULE_RE: Regex = Regex::new(r"^<(?P<left>\w+)>\s*::=\s*(?P<right>.*)$").unwrap();
    static ref SYMBOL_RE: Regex =
        Regex::new(r#"<(?P<non_terminal>[^>\n]+)>|"(?P<terminal>[^"\n]+)""#).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RhsSymbol {
    Terminal(String),
    NonTerminal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    pub lhs: String,
    pub rhs: Vec<RhsSymbol>,
}

/// Tokenizes BNF source text into rule records (§6.1). Blank lines and lines
/// without `::=` are skipped. A line whose right-hand side yields no symbols
/// is reported as `Diagnostic::EmptyRightHandSide` and skipped, enforcing
/// the empty-right-hand-side Non-goal at the earliest possible point.
pub fn tokenize(source: &str, sink: &mut impl DiagnosticSink) -> Vec<RuleRecord> {
    let mut records = Vec::new();
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(captures) = RULE_RE.captures(line) else {
            continue;
        };
        let lhs = captures["left"].to_string();
        let right_side = &captures["right"];
        let rhs: Vec<RhsSymbol> = SYMBOL_RE
            .captures_iter(right_side)
            .map(|caps| {
                if let Some(non_terminal) = caps.name("non_terminal") {
                    RhsSymbol::NonTerminal(non_terminal.as_str().to_string())
                } else {
                    RhsSymbol::Terminal(caps["terminal"].to_string())
                }
            })
            .collect();
        if rhs.is_empty() {
            sink.report(Diagnostic::EmptyRightHandSide {
                lhs,
                line: line.to_string(),
            });
            continue;
        }
        records.push(RuleRecord { lhs, rhs });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::CollectingSink;

    #[test]
    fn tokenizes_mixed_terminal_and_non_terminal_rhs() {
        let mut sink = CollectingSink::new();
        let records = tokenize(
            "<Goal> ::= <A>\n<A> ::= <A> \",\" \"x\"\n<A> ::= \"x\"\n",
            &mut sink,
        );
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].lhs, "Goal");
        assert_eq!(records[0].rhs, vec![RhsSymbol::NonTerminal("A".to_string())]);
        assert_eq!(
            records[1].rhs,
            vec![
                RhsSymbol::NonTerminal("A".to_string()),
                RhsSymbol::Terminal(",".to_string()),
                RhsSymbol::Terminal("x".to_string()),
            ]
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn blank_and_non_rule_lines_are_skipped() {
        let mut sink = CollectingSink::new();
        let records = tokenize("\n   \n# not a rule\n<A> ::= \"x\"\n", &mut sink);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_right_hand_side_is_reported_and_skipped() {
        let mut sink = CollectingSink::new();
        let records = tokenize("<A> ::= \n<B> ::= \"x\"\n", &mut sink);
        assert_eq!(records.len(), 1);
        assert_eq!(sink.diagnostics.len(), 1);
        assert!(matches!(
            sink.diagnostics[0],
            Diagnostic::EmptyRightHandSide { .. }
        ));
    }
}
