// Copyright 2025 Cornell University
// released under MIT License

use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::PrattParser;
use pest::Parser;

use crate::errors::{CompileError, CompileResult};
use crate::ir::{Guard, PropositionMap};
use crate::parser::{HoaParser, Rule};

lazy_static::lazy_static! {
    static ref PRATT_PARSER: PrattParser<Rule> = {
        use pest::pratt_parser::{Assoc::*, Op};
        use Rule::*;

        // Precedence is defined lowest to highest
        PrattParser::new()
            .op(Op::infix(or, Left))
            .op(Op::infix(and, Left))
    };
}

/// Compiles one bracketed guard such as `[0&!1 | 2]` into a `Guard` over
/// canonical propositions. The translation is purely syntax directed: every
/// disjunct of the text becomes one `Or` child, every conjunct one `And`
/// child, nothing is simplified.
pub fn compile_guard(text: &str, map: &PropositionMap) -> CompileResult<Guard> {
    let text = text.trim();
    if !(text.starts_with('[') && text.ends_with(']')) || text.len() < 2 {
        return Err(CompileError::format(
            text,
            "a guard has to be enclosed in `[` and `]`",
        ));
    }

    let mut pairs = HoaParser::parse(Rule::guard, text).map_err(|err| {
        CompileError::format(text, format!("malformed guard: {}", err.variant.message()))
    })?;
    let body = pairs
        .next()
        .and_then(|guard| guard.into_inner().next())
        .ok_or_else(|| CompileError::format(text, "empty guard"))?;

    build_guard(text, body.into_inner(), map)
}

fn build_guard(text: &str, pairs: Pairs<Rule>, map: &PropositionMap) -> CompileResult<Guard> {
    PRATT_PARSER
        .map_primary(|primary| compile_literal(text, primary, map))
        .map_infix(|lhs, op, rhs| {
            let (lhs, rhs) = (lhs?, rhs?);
            match op.as_rule() {
                Rule::and => Ok(join(lhs, rhs, true)),
                Rule::or => Ok(join(lhs, rhs, false)),
                rule => unreachable!("guard expected infix operation, found {:?}", rule),
            }
        })
        .parse(pairs)
}

fn compile_literal(text: &str, pair: Pair<Rule>, map: &PropositionMap) -> CompileResult<Guard> {
    let mut negated = false;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::tru => return Ok(Guard::True),
            Rule::neg => negated = true,
            Rule::prop => {
                let local: usize = inner.as_str().parse().map_err(|_| {
                    CompileError::format(text, format!("invalid proposition index {}", inner.as_str()))
                })?;
                let prop = map.canonical(local).ok_or_else(|| {
                    CompileError::format(
                        text,
                        format!(
                            "proposition index {local} is not declared (the description lists {} propositions)",
                            map.len()
                        ),
                    )
                })?;
                return Ok(Guard::lit(prop, negated));
            }
            rule => unreachable!("guard expected literal, found {:?}", rule),
        }
    }
    Err(CompileError::format(text, "expected a literal"))
}

/// Appends `rhs` to `lhs` under a conjunction (`conjunction = true`) or a
/// disjunction, flattening nested operators of the same kind.
fn join(lhs: Guard, rhs: Guard, conjunction: bool) -> Guard {
    let split = |g: Guard| -> Vec<Guard> {
        match (g, conjunction) {
            (Guard::And(terms), true) | (Guard::Or(terms), false) => terms,
            (other, _) => vec![other],
        }
    };
    let mut terms = split(lhs);
    terms.extend(split(rhs));
    if conjunction {
        Guard::And(terms)
    } else {
        Guard::Or(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::tests::{np, p, props};
    use crate::ir::PropositionTable;

    fn identity_map(table: &PropositionTable) -> PropositionMap {
        let names: Vec<&str> = table.names().collect();
        PropositionMap::resolve(names.as_slice(), table).unwrap()
    }

    #[test]
    fn constant_true() {
        let table = props(&["a"]);
        assert_eq!(compile_guard("[t]", &identity_map(&table)).unwrap(), Guard::True);
    }

    #[test]
    fn keeps_disjunct_and_conjunct_structure() {
        let table = props(&["a", "b", "c"]);
        let map = identity_map(&table);
        assert_eq!(compile_guard("[0]", &map).unwrap(), p(0));
        assert_eq!(compile_guard("[!1]", &map).unwrap(), np(1));
        assert_eq!(
            compile_guard("[0&!1]", &map).unwrap(),
            Guard::And(vec![p(0), np(1)])
        );
        assert_eq!(
            compile_guard("[0&!1 | !0&1&2 | 2]", &map).unwrap(),
            Guard::Or(vec![
                Guard::And(vec![p(0), np(1)]),
                Guard::And(vec![np(0), p(1), p(2)]),
                p(2),
            ])
        );
        // no simplification, even of obviously redundant terms
        assert_eq!(
            compile_guard("[0 | 0]", &map).unwrap(),
            Guard::Or(vec![p(0), p(0)])
        );
    }

    #[test]
    fn remaps_local_indices() {
        let table = props(&["r1", "y1", "g1"]);
        // translator declared AP: 2 "g1" "r1"
        let map = PropositionMap::resolve(&["g1", "r1"], &table).unwrap();
        assert_eq!(
            compile_guard("[0&!1]", &map).unwrap(),
            Guard::And(vec![p(2), np(0)])
        );
    }

    #[test]
    fn rejects_unbracketed_and_malformed_text() {
        let table = props(&["a", "b"]);
        let map = identity_map(&table);
        for bad in ["0&1", "[0&1", "0&1]", "[]", "[0&]", "[&0]", "[0 1]", "[!t]", "[(0)]", "[2]"] {
            match compile_guard(bad, &map) {
                Err(CompileError::Format { .. }) => {}
                other => panic!("expected a format error for {bad}, got {other:?}"),
            }
        }
    }
}
