// Copyright 2025 Cornell University
// released under MIT License

use std::io::Write;

use cranelift_entity::EntityRef;
use itertools::Itertools;

use crate::ir::*;

/// Serializes an automaton back into the description format it was parsed from
pub fn serialize_to_string(automaton: &Automaton, props: &PropositionTable) -> std::io::Result<String> {
    let mut out = Vec::new();
    serialize(&mut out, automaton, props)?;
    String::from_utf8(out).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Pretty prints a guard with the translator-local proposition indices of `map`
pub fn serialize_guard(guard: &Guard, map: &PropositionMap) -> std::io::Result<String> {
    let s = match guard {
        Guard::True => "t".to_string(),
        Guard::Lit { prop, negated } => {
            let local = map.local_index(*prop).ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("proposition {} is not declared by the automaton", prop.index()),
                )
            })?;
            format!("{}{}", if *negated { "!" } else { "" }, local)
        }
        Guard::And(terms) => terms
            .iter()
            .map(|t| serialize_guard(t, map))
            .collect::<std::io::Result<Vec<_>>>()?
            .join("&"),
        Guard::Or(terms) => terms
            .iter()
            .map(|t| serialize_guard(t, map))
            .collect::<std::io::Result<Vec<_>>>()?
            .join(" | "),
    };
    Ok(s)
}

pub fn serialize(
    out: &mut impl Write,
    automaton: &Automaton,
    props: &PropositionTable,
) -> std::io::Result<()> {
    let map = automaton.proposition_map();
    writeln!(out, "HOA: v1")?;
    writeln!(out, "name: \"{}\"", automaton.name)?;
    writeln!(out, "States: {}", automaton.num_states())?;
    writeln!(
        out,
        "Start: {}",
        automaton.initial_states().iter().map(|s| s.index()).join(" ")
    )?;
    write!(out, "AP: {}", map.len())?;
    for prop in map.iter() {
        write!(out, " \"{}\"", &props[prop])?;
    }
    writeln!(out)?;
    writeln!(out, "--BODY--")?;
    for state in automaton.state_ids() {
        writeln!(out, "State: {}", state.index())?;
        for tran in automaton.transitions(state) {
            writeln!(
                out,
                "[{}] {}",
                serialize_guard(&tran.guard, map)?,
                tran.target.index()
            )?;
        }
    }
    writeln!(out, "--END--")?;
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticHandler;
    use crate::ir::tests::props;
    use crate::parser::parse_automaton;

    const MUTEX: &str = r#"HOA: v1
name: "G!(c1 & c2) & G(r1 -> F c1)"
States: 3
Start: 0
AP: 3 "c2" "c1" "r1"
acc-name: Buchi
Acceptance: 1 Inf(0)
--BODY--
State: 0 {0}
[!0&!2 | !1&!2] 0
[!0&2 | !1&2] 1
State: 1
[!0&1] 0
[!0&!1 | 0&!1&t] 1
State: 2
[t] 2
--END--
"#;

    fn reparse(text: &str, table: &PropositionTable) -> Automaton {
        let mut handler = DiagnosticHandler::default();
        parse_automaton("mutex", text, table, &mut handler).unwrap()
    }

    #[test]
    fn parse_serialize_parse_is_identity() {
        let table = props(&["r1", "c1", "c2"]);
        let first = reparse(MUTEX, &table);
        let text = serialize_to_string(&first, &table).unwrap();
        let second = reparse(&text, &table);
        assert_eq!(first, second);
        // serializing again does not change the text
        assert_eq!(serialize_to_string(&second, &table).unwrap(), text);
    }

    #[test]
    fn keeps_local_indices() {
        let table = props(&["r1", "c1", "c2"]);
        let aut = reparse(MUTEX, &table);
        let text = serialize_to_string(&aut, &table).unwrap();
        assert!(text.contains("AP: 3 \"c2\" \"c1\" \"r1\"\n"));
        assert!(text.contains("State: 0\n[!0&!2 | !1&!2] 0\n[!0&2 | !1&2] 1\n"));
        assert!(text.contains("[!0&!1 | 0&!1&t] 1\n"));
    }
}
