// Copyright 2025 Cornell University
// released under MIT License

use cranelift_entity::PrimaryMap;
use log::{debug, info};
use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use rustc_hash::FxHashSet;

use crate::diagnostic::{DiagnosticHandler, Level};
use crate::errors::{CompileError, CompileResult};
use crate::guard::compile_guard;
use crate::ir::*;

#[derive(Parser)]
#[grammar = "hoa.pest"]
pub(crate) struct HoaParser;

/// One `State:` block before guard compilation
struct StateBlock<'i> {
    id: u32,
    header: Pair<'i, Rule>,
    edges: Vec<(Pair<'i, Rule>, u32, Pair<'i, Rule>)>,
}

struct ParserContext<'a> {
    name: &'a str,
    fileid: usize,
    handler: &'a mut DiagnosticHandler,
}

impl ParserContext<'_> {
    /// Reports `err` at the location of `pair` and hands it back
    fn located(&mut self, pair: &Pair<Rule>, err: CompileError) -> CompileError {
        self.handler
            .emit_diagnostic_parsing(&err.to_string(), self.fileid, pair, Level::Error);
        err
    }

    fn unlocated(&mut self, err: CompileError) -> CompileError {
        self.handler
            .emit_general_message(&format!("{}: {}", self.name, err), Level::Error);
        err
    }

    fn parse_int(&mut self, pair: &Pair<Rule>) -> CompileResult<u32> {
        pair.as_str().parse::<u32>().map_err(|_| {
            let err = CompileError::parse(format!("integer {} is out of range", pair.as_str()));
            self.located(pair, err)
        })
    }

    /// Checks that a state index refers to one of the `n` declared states
    fn check_state(&mut self, id: u32, n: u32, pair: &Pair<Rule>, what: &str) -> CompileResult<()> {
        if id < n {
            Ok(())
        } else {
            let err = CompileError::parse(format!(
                "{what} {id} is out of range, automaton {} declares {n} states",
                self.name
            ));
            Err(self.located(pair, err))
        }
    }

    fn parse_states_decl(&mut self, pair: Pair<Rule>) -> CompileResult<u32> {
        let int = pair.into_inner().next();
        match int {
            Some(int) => self.parse_int(&int),
            None => Err(CompileError::parse("`States:` without a count")),
        }
    }

    fn parse_ap_decl(&mut self, pair: Pair<Rule>) -> CompileResult<Vec<String>> {
        let mut inner = pair.clone().into_inner();
        let count = match inner.next() {
            Some(int) => self.parse_int(&int)? as usize,
            None => return Err(CompileError::parse("`AP:` without a count")),
        };
        let mut names: Vec<String> = Vec::with_capacity(count);
        for string in inner {
            let name = string.as_str().trim_matches('"').to_string();
            if names.contains(&name) {
                let err = CompileError::parse(format!(
                    "proposition `{name}` is declared twice in automaton {}",
                    self.name
                ));
                return Err(self.located(&string, err));
            }
            names.push(name);
        }
        if names.len() != count {
            let err = CompileError::parse(format!(
                "`AP:` announces {count} propositions but lists {}",
                names.len()
            ));
            return Err(self.located(&pair, err));
        }
        Ok(names)
    }
}

/// Parses one automaton description. `name` is used in messages only.
/// Proposition names of the `AP:` header are resolved against `props`.
pub fn parse_automaton(
    name: &str,
    text: &str,
    props: &PropositionTable,
    handler: &mut DiagnosticHandler,
) -> CompileResult<Automaton> {
    let fileid = handler.add_file(name.to_string(), text.to_string());

    let file = match HoaParser::parse(Rule::file, text) {
        Ok(mut pairs) => pairs.next(),
        Err(err) => {
            let (start, end) = match err.location {
                InputLocation::Pos(start) => (start, start),
                InputLocation::Span(span) => span,
            };
            let msg = format!("malformed automaton description: {}", err.variant.message());
            handler.emit_diagnostic_span(&msg, fileid, start, end, Level::Error);
            return Err(CompileError::parse(format!("{name}: {msg}")));
        }
    };
    let file = file.ok_or_else(|| CompileError::parse(format!("{name}: empty description")))?;

    let mut ctx = ParserContext {
        name,
        fileid,
        handler,
    };

    let mut num_states: Option<(u32, Pair<Rule>)> = None;
    let mut ap: Option<(Vec<String>, Pair<Rule>)> = None;
    let mut start: Vec<(u32, Pair<Rule>)> = vec![];
    let mut blocks: Vec<StateBlock> = vec![];
    let mut seen: FxHashSet<u32> = FxHashSet::default();

    for pair in file.into_inner() {
        match pair.as_rule() {
            Rule::states_decl => {
                if num_states.is_some() {
                    let err = CompileError::parse("`States:` header appears twice");
                    return Err(ctx.located(&pair, err));
                }
                let n = ctx.parse_states_decl(pair.clone())?;
                num_states = Some((n, pair));
            }
            Rule::ap_decl => {
                if ap.is_some() {
                    let err = CompileError::parse("`AP:` header appears twice");
                    return Err(ctx.located(&pair, err));
                }
                let names = ctx.parse_ap_decl(pair.clone())?;
                ap = Some((names, pair));
            }
            Rule::start_decl => {
                for int in pair.into_inner() {
                    let id = ctx.parse_int(&int)?;
                    start.push((id, int));
                }
            }
            Rule::state_decl => {
                let id = match pair.clone().into_inner().next() {
                    Some(int) => ctx.parse_int(&int)?,
                    None => return Err(CompileError::parse("`State:` without an index")),
                };
                if !seen.insert(id) {
                    let err = CompileError::parse(format!("state {id} has more than one block"));
                    return Err(ctx.located(&pair, err));
                }
                blocks.push(StateBlock {
                    id,
                    header: pair,
                    edges: vec![],
                });
            }
            Rule::edge => {
                let mut inner = pair.clone().into_inner();
                let (Some(guard), Some(target)) = (inner.next(), inner.next()) else {
                    let err = CompileError::parse("transition without guard or destination");
                    return Err(ctx.located(&pair, err));
                };
                let target_id = ctx.parse_int(&target)?;
                let Some(block) = blocks.last_mut() else {
                    let err = CompileError::parse("transition outside of a `State:` block");
                    return Err(ctx.located(&pair, err));
                };
                block.edges.push((guard, target_id, target));
            }
            Rule::other_line | Rule::EOI => {}
            rule => unreachable!("unexpected line rule {:?}", rule),
        }
    }

    let Some((n, _)) = num_states else {
        return Err(ctx.unlocated(CompileError::parse("missing `States:` header")));
    };
    if start.is_empty() {
        return Err(ctx.unlocated(CompileError::parse("missing `Start:` header")));
    }

    let map = match &ap {
        Some((names, pair)) => match PropositionMap::resolve(names.as_slice(), props) {
            Ok(map) => map,
            Err(err) => return Err(ctx.located(pair, err)),
        },
        None => PropositionMap::default(),
    };

    for (id, pair) in &start {
        ctx.check_state(*id, n, pair, "initial state")?;
    }
    for block in &blocks {
        ctx.check_state(block.id, n, &block.header, "state")?;
        for (_, target, pair) in &block.edges {
            ctx.check_state(*target, n, pair, "transition target")?;
        }
    }
    // block ids are unique and in range here, so equal counts mean no gaps
    if seen.len() < n as usize {
        if let Some(missing) = (0..n).find(|s| !seen.contains(s)) {
            let err = CompileError::parse(format!("state {missing} is declared but has no block"));
            return Err(ctx.unlocated(err));
        }
    }

    blocks.sort_by_key(|b| b.id);
    let mut states: PrimaryMap<StateId, State> = PrimaryMap::with_capacity(blocks.len());
    for block in blocks {
        let mut state = State::default();
        for (guard_pair, target, _) in block.edges {
            let guard = match compile_guard(guard_pair.as_str(), &map) {
                Ok(guard) => guard,
                Err(err) => return Err(ctx.located(&guard_pair, err)),
            };
            state
                .transitions
                .push(Transition::new(guard, StateId::from_u32(target)));
        }
        debug!(
            "{}: state {} has {} transitions",
            name,
            block.id,
            state.transitions.len()
        );
        states.push(state);
    }

    let automaton = Automaton::new(
        name,
        states,
        start.iter().map(|(id, _)| StateId::from_u32(*id)),
        map,
    )
    .map_err(|err| ctx.unlocated(err))?;
    info!(
        "parsed automaton {}: {} states, {} initial, {} propositions",
        name,
        automaton.num_states(),
        automaton.initial_states().len(),
        automaton.proposition_map().len()
    );
    Ok(automaton)
}

/// Reads and parses an automaton description from disk
pub fn parse_file(
    filename: impl AsRef<std::path::Path>,
    props: &PropositionTable,
    handler: &mut DiagnosticHandler,
) -> CompileResult<Automaton> {
    let path = filename.as_ref();
    let text = std::fs::read_to_string(path)?;
    parse_automaton(&path.display().to_string(), &text, props, handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::tests::{np, p, props};

    const REQUEST_GRANT: &str = r#"HOA: v1
name: "G(r -> X g)"
States: 2
Start: 0
AP: 2 "g" "r"
acc-name: all
Acceptance: 0 t
properties: trans-labels explicit-labels state-acc deterministic
--BODY--
State: 0
[!1] 0
[1] 1
State: 1 "waiting" {0}
[0&!1] 0
[0&1] 1 {0}
--END--
"#;

    fn parse(text: &str, table: &PropositionTable) -> (CompileResult<Automaton>, String) {
        let mut handler = DiagnosticHandler::default();
        let res = parse_automaton("test.hoa", text, table, &mut handler);
        (res, handler.error_string().to_string())
    }

    #[test]
    fn parses_translator_output() {
        let table = props(&["r", "g"]);
        let (res, errors) = parse(REQUEST_GRANT, &table);
        let aut = res.unwrap();
        assert!(errors.is_empty());
        assert_eq!(aut.num_states(), 2);
        assert_eq!(aut.initial_states(), &[StateId::from_u32(0)]);
        // `AP: 2 "g" "r"` maps local 0 to canonical 1 and local 1 to canonical 0
        let s0 = aut.transitions(StateId::from_u32(0));
        assert_eq!(s0[0], Transition::new(np(0), StateId::from_u32(0)));
        assert_eq!(s0[1], Transition::new(p(0), StateId::from_u32(1)));
        let s1 = aut.transitions(StateId::from_u32(1));
        assert_eq!(s1[0].guard, Guard::And(vec![p(1), np(0)]));
        assert_eq!(s1[1].target, StateId::from_u32(1));
    }

    #[test]
    fn start_lines_accumulate() {
        let table = props(&["a"]);
        let text = "States: 3\nStart: 2\nStart: 0\nAP: 1 \"a\"\nState: 0\n[t] 0\nState: 1\n[0] 1\nState: 2\n[!0] 2\n";
        let aut = parse(text, &table).0.unwrap();
        assert_eq!(
            aut.initial_states(),
            &[StateId::from_u32(0), StateId::from_u32(2)]
        );
    }

    #[test]
    fn long_descriptions_parse() {
        let table = props(&["a"]);
        let n = 20_000;
        let mut text = format!("States: {n}\nStart: 0\nAP: 1 \"a\"\n--BODY--\n");
        for i in 0..n - 1 {
            text.push_str(&format!("State: {i}\n[0] {}\n", i + 1));
        }
        text.push_str(&format!("State: {}\n[t] {}\n--END--\n", n - 1, n - 1));
        let (res, errors) = parse(&text, &table);
        let aut = res.unwrap();
        assert!(errors.is_empty());
        assert_eq!(aut.num_states(), n);
        let last = StateId::from_u32(n as u32 - 1);
        assert_eq!(aut.rejecting_state().unwrap(), last);

        // the same description with one block missing
        let gap = text.replace("State: 777\n[0] 778\n", "");
        let errors = expect_parse_error(&gap);
        assert!(errors.contains("state 777 is declared but has no block"));
    }

    fn expect_parse_error(text: &str) -> String {
        let table = props(&["a", "b"]);
        let (res, errors) = parse(text, &table);
        match res {
            Err(CompileError::Parse { .. }) => errors,
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn structural_parse_errors() {
        // missing headers
        expect_parse_error("Start: 0\nAP: 1 \"a\"\nState: 0\n[0] 0\n");
        expect_parse_error("States: 1\nAP: 1 \"a\"\nState: 0\n[0] 0\n");
        // duplicate block
        let errors = expect_parse_error(
            "States: 1\nStart: 0\nAP: 1 \"a\"\nState: 0\n[0] 0\nState: 0\n[!0] 0\n",
        );
        assert!(errors.contains("more than one block"));
        // out of range ids
        expect_parse_error("States: 1\nStart: 1\nAP: 1 \"a\"\nState: 0\n[0] 0\n");
        expect_parse_error("States: 1\nStart: 0\nAP: 1 \"a\"\nState: 0\n[0] 4\n");
        expect_parse_error("States: 1\nStart: 0\nAP: 1 \"a\"\nState: 3\n[0] 0\n");
        // declared state without block
        expect_parse_error("States: 2\nStart: 0\nAP: 1 \"a\"\nState: 0\n[0] 0\n");
        // AP inconsistencies
        expect_parse_error("States: 1\nStart: 0\nAP: 2 \"a\"\nState: 0\n[0] 0\n");
        expect_parse_error("States: 1\nStart: 0\nAP: 2 \"a\" \"a\"\nState: 0\n[0] 0\n");
        // edge before any state block and a malformed keyword line
        expect_parse_error("States: 1\nStart: 0\nAP: 1 \"a\"\n[0] 0\nState: 0\n");
        expect_parse_error("States: x\nStart: 0\nState: 0\n[0] 0\n");
    }

    #[test]
    fn unknown_proposition_is_a_configuration_error() {
        let table = props(&["a"]);
        let (res, errors) = parse(
            "States: 1\nStart: 0\nAP: 1 \"blue\"\nState: 0\n[0] 0\n",
            &table,
        );
        assert!(matches!(res, Err(CompileError::Configuration { .. })));
        assert!(errors.contains("blue"));
    }

    #[test]
    fn malformed_guard_is_reported_at_its_location() {
        let table = props(&["a"]);
        let (res, errors) = parse("States: 1\nStart: 0\nAP: 1 \"a\"\nState: 0\n[0&] 0\n", &table);
        assert!(matches!(res, Err(CompileError::Format { .. })));
        assert!(errors.contains("test.hoa:5:1"));
    }
}
