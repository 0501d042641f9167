// Copyright 2025 Cornell University
// released under MIT License

use cranelift_entity::EntityRef;
use itertools::Itertools;

use crate::encoding::tracking::{
    TraceLayout, TRACE_HEADER, TRACE_LINE_REJECTING, TRACE_LINE_SOURCE, TRACE_LINE_TARGET,
    TRACE_LINE_VALUES,
};
use crate::encoding::{Buffering, Verdict};
use crate::ir::{Automaton, Guard, PropositionTable, StateId};

/// C expression of a guard: disjuncts in parentheses joined by `||`,
/// conjuncts joined by `&&`, the constant `t` becomes `1`.
pub fn guard_to_c(guard: &Guard, props: &PropositionTable) -> String {
    match guard {
        Guard::True => "1".to_string(),
        Guard::Lit { prop, negated } => {
            format!("{}{}", if *negated { "!" } else { "" }, &props[*prop])
        }
        Guard::And(terms) => terms.iter().map(|t| guard_to_c(t, props)).join("&&"),
        Guard::Or(terms) => terms
            .iter()
            .map(|t| format!("({})", guard_to_c(t, props)))
            .join("||"),
    }
}

fn signature(props: &PropositionTable) -> String {
    format!(
        "int monitor({})",
        props.names().map(|n| format!("uint8_t {n}")).join(",")
    )
}

fn write_preamble(
    title: &str,
    with_stdio: bool,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    writeln!(out, "/* Temporal Logic Runtime Monitor Code */")?;
    writeln!(out, "/* {title} */")?;
    writeln!(out, "#include <stdint.h>")?;
    if with_stdio {
        writeln!(out, "#include <stdio.h>")?;
    }
    writeln!(out)?;
    Ok(())
}

/// `prefix` tells apart the flags of different fragments
fn write_flag_storage(
    automaton: &Automaton,
    prefix: &str,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    for state in automaton.state_ids() {
        writeln!(
            out,
            "uint8_t inState{prefix}{} = {};",
            state.index(),
            automaton.is_initial(state) as u8
        )?;
    }
    Ok(())
}

/// Double-buffered subset update: all guards read `inState`, results are
/// collected in `nextState` and copied back at the end
fn write_flag_update(
    automaton: &Automaton,
    props: &PropositionTable,
    prefix: &str,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    for state in automaton.state_ids() {
        writeln!(out, "  uint8_t nextState{prefix}{} = 0;", state.index())?;
    }
    for state in automaton.state_ids() {
        writeln!(out, "  if (inState{prefix}{}) {{", state.index())?;
        for tran in automaton.transitions(state) {
            writeln!(
                out,
                "    if ({}) nextState{prefix}{} = 1;",
                guard_to_c(&tran.guard, props),
                tran.target.index()
            )?;
        }
        writeln!(out, "  }}")?;
    }
    for state in automaton.state_ids() {
        let s = state.index();
        writeln!(out, "  inState{prefix}{s} = nextState{prefix}{s};")?;
    }
    Ok(())
}

/// Flag encoding; with `rejecting` set the violation is the rejecting state
/// being active, otherwise it is the empty set of active states
fn flags_to_c(
    automaton: &Automaton,
    props: &PropositionTable,
    rejecting: Option<StateId>,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    let title = match rejecting {
        Some(_) => "universal",
        None => "nondeterministic",
    };
    write_preamble(&format!("{title} encoding of {}", automaton.name), false, out)?;
    writeln!(out, "/* State storage information */")?;
    write_flag_storage(automaton, "", out)?;
    writeln!(out)?;

    writeln!(out, "/* Monitor step/update function */")?;
    writeln!(out, "{} {{", signature(props))?;
    write_flag_update(automaton, props, "", out)?;
    match rejecting {
        Some(rejecting) => {
            writeln!(out, "  return inState{};", rejecting.index())?;
        }
        None => {
            for state in automaton.state_ids() {
                writeln!(out, "  if (inState{}) return 0;", state.index())?;
            }
            writeln!(out, "  return 1; /* Reporting a violation. */")?;
        }
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// Subset encoding, reports a violation once no state is active
pub fn nondeterministic_to_c(
    automaton: &Automaton,
    props: &PropositionTable,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    flags_to_c(automaton, props, None, out)
}

/// Flag encoding of a co-Büchi automaton, reports a violation while the
/// rejecting state is active
pub fn universal_to_c(
    automaton: &Automaton,
    rejecting: StateId,
    props: &PropositionTable,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    flags_to_c(automaton, props, Some(rejecting), out)
}

pub fn deterministic_to_c(
    automaton: &Automaton,
    initial: StateId,
    props: &PropositionTable,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    write_preamble(
        &format!("deterministic encoding of {}", automaton.name),
        false,
        out,
    )?;
    writeln!(out, "/* State storage information */")?;
    writeln!(out, "uint32_t monitorState = {};", initial.index())?;
    writeln!(out)?;

    writeln!(out, "/* Monitor step/update function */")?;
    writeln!(out, "{} {{", signature(props))?;
    for state in automaton.state_ids() {
        writeln!(out, "  if (monitorState == {}) {{", state.index())?;
        for tran in automaton.transitions(state) {
            writeln!(
                out,
                "    if ({}) {{ monitorState = {}; return 0; }}",
                guard_to_c(&tran.guard, props),
                tran.target.index()
            )?;
        }
        writeln!(out, "  }}")?;
    }
    writeln!(out, "  return 1; /* Fall through. */")?;
    writeln!(out, "}}")?;
    Ok(())
}

/// One subset encoding per automaton, flags named `inState<fragment>_<state>`
pub fn fragmented_to_c(
    automata: &[Automaton],
    props: &PropositionTable,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    let names = automata.iter().map(|a| a.name.as_str()).join(", ");
    write_preamble(&format!("fragmented encoding of {names}"), false, out)?;
    writeln!(out, "/* State storage information */")?;
    for (fragment, automaton) in automata.iter().enumerate() {
        write_flag_storage(automaton, &format!("{fragment}_"), out)?;
    }
    writeln!(out)?;

    writeln!(out, "/* Monitor step/update function */")?;
    writeln!(out, "{} {{", signature(props))?;
    for (fragment, automaton) in automata.iter().enumerate() {
        writeln!(out, "  /* fragment {fragment}: {} */", automaton.name)?;
        write_flag_update(automaton, props, &format!("{fragment}_"), out)?;
        let dead = automaton
            .state_ids()
            .map(|s| format!("!inState{fragment}_{}", s.index()))
            .join(" && ");
        writeln!(out, "  if ({dead}) return 1;")?;
    }
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    Ok(())
}

/// Universal encoding with per-state trace storage plus the
/// `buildViolatingTraceInformation` routine that prints the recorded path
/// into the rejecting state.
pub fn reason_tracking_to_c(
    layout: &TraceLayout,
    props: &PropositionTable,
    buffering: Buffering,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    let automaton = layout.automaton();
    let ty = layout.width().c_type();
    let variant = match buffering {
        Buffering::SinglePass => "single pass",
        Buffering::DoubleBuffered => "double buffered",
    };
    write_preamble(
        &format!("reason-tracking encoding ({variant}) of {}", automaton.name),
        true,
        out,
    )?;

    writeln!(out, "/* State storage information */")?;
    for state in automaton.state_ids() {
        let s = state.index();
        writeln!(out, "uint8_t inState{s} = {};", automaton.is_initial(state) as u8)?;
        writeln!(out, "volatile uint32_t state{s}History = 0;")?;
        let depth = layout.depth(state);
        if depth > 0 {
            writeln!(out, "volatile {ty} state{s}Snapshots[{depth}];")?;
        }
    }
    writeln!(out)?;

    writeln!(out, "/* Monitor step/update function */")?;
    writeln!(out, "{} {{", signature(props))?;
    let compressed = props
        .iter()
        .map(|(id, name)| format!("({name} ? {}u : 0u)", 1u64 << id.index()))
        .join(" | ");
    writeln!(out, "  {ty} snapshot = ({ty})({compressed});")?;
    let order = layout.profile().order();
    let flag = |state: StateId| match buffering {
        Buffering::SinglePass => format!("inState{}", state.index()),
        Buffering::DoubleBuffered => format!("nextState{}", state.index()),
    };
    if buffering == Buffering::DoubleBuffered {
        for &state in order {
            writeln!(out, "  uint8_t nextState{} = 0;", state.index())?;
        }
    }
    for &state in order {
        let s = state.index();
        let depth = layout.depth(state);
        match (layout.self_loop(state), buffering) {
            (Some(guard), _) => writeln!(
                out,
                "  {} = inState{s} && ({});",
                flag(state),
                guard_to_c(guard, props)
            )?,
            (None, Buffering::SinglePass) => writeln!(out, "  inState{s} = 0;")?,
            (None, Buffering::DoubleBuffered) => {}
        }
        for edge in layout.reachable_incoming(state) {
            let src = edge.source.index();
            writeln!(
                out,
                "  if (!{} && inState{src} && ({})) {{",
                flag(state),
                guard_to_c(&edge.guard, props)
            )?;
            writeln!(out, "    {} = 1;", flag(state))?;
            for slot in 0..layout.depth(edge.source) {
                writeln!(
                    out,
                    "    state{s}Snapshots[{slot}] = state{src}Snapshots[{slot}];"
                )?;
            }
            writeln!(out, "    state{s}Snapshots[{}] = snapshot;", depth - 1)?;
            writeln!(
                out,
                "    state{s}History = state{src}History * {} + {};",
                layout.fan_in(state),
                edge.index
            )?;
            writeln!(out, "  }}")?;
        }
    }
    if buffering == Buffering::DoubleBuffered {
        for &state in order {
            let s = state.index();
            writeln!(out, "  inState{s} = nextState{s};")?;
        }
    }
    writeln!(out, "  return inState{};", layout.rejecting().index())?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    write_trace_builder(layout, props, out)
}

fn write_trace_builder(
    layout: &TraceLayout,
    props: &PropositionTable,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    let automaton = layout.automaton();
    let rejecting = layout.rejecting();
    let r = rejecting.index();
    let buffer = "violatingTraceInformation";

    writeln!(out, "/* Trace reconstruction, uses statically reserved space only */")?;
    writeln!(out, "char {buffer}[{}];", layout.buffer_size())?;
    writeln!(out)?;
    writeln!(out, "void buildViolatingTraceInformation(void) {{")?;
    writeln!(out, "  uint32_t history = state{r}History;")?;
    writeln!(out, "  int state = {r};")?;
    writeln!(out, "  int selector;")?;
    writeln!(out, "  int ptr;")?;
    writeln!(out, "  {buffer}[0] = 0;")?;
    writeln!(out, "  if (!inState{r}) return;")?;
    writeln!(
        out,
        "  ptr = snprintf({buffer}, sizeof({buffer}), \"{}\");",
        TRACE_HEADER.escape_default()
    )?;
    let not_initial = automaton
        .initial_states()
        .iter()
        .map(|s| format!("state != {}", s.index()))
        .join(" && ");
    writeln!(out, "  while ({not_initial}) {{")?;
    writeln!(out, "    if (ptr < 0 || ptr >= (int)sizeof({buffer})) return;")?;
    writeln!(out, "    switch (state) {{")?;
    // only states that can lie on a path into the rejecting state index its
    // snapshot array in bounds
    let rejecting_depth = layout.depth(rejecting);
    for state in automaton.state_ids() {
        if !layout.is_reachable(state)
            || automaton.is_initial(state)
            || layout.depth(state) > rejecting_depth
            || !layout.is_reachable(rejecting)
        {
            continue;
        }
        let s = state.index();
        let fan = layout.fan_in(state);
        let sources = layout
            .incoming(state)
            .iter()
            .map(|e| e.source.index())
            .join(",");
        let slot = format!("state{r}Snapshots[{}]", layout.depth(state) - 1);
        let marker = if state == rejecting { TRACE_LINE_REJECTING } else { "" };
        let format_values = props.names().map(|n| format!("{n}=%d")).join(", ");
        let values = props
            .iter()
            .map(|(id, _)| format!("({slot} & {}u) ? 1 : 0", 1u64 << id.index()))
            .join(", ");
        writeln!(out, "      case {s}:")?;
        writeln!(out, "        selector = (int[]){{{sources}}}[history % {fan}];")?;
        writeln!(
            out,
            "        ptr += snprintf({buffer} + ptr, sizeof({buffer}) - ptr, \"{TRACE_LINE_SOURCE}%d{TRACE_LINE_TARGET}{s}{marker}{TRACE_LINE_VALUES}{format_values}\\n\", selector, {values});"
        )?;
        writeln!(out, "        history = history / {fan};")?;
        writeln!(out, "        state = selector;")?;
        writeln!(out, "        break;")?;
    }
    writeln!(out, "      default:")?;
    writeln!(out, "        return;")?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    Ok(())
}

/// Test driver that replays `valuations` against `monitor` and checks every
/// verdict. With `trace_buffer` set (size of the trace buffer of a
/// reason-tracking monitor) the reconstructed trace is printed after a final
/// violation.
pub fn harness_to_c(
    props: &PropositionTable,
    valuations: &[Vec<bool>],
    expected: &[Verdict],
    trace_buffer: Option<usize>,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    writeln!(out, "/* Monitor test driver */")?;
    writeln!(out, "#include <stdlib.h>")?;
    writeln!(out, "#include <stdio.h>")?;
    writeln!(out, "#include <stdint.h>")?;
    writeln!(out)?;
    writeln!(out, "{};", signature(props))?;
    if let Some(size) = trace_buffer {
        writeln!(out, "void buildViolatingTraceInformation(void);")?;
        writeln!(out, "extern char violatingTraceInformation[{size}];")?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "#define CHECKMON(STEP,VAL) if (failed!=VAL) {{ printf(\"Monitor result differs from expected result in step %d\\n\",STEP); return 1; }}"
    )?;
    writeln!(out)?;
    writeln!(out, "int main(void) {{")?;
    writeln!(out, "  int failed = 0;")?;
    for (step, (valuation, verdict)) in valuations.iter().zip(expected).enumerate() {
        let args = valuation.iter().map(|v| *v as u8).join(",");
        writeln!(out, "  failed = monitor({args});")?;
        writeln!(out, "  CHECKMON({},{})", step + 1, verdict.as_c_int())?;
    }
    if trace_buffer.is_some() && expected.last().is_some_and(|v| v.is_violation()) {
        writeln!(out, "  buildViolatingTraceInformation();")?;
        writeln!(out, "  printf(\"%s\",violatingTraceInformation);")?;
    }
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::Settings;
    use std::path::Path;

    use super::*;
    use crate::encoding::tracking::tests::chain;
    use crate::ir::tests::{build, np, p, props};

    fn snap(name: &str, content: String) {
        let mut settings = Settings::clone_current();
        settings.set_snapshot_path(Path::new("../../tests/snapshots"));
        settings.bind(|| {
            insta::assert_snapshot!(name, content);
        });
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut out = vec![];
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn two_state(table: &PropositionTable) -> Automaton {
        build(
            2,
            &[0],
            &[
                (0, np(0), 0),
                (0, p(0), 1),
                (1, Guard::Or(vec![Guard::And(vec![np(0), p(1)]), p(1)]), 0),
            ],
            table,
        )
    }

    #[test]
    fn guard_expressions() {
        let table = props(&["r1", "g1"]);
        assert_eq!(guard_to_c(&Guard::True, &table), "1");
        assert_eq!(guard_to_c(&np(1), &table), "!g1");
        assert_eq!(
            guard_to_c(&Guard::And(vec![p(0), np(1)]), &table),
            "r1&&!g1"
        );
        assert_eq!(
            guard_to_c(
                &Guard::Or(vec![Guard::And(vec![p(0), np(1)]), p(1), Guard::True]),
                &table
            ),
            "(r1&&!g1)||(g1)||(1)"
        );
    }

    #[test]
    fn nondeterministic_monitor() {
        let table = props(&["a", "b"]);
        let aut = two_state(&table);
        let code = render(|out| nondeterministic_to_c(&aut, &table, out));
        snap("nondeterministic_two_state", code);
    }

    #[test]
    fn deterministic_monitor() {
        let table = props(&["a", "b"]);
        let aut = two_state(&table);
        let code = render(|out| deterministic_to_c(&aut, StateId::from_u32(0), &table, out));
        snap("deterministic_two_state", code);
    }

    #[test]
    fn universal_monitor_returns_rejecting_flag() {
        let table = props(&["a", "b"]);
        let aut = chain(&table);
        let code = render(|out| universal_to_c(&aut, StateId::from_u32(2), &table, out));
        assert!(code.contains("/* universal encoding of test */"));
        assert!(code.contains("  if (inState1) {\n    if (b) nextState2 = 1;\n  }\n"));
        assert!(code.ends_with("  return inState2;\n}\n"));
        snap("universal_chain", code);
    }

    #[test]
    fn fragmented_monitor_checks_each_fragment() {
        let table = props(&["a", "b"]);
        let automata = vec![two_state(&table), chain(&table)];
        let code = render(|out| fragmented_to_c(&automata, &table, out));
        assert!(code.contains("uint8_t inState0_0 = 1;\nuint8_t inState0_1 = 0;\nuint8_t inState1_0 = 1;"));
        assert!(code.contains("    if (a) nextState1_1 = 1;\n"));
        assert!(code.contains("  if (!inState0_0 && !inState0_1) return 1;\n"));
        assert!(code.contains(
            "  if (!inState1_0 && !inState1_1 && !inState1_2 && !inState1_3) return 1;\n  return 0;\n}\n"
        ));
        // fragment 0 is updated and checked before fragment 1
        let first = code.find("inState0_0 = nextState0_0;").unwrap();
        let second = code.find("inState1_0 = nextState1_0;").unwrap();
        assert!(first < second);
        snap("fragmented_two_fragments", code);
    }

    #[test]
    fn reason_tracking_single_pass() {
        let table = props(&["a", "b"]);
        let aut = chain(&table);
        let layout = TraceLayout::new(&aut, &table).unwrap();
        let code = render(|out| reason_tracking_to_c(&layout, &table, Buffering::SinglePass, out));

        assert!(code.contains("#include <stdio.h>\n"));
        assert!(code.contains("volatile uint32_t state0History = 0;\nuint8_t inState1 = 0;"));
        assert!(code.contains("volatile uint8_t state2Snapshots[2];"));
        assert!(!code.contains("state0Snapshots"));
        assert!(!code.contains("state3Snapshots"));
        assert!(code.contains("  uint8_t snapshot = (uint8_t)((a ? 1u : 0u) | (b ? 2u : 0u));\n"));

        let step = "  inState2 = inState2 && (1);\n\
                    \x20 if (!inState2 && inState1 && (b)) {\n\
                    \x20   inState2 = 1;\n\
                    \x20   state2Snapshots[0] = state1Snapshots[0];\n\
                    \x20   state2Snapshots[1] = snapshot;\n\
                    \x20   state2History = state1History * 2 + 0;\n\
                    \x20 }\n\
                    \x20 inState1 = 0;\n\
                    \x20 if (!inState1 && inState0 && (a)) {\n\
                    \x20   inState1 = 1;\n\
                    \x20   state1Snapshots[0] = snapshot;\n\
                    \x20   state1History = state0History * 1 + 0;\n\
                    \x20 }\n\
                    \x20 inState0 = inState0 && (1);\n\
                    \x20 return inState2;\n";
        assert!(code.contains(step), "{code}");
        // the unreachable state 3 takes no part in the update
        assert!(!code.contains("inState3 &&"));

        assert!(code.contains(&format!("char violatingTraceInformation[{}];", layout.buffer_size())));
        assert!(code.contains("  if (!inState2) return;\n"));
        assert!(code.contains(
            "  ptr = snprintf(violatingTraceInformation, sizeof(violatingTraceInformation), \"Violating trace (before entering the rejecting state):\\n\");\n"
        ));
        assert!(code.contains("  while (state != 0) {\n"));
        assert!(code.contains("        selector = (int[]){1,3}[history % 2];\n"));
        assert!(code.contains(
            "\"- Transition from state %d to state 2 (rejecting) with prop. values: a=%d, b=%d\\n\", selector, (state2Snapshots[1] & 1u) ? 1 : 0, (state2Snapshots[1] & 2u) ? 1 : 0);"
        ));
        assert!(code.contains(
            "\"- Transition from state %d to state 1 with prop. values: a=%d, b=%d\\n\", selector, (state2Snapshots[0] & 1u) ? 1 : 0, (state2Snapshots[0] & 2u) ? 1 : 0);"
        ));
        assert!(!code.contains("case 3:"));
        assert!(!code.contains("case 0:"));
        snap("reason_tracking_single_pass_chain", code);
    }

    #[test]
    fn reason_tracking_double_buffered() {
        let table = props(&["a", "b"]);
        let aut = chain(&table);
        let layout = TraceLayout::new(&aut, &table).unwrap();
        let code = render(|out| reason_tracking_to_c(&layout, &table, Buffering::DoubleBuffered, out));
        assert!(code.contains("/* reason-tracking encoding (double buffered) of test */"));
        assert!(code.contains("  uint8_t nextState2 = 0;\n  uint8_t nextState1 = 0;\n  uint8_t nextState0 = 0;\n"));
        assert!(code.contains("  nextState2 = inState2 && (1);\n  if (!nextState2 && inState1 && (b)) {\n    nextState2 = 1;\n"));
        assert!(!code.contains("inState1 = 0;"));
        assert!(code.contains("  inState2 = nextState2;\n  inState1 = nextState1;\n  inState0 = nextState0;\n  return inState2;\n"));
        snap("reason_tracking_double_buffered_chain", code);
    }

    #[test]
    fn wide_snapshots() {
        let names: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
        let table = PropositionTable::new(names.as_slice()).unwrap();
        let aut = chain(&table);
        let layout = TraceLayout::new(&aut, &table).unwrap();
        let code = render(|out| reason_tracking_to_c(&layout, &table, Buffering::SinglePass, out));
        assert!(code.contains("volatile uint16_t state2Snapshots[2];"));
        assert!(code.contains("(p9 ? 512u : 0u)"));
        assert!(code.contains("(state2Snapshots[1] & 512u) ? 1 : 0"));
    }

    #[test]
    fn generation_is_deterministic() {
        let table = props(&["a", "b"]);
        let aut = chain(&table);
        let layout = TraceLayout::new(&aut, &table).unwrap();
        let first = render(|out| reason_tracking_to_c(&layout, &table, Buffering::SinglePass, out));
        let second = render(|out| reason_tracking_to_c(&layout, &table, Buffering::SinglePass, out));
        assert_eq!(first, second);
    }

    #[test]
    fn harness_replays_stimulus() {
        let table = props(&["a", "b"]);
        let valuations = vec![vec![true, false], vec![false, true]];
        let expected = vec![Verdict::Ok, Verdict::Violation];
        let code = render(|out| harness_to_c(&table, &valuations, &expected, Some(123), out));
        assert!(code.contains("int monitor(uint8_t a,uint8_t b);\n"));
        assert!(code.contains("extern char violatingTraceInformation[123];\n"));
        assert!(code.contains("  failed = monitor(1,0);\n  CHECKMON(1,0)\n  failed = monitor(0,1);\n  CHECKMON(2,1)\n"));
        assert!(code.contains("  buildViolatingTraceInformation();\n"));

        let code = render(|out| harness_to_c(&table, &valuations, &expected, None, out));
        assert!(!code.contains("buildViolatingTraceInformation"));
    }
}
