// Copyright 2025 Cornell University
// released under MIT License

//! Executable versions of the state encodings. Each monitor performs exactly
//! the update that the corresponding generated C routine performs, so they
//! double as a reference for the code generator.

pub mod deterministic;
pub mod flags;
pub mod fragmented;
pub mod tracking;

use crate::errors::CompileResult;
use crate::ir::{Automaton, StateId};

/// The state encoding strategy of a generated monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Mode {
    /// one activity flag per state, violation when no state is active
    Nondeterministic,
    /// one state register, violation when no guard matches
    Deterministic,
    /// one flag encoding per conjunct, violation when any of them dies
    Fragmented,
    /// co-Büchi automaton of the negated property, violation when the
    /// rejecting state becomes active
    Universal,
    /// universal encoding that also records why the rejecting state was reached
    ReasonTracking,
}

impl Mode {
    /// Only the fragmented encoding combines several automata
    pub fn accepts_multiple_inputs(self) -> bool {
        self == Mode::Fragmented
    }
}

/// When a step reports a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptancePolicy {
    /// no state is active after the step
    EmptySet,
    /// the given rejecting state is active after the step
    RejectingActive(StateId),
    /// no outgoing transition of the current state matched
    FirstUnmatchedGuard,
}

impl AcceptancePolicy {
    /// The policy `mode` applies to a single automaton. Fragments of the
    /// fragmented encoding each use `EmptySet`.
    pub fn for_mode(mode: Mode, automaton: &Automaton) -> CompileResult<Self> {
        match mode {
            Mode::Nondeterministic | Mode::Fragmented => Ok(AcceptancePolicy::EmptySet),
            Mode::Deterministic => Ok(AcceptancePolicy::FirstUnmatchedGuard),
            Mode::Universal | Mode::ReasonTracking => {
                Ok(AcceptancePolicy::RejectingActive(automaton.rejecting_state()?))
            }
        }
    }
}

/// How the flags of the successor states are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Buffering {
    /// all guards read the previous flags, results go to `nextState` copies
    #[default]
    DoubleBuffered,
    /// flags are updated in place in an order where sources are read before
    /// they are written (requires a very weak automaton)
    SinglePass,
}

/// Result of one monitor step. Mirrors the `int` returned by the C routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Violation,
}

impl Verdict {
    pub fn from_violated(violated: bool) -> Self {
        if violated {
            Verdict::Violation
        } else {
            Verdict::Ok
        }
    }

    pub fn is_violation(self) -> bool {
        self == Verdict::Violation
    }

    /// Value returned by the generated `monitor` function
    pub fn as_c_int(self) -> u8 {
        match self {
            Verdict::Ok => 0,
            Verdict::Violation => 1,
        }
    }
}

/// A runtime monitor that consumes one input valuation per step.
/// `valuation[i]` is the value of canonical proposition `i`.
pub trait Monitor {
    fn step(&mut self, valuation: &[bool]) -> Verdict;

    /// Back to the initial configuration
    fn reset(&mut self);

    /// Runs a whole sequence from the current configuration
    fn run(&mut self, valuations: &[Vec<bool>]) -> Vec<Verdict> {
        valuations.iter().map(|v| self.step(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompileError;
    use crate::ir::tests::{build, np, p, props};
    use crate::ir::Guard;

    #[test]
    fn policy_of_each_mode() {
        let table = props(&["a"]);
        let universal = build(
            2,
            &[0],
            &[(0, np(0), 0), (0, p(0), 1), (1, Guard::True, 1)],
            &table,
        );
        let rejecting = StateId::from_u32(1);
        let expected = [
            (Mode::Nondeterministic, AcceptancePolicy::EmptySet),
            (Mode::Deterministic, AcceptancePolicy::FirstUnmatchedGuard),
            (Mode::Fragmented, AcceptancePolicy::EmptySet),
            (Mode::Universal, AcceptancePolicy::RejectingActive(rejecting)),
            (Mode::ReasonTracking, AcceptancePolicy::RejectingActive(rejecting)),
        ];
        for (mode, policy) in expected {
            assert_eq!(AcceptancePolicy::for_mode(mode, &universal).unwrap(), policy);
        }

        let safety = build(1, &[0], &[(0, np(0), 0)], &table);
        assert!(matches!(
            AcceptancePolicy::for_mode(Mode::Universal, &safety),
            Err(CompileError::Structural { .. })
        ));
        assert_eq!(
            AcceptancePolicy::for_mode(Mode::Deterministic, &safety).unwrap(),
            AcceptancePolicy::FirstUnmatchedGuard
        );
    }
}
