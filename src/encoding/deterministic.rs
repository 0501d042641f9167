// Copyright 2025 Cornell University
// released under MIT License

use crate::encoding::{Monitor, Verdict};
use crate::errors::{CompileError, CompileResult};
use crate::ir::{Automaton, StateId};

/// Single state register. The transitions of the current state are tried in
/// the order of the description and the first matching guard wins.
#[derive(Debug, Clone)]
pub struct DeterministicMonitor<'a> {
    automaton: &'a Automaton,
    initial: StateId,
    current: StateId,
}

impl<'a> DeterministicMonitor<'a> {
    pub fn new(automaton: &'a Automaton) -> CompileResult<Self> {
        let initial = single_initial_state(automaton)?;
        Ok(Self {
            automaton,
            initial,
            current: initial,
        })
    }

    pub fn current(&self) -> StateId {
        self.current
    }
}

/// The register encoding can only start in one state
pub fn single_initial_state(automaton: &Automaton) -> CompileResult<StateId> {
    match automaton.initial_states() {
        [single] => Ok(*single),
        many => Err(CompileError::structural(format!(
            "the deterministic encoding needs exactly one initial state, automaton {} has {}",
            automaton.name,
            many.len()
        ))),
    }
}

impl Monitor for DeterministicMonitor<'_> {
    fn step(&mut self, valuation: &[bool]) -> Verdict {
        let next = self
            .automaton
            .transitions(self.current)
            .iter()
            .find(|t| t.guard.eval(valuation));
        match next {
            Some(tran) => {
                self.current = tran.target;
                Verdict::Ok
            }
            // the register keeps its value
            None => Verdict::Violation,
        }
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}
