// Copyright 2025 Cornell University
// released under MIT License

use cranelift_entity::SecondaryMap;

use crate::encoding::{AcceptancePolicy, Monitor, Verdict};
use crate::errors::{CompileError, CompileResult};
use crate::ir::{Automaton, StateId};

/// One boolean activity flag per automaton state. Used for the
/// nondeterministic (subset) encoding, as the building block of the
/// fragmented encoding and for universal automata.
#[derive(Debug, Clone)]
pub struct FlagMonitor<'a> {
    automaton: &'a Automaton,
    /// `None` reports a violation once no state is active
    rejecting: Option<StateId>,
    active: SecondaryMap<StateId, bool>,
}

impl<'a> FlagMonitor<'a> {
    pub fn new(automaton: &'a Automaton, policy: AcceptancePolicy) -> CompileResult<Self> {
        let rejecting = match policy {
            AcceptancePolicy::EmptySet => None,
            AcceptancePolicy::RejectingActive(rejecting) => Some(rejecting),
            AcceptancePolicy::FirstUnmatchedGuard => {
                return Err(CompileError::structural(
                    "the flag encoding cannot report unmatched guards",
                ))
            }
        };
        let mut monitor = Self {
            automaton,
            rejecting,
            active: SecondaryMap::with_capacity(automaton.num_states()),
        };
        monitor.reset();
        Ok(monitor)
    }

    /// Subset construction: violation once no state is active
    pub fn subset(automaton: &'a Automaton) -> Self {
        Self {
            automaton,
            rejecting: None,
            active: initial_flags(automaton),
        }
    }

    /// Co-Büchi reading: violation once the rejecting state is active
    pub fn universal(automaton: &'a Automaton) -> CompileResult<Self> {
        let rejecting = automaton.rejecting_state()?;
        Self::new(automaton, AcceptancePolicy::RejectingActive(rejecting))
    }

    pub fn is_active(&self, state: StateId) -> bool {
        self.active[state]
    }

    pub fn active_states(&self) -> Vec<StateId> {
        self.automaton
            .state_ids()
            .filter(|s| self.active[*s])
            .collect()
    }

    /// Advances the flags without evaluating the acceptance policy
    pub fn update(&mut self, valuation: &[bool]) {
        let mut next: SecondaryMap<StateId, bool> =
            SecondaryMap::with_capacity(self.automaton.num_states());
        for source in self.automaton.state_ids() {
            if !self.active[source] {
                continue;
            }
            for tran in self.automaton.transitions(source) {
                if tran.guard.eval(valuation) {
                    next[tran.target] = true;
                }
            }
        }
        self.active = next;
    }

    pub fn is_violated(&self) -> bool {
        match self.rejecting {
            Some(rejecting) => self.active[rejecting],
            None => !self.automaton.state_ids().any(|s| self.active[s]),
        }
    }
}

pub(crate) fn initial_flags(automaton: &Automaton) -> SecondaryMap<StateId, bool> {
    let mut flags = SecondaryMap::with_capacity(automaton.num_states());
    for &s in automaton.initial_states() {
        flags[s] = true;
    }
    flags
}

impl Monitor for FlagMonitor<'_> {
    fn step(&mut self, valuation: &[bool]) -> Verdict {
        self.update(valuation);
        Verdict::from_violated(self.is_violated())
    }

    fn reset(&mut self) {
        self.active = initial_flags(self.automaton);
    }
}
