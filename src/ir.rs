// Copyright 2025 Cornell University
// released under MIT License

use cranelift_entity::{entity_impl, EntityRef, PrimaryMap};
use rustc_hash::FxHashMap;
use std::ops::Index;

use crate::errors::{CompileError, CompileResult};

#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct StateId(u32);
entity_impl!(StateId, "state");

/// Index of a proposition in the caller's canonical order
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct PropId(u32);
entity_impl!(PropId, "prop");

/// The monitored input signals, in the order in which every generated
/// `monitor` routine receives them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropositionTable {
    names: PrimaryMap<PropId, String>,
    by_name: FxHashMap<String, PropId>,
}

impl PropositionTable {
    /// Builds the table from the caller's ordered list of signal names.
    /// Names end up as C parameter names, so they must be identifiers.
    pub fn new<S: AsRef<str>>(names: &[S]) -> CompileResult<Self> {
        let mut table = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            if !is_c_identifier(name) {
                return Err(CompileError::configuration(format!(
                    "proposition `{name}` is not a valid C identifier"
                )));
            }
            if table.by_name.contains_key(name) {
                return Err(CompileError::configuration(format!(
                    "proposition `{name}` is listed more than once"
                )));
            }
            let id = table.names.push(name.to_string());
            table.by_name.insert(name.to_string(), id);
        }
        if table.is_empty() {
            return Err(CompileError::configuration(
                "the canonical proposition list is empty",
            ));
        }
        Ok(table)
    }

    /// Parses a comma separated list such as `r1,y1,g1`
    pub fn from_list(list: &str) -> CompileResult<Self> {
        let names: Vec<&str> = list.split(',').filter(|n| !n.trim().is_empty()).collect();
        Self::new(names.as_slice())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn id_from_name(&self, name: &str) -> Option<PropId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropId, &str)> {
        self.names.iter().map(|(id, name)| (id, name.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(|n| n.as_str())
    }
}

impl Index<PropId> for PropositionTable {
    type Output = str;

    fn index(&self, index: PropId) -> &Self::Output {
        &self.names[index]
    }
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Maps the translator-local proposition indices of one automaton
/// description to canonical `PropId`s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropositionMap {
    /// `local[i]` is the canonical proposition for translator index `i`
    local: Vec<PropId>,
}

impl PropositionMap {
    /// Resolves the names of an `AP:` header against the canonical table
    pub fn resolve<S: AsRef<str>>(declared: &[S], props: &PropositionTable) -> CompileResult<Self> {
        let mut local = Vec::with_capacity(declared.len());
        for name in declared {
            let name = name.as_ref();
            let id = props.id_from_name(name).ok_or_else(|| {
                CompileError::configuration(format!(
                    "proposition `{name}` of the automaton is not one of the monitored signals ({})",
                    props.names().collect::<Vec<_>>().join(", ")
                ))
            })?;
            local.push(id);
        }
        Ok(Self { local })
    }

    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    pub fn canonical(&self, local_index: usize) -> Option<PropId> {
        self.local.get(local_index).copied()
    }

    /// Translator-local index of a canonical proposition (used when
    /// re-serializing a description)
    pub fn local_index(&self, prop: PropId) -> Option<usize> {
        self.local.iter().position(|p| *p == prop)
    }

    pub fn iter(&self) -> impl Iterator<Item = PropId> + '_ {
        self.local.iter().copied()
    }
}

/// Transition label in OR-of-AND form over canonical propositions.
/// `Or` children are `And`, `Lit` or `True`; `And` children are `Lit` or `True`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Guard {
    True,
    Lit { prop: PropId, negated: bool },
    And(Vec<Guard>),
    Or(Vec<Guard>),
}

impl Guard {
    pub fn lit(prop: PropId, negated: bool) -> Self {
        Guard::Lit { prop, negated }
    }

    /// Evaluates the guard under one input valuation (indexed by `PropId`)
    pub fn eval(&self, valuation: &[bool]) -> bool {
        match self {
            Guard::True => true,
            Guard::Lit { prop, negated } => valuation[prop.index()] != *negated,
            Guard::And(terms) => terms.iter().all(|t| t.eval(valuation)),
            Guard::Or(terms) => terms.iter().any(|t| t.eval(valuation)),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Guard::True)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub guard: Guard,
    pub target: StateId,
}

impl Transition {
    pub fn new(guard: Guard, target: StateId) -> Self {
        Self { guard, target }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    /// outgoing transitions, in the order of the description
    pub transitions: Vec<Transition>,
}

/// An automaton description after parsing and guard compilation. Immutable
/// once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    /// Name used in log messages and generated comments (usually the file name)
    pub name: String,
    states: PrimaryMap<StateId, State>,
    /// sorted and free of duplicates
    initial: Vec<StateId>,
    props: PropositionMap,
}

impl Automaton {
    /// Checks the structural invariants every description has to satisfy:
    /// at least one initial state and all state references in range.
    pub fn new(
        name: impl ToString,
        states: PrimaryMap<StateId, State>,
        initial: impl IntoIterator<Item = StateId>,
        props: PropositionMap,
    ) -> CompileResult<Self> {
        let name = name.to_string();
        let mut initial: Vec<StateId> = initial.into_iter().collect();
        initial.sort();
        initial.dedup();
        if initial.is_empty() {
            return Err(CompileError::parse(format!(
                "automaton {name} has no initial state"
            )));
        }
        for &s in &initial {
            if !states.is_valid(s) {
                return Err(CompileError::parse(format!(
                    "initial state {} of automaton {name} does not exist ({} states declared)",
                    s.as_u32(),
                    states.len()
                )));
            }
        }
        for (source, state) in states.iter() {
            for tran in &state.transitions {
                if !states.is_valid(tran.target) {
                    return Err(CompileError::parse(format!(
                        "transition from state {} of automaton {name} targets undeclared state {}",
                        source.as_u32(),
                        tran.target.as_u32()
                    )));
                }
            }
        }
        Ok(Self {
            name,
            states,
            initial,
            props,
        })
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys()
    }

    pub fn transitions(&self, state: StateId) -> &[Transition] {
        &self.states[state].transitions
    }

    pub fn initial_states(&self) -> &[StateId] {
        &self.initial
    }

    pub fn is_initial(&self, state: StateId) -> bool {
        self.initial.binary_search(&state).is_ok()
    }

    pub fn proposition_map(&self) -> &PropositionMap {
        &self.props
    }

    /// A state whose only outgoing transition is a `[t]` self-loop
    fn is_rejecting_sink(&self, state: StateId) -> bool {
        match self.transitions(state) {
            [only] => only.target == state && only.guard.is_true(),
            _ => false,
        }
    }

    /// Finds the unique rejecting sink of a universal (co-Büchi) automaton
    pub fn rejecting_state(&self) -> CompileResult<StateId> {
        let sinks: Vec<StateId> = self
            .state_ids()
            .filter(|s| self.is_rejecting_sink(*s))
            .collect();
        match sinks.as_slice() {
            [single] => Ok(*single),
            [] => Err(CompileError::structural(format!(
                "automaton {} has no rejecting state (a state whose only transition is a `[t]` self-loop)",
                self.name
            ))),
            many => Err(CompileError::structural(format!(
                "automaton {} has {} candidate rejecting states ({}), expected exactly one",
                self.name,
                many.len(),
                many.iter().map(|s| s.as_u32().to_string()).collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}
