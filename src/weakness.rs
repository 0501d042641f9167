// Copyright 2025 Cornell University
// released under MIT License

use std::collections::VecDeque;

use cranelift_entity::{EntityRef, SecondaryMap};
use itertools::Itertools;
use log::{debug, info};

use crate::errors::{CompileError, CompileResult};
use crate::ir::{Automaton, StateId};

/// Result of the very-weakness analysis of an automaton
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaknessProfile {
    /// Longest number of non-self-loop edges on any path from an initial
    /// state; `None` for unreachable states.
    depth: SecondaryMap<StateId, Option<u32>>,
    /// Reachable states by descending depth, ties by ascending id
    order: Vec<StateId>,
}

impl WeaknessProfile {
    pub fn depth(&self, state: StateId) -> Option<u32> {
        self.depth[state]
    }

    pub fn is_reachable(&self, state: StateId) -> bool {
        self.depth[state].is_some()
    }

    /// Processing order of the single-pass update
    pub fn order(&self) -> &[StateId] {
        &self.order
    }

    pub fn max_depth(&self) -> u32 {
        self.order
            .iter()
            .filter_map(|s| self.depth[*s])
            .max()
            .unwrap_or(0)
    }
}

/// Tarjan's strongly connected components, restricted to `reachable` states.
/// Returns the components in the order in which they are completed, which is
/// a reverse topological order.
struct Tarjan<'a> {
    automaton: &'a Automaton,
    reachable: &'a SecondaryMap<StateId, bool>,
    index: SecondaryMap<StateId, Option<u32>>,
    lowlink: SecondaryMap<StateId, u32>,
    on_stack: SecondaryMap<StateId, bool>,
    stack: Vec<StateId>,
    next_index: u32,
    components: Vec<Vec<StateId>>,
}

impl<'a> Tarjan<'a> {
    fn new(automaton: &'a Automaton, reachable: &'a SecondaryMap<StateId, bool>) -> Self {
        Self {
            automaton,
            reachable,
            index: SecondaryMap::new(),
            lowlink: SecondaryMap::new(),
            on_stack: SecondaryMap::new(),
            stack: vec![],
            next_index: 0,
            components: vec![],
        }
    }

    fn run(mut self) -> Vec<Vec<StateId>> {
        for state in self.automaton.state_ids() {
            if self.reachable[state] && self.index[state].is_none() {
                self.connect(state);
            }
        }
        self.components
    }

    fn visit(&mut self, state: StateId) {
        self.index[state] = Some(self.next_index);
        self.lowlink[state] = self.next_index;
        self.next_index += 1;
        self.stack.push(state);
        self.on_stack[state] = true;
    }

    /// Depth-first search from `root` with an explicit frame stack, so long
    /// chains of states do not grow the call stack
    fn connect(&mut self, root: StateId) {
        let automaton = self.automaton;
        self.visit(root);
        // (state, position of the next transition to follow)
        let mut frames: Vec<(StateId, usize)> = vec![(root, 0)];
        while let Some((state, next)) = frames.pop() {
            if let Some(tran) = automaton.transitions(state).get(next) {
                frames.push((state, next + 1));
                let target = tran.target;
                match self.index[target] {
                    None => {
                        self.visit(target);
                        frames.push((target, 0));
                    }
                    Some(index) if self.on_stack[target] => {
                        self.lowlink[state] = self.lowlink[state].min(index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            if let Some(&(parent, _)) = frames.last() {
                self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[state]);
            }
            if Some(self.lowlink[state]) == self.index[state] {
                let mut component = vec![];
                while let Some(member) = self.stack.pop() {
                    self.on_stack[member] = false;
                    component.push(member);
                    if member == state {
                        break;
                    }
                }
                component.sort();
                self.components.push(component);
            }
        }
    }
}

fn reachable_states(automaton: &Automaton) -> SecondaryMap<StateId, bool> {
    let mut reachable: SecondaryMap<StateId, bool> = SecondaryMap::with_capacity(automaton.num_states());
    let mut todo: VecDeque<StateId> = automaton.initial_states().iter().copied().collect();
    for s in &todo {
        reachable[*s] = true;
    }
    while let Some(state) = todo.pop_front() {
        for tran in automaton.transitions(state) {
            if !reachable[tran.target] {
                reachable[tran.target] = true;
                todo.push_back(tran.target);
            }
        }
    }
    reachable
}

/// Checks that the automaton is very weak and computes the history depth of
/// every reachable state together with the single-pass processing order.
pub fn analyze(automaton: &Automaton) -> CompileResult<WeaknessProfile> {
    let reachable = reachable_states(automaton);

    // (1) every reachable cycle has to be a self-loop
    let components = Tarjan::new(automaton, &reachable).run();
    for component in &components {
        if component.len() > 1 {
            return Err(CompileError::structural(format!(
                "automaton {} is not very weak: states {} form a cycle",
                automaton.name,
                component.iter().map(|s| s.index()).join(", ")
            )));
        }
    }

    // (2) longest paths, ignoring self-loops. Components are completed in
    // reverse topological order and are single states by now.
    let mut depth: SecondaryMap<StateId, Option<u32>> = SecondaryMap::with_capacity(automaton.num_states());
    for &init in automaton.initial_states() {
        depth[init] = Some(0);
    }
    for &state in components.iter().rev().flatten() {
        let Some(current) = depth[state] else {
            continue;
        };
        for tran in automaton.transitions(state) {
            if tran.target == state {
                continue;
            }
            let candidate = current + 1;
            if depth[tran.target].map_or(true, |d| candidate > d) {
                depth[tran.target] = Some(candidate);
            }
        }
    }

    // (3) initial states may only be re-entered through their self-loops
    for source in automaton.state_ids() {
        for tran in automaton.transitions(source) {
            if tran.target != source && automaton.is_initial(tran.target) {
                return Err(CompileError::structural(format!(
                    "initial state {} of automaton {} has an incoming transition from state {}",
                    tran.target.index(),
                    automaton.name,
                    source.index()
                )));
            }
        }
    }

    let order: Vec<StateId> = automaton
        .state_ids()
        .filter_map(|s| depth[s].map(|d| (s, d)))
        .sorted_by(|(s1, d1), (s2, d2)| d2.cmp(d1).then(s1.cmp(s2)))
        .map(|(s, _)| s)
        .collect();

    for s in &order {
        debug!("state {} has depth {:?}", s.index(), depth[*s]);
    }
    let profile = WeaknessProfile { depth, order };
    info!(
        "automaton {} is very weak, {} reachable states, maximal depth {}",
        automaton.name,
        profile.order.len(),
        profile.max_depth()
    );
    Ok(profile)
}
