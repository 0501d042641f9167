// Copyright 2025 Cornell University
// released under MIT License

//! Universal monitors that remember, in statically sized storage, which
//! inputs led into every active state. After a violation the path into the
//! rejecting state can be replayed from that storage.

use std::fmt;

use cranelift_entity::{EntityRef, SecondaryMap};
use itertools::Itertools;
use log::{debug, info};

use crate::encoding::flags::initial_flags;
use crate::encoding::{Buffering, Monitor, Verdict};
use crate::errors::{CompileError, CompileResult};
use crate::ir::{Automaton, Guard, PropositionTable, StateId};
use crate::weakness::{analyze, WeaknessProfile};

/// First line of every reconstructed trace
pub const TRACE_HEADER: &str = "Violating trace (before entering the rejecting state):\n";

/// Pieces of one trace line:
/// `- Transition from state S to state T[ (rejecting)] with prop. values: p=v, ...\n`
pub const TRACE_LINE_SOURCE: &str = "- Transition from state ";
pub const TRACE_LINE_TARGET: &str = " to state ";
pub const TRACE_LINE_REJECTING: &str = " (rejecting)";
pub const TRACE_LINE_VALUES: &str = " with prop. values: ";

/// Integer type holding one compressed input valuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotWidth {
    U8,
    U16,
    U32,
}

impl SnapshotWidth {
    pub fn for_props(count: usize) -> CompileResult<Self> {
        match count {
            0..=8 => Ok(SnapshotWidth::U8),
            9..=16 => Ok(SnapshotWidth::U16),
            17..=32 => Ok(SnapshotWidth::U32),
            _ => Err(CompileError::resource(format!(
                "{count} propositions do not fit into a 32 bit snapshot"
            ))),
        }
    }

    pub fn c_type(self) -> &'static str {
        match self {
            SnapshotWidth::U8 => "uint8_t",
            SnapshotWidth::U16 => "uint16_t",
            SnapshotWidth::U32 => "uint32_t",
        }
    }
}

/// A non-self-loop transition, seen from its destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEdge {
    pub source: StateId,
    pub guard: Guard,
    /// position among the destination's incoming edges, the history digit
    pub index: u32,
}

/// Everything the reason-tracking encoding fixes at generation time
#[derive(Debug, Clone)]
pub struct TraceLayout<'a> {
    automaton: &'a Automaton,
    names: Vec<String>,
    profile: WeaknessProfile,
    rejecting: StateId,
    /// ordered by source id, then by the source's transition order
    incoming: SecondaryMap<StateId, Vec<IncomingEdge>>,
    self_loops: SecondaryMap<StateId, Option<Guard>>,
    width: SnapshotWidth,
    max_history: u32,
    buffer_size: usize,
}

impl<'a> TraceLayout<'a> {
    pub fn new(automaton: &'a Automaton, props: &PropositionTable) -> CompileResult<Self> {
        let rejecting = automaton.rejecting_state()?;
        let profile = analyze(automaton)?;
        let width = SnapshotWidth::for_props(props.len())?;

        let mut incoming: SecondaryMap<StateId, Vec<IncomingEdge>> = SecondaryMap::new();
        let mut self_loops: SecondaryMap<StateId, Option<Guard>> = SecondaryMap::new();
        for source in automaton.state_ids() {
            for tran in automaton.transitions(source) {
                if tran.target == source {
                    if self_loops[source].is_some() && profile.is_reachable(source) {
                        return Err(CompileError::structural(format!(
                            "state {} of automaton {} has more than one self-loop",
                            source.index(),
                            automaton.name
                        )));
                    }
                    if self_loops[source].is_none() {
                        self_loops[source] = Some(tran.guard.clone());
                    }
                } else {
                    let index = incoming[tran.target].len() as u32;
                    incoming[tran.target].push(IncomingEdge {
                        source,
                        guard: tran.guard.clone(),
                        index,
                    });
                }
            }
        }

        let mut layout = Self {
            automaton,
            names: props.names().map(|n| n.to_string()).collect(),
            profile,
            rejecting,
            incoming,
            self_loops,
            width,
            max_history: 0,
            buffer_size: 0,
        };
        layout.max_history = layout.history_bound()?;
        layout.buffer_size = layout.trace_buffer_size();
        info!(
            "reason tracking for {}: rejecting state {}, {} snapshots, history below {}",
            automaton.name,
            rejecting.index(),
            width.c_type(),
            layout.max_history as u64 + 1
        );
        Ok(layout)
    }

    /// Largest history value any reachable state can hold
    fn history_bound(&self) -> CompileResult<u32> {
        let mut bound: SecondaryMap<StateId, u64> = SecondaryMap::new();
        let mut max = 0;
        // ascending depth, so every source is final before its destinations
        for &state in self.profile.order().iter().rev() {
            let fan = self.fan_in(state) as u64;
            let mut value = 0u64;
            for edge in self.reachable_incoming(state) {
                let candidate = bound[edge.source]
                    .checked_mul(fan)
                    .and_then(|v| v.checked_add(edge.index as u64));
                value = value.max(candidate.unwrap_or(u64::MAX));
            }
            if value > u32::MAX as u64 {
                return Err(CompileError::resource(format!(
                    "the history of state {} of automaton {} does not fit into 32 bits",
                    state.index(),
                    self.automaton.name
                )));
            }
            debug!("history of state {} stays below {}", state.index(), value + 1);
            bound[state] = value;
            max = max.max(value);
        }
        Ok(max as u32)
    }

    /// Room for the header, one line per step of the longest path and the
    /// terminating zero
    fn trace_buffer_size(&self) -> usize {
        let fixed = TRACE_LINE_SOURCE.len()
            + TRACE_LINE_TARGET.len()
            + TRACE_LINE_REJECTING.len()
            + TRACE_LINE_VALUES.len()
            + 1;
        let digits = self.automaton.num_states().to_string().len();
        // `name=v, ` per proposition
        let values: usize = self.names.iter().map(|n| n.len() + 4).sum();
        let line = fixed + 2 * digits + values;
        TRACE_HEADER.len() + self.max_depth() as usize * line + 1
    }

    pub fn automaton(&self) -> &'a Automaton {
        self.automaton
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn profile(&self) -> &WeaknessProfile {
        &self.profile
    }

    pub fn rejecting(&self) -> StateId {
        self.rejecting
    }

    pub fn width(&self) -> SnapshotWidth {
        self.width
    }

    pub fn max_history(&self) -> u32 {
        self.max_history
    }

    pub fn max_depth(&self) -> u32 {
        self.profile.max_depth()
    }

    /// Size of the `violatingTraceInformation` buffer
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Length of the snapshot array of `state` (0 for unreachable states)
    pub fn depth(&self, state: StateId) -> usize {
        self.profile.depth(state).unwrap_or(0) as usize
    }

    pub fn is_reachable(&self, state: StateId) -> bool {
        self.profile.is_reachable(state)
    }

    pub fn incoming(&self, state: StateId) -> &[IncomingEdge] {
        &self.incoming[state]
    }

    /// Incoming edges whose source can actually be active
    pub fn reachable_incoming(&self, state: StateId) -> impl Iterator<Item = &IncomingEdge> + '_ {
        self.incoming[state]
            .iter()
            .filter(|e| self.profile.is_reachable(e.source))
    }

    pub fn fan_in(&self, state: StateId) -> u32 {
        self.incoming[state].len() as u32
    }

    pub fn self_loop(&self, state: StateId) -> Option<&Guard> {
        self.self_loops[state].as_ref()
    }

    /// Bit `i` of the result is the value of proposition `i`
    pub fn compress(&self, valuation: &[bool]) -> u32 {
        valuation
            .iter()
            .take(self.names.len())
            .enumerate()
            .fold(0, |acc, (i, v)| if *v { acc | (1 << i) } else { acc })
    }

    pub fn decompress(&self, snapshot: u32) -> Vec<bool> {
        (0..self.names.len())
            .map(|i| snapshot & (1 << i) != 0)
            .collect()
    }
}

/// One step of a reconstructed trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub source: StateId,
    pub target: StateId,
    pub valuation: Vec<bool>,
}

/// Path into the rejecting state, most recent step first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample {
    rejecting: StateId,
    names: Vec<String>,
    steps: Vec<TraceStep>,
}

impl Counterexample {
    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TRACE_HEADER}")?;
        for step in &self.steps {
            let rejecting = if step.target == self.rejecting {
                TRACE_LINE_REJECTING
            } else {
                ""
            };
            let values = self
                .names
                .iter()
                .zip(&step.valuation)
                .map(|(name, v)| format!("{}={}", name, *v as u8))
                .join(", ");
            writeln!(
                f,
                "{TRACE_LINE_SOURCE}{}{TRACE_LINE_TARGET}{}{rejecting}{TRACE_LINE_VALUES}{values}",
                step.source.index(),
                step.target.index(),
            )?;
        }
        Ok(())
    }
}

/// Per-state trace storage
#[derive(Debug, Clone)]
struct TraceRecords {
    history: SecondaryMap<StateId, u32>,
    snapshots: SecondaryMap<StateId, Vec<u32>>,
}

impl TraceRecords {
    fn new(layout: &TraceLayout) -> Self {
        let mut snapshots: SecondaryMap<StateId, Vec<u32>> = SecondaryMap::new();
        for state in layout.automaton.state_ids() {
            snapshots[state] = vec![0; layout.depth(state)];
        }
        Self {
            history: SecondaryMap::new(),
            snapshots,
        }
    }

    /// `target` is entered through `edge`
    fn enter(&mut self, layout: &TraceLayout, target: StateId, edge: &IncomingEdge, snapshot: u32) {
        let source_depth = layout.depth(edge.source);
        let copied: Vec<u32> = self.snapshots[edge.source][..source_depth].to_vec();
        let record = &mut self.snapshots[target];
        record[..source_depth].copy_from_slice(&copied);
        record[layout.depth(target) - 1] = snapshot;
        self.history[target] = self.history[edge.source] * layout.fan_in(target) + edge.index;
    }
}

/// Executable reason-tracking monitor
#[derive(Debug, Clone)]
pub struct ReasonTrackingMonitor<'a> {
    layout: &'a TraceLayout<'a>,
    buffering: Buffering,
    active: SecondaryMap<StateId, bool>,
    records: TraceRecords,
}

impl<'a> ReasonTrackingMonitor<'a> {
    pub fn new(layout: &'a TraceLayout<'a>, buffering: Buffering) -> Self {
        Self {
            layout,
            buffering,
            active: initial_flags(layout.automaton),
            records: TraceRecords::new(layout),
        }
    }

    pub fn is_active(&self, state: StateId) -> bool {
        self.active[state]
    }

    pub fn history(&self, state: StateId) -> u32 {
        self.records.history[state]
    }

    /// New flag of `target`: kept by its self-loop or entered through the
    /// first matching incoming edge. `was_active` holds the pre-step flags
    /// of all sources.
    fn update_state(
        layout: &TraceLayout,
        records: &mut TraceRecords,
        was_active: &SecondaryMap<StateId, bool>,
        target: StateId,
        valuation: &[bool],
        snapshot: u32,
    ) -> bool {
        let kept = was_active[target]
            && layout
                .self_loop(target)
                .is_some_and(|guard| guard.eval(valuation));
        if kept {
            return true;
        }
        for edge in layout.reachable_incoming(target) {
            if was_active[edge.source] && edge.guard.eval(valuation) {
                records.enter(layout, target, edge, snapshot);
                return true;
            }
        }
        false
    }

    /// Walks back from the rejecting state. `None` while no violation was
    /// detected.
    pub fn counterexample(&self) -> Option<Counterexample> {
        let layout = self.layout;
        let rejecting = layout.rejecting;
        if !self.active[rejecting] {
            return None;
        }
        let record = &self.records.snapshots[rejecting];
        let mut history = self.records.history[rejecting];
        let mut state = rejecting;
        let mut steps = vec![];
        while !layout.automaton.is_initial(state) {
            let fan = layout.fan_in(state);
            let depth = layout.depth(state);
            if fan == 0 || depth == 0 {
                break;
            }
            let edge = &layout.incoming[state][(history % fan) as usize];
            steps.push(TraceStep {
                source: edge.source,
                target: state,
                valuation: layout.decompress(record[depth - 1]),
            });
            history /= fan;
            state = edge.source;
        }
        Some(Counterexample {
            rejecting,
            names: layout.names.clone(),
            steps,
        })
    }
}

impl Monitor for ReasonTrackingMonitor<'_> {
    fn step(&mut self, valuation: &[bool]) -> Verdict {
        let layout = self.layout;
        let snapshot = layout.compress(valuation);
        match self.buffering {
            Buffering::SinglePass => {
                // destinations come before their sources, so every source
                // flag read here still holds its pre-step value
                for &state in layout.profile.order() {
                    let active = Self::update_state(
                        layout,
                        &mut self.records,
                        &self.active,
                        state,
                        valuation,
                        snapshot,
                    );
                    self.active[state] = active;
                }
            }
            Buffering::DoubleBuffered => {
                let mut next: SecondaryMap<StateId, bool> = SecondaryMap::new();
                for &state in layout.profile.order() {
                    next[state] = Self::update_state(
                        layout,
                        &mut self.records,
                        &self.active,
                        state,
                        valuation,
                        snapshot,
                    );
                }
                self.active = next;
            }
        }
        Verdict::from_violated(self.active[layout.rejecting])
    }

    fn reset(&mut self) {
        self.active = initial_flags(self.layout.automaton);
        self.records = TraceRecords::new(self.layout);
    }
}
