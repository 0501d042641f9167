// Copyright 2025 Cornell University
// released under MIT License

use std::io::Write;
use std::path::Path;

use log::{info, warn};
use tempfile::NamedTempFile;

use crate::backends::c;
use crate::encoding::deterministic::{single_initial_state, DeterministicMonitor};
use crate::encoding::flags::FlagMonitor;
use crate::encoding::fragmented::FragmentedMonitor;
use crate::encoding::tracking::{Counterexample, ReasonTrackingMonitor, TraceLayout};
use crate::encoding::{AcceptancePolicy, Buffering, Mode, Monitor, Verdict};
use crate::errors::{CompileError, CompileResult};
use crate::ir::{Automaton, PropositionTable};

/// Settings of one generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    /// emit the reason-tracking update with `nextState` copies
    pub double_buffer: bool,
}

impl Options {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            double_buffer: false,
        }
    }

    /// Only the reason-tracking encoding has a single pass variant; the
    /// other flag encodings are always double buffered
    pub fn buffering(&self) -> Buffering {
        if self.mode == Mode::ReasonTracking && !self.double_buffer {
            Buffering::SinglePass
        } else {
            Buffering::DoubleBuffered
        }
    }
}

fn check_inputs(automata: &[Automaton], options: &Options) -> CompileResult<()> {
    if automata.is_empty() {
        return Err(CompileError::configuration("no automaton description given"));
    }
    if automata.len() > 1 && !options.mode.accepts_multiple_inputs() {
        return Err(CompileError::configuration(format!(
            "{} automaton descriptions given, but only the fragmented encoding combines several",
            automata.len()
        )));
    }
    Ok(())
}

/// Generates the C translation unit for `automata`. Nothing is written
/// anywhere: the caller decides where the artifact goes.
pub fn compile(
    automata: &[Automaton],
    props: &PropositionTable,
    options: &Options,
) -> CompileResult<String> {
    check_inputs(automata, options)?;
    let automaton = &automata[0];
    let mut out: Vec<u8> = vec![];
    match options.mode {
        Mode::Fragmented => c::fragmented_to_c(automata, props, &mut out)?,
        Mode::ReasonTracking => {
            let layout = TraceLayout::new(automaton, props)?;
            if !layout.is_reachable(layout.rejecting()) {
                warn!(
                    "the rejecting state of {} is unreachable, the monitor never reports a violation",
                    automaton.name
                );
            }
            c::reason_tracking_to_c(&layout, props, options.buffering(), &mut out)?
        }
        mode => match AcceptancePolicy::for_mode(mode, automaton)? {
            AcceptancePolicy::EmptySet => c::nondeterministic_to_c(automaton, props, &mut out)?,
            AcceptancePolicy::RejectingActive(rejecting) => {
                c::universal_to_c(automaton, rejecting, props, &mut out)?
            }
            AcceptancePolicy::FirstUnmatchedGuard => {
                let initial = single_initial_state(automaton)?;
                c::deterministic_to_c(automaton, initial, props, &mut out)?
            }
        },
    }
    info!(
        "generated {:?} monitor ({} bytes of C)",
        options.mode,
        out.len()
    );
    String::from_utf8(out)
        .map_err(|e| CompileError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Verdicts of the executable monitor on a stimulus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub verdicts: Vec<Verdict>,
    /// recorded path into the rejecting state (reason tracking only)
    pub counterexample: Option<Counterexample>,
    /// size of `violatingTraceInformation` (reason tracking only)
    pub trace_buffer: Option<usize>,
}

/// Runs the encoding selected by `options` in process
pub fn simulate(
    automata: &[Automaton],
    props: &PropositionTable,
    options: &Options,
    valuations: &[Vec<bool>],
) -> CompileResult<Simulation> {
    check_inputs(automata, options)?;
    if let Some(bad) = valuations.iter().position(|v| v.len() != props.len()) {
        return Err(CompileError::configuration(format!(
            "valuation {} has {} values, expected {}",
            bad + 1,
            valuations[bad].len(),
            props.len()
        )));
    }
    let automaton = &automata[0];
    let plain = |verdicts: Vec<Verdict>| Simulation {
        verdicts,
        counterexample: None,
        trace_buffer: None,
    };
    let simulation = match options.mode {
        Mode::Fragmented => plain(FragmentedMonitor::new(automata)?.run(valuations)),
        Mode::ReasonTracking => {
            let layout = TraceLayout::new(automaton, props)?;
            let mut monitor = ReasonTrackingMonitor::new(&layout, options.buffering());
            let verdicts = monitor.run(valuations);
            Simulation {
                verdicts,
                counterexample: monitor.counterexample(),
                trace_buffer: Some(layout.buffer_size()),
            }
        }
        mode => {
            let mut monitor: Box<dyn Monitor + '_> =
                match AcceptancePolicy::for_mode(mode, automaton)? {
                    AcceptancePolicy::FirstUnmatchedGuard => {
                        Box::new(DeterministicMonitor::new(automaton)?)
                    }
                    policy => Box::new(FlagMonitor::new(automaton, policy)?),
                };
            plain(monitor.run(valuations))
        }
    };
    Ok(simulation)
}

/// Writes `contents` to `path` through a temporary file in the same
/// directory, so `path` either holds the complete artifact or is untouched
pub fn persist(path: impl AsRef<Path>, contents: &str) -> std::io::Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Persists `artifacts` in order and stops at the first failure, so a
/// harness is never written without the monitor listed before it
pub fn persist_all(artifacts: &[(&Path, &str)]) -> std::io::Result<()> {
    for (path, contents) in artifacts {
        persist(path, contents).map_err(|e| {
            std::io::Error::new(e.kind(), format!("failed to write {}: {e}", path.display()))
        })?;
    }
    Ok(())
}
