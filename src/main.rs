// Copyright 2025 Cornell University
// released under MIT License

use std::path::PathBuf;

use anyhow::Context;
use clap::{ColorChoice, Parser};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use ltlmon::backends::c::harness_to_c;
use ltlmon::compiler::{compile, persist_all, simulate, Options};
use ltlmon::diagnostic::DiagnosticHandler;
use ltlmon::encoding::Mode;
use ltlmon::ir::PropositionTable;
use ltlmon::parser::parse_file;
use ltlmon::stimulus::read_valuations;

// From the top-level directory, run:
// $ cargo run -- --mode reason-tracking --props a,b -o monitor.c property.hoa

/// Args for the monitor generator CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// State encoding of the generated monitor
    #[arg(short, long, value_enum)]
    mode: Mode,

    /// Canonical proposition order, comma separated. This is the parameter
    /// order of the generated `monitor` function.
    #[arg(short, long, value_name = "NAMES")]
    props: String,

    /// Where to write the C code (stdout if omitted)
    #[arg(short, long, value_name = "OUT_FILE")]
    output: Option<PathBuf>,

    /// Reason tracking only: compute successors into `nextState` copies
    /// instead of updating the flags in place
    #[arg(long)]
    double_buffer: bool,

    /// Stimulus file to run through the monitor; prints one verdict per step
    #[arg(long, value_name = "STIMULUS_FILE")]
    trace: Option<PathBuf>,

    /// Writes a C driver that replays the `--trace` stimulus and checks
    /// every verdict of the generated monitor
    #[arg(long, value_name = "HARNESS_FILE", requires = "trace")]
    harness: Option<PathBuf>,

    /// Users can specify `-v` or `--verbose` to toggle logging
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// To suppress colors in error messages, pass in `--color never`
    #[arg(long, value_name = "COLOR_CHOICE", default_value = "auto")]
    color: ColorChoice,

    /// Automaton descriptions; several only with `--mode fragmented`
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // For concision, we disable timestamps in the log
    let mut logger = env_logger::Builder::new();
    logger
        .format_timestamp(None)
        .filter_level(cli.verbosity.log_level_filter());
    if cli.color == ColorChoice::Never {
        logger.write_style(env_logger::WriteStyle::Never);
    }
    logger.init();

    let mut handler = DiagnosticHandler::new(cli.color, true);

    let props = PropositionTable::from_list(&cli.props)
        .with_context(|| format!("invalid proposition list `{}`", cli.props))?;

    let automata = cli
        .inputs
        .iter()
        .map(|input| {
            parse_file(input, &props, &mut handler)
                .with_context(|| format!("failed to read automaton {}", input.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let options = Options {
        mode: cli.mode,
        double_buffer: cli.double_buffer,
    };
    let code = compile(&automata, &props, &options)?;

    let mut harness = None;
    if let Some(stimulus) = &cli.trace {
        let valuations = read_valuations(stimulus, &props)
            .with_context(|| format!("failed to read stimulus {}", stimulus.display()))?;
        let simulation = simulate(&automata, &props, &options, &valuations)?;
        for (step, verdict) in simulation.verdicts.iter().enumerate() {
            println!("step {}: {:?}", step + 1, verdict);
        }
        if let Some(counterexample) = &simulation.counterexample {
            print!("{counterexample}");
        }

        if let Some(path) = &cli.harness {
            let mut out = vec![];
            harness_to_c(
                &props,
                &valuations,
                &simulation.verdicts,
                simulation.trace_buffer,
                &mut out,
            )?;
            harness = Some((path, String::from_utf8(out)?));
        }
    }

    let mut artifacts = vec![];
    match &cli.output {
        Some(path) => artifacts.push((path.as_path(), code.as_str())),
        None if cli.trace.is_none() => print!("{code}"),
        None => {}
    }
    if let Some((path, text)) = &harness {
        artifacts.push((path.as_path(), text.as_str()));
    }
    persist_all(&artifacts)?;
    Ok(())
}
