// Copyright 2025 Cornell University
// released under MIT License

use std::io::Write;

use clap::ColorChoice;
use codespan_reporting::diagnostic::{
    Diagnostic as CodespanDiagnostic, Label as CodespanLabel, LabelStyle, Severity,
};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Buffer, Color, ColorSpec, WriteColor};
use pest::iterators::Pair;
use pest::RuleType;

/// Severity of diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

/// A label representing a part of the source code
#[derive(Debug, Clone, PartialEq, Eq)]
struct Label {
    message: Option<String>,
    range: (usize, usize),
}

impl Label {
    fn to_codespan_label(&self, fileid: usize) -> CodespanLabel<usize> {
        CodespanLabel::new(LabelStyle::Primary, fileid, self.range.0..self.range.1)
            .with_message(self.message.clone().unwrap_or_default())
    }
}

/// Diagnostic of a particular part of an automaton description
struct Diagnostic {
    title: String,
    message: String,
    level: Level,
    location: Option<(usize, Label)>,
}

impl Diagnostic {
    fn emit(&self, buffer: &mut Buffer, files: &SimpleFiles<String, String>) {
        let severity = match self.level {
            Level::Error => Severity::Error,
            Level::Warning => Severity::Warning,
        };
        if let Some((fileid, label)) = &self.location {
            let diagnostic = CodespanDiagnostic::new(severity)
                .with_message(&self.message)
                .with_labels(vec![label.to_codespan_label(*fileid)]);

            let config = term::Config::default();
            // rendering into an in-memory buffer only fails on a bad span
            if term::emit(buffer, &config, files, &diagnostic).is_err() {
                let _ = writeln!(buffer, "{}: {}", self.title, self.message);
            }
        } else {
            let color = match self.level {
                Level::Error => Color::Red,
                Level::Warning => Color::Yellow,
            };
            let _ = buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(color)));
            let _ = write!(buffer, "{}", self.title);
            let _ = buffer.set_color(&ColorSpec::new());
            let _ = writeln!(buffer, ": {}", self.message);
        }
    }
}

/// Collects source files and renders located error messages for them.
/// Everything emitted is also kept in `error_string` so callers (and tests)
/// can inspect it.
pub struct DiagnosticHandler {
    files: SimpleFiles<String, String>,
    error_string: String,
    /// `color_choice` indicates whether to emit error messages w/ ANSI colors
    color_choice: ColorChoice,
    /// print diagnostics to stderr as they are emitted
    echo: bool,
}

impl Default for DiagnosticHandler {
    /// Default `DiagnosticHandler` does not emit colored error messages
    /// and does not print anything
    fn default() -> Self {
        Self::new(ColorChoice::Never, false)
    }
}

impl DiagnosticHandler {
    pub fn new(color_choice: ColorChoice, echo: bool) -> Self {
        Self {
            files: SimpleFiles::new(),
            error_string: String::new(),
            color_choice,
            echo,
        }
    }

    fn create_buffer(&self) -> Buffer {
        if self.color_choice == ColorChoice::Never {
            Buffer::no_color()
        } else {
            Buffer::ansi()
        }
    }

    pub fn add_file(&mut self, name: String, content: String) -> usize {
        self.files.add(name, content)
    }

    pub fn error_string(&self) -> &str {
        &self.error_string
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        let mut buffer = self.create_buffer();
        diagnostic.emit(&mut buffer, &self.files);
        let msg = String::from_utf8_lossy(buffer.as_slice()).to_string();
        if self.echo {
            eprint!("{}", msg);
        }
        self.error_string.push_str(&msg);
    }

    /// Note: we make this function parametric over any type `R`
    /// that implements Pest's `RuleType` trait
    pub fn emit_diagnostic_parsing<R: RuleType>(
        &mut self,
        message: &str,
        fileid: usize,
        pair: &Pair<'_, R>,
        level: Level,
    ) {
        let span = pair.as_span();
        self.emit_diagnostic_span(message, fileid, span.start(), span.end(), level);
    }

    pub fn emit_diagnostic_span(
        &mut self,
        message: &str,
        fileid: usize,
        start: usize,
        end: usize,
        level: Level,
    ) {
        let label = Label {
            message: Some(message.to_string()),
            range: (start, end),
        };
        self.record(Diagnostic {
            title: format!("{:?} in file {}", level, fileid),
            message: message.to_string(),
            level,
            location: Some((fileid, label)),
        });
    }

    pub fn emit_general_message(&mut self, message: &str, level: Level) {
        self.record(Diagnostic {
            title: format!("{:?}", level),
            message: message.to_string(),
            level,
            location: None,
        });
    }
}
