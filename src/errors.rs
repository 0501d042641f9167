// Copyright 2025 Cornell University
// released under MIT License

use thiserror::Error;

/// Everything that can stop a generation run. All of them are fatal: the
/// driver never writes a partial monitor.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed or incomplete automaton description
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A guard violates the bracket / operator grammar
    #[error("format error in guard `{guard}`: {message}")]
    Format { guard: String, message: String },

    /// Mismatch between the automaton's propositions and the monitored signals
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Missing / duplicate rejecting state, automaton not very weak,
    /// precondition of an encoding violated
    #[error("structural error: {message}")]
    Structural { message: String },

    /// A statically sized resource of the chosen encoding is too small
    #[error("resource error: {message}")]
    Resource { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn parse(message: impl Into<String>) -> Self {
        CompileError::Parse {
            message: message.into(),
        }
    }

    pub fn format(guard: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::Format {
            guard: guard.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CompileError::Configuration {
            message: message.into(),
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        CompileError::Structural {
            message: message.into(),
        }
    }

    pub fn resource(message: impl Into<String>) -> Self {
        CompileError::Resource {
            message: message.into(),
        }
    }
}

// Type alias for Results
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = CompileError::format("[0&", "expected literal");
        assert_eq!(
            err.to_string(),
            "format error in guard `[0&`: expected literal"
        );
        let err = CompileError::structural("state 3 is part of a cycle");
        assert_eq!(err.to_string(), "structural error: state 3 is part of a cycle");
        let io: CompileError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, CompileError::Io(_)));
    }
}
