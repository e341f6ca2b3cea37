//! Fatal errors and recoverable diagnostics.
//!
//! A run either produces a complete class definition or stops with a
//! `CompileError`. Everything recoverable is recorded as a `Diagnostic` and
//! mirrored to `tracing` so operators can see what was dropped or demoted.
use std::fmt;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("don't know how to handle a fact of type `{kind}` (node {id})")]
    UnrecognizedFact { id: String, kind: String },

    #[error("identifier `{0}` is outside the ontology namespace")]
    ForeignIdentifier(String),

    #[error("malformed ontology document: {0}")]
    MalformedDocument(String),

    #[error("struct type {0} has no fields")]
    EmptyStruct(String),

    #[error("type {0} is referenced but was never declared")]
    UnknownType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CompileError> = std::result::Result<T, E>;

// ————————————————————————————————————————————————————————————————————————————
// DIAGNOSTICS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    /// The type or property the message is about.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Append-only collector threaded through the pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self { Self::default() }

    pub fn warn(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        let subject = subject.into();
        let message = message.into();
        tracing::warn!(%subject, "{message}");
        self.entries.push(Diagnostic { level: Level::Warning, subject, message });
    }

    pub fn debug(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        let subject = subject.into();
        let message = message.into();
        tracing::debug!(%subject, "{message}");
        self.entries.push(Diagnostic { level: Level::Debug, subject, message });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.level == Level::Warning)
    }

    /// True if some diagnostic about `subject` contains `needle`.
    pub fn mentions(&self, subject: &str, needle: &str) -> bool {
        self.entries.iter().any(|d| d.subject == subject && d.message.contains(needle))
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
