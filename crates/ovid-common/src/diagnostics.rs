//! Structured problems and the reporting sink.
//!
//! Every stage of the pipeline accumulates problems into a
//! [`ProblemReporter`] instead of aborting the run. Only structurally fatal
//! conditions (a resolution gap inside a unit, a cyclic bundle dependency)
//! withhold the specific artifact they affect; the run itself always
//! completes and the host process is never terminated.

use crate::position::SourcePosition;
use serde::Serialize;

/// Problem severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Error,
    Message,
}

/// The kinds of problems the core reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ProblemKind {
    /// A referenced symbol or type is missing from the resolved model.
    /// Fatal to the unit being printed.
    UnresolvedSymbol,
    /// Two overloads cannot be distinguished in the target language.
    /// Emission continues with a best-effort dispatch.
    AmbiguousOverload,
    /// The static-initialization dependency graph has a cycle. Fatal to
    /// bundle generation, harmless in one-file-per-unit mode.
    CycleInStaticInitializers,
    /// Exact source-line preservation could not be achieved for a node.
    LineAlignment,
    /// Bundles cannot be generated when module output is enabled.
    BundleWithModule,
    /// An output artifact could not be written.
    OutputIo,
}

impl ProblemKind {
    pub fn severity(self) -> Severity {
        match self {
            ProblemKind::UnresolvedSymbol
            | ProblemKind::AmbiguousOverload
            | ProblemKind::CycleInStaticInitializers
            | ProblemKind::BundleWithModule
            | ProblemKind::OutputIo => Severity::Error,
            ProblemKind::LineAlignment => Severity::Warning,
        }
    }
}

/// A reported problem: kind, optional source position, readable message.
#[derive(Clone, Debug, Serialize)]
pub struct Problem {
    pub kind: ProblemKind,
    pub severity: Severity,
    pub position: Option<SourcePosition>,
    pub message: String,
}

impl Problem {
    pub fn new(
        kind: ProblemKind,
        position: Option<SourcePosition>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            position,
            message: message.into(),
        }
    }
}

/// The sink problems are reported to.
///
/// Implementations must not panic and must not terminate the process; a
/// report is an observation, not control flow.
pub trait ProblemReporter {
    fn report(&mut self, problem: Problem);
}

/// A reporter that collects everything into a vector, for tests and for
/// hosts that present problems after the run.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub problems: Vec<Problem>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_count(&self) -> usize {
        self.problems
            .iter()
            .filter(|p| p.severity == Severity::Error)
            .count()
    }

    pub fn has_kind(&self, kind: ProblemKind) -> bool {
        self.problems.iter().any(|p| p.kind == kind)
    }
}

impl ProblemReporter for CollectingReporter {
    fn report(&mut self, problem: Problem) {
        self.problems.push(problem);
    }
}

/// Decorator that counts errors while forwarding every problem to the
/// wrapped reporter. Stages use the count to decide whether an artifact
/// can still be produced.
pub struct ErrorCountReporter<'a> {
    inner: &'a mut dyn ProblemReporter,
    error_count: usize,
}

impl<'a> ErrorCountReporter<'a> {
    pub fn new(inner: &'a mut dyn ProblemReporter) -> Self {
        Self {
            inner,
            error_count: 0,
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }
}

impl ProblemReporter for ErrorCountReporter<'_> {
    fn report(&mut self, problem: Problem) {
        if problem.severity == Severity::Error {
            self.error_count += 1;
        }
        self.inner.report(problem);
    }
}
