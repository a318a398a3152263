//! Error types with rich diagnostics using miette
//!
//! Transform parse errors carry source spans so a bad `transform` string in
//! a config document points at the offending token.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::{NumericError, PartitionKey};

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors that make a matching run meaningless. Never retried.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("no transform configured for partition {partition}")]
    #[diagnostic(
        code(skillmatch::config::missing_transform),
        help("every tree used by a reference node or artifact needs an entry in the transform table")
    )]
    MissingTransform { partition: PartitionKey },

    #[error("invalid tolerance: {source}")]
    #[diagnostic(
        code(skillmatch::config::invalid_tolerance),
        help("tolerance must be a finite, non-negative distance")
    )]
    InvalidTolerance {
        #[source]
        source: NumericError,
    },

    #[error("invalid coordinate for {id}: {source}")]
    #[diagnostic(code(skillmatch::config::invalid_coordinate))]
    InvalidCoordinate {
        id: String,
        #[source]
        source: NumericError,
    },

    #[error("invalid document: {message}")]
    #[diagnostic(code(skillmatch::config::invalid_document))]
    InvalidDocument { message: String },

    #[error("artifact {id} has no position")]
    #[diagnostic(
        code(skillmatch::config::missing_point),
        help("give the artifact `x` and `y`, or path data in `d` to anchor it")
    )]
    MissingPoint { id: String },

    #[error("artifact {id} has no partition")]
    #[diagnostic(
        code(skillmatch::config::missing_partition),
        help("set `tree`, or use a label like `Tree A container node 1` or an id like `container-a-1`")
    )]
    MissingPartition { id: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transform(#[from] TransformParseError),

    #[error("failed to read {path}")]
    #[diagnostic(code(skillmatch::config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {name}: {source}")]
    #[diagnostic(code(skillmatch::config::json))]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Transform Parse Errors
// ============================================================================

/// Errors from parsing an SVG-style transform list
#[derive(Error, Diagnostic, Debug)]
pub enum TransformParseError {
    #[error("invalid transform syntax")]
    #[diagnostic(
        code(skillmatch::transform::syntax),
        help("expected e.g. `matrix(a,b,c,d,e,f)`, `translate(tx,ty)`, `scale(s)` or `rotate(deg)`")
    )]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected input here")]
        span: SourceSpan,
    },

    #[error("{function}() takes {expected} arguments, got {got}")]
    #[diagnostic(code(skillmatch::transform::arity))]
    Arity {
        function: String,
        expected: &'static str,
        got: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("invalid number in transform")]
    #[diagnostic(code(skillmatch::transform::invalid_number))]
    InvalidNumber {
        #[source_code]
        src: NamedSource<String>,
        #[label("not a finite number")]
        span: SourceSpan,
    },
}

// ============================================================================
// Geometry Errors
// ============================================================================

/// The transform has no inverse (determinant is zero)
#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq)]
#[error("transform is singular (determinant {determinant})")]
#[diagnostic(code(skillmatch::transform::singular))]
pub struct SingularTransform {
    pub determinant: f64,
}
