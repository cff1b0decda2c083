use core::fmt;

use ncube_core::CoreError;
use ncube_lexer::LexerError;
use ncube_model::ModelError;
use ncube_parser::ParserError;

/// The full error taxonomy surfaced by the binder, executor, rule engine
/// and identity/delta machinery (spec §7).
///
/// Lower-level errors (`ModelError` from axis/column invariants,
/// `ParserError`/`LexerError` from textual coercion, `CoreError` from
/// external collaborators) are wrapped rather than flattened, the same way
/// `usql-parser::ParserError` wraps `usql-lexer::LexerError`.
#[derive(Clone, Debug, PartialEq)]
pub enum NCubeError {
    /// A coordinate is missing a value for an axis the cube requires
    /// (spec §4.3, §7).
    MissingScope {
        /// The axis whose value was missing from the coordinate.
        axis: String,
    },
    /// A coordinate's value for an axis matched no column and the axis has
    /// no default (spec §4.3, §7).
    CoordinateNotFound {
        /// The axis on which no column matched.
        axis: String,
        /// A description of the value that failed to bind.
        value: String,
    },
    /// A RANGE/SET column addition or update conflicts with an existing
    /// column (spec invariant 3).
    AxisOverlap {
        /// The axis on which the conflict occurred.
        axis: String,
        /// A description of the conflicting value.
        value: String,
    },
    /// A value's type isn't acceptable for the requested operation.
    Unsupported {
        /// Context describing where the value was rejected.
        context: String,
        /// A description of what was rejected and why.
        reason: String,
    },
    /// A textual or typed value couldn't be promoted to the target
    /// value-type.
    ConversionFailed {
        /// The value-type the value was promoted towards.
        target_type: String,
        /// A description of the input that failed to convert.
        input: String,
    },
    /// A structurally invalid argument.
    InvalidArgument(String),
    /// Evaluating a coordinate re-entered a cube/coordinate pair already in
    /// flight (spec §5 concurrency, cyclic cross-cube references).
    CyclicReference {
        /// The cube name at which the cycle was detected.
        cube: String,
        /// A description of the coordinate that re-entered.
        coordinate: String,
    },
    /// An `ExpressionHost` failed to compile expression/template/method
    /// source.
    CompilationError(String),
    /// An `ExpressionHost` failed while invoking compiled source, or a
    /// `ResourceFetcher`/`CubeRegistry` lookup failed during execution.
    RuntimeFailure(String),
    /// Two cubes' deltas couldn't be merged because their dimensions,
    /// axis names or column values diverge (spec §4.7).
    IncompatibleMerge(String),
    /// A cell body signaled early termination of the in-flight rule axis
    /// iteration (spec §4.6). Caught by the rule engine rather than
    /// propagated to the caller; [`crate::RuleInfo::was_rule_stop_thrown`]
    /// reports it instead.
    RuleStop,
}

impl fmt::Display for NCubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NCubeError::MissingScope { axis } => {
                write!(f, "coordinate is missing a value for required axis '{axis}'")
            }
            NCubeError::CoordinateNotFound { axis, value } => {
                write!(f, "no column on axis '{axis}' matches value {value}")
            }
            NCubeError::AxisOverlap { axis, value } => {
                write!(f, "column {value} overlaps an existing column on axis '{axis}'")
            }
            NCubeError::Unsupported { context, reason } => {
                write!(f, "unsupported in {context}: {reason}")
            }
            NCubeError::ConversionFailed { target_type, input } => {
                write!(f, "cannot convert '{input}' to {target_type}")
            }
            NCubeError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            NCubeError::CyclicReference { cube, coordinate } => {
                write!(f, "cyclic reference detected re-entering cube '{cube}' at {coordinate}")
            }
            NCubeError::CompilationError(msg) => write!(f, "compilation failed: {msg}"),
            NCubeError::RuntimeFailure(msg) => write!(f, "runtime failure: {msg}"),
            NCubeError::IncompatibleMerge(msg) => write!(f, "incompatible merge: {msg}"),
            NCubeError::RuleStop => write!(f, "rule stop signaled"),
        }
    }
}

impl std::error::Error for NCubeError {}

impl From<ModelError> for NCubeError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::AxisOverlap { axis, value } => NCubeError::AxisOverlap { axis, value },
            ModelError::Unsupported { axis, reason } => NCubeError::Unsupported { context: axis, reason },
            ModelError::ConversionFailed { target_type, input } => {
                NCubeError::ConversionFailed { target_type, input }
            }
            ModelError::InvalidArgument(msg) => NCubeError::InvalidArgument(msg),
        }
    }
}

impl From<ParserError> for NCubeError {
    fn from(err: ParserError) -> Self {
        NCubeError::ConversionFailed {
            target_type: "column spec".to_string(),
            input: err.to_string(),
        }
    }
}

impl From<LexerError> for NCubeError {
    fn from(err: LexerError) -> Self {
        NCubeError::ConversionFailed {
            target_type: "column spec".to_string(),
            input: err.to_string(),
        }
    }
}

impl From<CoreError> for NCubeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Fetch(msg) => NCubeError::RuntimeFailure(msg),
            CoreError::Compilation(msg) => NCubeError::CompilationError(msg),
            CoreError::Runtime(msg) => NCubeError::RuntimeFailure(msg),
            CoreError::Lookup(msg) => NCubeError::RuntimeFailure(msg),
            CoreError::RuleStop => NCubeError::RuleStop,
        }
    }
}
