use core::fmt;

/// Errors raised directly by axis/column invariant enforcement (spec §7).
///
/// This is the lower half of the taxonomy; `ncube-engine::NCubeError` wraps
/// each variant with the higher-level context (cube name, coordinate) once
/// it crosses the binder/executor boundary, the same way `usql-parser`
/// wraps `usql-lexer`'s error.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelError {
    /// A RANGE/SET column addition or update conflicts with an existing
    /// column (spec invariant 3).
    AxisOverlap {
        /// The axis on which the conflict occurred.
        axis: String,
        /// A description of the conflicting value.
        value: String,
    },
    /// A value's type isn't acceptable on the target axis (e.g. a Range on
    /// a DISCRETE axis).
    Unsupported {
        /// The axis on which the value was rejected.
        axis: String,
        /// A description of what was rejected and why.
        reason: String,
    },
    /// A textual or typed value couldn't be promoted to the axis's
    /// value-type.
    ConversionFailed {
        /// The axis value-type the value was promoted towards.
        target_type: String,
        /// A description of the input that failed to convert.
        input: String,
    },
    /// A structurally invalid argument (null/empty axis name, duplicate
    /// axis name, unknown column id, NEAREST axis with a default, etc).
    InvalidArgument(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::AxisOverlap { axis, value } => {
                write!(f, "column {value} overlaps an existing column on axis '{axis}'")
            }
            ModelError::Unsupported { axis, reason } => {
                write!(f, "unsupported value on axis '{axis}': {reason}")
            }
            ModelError::ConversionFailed { target_type, input } => {
                write!(f, "cannot convert '{input}' to {target_type}")
            }
            ModelError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}
