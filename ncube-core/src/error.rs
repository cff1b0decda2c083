use core::fmt;

/// Errors an external collaborator implementation can raise (spec §6, §7).
///
/// `ncube-engine::NCubeError` wraps these with the coordinate/cube context
/// that was active when the collaborator was invoked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// A [`crate::ResourceFetcher`] couldn't retrieve the requested URL.
    Fetch(String),
    /// A [`crate::ExpressionHost`] failed to compile source.
    Compilation(String),
    /// A [`crate::ExpressionHost`] failed while invoking compiled source.
    Runtime(String),
    /// A [`crate::CubeRegistry`] couldn't resolve a cube/coordinate lookup.
    Lookup(String),
    /// A cell body signaled early termination of the in-flight rule axis
    /// iteration (spec §4.6 "Terminate … or a RuleStop is signaled").
    RuleStop,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Fetch(msg) => write!(f, "resource fetch failed: {msg}"),
            CoreError::Compilation(msg) => write!(f, "expression compilation failed: {msg}"),
            CoreError::Runtime(msg) => write!(f, "expression invocation failed: {msg}"),
            CoreError::Lookup(msg) => write!(f, "cube registry lookup failed: {msg}"),
            CoreError::RuleStop => write!(f, "rule stop signaled"),
        }
    }
}

impl std::error::Error for CoreError {}
