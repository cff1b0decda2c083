use core::fmt::Debug;

use ncube_model::{ExpressionDescriptor, NameMap, Value};

use crate::{ApplicationId, CoreError, Sha1Digest};

/// Compiles and invokes expression, template and method cell source (spec
/// §4.1 EXPRESSION, §4.5 cell dispatch, §6).
///
/// Dynamic expression compilation is explicitly out of scope for this crate
/// (spec Non-goals) — only the interface a host embedding the engine must
/// implement is specified here, the same way `usql-core::Dialect` specifies
/// a shape without prescribing a SQL engine.
pub trait ExpressionHost: Debug {
    /// Compiles `descriptor`'s source, returning a digest identifying the
    /// compiled artifact for [`super::NCubeContext`]'s cache. Implementations
    /// that don't support caching may recompile on every call and derive the
    /// digest from the source text alone.
    fn compile(&self, descriptor: &ExpressionDescriptor) -> Result<Sha1Digest, CoreError>;

    /// Invokes previously compiled source against the given input bindings,
    /// returning the expression's result.
    fn invoke(&self, descriptor: &ExpressionDescriptor, input: &NameMap) -> Result<Value, CoreError>;
}

/// Retrieves source text referenced by an [`ExpressionDescriptor`]'s `url`
/// field instead of carrying it inline (spec §4.1, §6).
///
/// HTTP/URL fetching itself is out of scope (spec Non-goals); this is the
/// interface the executor calls through.
pub trait ResourceFetcher: Debug {
    /// Fetches the content at `url`.
    fn fetch(&self, url: &str) -> Result<String, CoreError>;
}

/// Resolves cross-cube cell references (spec §4.5 `CrossCubeReference`, §6).
///
/// A full multi-cube persistence/branching manager is out of scope (spec
/// Non-goals); this trait is the narrow lookup surface the executor needs.
pub trait CubeRegistry: Debug {
    /// Looks up the value a coordinate resolves to on the named cube within
    /// `app`'s scope.
    fn lookup(&self, app: &ApplicationId, cube_name: &str, coordinate: &NameMap) -> Result<Value, CoreError>;
}
