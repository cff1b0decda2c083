//! # ncube-core
//!
//! ncube-core defines the traits an embedding host implements to supply
//! expression evaluation, remote resource fetching and cross-cube lookups,
//! plus the identity newtypes and explicit context object that replace
//! process-wide global state (spec §6, §9).

#![deny(missing_docs)]
#![deny(unused_imports)]

mod collaborators;
mod context;
mod error;
mod identity;

pub use self::{
    collaborators::{CubeRegistry, ExpressionHost, ResourceFetcher},
    context::{CompiledArtifact, NCubeContext},
    error::CoreError,
    identity::{ApplicationId, Sha1Digest, Sha1Builder},
};
