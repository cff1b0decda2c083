//! # ncube
//!
//! ncube is a multidimensional decision-table engine: an *n-cube* is a
//! hypercube whose cells hold decision values (scalars, expressions,
//! templates, cross-cube references) addressed by a coordinate over N typed
//! axes (DISCRETE, RANGE, SET, NEAREST, RULE). Callers supply a
//! loosely-typed coordinate map; the engine binds each key to a column on
//! its axis, locates the cell, executes any embedded logic — including
//! rule-axis traversal and cross-cube calls — and returns a result.
//!
//! This crate re-exports the five lower-level crates that make up the
//! engine, plus a [`prelude`] with the types most embeddings need:
//!
//! - [`model`] — values, axes, columns, cells (`ncube-model`).
//! - [`core`] — the traits an embedding host implements: [`core::CubeRegistry`],
//!   [`core::ExpressionHost`], [`core::ResourceFetcher`], and the
//!   [`core::NCubeContext`] that bundles them (`ncube-core`).
//! - [`lexer`] — tokenizes textual column specs (`ncube-lexer`).
//! - [`parser`] — turns tokens into typed values (`ncube-parser`).
//! - [`engine`] — [`engine::NCube`], the binder, executor, rule engine and
//!   identity/delta machinery (`ncube-engine`).

#![deny(missing_docs)]
#![deny(unused_imports)]

pub use ncube_core as core;
pub use ncube_engine as engine;
pub use ncube_lexer as lexer;
pub use ncube_model as model;
pub use ncube_parser as parser;

/// The types most embeddings need in scope: the cube itself, coordinates,
/// the execution context and the collaborator traits it bundles.
pub mod prelude {
    pub use crate::core::{ApplicationId, CubeRegistry, ExpressionHost, NCubeContext, ResourceFetcher};
    pub use crate::engine::{
        coerce_text, coerce_value, get_cell, get_map, BoundCoordinate, Coordinate, CubeDelta, ExecutionContext, NCube,
        NCubeError, PointKind, RuleInfo, RuleOutcome,
    };
    pub use crate::model::{Axis, AxisKind, AxisValueType, CellValue, Column, ColumnOrder, Value};
}
