//! # ncube-parser
//!
//! ncube-parser turns `ncube-lexer` token streams into typed
//! [`ncube_model::Value`]s: RANGE/SET column specs and 2-D/3-D/lat-lon
//! point literals (spec §4.1).

#![deny(missing_docs)]
#![deny(unused_imports)]

mod error;
mod spec;

pub use self::{error::ParserError, spec::SpecParser};
