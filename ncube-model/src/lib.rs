//! # ncube-model
//!
//! ncube-model is the core in-memory data model for the n-cube engine:
//! values, axes, columns, cells and the errors their invariants can raise.

#![deny(missing_docs)]
#![deny(unused_imports)]

mod axis;
mod cell;
mod error;
mod name;
mod value;

pub use self::{axis::*, cell::*, error::*, name::*, value::*};
