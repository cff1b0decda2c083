//! # ncube-lexer
//!
//! ncube-lexer converts the textual column specs used by RANGE, SET and
//! point-valued axes (`"1,10"`, `"[1,10]"`, `"1,2,3"`, `"3.0,4.0"`) into a
//! sequence of tokens for `ncube-parser` to assemble into typed values.

#![deny(missing_docs)]
#![deny(unused_imports)]

mod error;
mod lexer;
mod token;

pub use self::{
    error::{LexerError, Location},
    lexer::Lexer,
    token::Token,
};
