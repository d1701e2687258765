//! # ratstack
//! A small stack language where every value is an exact rational number.
//!
//! A program is a set of numbered functions:
//! ```text
//! # prints 1/3
//! def 0
//!     3 1 / out
//! end
//! ```
//! Each function is a sequence of number literals, which are pushed, and words,
//! which operate on the active stack. Execution starts with function 0. There
//! can be any number of stacks, each named by a rational id; `change` switches
//! between them and `move` sends a value to another one. `nret` returns from
//! several calls at once and `rerun` starts the current function over.
//!
//! Use [`vm::run_program`] to parse and run source text, or
//! [`parser::parse_program`] and [`vm::Engine`] for finer control.
use thiserror::Error;

pub mod config;
pub mod diagnostics;
pub mod host;
pub mod ops;
pub mod parser;
pub mod program;
pub mod stacks;
pub mod value;
pub mod vm;

/// Any fatal error: a structural one found while parsing or one hit while running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] parser::ParseError),
    #[error("{0}")]
    Run(#[from] vm::RunError),
}

impl Error {
    pub fn position(&self) -> program::Position {
        match self {
            Error::Parse(err) => err.position,
            Error::Run(err) => err.position,
        }
    }
}
