//! # jmmcheck-smtlib
//!
//! SMT-LIB2 abstract syntax used to express memory-model legality problems:
//! sorts, terms, commands and scripts, their `Display` rendering to SMT-LIB2
//! text, and constant-folding constructors in [`builder`].

pub mod builder;
pub mod command;
mod formatter;
pub mod script;
pub mod sort;
pub mod term;

pub use command::Command;
pub use script::Script;
pub use sort::Sort;
pub use term::Term;
