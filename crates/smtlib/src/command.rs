use crate::sort::Sort;
use crate::term::Term;

/// The SMT-LIB commands a legality script is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetLogic(String),
    /// `(set-option :key value)`; the key is stored without the colon.
    SetOption(String, String),
    DeclareConst(String, Sort),
    Assert(Term),
    CheckSat,
    GetModel,
    /// A `;;` line naming the assertion that follows.
    Comment(String),
}

impl Command {
    pub fn is_assertion(&self) -> bool {
        matches!(self, Command::Assert(_))
    }
}
