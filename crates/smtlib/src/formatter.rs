//! SMT-LIB2 text formatting for AST types.
//!
//! Implements `Display` for [`Sort`], [`Term`], [`Command`], and [`Script`],
//! producing valid SMT-LIB2 output that can be parsed by solvers such as Z3.

use std::fmt;

use crate::command::Command;
use crate::script::Script;
use crate::sort::Sort;
use crate::term::Term;

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Int => write!(f, "Int"),
        }
    }
}

/// Write a binary SMT-LIB operator: `(op lhs rhs)`.
fn fmt_binop(op: &str, lhs: &Term, rhs: &Term, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({op} {lhs} {rhs})")
}

/// Write an n-ary operator, falling back to `empty` for zero operands.
fn fmt_nary(op: &str, terms: &[Term], empty: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match terms {
        [] => write!(f, "{empty}"),
        [single] if op != "distinct" => write!(f, "{single}"),
        _ => {
            write!(f, "({op}")?;
            for t in terms {
                write!(f, " {t}")?;
            }
            write!(f, ")")
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::BoolLit(true) => write!(f, "true"),
            Term::BoolLit(false) => write!(f, "false"),
            Term::IntLit(n) => {
                if *n < 0 {
                    // SMT-LIB represents negative integers as `(- N)`
                    write!(f, "(- {})", n.unsigned_abs())
                } else {
                    write!(f, "{n}")
                }
            }
            Term::Const(name) => write!(f, "{name}"),

            Term::Not(inner) => write!(f, "(not {inner})"),
            Term::And(terms) => fmt_nary("and", terms, "true", f),
            Term::Or(terms) => fmt_nary("or", terms, "false", f),
            Term::Implies(lhs, rhs) => fmt_binop("=>", lhs, rhs, f),
            Term::Iff(lhs, rhs) | Term::Eq(lhs, rhs) => fmt_binop("=", lhs, rhs, f),
            // `distinct` over fewer than two terms is trivially true
            Term::Distinct(terms) if terms.len() < 2 => write!(f, "true"),
            Term::Distinct(terms) => fmt_nary("distinct", terms, "true", f),
            Term::Ite(cond, then_branch, else_branch) => {
                write!(f, "(ite {cond} {then_branch} {else_branch})")
            }

            Term::IntAdd(terms) => fmt_nary("+", terms, "0", f),
            Term::IntSub(a, b) => fmt_binop("-", a, b, f),
            Term::IntLt(a, b) => fmt_binop("<", a, b, f),
            Term::IntLe(a, b) => fmt_binop("<=", a, b, f),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetLogic(logic) => write!(f, "(set-logic {logic})"),
            Command::SetOption(key, value) => write!(f, "(set-option :{key} {value})"),
            Command::DeclareConst(name, sort) => write!(f, "(declare-const {name} {sort})"),
            Command::Assert(term) => write!(f, "(assert {term})"),
            Command::CheckSat => write!(f, "(check-sat)"),
            Command::GetModel => write!(f, "(get-model)"),
            Command::Comment(text) => write!(f, ";; {text}"),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{cmd}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::command::Command;
    use crate::script::Script;
    use crate::sort::Sort;
    use crate::term::Term;

    fn c(name: &str) -> Term {
        Term::Const(name.to_string())
    }

    #[test]
    fn sorts() {
        assert_eq!(Sort::Bool.to_string(), "Bool");
        assert_eq!(Sort::Int.to_string(), "Int");
    }

    #[test]
    fn int_literals() {
        assert_eq!(Term::IntLit(0).to_string(), "0");
        assert_eq!(Term::IntLit(42).to_string(), "42");
        assert_eq!(Term::IntLit(-3).to_string(), "(- 3)");
        assert_eq!(Term::IntLit(i64::MIN).to_string(), "(- 9223372036854775808)");
    }

    #[test]
    fn empty_and_singleton_connectives() {
        assert_eq!(Term::And(vec![]).to_string(), "true");
        assert_eq!(Term::Or(vec![]).to_string(), "false");
        assert_eq!(Term::And(vec![c("a")]).to_string(), "a");
        assert_eq!(Term::IntAdd(vec![]).to_string(), "0");
        assert_eq!(Term::Distinct(vec![c("a")]).to_string(), "true");
    }

    #[test]
    fn nested_terms() {
        let t = Term::Implies(
            Box::new(Term::And(vec![c("e_act_1"), c("c1_1")])),
            Box::new(Term::IntLt(Box::new(c("e_so_1")), Box::new(c("e_so_2")))),
        );
        assert_eq!(t.to_string(), "(=> (and e_act_1 c1_1) (< e_so_1 e_so_2))");
    }

    #[test]
    fn ite_and_sum() {
        let t = Term::IntAdd(vec![
            Term::Ite(Box::new(c("p")), Box::new(Term::IntLit(1)), Box::new(Term::IntLit(0))),
            Term::IntLit(2),
        ]);
        assert_eq!(t.to_string(), "(+ (ite p 1 0) 2)");
    }

    #[test]
    fn distinct_many() {
        let t = Term::Distinct(vec![c("x"), c("y"), c("z")]);
        assert_eq!(t.to_string(), "(distinct x y z)");
    }

    #[test]
    fn commands() {
        assert_eq!(
            Command::DeclareConst("e_hb_0_1".into(), Sort::Bool).to_string(),
            "(declare-const e_hb_0_1 Bool)"
        );
        assert_eq!(
            Command::SetOption("produce-models".into(), "true".into()).to_string(),
            "(set-option :produce-models true)"
        );
        assert_eq!(Command::Comment("rule 7".into()).to_string(), ";; rule 7");
    }

    #[test]
    fn script_lines() {
        let mut script = Script::new();
        script.extend([
            Command::SetLogic("QF_LIA".into()),
            Command::DeclareConst("x".into(), Sort::Int),
            Command::Assert(Term::IntLt(Box::new(Term::IntLit(0)), Box::new(c("x")))),
            Command::CheckSat,
        ]);
        assert_eq!(
            script.to_string(),
            "(set-logic QF_LIA)\n(declare-const x Int)\n(assert (< 0 x))\n(check-sat)"
        );
    }
}
