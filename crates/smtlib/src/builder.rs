//! Constant-folding term constructors.
//!
//! The legality encoding is generated by quantifying over the finite action
//! set, and most instances of a rule collapse to a literal once the fixed
//! relations (program order, candidate writes) are substituted. These
//! constructors fold literals as terms are built so that trivial conjuncts
//! never reach the solver.

use crate::term::Term;

/// A named constant.
pub fn var(name: impl Into<String>) -> Term {
    Term::Const(name.into())
}

/// Integer literal.
pub fn int(n: i64) -> Term {
    Term::IntLit(n)
}

/// Boolean literal.
pub fn bool_lit(b: bool) -> Term {
    Term::BoolLit(b)
}

/// Conjunction with flattening, `true` elimination and `false` short-circuit.
pub fn and(terms: impl IntoIterator<Item = Term>) -> Term {
    let mut out = Vec::new();
    for t in terms {
        match t {
            Term::BoolLit(true) => {}
            Term::BoolLit(false) => return Term::BoolLit(false),
            Term::And(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    match out.len() {
        0 => Term::BoolLit(true),
        1 => out.pop().unwrap_or(Term::BoolLit(true)),
        _ => Term::And(out),
    }
}

/// Disjunction with flattening, `false` elimination and `true` short-circuit.
pub fn or(terms: impl IntoIterator<Item = Term>) -> Term {
    let mut out = Vec::new();
    for t in terms {
        match t {
            Term::BoolLit(false) => {}
            Term::BoolLit(true) => return Term::BoolLit(true),
            Term::Or(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    match out.len() {
        0 => Term::BoolLit(false),
        1 => out.pop().unwrap_or(Term::BoolLit(false)),
        _ => Term::Or(out),
    }
}

/// Negation; folds literals and double negation.
pub fn not(t: Term) -> Term {
    match t {
        Term::BoolLit(b) => Term::BoolLit(!b),
        Term::Not(inner) => *inner,
        other => Term::Not(Box::new(other)),
    }
}

/// Implication `a => b`.
pub fn implies(a: Term, b: Term) -> Term {
    match (a, b) {
        (Term::BoolLit(false), _) | (_, Term::BoolLit(true)) => Term::BoolLit(true),
        (Term::BoolLit(true), b) => b,
        (a, Term::BoolLit(false)) => not(a),
        (a, b) => Term::Implies(Box::new(a), Box::new(b)),
    }
}

/// Boolean equivalence `a <=> b`.
pub fn iff(a: Term, b: Term) -> Term {
    if a == b {
        return Term::BoolLit(true);
    }
    match (a, b) {
        (Term::BoolLit(true), t) | (t, Term::BoolLit(true)) => t,
        (Term::BoolLit(false), t) | (t, Term::BoolLit(false)) => not(t),
        (a, b) => Term::Iff(Box::new(a), Box::new(b)),
    }
}

/// Equality of two (integer) terms.
pub fn eq(a: Term, b: Term) -> Term {
    if a == b {
        return Term::BoolLit(true);
    }
    match (&a, &b) {
        (Term::IntLit(x), Term::IntLit(y)) => Term::BoolLit(x == y),
        _ => Term::Eq(Box::new(a), Box::new(b)),
    }
}

/// Strict integer comparison `a < b`.
pub fn lt(a: Term, b: Term) -> Term {
    if a == b {
        return Term::BoolLit(false);
    }
    match (&a, &b) {
        (Term::IntLit(x), Term::IntLit(y)) => Term::BoolLit(x < y),
        _ => Term::IntLt(Box::new(a), Box::new(b)),
    }
}

/// Integer comparison `a <= b`.
pub fn le(a: Term, b: Term) -> Term {
    if a == b {
        return Term::BoolLit(true);
    }
    match (&a, &b) {
        (Term::IntLit(x), Term::IntLit(y)) => Term::BoolLit(x <= y),
        _ => Term::IntLe(Box::new(a), Box::new(b)),
    }
}

/// If-then-else with literal conditions and equal branches folded.
pub fn ite(cond: Term, then_branch: Term, else_branch: Term) -> Term {
    match cond {
        Term::BoolLit(true) => then_branch,
        Term::BoolLit(false) => else_branch,
        _ if then_branch == else_branch => then_branch,
        cond => Term::Ite(Box::new(cond), Box::new(then_branch), Box::new(else_branch)),
    }
}

/// Integer sum with literal folding.
///
/// Literals that would overflow `i64` stay as separate operands.
pub fn sum(terms: impl IntoIterator<Item = Term>) -> Term {
    let mut constant = 0i64;
    let mut out = Vec::new();
    for t in terms {
        match t {
            Term::IntLit(n) => match constant.checked_add(n) {
                Some(folded) => constant = folded,
                None => out.push(Term::IntLit(n)),
            },
            Term::IntAdd(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    if constant != 0 || out.is_empty() {
        out.push(Term::IntLit(constant));
    }
    match out.len() {
        1 => out.pop().unwrap_or(Term::IntLit(0)),
        _ => Term::IntAdd(out),
    }
}

/// Integer subtraction `a - b`.
pub fn sub(a: Term, b: Term) -> Term {
    match (&a, &b) {
        (Term::IntLit(x), Term::IntLit(y)) => match x.checked_sub(*y) {
            Some(diff) => Term::IntLit(diff),
            None => Term::IntSub(Box::new(a), Box::new(b)),
        },
        (_, Term::IntLit(0)) => a,
        _ => Term::IntSub(Box::new(a), Box::new(b)),
    }
}

/// `1` if `cond` holds, `0` otherwise. Used for counting constraints.
pub fn indicator(cond: Term) -> Term {
    ite(cond, Term::IntLit(1), Term::IntLit(0))
}

/// Pairwise distinctness; fewer than two terms is trivially true.
pub fn distinct(terms: Vec<Term>) -> Term {
    if terms.len() < 2 {
        Term::BoolLit(true)
    } else {
        Term::Distinct(terms)
    }
}

/// `t` equals one of `values`.
pub fn member(t: &Term, values: &[i64]) -> Term {
    or(values.iter().map(|v| eq(t.clone(), Term::IntLit(*v))))
}
