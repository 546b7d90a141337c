/// SMT-LIB term (expression) representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    // === Literals ===
    /// Boolean literal
    BoolLit(bool),
    /// Integer literal (unbounded)
    IntLit(i64),

    // === Variables ===
    /// Named constant/variable reference
    Const(String),

    // === Boolean operations ===
    /// Logical NOT
    Not(Box<Term>),
    /// Logical AND (n-ary)
    And(Vec<Term>),
    /// Logical OR (n-ary)
    Or(Vec<Term>),
    /// Logical implication: `(=> a b)`
    Implies(Box<Term>, Box<Term>),
    /// Logical if-and-only-if: `(= a b)` for Bool
    Iff(Box<Term>, Box<Term>),

    // === Core ===
    /// Equality: `(= a b)`
    Eq(Box<Term>, Box<Term>),
    /// Distinct: `(distinct a b ...)`
    Distinct(Vec<Term>),
    /// If-then-else: `(ite cond then else)`
    Ite(Box<Term>, Box<Term>, Box<Term>),

    // === Integer arithmetic ===
    /// `(+ a b ...)` (n-ary)
    IntAdd(Vec<Term>),
    /// `(- a b)`
    IntSub(Box<Term>, Box<Term>),
    /// `(< a b)`
    IntLt(Box<Term>, Box<Term>),
    /// `(<= a b)`
    IntLe(Box<Term>, Box<Term>),
}

impl Term {
    /// Returns `Some(b)` if this term is the Boolean literal `b`.
    pub fn as_bool_lit(&self) -> Option<bool> {
        match self {
            Term::BoolLit(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns `Some(n)` if this term is the integer literal `n`.
    pub fn as_int_lit(&self) -> Option<i64> {
        match self {
            Term::IntLit(n) => Some(*n),
            _ => None,
        }
    }

    /// True for the literal `true`.
    pub fn is_true(&self) -> bool {
        self.as_bool_lit() == Some(true)
    }

    /// True for the literal `false`.
    pub fn is_false(&self) -> bool {
        self.as_bool_lit() == Some(false)
    }

    /// Count the nodes of this term. Used to report formula size.
    pub fn size(&self) -> usize {
        match self {
            Term::BoolLit(_) | Term::IntLit(_) | Term::Const(_) => 1,
            Term::Not(a) => 1 + a.size(),
            Term::And(ts) | Term::Or(ts) | Term::Distinct(ts) | Term::IntAdd(ts) => {
                1 + ts.iter().map(Term::size).sum::<usize>()
            }
            Term::Implies(a, b)
            | Term::Iff(a, b)
            | Term::Eq(a, b)
            | Term::IntSub(a, b)
            | Term::IntLt(a, b)
            | Term::IntLe(a, b) => 1 + a.size() + b.size(),
            Term::Ite(c, t, e) => 1 + c.size() + t.size() + e.size(),
        }
    }

    /// Collect the names of all constants referenced by this term.
    pub fn free_consts(&self) -> std::collections::BTreeSet<&str> {
        let mut out = std::collections::BTreeSet::new();
        self.collect_consts(&mut out);
        out
    }

    fn collect_consts<'a>(&'a self, out: &mut std::collections::BTreeSet<&'a str>) {
        match self {
            Term::BoolLit(_) | Term::IntLit(_) => {}
            Term::Const(name) => {
                out.insert(name.as_str());
            }
            Term::Not(a) => a.collect_consts(out),
            Term::And(ts) | Term::Or(ts) | Term::Distinct(ts) | Term::IntAdd(ts) => {
                for t in ts {
                    t.collect_consts(out);
                }
            }
            Term::Implies(a, b)
            | Term::Iff(a, b)
            | Term::Eq(a, b)
            | Term::IntSub(a, b)
            | Term::IntLt(a, b)
            | Term::IntLe(a, b) => {
                a.collect_consts(out);
                b.collect_consts(out);
            }
            Term::Ite(c, t, e) => {
                c.collect_consts(out);
                t.collect_consts(out);
                e.collect_consts(out);
            }
        }
    }
}
