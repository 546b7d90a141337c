//! Arena-indexed binary relations over small integer ids.
//!
//! Program order, thread ordering and the static happens-before upper bound
//! are all relations over a few dozen nodes, so a dense bit matrix with
//! Warshall closure is both the simplest and the fastest representation.

/// A binary relation over `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    n: usize,
    bits: Vec<bool>,
}

impl Relation {
    /// The empty relation over `n` nodes.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            bits: vec![false; n * n],
        }
    }

    /// Build a relation from an edge list.
    ///
    /// # Panics
    ///
    /// Panics if an endpoint is not below `n`. Callers validate ids first.
    pub fn from_edges(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut rel = Self::new(n);
        for (a, b) in edges {
            rel.insert(a, b);
        }
        rel
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Add the edge `a -> b`. Panics if either node is out of range.
    pub fn insert(&mut self, a: usize, b: usize) {
        assert!(
            a < self.n && b < self.n,
            "edge ({a}, {b}) outside a relation over {} nodes",
            self.n
        );
        self.bits[a * self.n + b] = true;
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        a < self.n && b < self.n && self.bits[a * self.n + b]
    }

    /// Union with another relation over the same nodes.
    pub fn union(&self, other: &Relation) -> Relation {
        let n = self.n.max(other.n);
        let mut out = Relation::new(n);
        for (a, b) in self.pairs().chain(other.pairs()) {
            out.insert(a, b);
        }
        out
    }

    /// Transitive closure (Warshall).
    pub fn transitive_closure(&self) -> Relation {
        let n = self.n;
        let mut bits = self.bits.clone();
        for k in 0..n {
            for i in 0..n {
                if !bits[i * n + k] {
                    continue;
                }
                for j in 0..n {
                    if bits[k * n + j] {
                        bits[i * n + j] = true;
                    }
                }
            }
        }
        Relation { n, bits }
    }

    /// First node that reaches itself, if any.
    pub fn find_cycle(&self) -> Option<usize> {
        let closure = self.transitive_closure();
        (0..self.n).find(|&a| closure.contains(a, a))
    }

    pub fn is_acyclic(&self) -> bool {
        self.find_cycle().is_none()
    }

    pub fn successors(&self, a: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n).filter(move |&b| self.contains(a, b))
    }

    pub fn predecessors(&self, b: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.n).filter(move |&a| self.contains(a, b))
    }

    /// All related pairs in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.n;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| (i / n, i % n))
    }

    pub fn edge_count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}
