/// SMT-LIB sort (type) representation.
///
/// The legality encoding is propositional over a finite universe of actions
/// with integer-valued positions, locations, monitors and values, so only
/// the Boolean and integer sorts are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Boolean sort
    Bool,
    /// Mathematical integer sort
    Int,
}
