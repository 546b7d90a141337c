/// A satisfying assignment returned by the solver.
///
/// Holds the raw value text of each constant from `(get-model)` output and
/// decodes the Bool and Int values the legality encoding declares.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    /// Variable assignments: `(name, value_string)` pairs.
    pub assignments: Vec<(String, String)>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model from assignment pairs.
    pub fn with_assignments(assignments: Vec<(String, String)>) -> Self {
        Self { assignments }
    }

    /// Look up a variable's raw value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Decode a Boolean assignment.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Decode an integer assignment, including the `(- n)` form.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        parse_int(self.get(name)?)
    }

    /// Return the number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Return whether the model is empty.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let magnitude = inner.trim().strip_prefix('-')?.trim();
        return magnitude.parse::<i64>().ok().map(|n| -n);
    }
    text.parse().ok()
}
