//! Resource limits for the coloring solver

/// Budget for one solve.
///
/// Satisfiability with cardinality bounds is exponential in the worst case, so an encoding
/// larger than this budget is reported as indeterminate instead of being handed to the back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Upper bound on boolean variables, auxiliary counter registers included
    pub max_variables: usize,

    /// Upper bound on clauses
    pub max_clauses: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_variables: 1 << 20,
            max_clauses: 1 << 24,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// No budget at all
    pub fn unbounded() -> Self {
        Self {
            max_variables: usize::MAX,
            max_clauses: usize::MAX,
        }
    }

    /// Set the variable budget
    pub fn with_max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables;
        self
    }

    /// Set the clause budget
    pub fn with_max_clauses(mut self, max_clauses: usize) -> Self {
        self.max_clauses = max_clauses;
        self
    }
}
