use std::ops::Not;

use varisat::{ExtendFormula, Lit, Solver};

use crate::logic::at_most;

/// The narrow capability set the coloring encoder needs from a boolean decision engine.
///
/// Implement this to run the encoding on a different SAT/SMT/CP back end; [`VarisatBackend`] is the default.
pub trait DecisionProcedure {
    /// A literal: a variable or its negation.
    type Lit: Copy + Not<Output = Self::Lit>;

    /// Declare a fresh boolean variable, returning its positive literal.
    fn new_lit(&mut self) -> Self::Lit;

    /// Assert the disjunction of `clause`. The empty clause is unsatisfiable.
    fn add_clause(&mut self, clause: &[Self::Lit]);

    /// Assert that at most `bound` of `lits` are true.
    ///
    /// The default lowers the bound to clauses with a sequential counter.
    fn add_at_most(&mut self, lits: &[Self::Lit], bound: usize) {
        let clauses = at_most(lits, bound, || self.new_lit());
        for clause in clauses {
            self.add_clause(&clause);
        }
    }

    /// Decide the asserted system: `Ok(true)` if satisfiable, `Ok(false)` if not,
    /// `Err` with a reason if the engine could not decide.
    fn check(&mut self) -> Result<bool, String>;

    /// The value of `lit` in the model found by the last successful [`Self::check`].
    fn value(&self, lit: Self::Lit) -> Option<bool>;
}

/// [`DecisionProcedure`] backed by the [`varisat`] CDCL solver.
pub struct VarisatBackend {
    solver: Solver<'static>,
    model: Option<Vec<Lit>>,
}

impl Default for VarisatBackend {
    fn default() -> Self {
        Self {
            solver: Solver::new(),
            model: None,
        }
    }
}

impl DecisionProcedure for VarisatBackend {
    type Lit = Lit;

    fn new_lit(&mut self) -> Lit {
        self.solver.new_var().positive()
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        self.solver.add_clause(clause);
    }

    fn check(&mut self) -> Result<bool, String> {
        self.model = None;
        let satisfiable = self.solver.solve().map_err(|err| format!("{err:?}"))?;
        if satisfiable {
            self.model = self.solver.model();
        }
        Ok(satisfiable)
    }

    fn value(&self, lit: Lit) -> Option<bool> {
        // the model holds one literal per variable, in variable order
        self.model.as_ref()
            .and_then(|model| model.get(lit.var().index()))
            .map(|assigned| *assigned == lit)
    }
}
