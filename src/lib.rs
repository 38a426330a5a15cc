pub mod formula;
mod report;
mod solver;
mod store;

#[cfg(test)]
mod brute_force;

use formula::parse::parse_str;

pub use formula::parse::ParseError;
pub use formula::{Clause, Formula, Literal, LookupError, Variable, VariableMap};
pub use solver::{EntryKind, Solver, SolverStats, Trail, TrailEntry};
pub use store::{ClauseStore, NamedClauses, Snapshot};

#[derive(PartialEq, Clone, Debug)]
pub enum SatResult {
    Satisfiable(Model),
    Unsatisfiable,
}

impl SatResult {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SatResult::Satisfiable(_))
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            SatResult::Satisfiable(model) => Some(model),
            SatResult::Unsatisfiable => None,
        }
    }
}

/// The variables fixed on the search path that satisfied the formula.
///
/// Variables the formula no longer constrained when the search ended are absent.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Model {
    variables: VariableMap,
    values: Vec<Option<bool>>,
}

impl Model {
    pub(crate) fn new(variables: VariableMap, values: Vec<Option<bool>>) -> Self {
        debug_assert_eq!(variables.len(), values.len());
        Self { variables, values }
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.variables
            .index_of(name)
            .and_then(|v| self.values[v.0])
    }

    /// Assigned variables in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.variables
            .names()
            .zip(&self.values)
            .filter_map(|(name, value)| value.map(|value| (name, value)))
    }

    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every clause of `formula` against this model, reading unset variables as false.
    pub fn satisfies(&self, formula: &Formula) -> bool {
        let values: Vec<bool> = formula
            .variables()
            .names()
            .map(|name| self.get(name).unwrap_or(false))
            .collect();
        formula.is_satisfied_by(&values)
    }
}

/// Parse `text` (one clause per line, each ended by `0`) and decide it.
pub fn solve(text: &str) -> Result<SatResult, ParseError> {
    let formula = parse_str(text)?;
    Ok(Solver::new(formula).solve())
}
