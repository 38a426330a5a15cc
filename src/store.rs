use crate::formula::{fmt_clauses, Clause, Formula, Literal, VariableMap};
use std::fmt::{self, Display, Formatter};

/// The working clause set of a search, simplified destructively as literals are decided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClauseStore {
    clauses: Vec<Clause>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    clauses: Vec<Clause>,
}

impl ClauseStore {
    // tautologies are always satisfied, so they never enter the store
    pub fn new(formula: &Formula) -> Self {
        let clauses: Vec<Clause> = formula
            .clauses()
            .filter(|clause| !clause.is_tautology())
            .cloned()
            .collect();
        if clauses.len() < formula.num_clauses() {
            log::debug!(
                "dropped {} tautological clauses",
                formula.num_clauses() - clauses.len()
            );
        }
        Self { clauses }
    }

    /// Make `literal` true: drop every clause it satisfies and strip its complement from the rest.
    pub fn simplify(&mut self, literal: Literal) {
        let falsified = literal.complement();
        self.clauses.retain(|clause| !clause.contains(literal));
        for clause in &mut self.clauses {
            clause.remove(falsified);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }

    // first unit clause in store order, which is input order
    pub fn find_unit_clause(&self) -> Option<Literal> {
        self.clauses.iter().find_map(Clause::unit)
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            clauses: self.clauses.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.clauses.clone_from(&snapshot.clauses);
    }

    /// A view of the remaining clauses that prints variables by name, e.g. `(A | !B) & C`.
    pub fn named<'a>(&'a self, variables: &'a VariableMap) -> NamedClauses<'a> {
        NamedClauses {
            store: self,
            variables,
        }
    }
}

pub struct NamedClauses<'a> {
    store: &'a ClauseStore,
    variables: &'a VariableMap,
}

impl Display for NamedClauses<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.store.is_empty() {
            return f.write_str("<empty>");
        }
        fmt_clauses(f, &self.store.clauses, self.variables)
    }
}
