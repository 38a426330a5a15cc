pub mod dimacs;
pub mod parse;

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Variable(pub usize);

/// A variable index and a polarity packed into one integer: `(index << 1) | negated`.
///
/// The two literals of a variable differ only in the lowest bit, so the complement of a
/// literal is a single xor.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Literal(usize);

impl Literal {
    pub fn new(variable: Variable, negated: bool) -> Self {
        Literal((variable.0 << 1) | negated as usize)
    }

    pub fn from_code(code: usize) -> Self {
        Literal(code)
    }

    pub fn code(self) -> usize {
        self.0
    }

    pub fn variable(self) -> Variable {
        Variable(self.0 >> 1)
    }

    pub fn idx(self) -> usize {
        self.0 >> 1
    }

    pub fn is_negated(self) -> bool {
        self.0 & 1 == 1
    }

    pub fn is_positive(self) -> bool {
        !self.is_negated()
    }

    pub fn complement(self) -> Self {
        Literal(self.0 ^ 1)
    }

    /// The truth value of this literal when its variable is set to `value`.
    pub fn eval(self, value: bool) -> bool {
        value != self.is_negated()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.is_negated() {
            write!(f, "!{}", self.idx())
        } else {
            write!(f, "{}", self.idx())
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("literal {} refers to a variable that was never encoded", .literal.code())]
pub struct LookupError {
    pub literal: Literal,
}

/// Assigns dense indices to variable names in order of first appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariableMap {
    indices: HashMap<String, Variable>,
    names: Vec<String>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a literal over `name`, allocating the next free index on first sight.
    pub fn encode(&mut self, name: &str, negated: bool) -> Literal {
        let variable = match self.indices.get(name) {
            Some(v) => *v,
            None => {
                let v = Variable(self.names.len());
                self.indices.insert(name.to_string(), v);
                self.names.push(name.to_string());
                v
            }
        };
        Literal::new(variable, negated)
    }

    pub fn decode(&self, literal: Literal) -> Result<(&str, bool), LookupError> {
        self.name(literal.variable())
            .map(|name| (name, literal.is_negated()))
            .ok_or(LookupError { literal })
    }

    pub fn index_of(&self, name: &str) -> Option<Variable> {
        self.indices.get(name).copied()
    }

    pub fn name(&self, variable: Variable) -> Option<&str> {
        self.names.get(variable.0).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A disjunction of literals, kept sorted and free of duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(disjuncts: impl IntoIterator<Item = Literal>) -> Self {
        let mut literals: Vec<Literal> = disjuncts.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        Self { literals }
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.binary_search(&literal).is_ok()
    }

    /// The only literal of a unit clause.
    pub fn unit(&self) -> Option<Literal> {
        match self.literals.as_slice() {
            [l] => Some(*l),
            _ => None,
        }
    }

    pub fn is_tautology(&self) -> bool {
        // complementary literals are adjacent once sorted
        self.literals
            .windows(2)
            .any(|pair| pair[0].variable() == pair[1].variable())
    }

    /// Drop `literal` from the clause. Returns whether it was present.
    pub fn remove(&mut self, literal: Literal) -> bool {
        match self.literals.binary_search(&literal) {
            Ok(i) => {
                self.literals.remove(i);
                true
            }
            Err(_) => false,
        }
    }
}

/// A CNF formula together with the names of its variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Formula {
    variables: VariableMap,
    clauses: Vec<Clause>,
}

impl Formula {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause given as `(name, negated)` pairs.
    pub fn add_clause<'a>(&mut self, literals: impl IntoIterator<Item = (&'a str, bool)>) {
        let variables = &mut self.variables;
        let clause = Clause::new(
            literals
                .into_iter()
                .map(|(name, negated)| variables.encode(name, negated)),
        );
        self.clauses.push(clause);
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Evaluate under a total assignment indexed by variable.
    ///
    /// Panics unless `values` holds exactly one entry per variable.
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        assert_eq!(
            values.len(),
            self.num_variables(),
            "assignment does not cover every variable"
        );
        self.clauses
            .iter()
            .all(|clause| clause.literals().any(|l| l.eval(values[l.idx()])))
    }
}

/// Renders clauses as `(A | !B) & C`, naming variables through `variables`.
pub(crate) fn fmt_clauses<'a>(
    f: &mut Formatter,
    clauses: impl IntoIterator<Item = &'a Clause>,
    variables: &VariableMap,
) -> fmt::Result {
    let mut first_clause = true;
    for clause in clauses {
        if first_clause {
            first_clause = false;
        } else {
            f.write_str(" & ")?;
        }
        if clause.len() != 1 {
            f.write_str("(")?;
        }
        let mut first_literal = true;
        for literal in clause.literals() {
            if first_literal {
                first_literal = false;
            } else {
                f.write_str(" | ")?;
            }
            match variables.decode(*literal) {
                Ok((name, true)) => write!(f, "!{}", name)?,
                Ok((name, false)) => f.write_str(name)?,
                Err(_) => write!(f, "{}", literal)?,
            }
        }
        if clause.len() != 1 {
            f.write_str(")")?;
        }
    }
    Ok(())
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fmt_clauses(f, &self.clauses, &self.variables)
    }
}

/// Random formulas over at most six variables named `x0`..`x5`.
#[cfg(test)]
pub(crate) fn small_formula_strategy() -> impl proptest::strategy::Strategy<Value = Formula> {
    use proptest::prelude::*;

    let literal = (0..6usize, any::<bool>());
    let clause = proptest::collection::vec(literal, 1..=3);
    proptest::collection::vec(clause, 1..=12).prop_map(|clauses| {
        let mut formula = Formula::new();
        for clause in clauses {
            let named: Vec<(String, bool)> = clause
                .into_iter()
                .map(|(v, negated)| (format!("x{}", v), negated))
                .collect();
            formula.add_clause(named.iter().map(|(name, negated)| (name.as_str(), *negated)));
        }
        formula
    })
}
