use crate::formula::{Formula, Literal, Variable};
use crate::store::{ClauseStore, Snapshot};
use crate::{Model, SatResult};
use log::trace;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
    /// Implied by a unit clause. Never retried.
    Forced,
    /// A branch whose opposite polarity has not been tried yet.
    BranchUntried,
    /// A branch already flipped once; backtracking goes past it.
    BranchExhausted,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TrailEntry {
    pub literal: Literal,
    pub kind: EntryKind,
}

#[derive(Clone, Debug, Default)]
pub struct Trail {
    entries: Vec<TrailEntry>,
}

impl Trail {
    fn push(&mut self, literal: Literal, kind: EntryKind) {
        self.entries.push(TrailEntry { literal, kind });
    }

    fn last_untried_branch(&self) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|e| e.kind == EntryKind::BranchUntried)
    }

    fn split_off(&mut self, at: usize) -> Vec<TrailEntry> {
        self.entries.split_off(at)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// a variable is set iff it is on the trail
#[derive(Clone, Debug)]
struct Assignment {
    values: Vec<Option<bool>>,
}

impl Assignment {
    fn new(num_variables: usize) -> Self {
        Self {
            values: vec![None; num_variables],
        }
    }

    fn assign(&mut self, literal: Literal) {
        debug_assert_eq!(self.values[literal.idx()], None);
        self.values[literal.idx()] = Some(literal.is_positive());
    }

    fn unassign(&mut self, variable: Variable) {
        self.values[variable.0] = None;
    }

    fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
    }

    fn values(&self) -> &[Option<bool>] {
        &self.values
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SearchState {
    Propagating,
    Branching,
    Backtracking,
    Satisfied,
    Unsatisfiable,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SolverStats {
    pub decisions: u64,
    pub propagations: u64,
    pub backtracks: u64,
}

enum Outcome {
    Done(SatResult),
    OutOfBudget,
}

/// Chronological-backtracking DPLL over a destructively simplified clause store.
///
/// Backtracking never reverses a simplification. Instead the store is restored from the
/// snapshot taken before the first decision and the surviving trail prefix is replayed.
pub struct Solver {
    formula: Formula,
    store: ClauseStore,
    snapshot: Snapshot,
    assignment: Assignment,
    trail: Trail,
    stats: SolverStats,
}

impl Solver {
    pub fn new(formula: Formula) -> Self {
        let store = ClauseStore::new(&formula);
        let snapshot = store.snapshot();
        let assignment = Assignment::new(formula.num_variables());
        Self {
            formula,
            store,
            snapshot,
            assignment,
            trail: Trail::default(),
            stats: SolverStats::default(),
        }
    }

    pub fn solve(&mut self) -> SatResult {
        match self.run(None) {
            Outcome::Done(result) => result,
            Outcome::OutOfBudget => unreachable!("unbounded search ran out of budget"),
        }
    }

    /// Like [`Solver::solve`], but gives up once `max_decisions` branches have been taken.
    /// `None` means the verdict is unknown.
    pub fn solve_bounded(&mut self, max_decisions: u64) -> Option<SatResult> {
        match self.run(Some(max_decisions)) {
            Outcome::Done(result) => Some(result),
            Outcome::OutOfBudget => None,
        }
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    fn run(&mut self, max_decisions: Option<u64>) -> Outcome {
        self.reset();

        let mut state = self.status();
        loop {
            state = match state {
                SearchState::Propagating => self.propagate(),
                SearchState::Branching => {
                    if max_decisions.map_or(false, |max| self.stats.decisions >= max) {
                        log::debug!("decision budget exhausted: {:?}", self.stats);
                        return Outcome::OutOfBudget;
                    }
                    self.branch()
                }
                SearchState::Backtracking => self.backtrack(),
                SearchState::Satisfied => {
                    log::debug!("satisfiable: {:?}", self.stats);
                    return Outcome::Done(SatResult::Satisfiable(self.model()));
                }
                SearchState::Unsatisfiable => {
                    log::debug!("unsatisfiable: {:?}", self.stats);
                    return Outcome::Done(SatResult::Unsatisfiable);
                }
            }
        }
    }

    fn reset(&mut self) {
        self.store.restore(&self.snapshot);
        self.assignment.clear();
        self.trail.clear();
        self.stats = SolverStats::default();
    }

    fn status(&self) -> SearchState {
        if self.store.has_empty_clause() {
            SearchState::Backtracking
        } else if self.store.is_empty() {
            SearchState::Satisfied
        } else {
            SearchState::Propagating
        }
    }

    fn decide(&mut self, literal: Literal, kind: EntryKind) {
        trace!("{:?} {} at trail depth {}", kind, literal, self.trail.len());
        self.assignment.assign(literal);
        self.trail.push(literal, kind);
        self.store.simplify(literal);
    }

    fn propagate(&mut self) -> SearchState {
        while let Some(literal) = self.store.find_unit_clause() {
            self.stats.propagations += 1;
            self.decide(literal, EntryKind::Forced);
            match self.status() {
                SearchState::Propagating => continue,
                state => return state,
            }
        }
        SearchState::Branching
    }

    fn branch(&mut self) -> SearchState {
        let literal = match self.pick_branch_literal() {
            Some(literal) => literal,
            None => unreachable!("open clause set without an unassigned literal"),
        };
        self.stats.decisions += 1;
        self.decide(literal, EntryKind::BranchUntried);
        self.status()
    }

    // lowest variable still in the store; negative only if it never occurs positively
    fn pick_branch_literal(&self) -> Option<Literal> {
        let variable = self
            .store
            .clauses()
            .flat_map(|clause| clause.literals())
            .map(|literal| literal.variable())
            .min()?;
        let positive = Literal::new(variable, false);
        let only_negated = !self
            .store
            .clauses()
            .any(|clause| clause.contains(positive));
        Some(if only_negated {
            positive.complement()
        } else {
            positive
        })
    }

    fn backtrack(&mut self) -> SearchState {
        let idx = match self.trail.last_untried_branch() {
            Some(idx) => idx,
            None => return SearchState::Unsatisfiable,
        };
        self.stats.backtracks += 1;

        let dropped = self.trail.split_off(idx);
        for entry in &dropped {
            self.assignment.unassign(entry.literal.variable());
        }
        trace!(
            "backtrack: dropping {} entries, flipping {}",
            dropped.len(),
            dropped[0].literal
        );

        self.store.restore(&self.snapshot);
        for entry in self.trail.entries() {
            self.store.simplify(entry.literal);
        }
        trace!(
            "replayed {} entries: {}",
            self.trail.len(),
            self.store.named(self.formula.variables())
        );

        self.decide(dropped[0].literal.complement(), EntryKind::BranchExhausted);
        self.status()
    }

    fn model(&self) -> Model {
        Model::new(
            self.formula.variables().clone(),
            self.assignment.values().to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::solve_brute_force;
    use crate::formula::parse::parse_str;
    use crate::formula::small_formula_strategy;
    use proptest::prelude::*;
    use test_env_log::test;

    fn p(x: usize) -> Literal {
        Literal::new(Variable(x), false)
    }
    fn n(x: usize) -> Literal {
        Literal::new(Variable(x), true)
    }

    fn solver(text: &str) -> Solver {
        Solver::new(parse_str(text).expect("failed to parse"))
    }

    fn trail(solver: &Solver) -> Vec<(Literal, EntryKind)> {
        solver
            .trail()
            .entries()
            .iter()
            .map(|e| (e.literal, e.kind))
            .collect()
    }

    #[test]
    fn solve_single_unit() {
        let mut s = solver("A 0");
        let model = s.solve().model().cloned().expect("should be sat");
        assert_eq!(model.get("A"), Some(true));
        assert_eq!(trail(&s), vec![(p(0), EntryKind::Forced)]);
    }

    #[test]
    fn solve_conflicting_units() {
        let mut s = solver("A 0\n-A 0");
        assert_eq!(s.solve(), SatResult::Unsatisfiable);
        assert_eq!(s.stats().decisions, 0);
    }

    #[test]
    fn solve_all_four_binary_clauses() {
        let mut s = solver("A B 0\n-A B 0\nA -B 0\n-A -B 0");
        assert_eq!(s.solve(), SatResult::Unsatisfiable);
        assert_eq!(s.stats().decisions, 1);
        assert_eq!(s.stats().backtracks, 1);
    }

    #[test]
    fn solve_bcp_sat() {
        let mut s = solver("A B 0\n-A 0");
        let model = s.solve().model().cloned().expect("should be sat");
        assert_eq!(model.get("A"), Some(false));
        assert_eq!(model.get("B"), Some(true));
        assert_eq!(
            trail(&s),
            vec![(n(0), EntryKind::Forced), (p(1), EntryKind::Forced)]
        );
        assert_eq!(s.stats().decisions, 0);
    }

    #[test]
    fn solve_single_wide_clause() {
        let f = parse_str("A B C 0").unwrap();
        let model = Solver::new(f.clone()).solve().model().cloned().expect("should be sat");
        assert!(model.satisfies(&f));
        assert!(model.iter().any(|(_, value)| value));
        // the first branch satisfies the clause, leaving B and C free
        assert_eq!(model.get("A"), Some(true));
        assert_eq!(model.get("B"), None);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn empty_clause_before_any_decision() {
        let mut s = solver("A B 0\n0\nC 0");
        assert_eq!(s.solve(), SatResult::Unsatisfiable);
        assert!(s.trail().is_empty());
    }

    #[test]
    fn empty_formula_is_sat() {
        let mut s = Solver::new(Formula::new());
        let model = s.solve().model().cloned().expect("should be sat");
        assert!(model.is_empty());
    }

    #[test]
    fn tautologies_only_is_sat() {
        let mut s = solver("A -A 0\nB -B 0");
        let model = s.solve().model().cloned().expect("should be sat");
        assert!(model.is_empty());
    }

    #[test]
    fn branch_prefers_pure_negative() {
        // A occurs only negated, so the first branch is !A, which satisfies everything
        let mut s = solver("-A B 0\n-A -B 0");
        let model = s.solve().model().cloned().expect("should be sat");
        assert_eq!(model.get("A"), Some(false));
        assert_eq!(trail(&s), vec![(n(0), EntryKind::BranchUntried)]);
    }

    #[test]
    fn branch_defaults_to_positive() {
        let mut s = solver("A B 0\n-A B 0");
        let model = s.solve().model().cloned().expect("should be sat");
        assert_eq!(
            trail(&s),
            vec![(p(0), EntryKind::BranchUntried), (p(1), EntryKind::Forced)]
        );
        assert_eq!(model.get("B"), Some(true));
    }

    #[test]
    fn backtrack_flips_last_branch() {
        // A=true forces B and !B; flipping A to false satisfies the rest via C
        let mut s = solver("-A B 0\n-A -B 0\nA C 0\nA -C D 0\nA B C 0");
        let model = s.solve().model().cloned().expect("should be sat");
        assert_eq!(model.get("A"), Some(false));
        assert_eq!(model.get("C"), Some(true));
        assert_eq!(model.get("D"), Some(true));
        assert_eq!(trail(&s)[0], (n(0), EntryKind::BranchExhausted));
        assert_eq!(s.stats().backtracks, 1);
    }

    #[test]
    fn backtrack_replays_forced_prefix() {
        // Z is forced first and must survive the backtrack over A
        let mut s = solver("Z 0\n-Z A B 0\n-A C 0\n-A -C 0\nA B 0\n-B D 0");
        let model = s.solve().model().cloned().expect("should be sat");
        assert_eq!(model.get("Z"), Some(true));
        assert_eq!(model.get("A"), Some(false));
        assert_eq!(model.get("B"), Some(true));
        assert_eq!(model.get("D"), Some(true));
        assert_eq!(trail(&s)[0], (p(0), EntryKind::Forced));
        assert_eq!(trail(&s)[1].1, EntryKind::BranchExhausted);
    }

    #[test]
    fn solve_is_repeatable() {
        let mut s = solver("A B C 0\n-A -B 0\n-B -C 0\n-A -C 0\nA -C 0");
        let first = s.solve();
        let first_trail = trail(&s);
        let second = s.solve();
        assert_eq!(first, second);
        assert_eq!(first_trail, trail(&s));
    }

    #[test]
    fn bounded_search_gives_up() {
        let text = "A B 0\n-A B 0\nA -B 0\n-A -B 0";
        assert_eq!(solver(text).solve_bounded(0), None);
        assert_eq!(
            solver(text).solve_bounded(1),
            Some(SatResult::Unsatisfiable)
        );
        // no branching needed at all
        assert_eq!(solver("A 0\n-A 0").solve_bounded(0), Some(SatResult::Unsatisfiable));
    }

    #[test]
    fn solve_simple() {
        let s = "-x0 0\n-x0 -x1 0\n-x1 x2 x3 0\n-x1 x3 -x3 0";
        let f = parse_str(s).unwrap();
        let r = Solver::new(f.clone()).solve();
        assert!(r.model().expect("should be sat").satisfies(&f));
    }

    #[test]
    fn solve_failing() {
        let text = "-x1 x1 -x7 0
-x10 -x13 -x1 0
-x7 -x7 -x10 0
x6 -x9 -x15 0
-x2 -x1 -x1 0
-x6 -x7 -x15 0
x9 x10 x6 0
-x13 -x7 -x9 0
x9 x15 x15 0";
        let f = parse_str(text).unwrap();
        let brute_force = solve_brute_force(&f);
        let result = Solver::new(f.clone()).solve();
        assert_eq!(result.is_satisfiable(), brute_force);
        if let Some(model) = result.model() {
            assert!(model.satisfies(&f));
        }
    }

    #[test]
    fn pigeonhole_three_into_two() {
        // three pigeons, two holes
        let text = "p11 p12 0
p21 p22 0
p31 p32 0
-p11 -p21 0
-p11 -p31 0
-p21 -p31 0
-p12 -p22 0
-p12 -p32 0
-p22 -p32 0";
        let mut s = solver(text);
        assert_eq!(s.solve(), SatResult::Unsatisfiable);
        assert!(s.stats().backtracks > 0);
    }

    proptest! {
        #[test]
        fn proptest_solve(f in small_formula_strategy()) {
            let brute_force = solve_brute_force(&f);
            let result = Solver::new(f.clone()).solve();
            log::trace!("result = {:?}", result);
            prop_assert_eq!(result.is_satisfiable(), brute_force);
            if let Some(model) = result.model() {
                prop_assert!(model.satisfies(&f));
            }
        }

        #[test]
        fn proptest_deterministic(f in small_formula_strategy()) {
            let first = Solver::new(f.clone()).solve();
            let second = Solver::new(f).solve();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn proptest_assignment_matches_trail(f in small_formula_strategy()) {
            let mut solver = Solver::new(f);
            if let SatResult::Satisfiable(model) = solver.solve() {
                prop_assert_eq!(model.len(), solver.trail().len());
                for entry in solver.trail().entries() {
                    let (name, negated) = solver.formula().variables().decode(entry.literal).unwrap();
                    prop_assert_eq!(model.get(name), Some(!negated));
                }
            }
        }
    }
}
