use crate::formula::Formula;

// Truth-table oracle for property tests
pub(crate) fn solve_brute_force(f: &Formula) -> bool {
    let num_variables = f.num_variables();
    assert!(num_variables <= 15); // just for safety

    let mut values = vec![false; num_variables];
    for assignment in 0..2u32.pow(num_variables as u32) {
        for (x, value) in values.iter_mut().enumerate() {
            *value = assignment & (1 << x) != 0;
        }
        if f.is_satisfied_by(&values) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse::parse_str;

    fn brute_force(text: &str) -> bool {
        solve_brute_force(&parse_str(text).expect("failed to parse"))
    }

    #[test]
    fn solve_bcp_sat() {
        assert!(brute_force("A B 0\n-A 0"));
    }

    #[test]
    fn solve_bcp_unsat() {
        assert!(!brute_force("A B 0\n-A 0\n-B 0"));
    }

    #[test]
    fn solve_conflict_sat() {
        assert!(brute_force("A B C 0\n-A -B C 0\n-B -C 0"));
    }

    #[test]
    fn solve_empty_clause_unsat() {
        assert!(!brute_force("A 0\n0"));
    }

    #[test]
    fn solve_empty_formula_sat() {
        assert!(brute_force(""));
    }
}
