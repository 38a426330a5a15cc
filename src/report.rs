//! Text rendering of solver verdicts.

use crate::{Model, SatResult};
use std::fmt::{self, Display, Formatter};

impl Display for Model {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

impl Display for SatResult {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SatResult::Satisfiable(model) => {
                writeln!(f, "SATISFIABLE")?;
                write!(f, "{}", model)
            }
            SatResult::Unsatisfiable => writeln!(f, "UNSATISFIABLE"),
        }
    }
}
