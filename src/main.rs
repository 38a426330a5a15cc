use clap::{value_t, App, Arg};
use namesat::formula::{dimacs, parse};
use namesat::*;
use std::fs::File;
use std::io::Read;

fn main() {
    env_logger::init();

    let matches = App::new("namesat")
        .about("Decides satisfiability of CNF formulas with DPLL")
        .arg(Arg::with_name("INPUT").help("input file (one clause per line)").index(1))
        .arg(
            Arg::with_name("dimacs")
                .long("dimacs")
                .help("read the input as DIMACS CNF"),
        )
        .arg(
            Arg::with_name("max-decisions")
                .long("max-decisions")
                .value_name("N")
                .takes_value(true)
                .help("give up and report UNKNOWN after N branching decisions"),
        )
        .get_matches();

    let max_decisions = if matches.is_present("max-decisions") {
        Some(value_t!(matches, "max-decisions", u64).unwrap_or_else(|e| e.exit()))
    } else {
        None
    };

    let f = load(matches.value_of("INPUT"), matches.is_present("dimacs"));

    match f {
        Ok(f) => {
            log::info!(
                "solving {} clauses over {} variables",
                f.num_clauses(),
                f.num_variables()
            );
            let mut solver = Solver::new(f);
            let result = match max_decisions {
                Some(max) => solver.solve_bounded(max),
                None => Some(solver.solve()),
            };
            log::info!("{:?}", solver.stats());

            let exit_code = match result {
                Some(result) => {
                    print!("{}", result);
                    if result.is_satisfiable() {
                        0
                    } else {
                        1
                    }
                }
                None => {
                    println!("UNKNOWN");
                    2
                }
            };
            std::process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("parse error: {}", e);
            std::process::exit(-1);
        }
    }
}

fn load(path: Option<&str>, is_dimacs: bool) -> Result<Formula, ParseError> {
    match path {
        Some(path) => parse_from(File::open(path)?, is_dimacs),
        None => parse_from(std::io::stdin(), is_dimacs),
    }
}

fn parse_from<R: Read>(reader: R, is_dimacs: bool) -> Result<Formula, ParseError> {
    if is_dimacs {
        dimacs::parse(reader)
    } else {
        parse::parse(reader)
    }
}
