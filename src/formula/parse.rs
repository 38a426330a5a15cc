//! Reader for the line-oriented clause format: one clause per line, literals separated by single
//! spaces, `-` marks a negated literal, and the token `0` ends the clause.

use crate::formula::Formula;
use std::io::{BufRead, BufReader, Read};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read input")]
    Io(#[from] std::io::Error),
    #[error("line {line}: clause is missing its terminating `0`")]
    MissingTerminator { line: usize },
    #[error("line {line}: empty literal")]
    EmptyLiteral { line: usize },
    #[error("line {line}: invalid literal `{token}`")]
    InvalidLiteral { line: usize, token: String },
    #[error("missing 'p' line before clauses")]
    MissingHeader,
    #[error("line {line}: invalid header: {reason}")]
    InvalidHeader { line: usize, reason: &'static str },
}

pub fn parse<R: Read>(reader: R) -> Result<Formula, ParseError> {
    let reader = BufReader::new(reader);
    let mut formula = Formula::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let mut clause = vec![];
        let mut terminated = false;
        for token in line.split(' ') {
            if token == "0" {
                terminated = true;
                break;
            }
            clause.push(parse_literal(token, line_no)?);
        }
        if !terminated {
            return Err(ParseError::MissingTerminator { line: line_no });
        }
        log::trace!("line {}: clause of {} literals", line_no, clause.len());
        formula.add_clause(clause);
    }

    log::debug!(
        "parsed {} clauses over {} variables",
        formula.num_clauses(),
        formula.num_variables()
    );
    Ok(formula)
}

pub fn parse_str(input: &str) -> Result<Formula, ParseError> {
    parse(input.as_bytes())
}

fn parse_literal(token: &str, line: usize) -> Result<(&str, bool), ParseError> {
    let (name, negated) = match token.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if name.is_empty() {
        return Err(ParseError::EmptyLiteral { line });
    }
    Ok((name, negated))
}
