use crate::formula::parse::ParseError;
use crate::formula::Formula;
use std::io::{BufRead, BufReader, Read};

/// Read a DIMACS CNF file. Variables are named by their decimal index, so `-3` becomes the
/// negated literal over the variable `"3"`.
pub fn parse<R: Read>(reader: R) -> Result<Formula, ParseError> {
    let reader = BufReader::new(reader);

    let mut formula = Formula::new();
    let mut num_clauses = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let mut line = line.split_whitespace().peekable();

        match line.peek() {
            Some(&"c") | None => continue,
            Some(&"p") => {
                let _ = line.next();

                if line.next() != Some("cnf") {
                    return Err(ParseError::InvalidHeader {
                        line: line_no,
                        reason: "missing 'cnf'",
                    });
                }

                let _num_variables = line
                    .next()
                    .and_then(|c| c.parse::<usize>().ok())
                    .ok_or(ParseError::InvalidHeader {
                        line: line_no,
                        reason: "invalid num_variables",
                    })?;

                num_clauses = Some(line.next().and_then(|c| c.parse::<usize>().ok()).ok_or(
                    ParseError::InvalidHeader {
                        line: line_no,
                        reason: "invalid num_clauses",
                    },
                )?);
            }
            Some(_) => {
                let expected = num_clauses.ok_or(ParseError::MissingHeader)?;
                if formula.num_clauses() >= expected {
                    break;
                }

                let mut clause = vec![];
                let mut terminated = false;
                for token in line {
                    match parse_literal(token, line_no)? {
                        Some(l) => clause.push(l),
                        None => {
                            terminated = true;
                            break;
                        }
                    }
                }
                if !terminated {
                    return Err(ParseError::MissingTerminator { line: line_no });
                }
                formula.add_clause(clause.iter().map(|(name, negated)| (name.as_str(), *negated)));
            }
        }
    }

    if num_clauses.is_none() {
        return Err(ParseError::MissingHeader);
    }

    log::debug!(
        "parsed {} DIMACS clauses over {} variables",
        formula.num_clauses(),
        formula.num_variables()
    );
    Ok(formula)
}

pub fn parse_str(input: &str) -> Result<Formula, ParseError> {
    parse(input.as_bytes())
}

fn parse_literal(s: &str, line: usize) -> Result<Option<(String, bool)>, ParseError> {
    let l = s.parse::<i64>().map_err(|_| ParseError::InvalidLiteral {
        line,
        token: s.to_string(),
    })?;
    if l == 0 {
        Ok(None)
    } else {
        Ok(Some((l.unsigned_abs().to_string(), l < 0)))
    }
}
