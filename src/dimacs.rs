//! DIMACS CNF reading and model writing (spec §6.1, §6.2, §4.10).
//!
//! Grounded on `varisat-dimacs`'s `DimacsParser`/`ParserError` for the error
//! taxonomy and on the teacher's `minisat::dimacs` for the token-scanning
//! shape. Reads lazily, one line at a time, off the caller's reader: the
//! multi-instance driver (spec §6.3) keeps reusing the same reader across
//! instances, so `read_instance` must stop exactly at the `0` terminating
//! the last clause rather than consuming the stream to EOF.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::solver::Lit;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("i/o error reading DIMACS input: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: expected 'p cnf <vars> <clauses>' header, found {found:?}")]
    InvalidHeader { line: usize, found: String },
    #[error("line {line}: expected an integer, found {token:?}")]
    UnexpectedToken { line: usize, token: String },
    #[error("line {line}: literal {lit} out of range for {max} variables")]
    LiteralOutOfRange { line: usize, lit: i64, max: usize },
    #[error("unterminated clause at end of input")]
    UnterminatedClause,
    #[error("header declared {expected} clauses, found {found}")]
    ClauseCountMismatch { expected: usize, found: usize },
}

/// A parsed instance: variable count plus clauses, split by length exactly
/// as spec §4.2 requires (units are not clauses, unit/empty clauses are
/// reported as-is so the caller decides how to fold them into the solver).
pub struct Instance {
    pub num_vars: usize,
    pub clauses: Vec<Vec<Lit>>,
}

/// Reads one DIMACS CNF instance, terminated by having consumed exactly
/// `header.clauses` clauses (spec §6.1). Comment lines (`c ...`) are
/// skipped wherever they appear.
pub fn read_instance(reader: &mut impl BufRead) -> Result<Instance, DimacsError> {
    let mut tokens = TokenStream::new(reader);

    let (num_vars, num_clauses) = tokens.read_header()?;

    let mut clauses = Vec::with_capacity(num_clauses);
    let mut current = Vec::new();
    loop {
        match tokens.next_token()? {
            None => {
                if !current.is_empty() {
                    return Err(DimacsError::UnterminatedClause);
                }
                break;
            }
            Some((line, tok)) => {
                let lit: i64 = tok.parse().map_err(|_| DimacsError::UnexpectedToken {
                    line,
                    token: tok.clone(),
                })?;
                if lit == 0 {
                    clauses.push(std::mem::take(&mut current));
                    if clauses.len() == num_clauses {
                        break;
                    }
                } else {
                    if lit.unsigned_abs() as usize > num_vars {
                        return Err(DimacsError::LiteralOutOfRange {
                            line,
                            lit,
                            max: num_vars,
                        });
                    }
                    current.push(Lit::from_dimacs(lit));
                }
            }
        }
    }

    if clauses.len() != num_clauses {
        return Err(DimacsError::ClauseCountMismatch {
            expected: num_clauses,
            found: clauses.len(),
        });
    }

    Ok(Instance { num_vars, clauses })
}

/// Writes the SAT/UNSAT verdict and, on SAT, the model line (spec §6.2).
pub fn write_verdict(out: &mut impl Write, verdict: &crate::solver::Verdict) -> io::Result<()> {
    use crate::solver::Verdict;
    match verdict {
        Verdict::Unsat => writeln!(out, "UNSAT"),
        Verdict::Sat(model) => {
            writeln!(out, "SAT")?;
            for lit in model {
                write!(out, "{} ", lit.to_dimacs())?;
            }
            writeln!(out, "0")
        }
    }
}

/// A minimal whitespace/line tokenizer: `c`-prefixed lines are comments,
/// everything else splits on whitespace. Tracks line numbers for
/// diagnostics. Pulls exactly one line from `reader` at a time, on demand,
/// so it never reads past the instance it is parsing — the caller's reader
/// is left positioned right after the terminating `0` of the last clause,
/// ready for the next `read_instance` call on the same stream.
struct TokenStream<'r, R: BufRead + ?Sized> {
    reader: &'r mut R,
    current: std::vec::IntoIter<String>,
    current_line: usize,
    line_number: usize,
}

impl<'r, R: BufRead + ?Sized> TokenStream<'r, R> {
    fn new(reader: &'r mut R) -> TokenStream<'r, R> {
        TokenStream {
            reader,
            current: Vec::new().into_iter(),
            current_line: 0,
            line_number: 0,
        }
    }

    fn next_token(&mut self) -> Result<Option<(usize, String)>, DimacsError> {
        loop {
            if let Some(tok) = self.current.next() {
                return Ok(Some((self.current_line, tok)));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if line.trim_start().starts_with('c') {
                continue;
            }
            self.current_line = self.line_number;
            self.current = line
                .split_whitespace()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .into_iter();
        }
    }

    fn read_header(&mut self) -> Result<(usize, usize), DimacsError> {
        let (line, p) = self.next_token()?.ok_or(DimacsError::InvalidHeader {
            line: 0,
            found: String::new(),
        })?;
        if p != "p" {
            return Err(DimacsError::InvalidHeader { line, found: p });
        }
        let (line2, cnf) = self.next_token()?.ok_or(DimacsError::InvalidHeader {
            line,
            found: String::new(),
        })?;
        if cnf != "cnf" {
            return Err(DimacsError::InvalidHeader { line: line2, found: cnf });
        }
        let (line3, vars) = self.next_token()?.ok_or(DimacsError::InvalidHeader {
            line: line2,
            found: String::new(),
        })?;
        let num_vars: usize = vars.parse().map_err(|_| DimacsError::InvalidHeader {
            line: line3,
            found: vars.clone(),
        })?;
        let (line4, clauses) = self.next_token()?.ok_or(DimacsError::InvalidHeader {
            line: line3,
            found: String::new(),
        })?;
        let num_clauses: usize = clauses.parse().map_err(|_| DimacsError::InvalidHeader {
            line: line4,
            found: clauses.clone(),
        })?;
        Ok((num_vars, num_clauses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Instance, DimacsError> {
        let mut cursor = Cursor::new(text.as_bytes());
        read_instance(&mut cursor)
    }

    #[test]
    fn parses_header_and_clauses() {
        let inst = parse("c a comment\np cnf 3 2\n1 2 0\n-1 3 0\n").unwrap();
        assert_eq!(inst.num_vars, 3);
        assert_eq!(inst.clauses.len(), 2);
        assert_eq!(inst.clauses[0].len(), 2);
    }

    #[test]
    fn empty_clause_is_read_as_is() {
        let inst = parse("p cnf 1 1\n0\n").unwrap();
        assert_eq!(inst.clauses, vec![Vec::new()]);
    }

    #[test]
    fn rejects_bad_header() {
        assert!(parse("p wat 1 1\n0\n").is_err());
    }

    #[test]
    fn rejects_literal_out_of_range() {
        let err = parse("p cnf 1 1\n2 0\n").unwrap_err();
        assert!(matches!(err, DimacsError::LiteralOutOfRange { .. }));
    }

    #[test]
    fn rejects_clause_count_mismatch() {
        let err = parse("p cnf 2 2\n1 0\n").unwrap_err();
        assert!(matches!(err, DimacsError::ClauseCountMismatch { .. }));
    }
}
