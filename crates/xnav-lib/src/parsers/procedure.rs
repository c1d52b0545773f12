//! Parser for per-airport CIFP procedure files (`CIFP/<airport>.dat`).
//!
//! Lines look like `SID:010,5,BANGR9,RW16L,ALKIA,K1,P,C,E  B,,,TF,...` with a
//! record type before the colon and comma-separated ARINC 424 fields after
//! it. Consecutive lines sharing a type and procedure identifier form one
//! [`Procedure`]; the transition field groups legs within it. Runway (`RWY`)
//! and procedure data (`PRDAT`) lines are skipped.

use std::io::BufRead;

use tracing::debug;

use super::Acceptor;
use crate::error::{Error, Result, TokenKind};
use crate::model::{FixKey, Procedure, ProcedureKind, ProcedureLeg, Transition};
use crate::tokenizer::RowTokenizer;

/// A procedure together with the airport whose file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureRecord {
    pub airport: String,
    pub procedure: Procedure,
}

fn procedure_kind(record_type: &str) -> Option<ProcedureKind> {
    match record_type {
        "SID" => Some(ProcedureKind::Sid),
        "STAR" => Some(ProcedureKind::Star),
        "APPCH" => Some(ProcedureKind::Approach),
        _ => None,
    }
}

/// CIFP files carry no header; the parser is bound to the airport named by
/// the file instead.
pub struct ProcedureParser<'a, R> {
    tokenizer: RowTokenizer<R>,
    airport: String,
    acceptor: Option<Acceptor<'a, ProcedureRecord>>,
}

impl<'a, R: BufRead> ProcedureParser<'a, R> {
    pub fn new(reader: R, airport: &str) -> Self {
        Self {
            tokenizer: RowTokenizer::new(reader),
            airport: airport.to_string(),
            acceptor: None,
        }
    }

    pub fn airport(&self) -> &str {
        &self.airport
    }

    pub fn set_acceptor<F>(&mut self, acceptor: F)
    where
        F: FnMut(ProcedureRecord) + 'a,
    {
        self.acceptor = Some(Box::new(acceptor));
    }

    /// Emit every procedure in the file. Returns the number emitted.
    pub fn load_procedures(&mut self) -> Result<usize> {
        let sink = self
            .acceptor
            .as_deref_mut()
            .ok_or(Error::AcceptorMissing { parser: "procedure" })?;

        let mut current: Option<Procedure> = None;
        let mut emitted = 0;
        let mut emit = |procedure: Procedure| {
            emitted += 1;
            sink(ProcedureRecord {
                airport: self.airport.clone(),
                procedure,
            });
        };

        self.tokenizer.each_line(|row| {
            let Some(kind) = procedure_kind(&row.parse_field(':')) else {
                return Ok(());
            };
            let (ident, transition_name, route_type, leg) = parse_leg(row)?;

            if current
                .as_ref()
                .is_some_and(|p| p.kind != kind || p.ident != ident)
            {
                if let Some(open) = current.take() {
                    emit(open);
                }
            }
            let procedure = current.get_or_insert_with(|| Procedure {
                kind,
                ident,
                transitions: Vec::new(),
            });

            let position = procedure
                .transitions
                .iter()
                .position(|t| t.name == transition_name);
            let transition = match position {
                Some(position) => &mut procedure.transitions[position],
                None => {
                    procedure.transitions.push(Transition {
                        name: transition_name,
                        route_type,
                        legs: Vec::new(),
                    });
                    let last = procedure.transitions.len() - 1;
                    &mut procedure.transitions[last]
                }
            };
            transition.legs.push(leg);
            Ok(())
        })?;

        if let Some(open) = current {
            emit(open);
        }

        debug!(airport = %self.airport, emitted, "finished procedure scan");
        Ok(emitted)
    }
}

/// `<seq>,<route type>,<ident>,<transition>,<fix>,<region>,<section>,<subsection>,<description>,<turn>,<rnp>,<path terminator>,...`
fn parse_leg<R: BufRead>(
    row: &mut RowTokenizer<R>,
) -> Result<(String, String, String, ProcedureLeg)> {
    let line = row.line_number();
    let sequence = row.parse_field(',');
    if sequence.parse::<u32>().is_err() {
        return Err(Error::MalformedToken {
            line,
            expected: TokenKind::Integer,
            found: Some(sequence).filter(|s| !s.is_empty()),
        });
    }

    let route_type = row.parse_field(',');
    let ident = row.parse_field(',');
    let transition = row.parse_field(',');
    let fix_id = row.parse_field(',');
    let fix_region = row.parse_field(',');
    row.parse_field(','); // section
    row.parse_field(','); // subsection
    let description = row.parse_field(',');
    row.parse_field(','); // turn direction
    row.parse_field(','); // RNP
    let path_terminator = row.parse_field(',');

    let fix = (!fix_id.is_empty()).then(|| FixKey {
        region: fix_region,
        id: fix_id,
    });

    Ok((
        ident,
        transition,
        route_type,
        ProcedureLeg {
            fix,
            path_terminator,
            description,
        },
    ))
}
