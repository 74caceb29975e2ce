use super::types::{ParseError, ParseResult};
use std::collections::BTreeMap;

/// Parse the output of `show interfaces <name> | include errors`.
///
/// The output is a comma-separated run of `<value> <label>` clauses, possibly
/// wrapped across several lines. A label printed twice keeps its last value.
///
/// Output without a single clause is `NoOutput`, and an empty clause (such as
/// one left by a trailing comma) is an error. Blank lines between wrapped
/// lines carry no clauses and are ignored.
pub fn parse_counter_output(output: &str) -> ParseResult<BTreeMap<String, u64>> {
    let mut counters = BTreeMap::new();

    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        for clause in line.split(',') {
            parse_clause(line, clause.trim(), &mut counters)?;
        }
    }

    if counters.is_empty() {
        return Err(ParseError::NoOutput);
    }

    Ok(counters)
}

fn parse_clause(
    line: &str,
    clause: &str,
    counters: &mut BTreeMap<String, u64>,
) -> ParseResult<()> {
    if clause.is_empty() {
        return Err(ParseError::EmptyCounterClause {
            line: line.trim().to_string(),
        });
    }

    let (value, label) = clause
        .split_once(' ')
        .ok_or_else(|| ParseError::MissingCounterLabel {
            clause: clause.to_string(),
        })?;

    let value: u64 = value
        .parse()
        .map_err(|_| ParseError::InvalidCounterValue {
            clause: clause.to_string(),
        })?;

    counters.insert(label.trim().to_string(), value);
    Ok(())
}
