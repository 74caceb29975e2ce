use super::types::{InterfaceRecord, ParseError, ParseResult};

const FIELD_COUNT: usize = 6;

/// IOS prints an admin-shutdown interface's status as two words.
const ADMIN_PREFIX: &str = "administratively";

/// Parse `show ip interface brief` style output into interface records.
///
/// Every non-blank line must split into the six columns
/// `Interface IP-Address OK? Method Status Protocol`. The first line is the
/// column header and is dropped after it has been validated.
///
/// Two shapes outside the six-column rule are accepted instead of failing the
/// device: blank lines are skipped, and a seven-field row whose status is
/// `administratively down` keeps that two-word status. Any other field count
/// is `FieldCount`.
pub fn parse_interface_brief(device: &str, output: &str) -> ParseResult<Vec<InterfaceRecord>> {
    let mut rows = output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_row);

    match rows.next() {
        Some(header) => {
            header?;
        }
        None => return Err(ParseError::NoOutput),
    }

    rows.map(|row| -> ParseResult<InterfaceRecord> {
        let [name, ip_address, ok_flag, method, line_status, protocol_status] = row?;
        Ok(InterfaceRecord {
            device: device.to_string(),
            name,
            ip_address,
            ok_flag,
            method,
            line_status,
            protocol_status,
        })
    })
    .collect()
}

fn split_row(line: &str) -> ParseResult<[String; FIELD_COUNT]> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    match fields.as_slice() {
        [name, ip, ok, method, status, protocol] => Ok([
            name.to_string(),
            ip.to_string(),
            ok.to_string(),
            method.to_string(),
            status.to_string(),
            protocol.to_string(),
        ]),
        [name, ip, ok, method, prefix, status, protocol] if *prefix == ADMIN_PREFIX => Ok([
            name.to_string(),
            ip.to_string(),
            ok.to_string(),
            method.to_string(),
            format!("{} {}", prefix, status),
            protocol.to_string(),
        ]),
        _ => Err(ParseError::FieldCount {
            line: line.trim().to_string(),
            found: fields.len(),
        }),
    }
}
