//! Agent values → snapshot text.

use async_snmp::Value;

/// Text for a GET result, or `None` for the SNMP exception values.
pub fn render(value: &Value) -> Option<String> {
    match value {
        Value::OctetString(bytes) | Value::Opaque(bytes) => Some(render_octets(bytes)),
        Value::Integer(v) => Some(v.to_string()),
        Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(v.to_string()),
        Value::Counter64(v) => Some(v.to_string()),
        _ => None,
    }
}

/// Printable octets come back as text with trailing NULs cut. Anything else
/// is tried as a `DateAndTime`, then rendered lossily.
pub fn render_octets(bytes: &[u8]) -> String {
    let trimmed = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map_or(&bytes[..0], |end| &bytes[..=end]);
    match std::str::from_utf8(trimmed) {
        Ok(text) if text.chars().all(|c| !c.is_control() || c.is_whitespace()) => text.to_string(),
        _ => date_and_time(bytes).unwrap_or_else(|| String::from_utf8_lossy(trimmed).into_owned()),
    }
}

/// SNMPv2-TC `DateAndTime`: year(2) month day hour minute second decisecond
/// [direction hours minutes]. The zone suffix is ignored.
fn date_and_time(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 8 && bytes.len() != 11 {
        return None;
    }
    let year = u16::from_be_bytes([bytes[0], bytes[1]]);
    let (month, day, hour, minute, second) = (bytes[2], bytes[3], bytes[4], bytes[5], bytes[6]);
    let plausible = (1970..=2200).contains(&year)
        && (1..=12).contains(&month)
        && (1..=31).contains(&day)
        && hour < 24
        && minute < 60
        && second <= 60;
    plausible.then(|| format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"))
}
