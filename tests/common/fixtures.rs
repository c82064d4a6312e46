//! Status-page payloads used across harnesses.
//!
//! Each constant is a body a modem firmware might return from its status
//! endpoint. Times are in the formats the firmwares actually emit.

/// Flat OID → value map, the shape of the Hub 3 `/getRouterStatus` body.
/// Rows 1..=4 are complete; row 5 has a time but no message.
pub const FLAT_STATUS_JSON: &str = r#"{
    "1.3.6.1.2.1.69.1.5.8.1.2.1": "06/10/2025 15:02:11",
    "1.3.6.1.2.1.69.1.5.8.1.7.1": "Cable Modem Reboot due to power button reset",
    "1.3.6.1.2.1.69.1.5.8.1.5.1": "6",
    "1.3.6.1.2.1.69.1.5.8.1.2.2": "2025-10-06 16:10:00",
    "1.3.6.1.2.1.69.1.5.8.1.7.2": "No Ranging Response received - T3 time-out;CM-MAC=aa:bb:cc:dd:ee:ff;CMTS-MAC=00:01:5c:00:00:01;CM-QOS=1.1;CM-VER=3.0;",
    "1.3.6.1.2.1.69.1.5.8.1.2.3": "2025-10-06 16:18:40",
    "1.3.6.1.2.1.69.1.5.8.1.7.3": "SYNC Timing Synchronization failure - Loss of Sync",
    "1.3.6.1.2.1.69.1.5.8.1.5.3": "3",
    "1.3.6.1.2.1.69.1.5.8.1.2.4": "2025-10-06 16:25:03",
    "1.3.6.1.2.1.69.1.5.8.1.7.4": "Honoring MDD; IP provisioning mode = IPv4",
    "1.3.6.1.2.1.69.1.5.8.1.2.5": "2025-10-06 16:30:00",
    "1.3.6.1.2.1.126.1.1.1.1.1.3": "1",
    "1.3.6.1.2.1.1.3.0": 123456
}"#;

/// Event objects under `data.events`, newest last.
pub const WRAPPED_EVENTS_JSON: &str = r#"{
    "data": {
        "events": [
            {"time": "2025-10-06T16:10:00", "message": "DHCP RENEW sent - No response for IPv4", "priority": "Error"},
            {"time": "2025-10-06T16:18:40Z", "message": "Cable Modem Reboot", "priority": "Notice"}
        ]
    }
}"#;

/// A bare array of event objects using alternate key spellings.
pub const EVENT_ARRAY_JSON: &str = r#"[
    {"Timestamp": "Mon Oct 06 16:10:00 2025", "Event": "T3 time-out", "Severity": "Warning"},
    {"Date": "2025-10-06 16:20:00", "Text": "Partial Service (US only)"}
]"#;

/// Event log table from an HTML status page.
pub const EVENT_LOG_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Event Log</title></head>
<body>
<table class="eventlog">
  <tr><th>Time</th><th>Priority</th><th>Description</th></tr>
  <tr><td>06/10/2025 15:02:11</td><td>notice</td><td>Cable Modem Reboot due to power button reset</td></tr>
  <tr><td>06/10/2025 16:10:00</td><td>critical</td><td>No Ranging Response received - T3 time-out</td></tr>
  <tr><td>Time Not Established</td><td>notice</td><td>dropped, no usable time</td></tr>
  <tr><td>06/10/2025 16:25:03</td><td>notice</td><td>Honoring MDD; IP provisioning mode = IPv4</td></tr>
</table>
</body>
</html>"#;

/// What some firmwares serve instead of the status page when not logged in.
pub const LOGIN_PAGE_HTML: &str = r#"<html><body>
<form action="/login" method="post">
  <h2>Login</h2>
  <table>
    <tr><td>2025-10-06 16:18:40</td><td>Last login</td></tr>
  </table>
  <input type="password" name="password">
</form>
</body></html>"#;

/// `n` complete rows of a flat snapshot body, indexed `1..=n`.
pub fn flat_status_rows(n: u32) -> String {
    let rows: Vec<String> = (1..=n)
        .flat_map(|i| {
            [
                format!(r#""1.3.6.1.2.1.69.1.5.8.1.2.{i}": "2025-10-06 16:{:02}:00""#, i % 60),
                format!(r#""1.3.6.1.2.1.69.1.5.8.1.7.{i}": "event {i}""#),
            ]
        })
        .collect();
    format!("{{{}}}", rows.join(","))
}
