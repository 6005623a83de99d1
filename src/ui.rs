//! Settings web UI helpers.
//!
//! Request parsing and page rendering for the settings UI. Kept free of any
//! HTTP server types so the text in and out can be tested on the host; the
//! ESP-IDF server in [`adapters::web`](crate::adapters) only moves bytes.

use core::fmt::Write as _;

use crate::app::status::StatusView;
use crate::settings::ControlSettings;

const INDEX_TEMPLATE: &str = r#"<html>
  <head>
    <title>Humidistat</title>
    <style>
      body { background-color: #99FF66; font-family: Arial, Helvetica, Sans-Serif; Color: #996633; }
    </style>
  </head>
  <body>
    <h1> Current humidity: {{humidity}} </h1>
    <h1> Current time: {{time}} </h1>
    <h2> High humidity setting: {{highValue}} </h2>
    <h2> Low  humidity setting: {{lowValue}} </h2>
    <h1>Change settings for humidity</h1><br>
    <form method="post" enctype="application/x-www-form-urlencoded" action="/settings/">
      <label for="highValue"> High value </label>
      <input value="{{highValue}}" id="highValue" type="text" name='highValue'><br>
      <label for="lowValue"> Low value </label>
      <input value="{{lowValue}}" id="lowValue" type="text" name='lowValue'><br>
      <label for="offset"> Timezone offset in hours </label>
      <input value="{{offset}}" id="offset" type="text" name='offset'><br>
      <input type="submit" value="Submit">
    </form>
  </body>
</html>"#;

/// Fill the status page template.
pub fn render_index(status: &StatusView) -> String {
    INDEX_TEMPLATE
        .replace("{{humidity}}", &format!("{:.2}", status.humidity))
        .replace("{{time}}", &status.time)
        .replace("{{highValue}}", &status.high_value.to_string())
        .replace("{{lowValue}}", &status.low_value.to_string())
        .replace("{{offset}}", &status.offset.to_string())
}

/// Body of the 404 response.
pub fn not_found_message(uri: &str, method: &str, args: &[(String, String)]) -> String {
    let mut msg = String::from("File Not Found\n\n");
    let _ = write!(msg, "URI: {uri}\nMethod: {method}\nArguments: {}\n", args.len());
    for (name, value) in args {
        let _ = writeln!(msg, " {name}: {value}");
    }
    msg
}

/// Build new settings from an `application/x-www-form-urlencoded` body.
///
/// Each field is read with the lenient "leading integer, else 0" rule, so a
/// missing or malformed field becomes 0. No range check is applied.
pub fn parse_settings_form(body: &str) -> ControlSettings {
    let args = parse_form(body);
    let field = |name: &str| {
        args.iter()
            .find(|(k, _)| k == name)
            .map_or(0, |(_, v)| to_int(v))
    };
    ControlSettings {
        high_threshold: field("highValue"),
        low_threshold: field("lowValue"),
        timezone_offset_hours: field("offset"),
    }
}

/// Split a urlencoded body (or query string) into decoded pairs.
pub fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (url_decode(k), url_decode(v))
        })
        .collect()
}

/// Optional whitespace, optional sign, then leading decimal digits.
/// Anything else yields 0; out-of-range values saturate.
pub fn to_int(s: &str) -> i16 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i32 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + i32::from(b - b'0')).min(i32::from(i16::MAX) + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = match bytes.get(i + 1..i + 3) {
            Some(&[hi, lo]) if bytes[i] == b'%' => hex_pair(hi, lo),
            _ => None,
        };
        match (bytes[i], escaped) {
            (_, Some(b)) => {
                out.push(b);
                i += 2;
            }
            (b'+', None) => out.push(b' '),
            (b, None) => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let digit = |c: u8| (c as char).to_digit(16);
    Some((digit(hi)? * 16 + digit(lo)?) as u8)
}
