//! Canonical JSON encoding for signing and hashing.
//!
//! Feed messages are signed and hashed as JSON text in a fixed layout:
//! - two-space indentation, one member per line
//! - `": "` between key and value, keys in insertion order
//! - `{}` / `[]` for empty containers
//! - strings escaped with the short forms `\" \\ \b \f \n \r \t`, other
//!   control characters as `\u00xx`
//! - numbers printed the way an ECMAScript engine prints a double
//!
//! The encoding must be byte-exact: a single differing character changes the
//! identifier and breaks the signature.

use serde_json::{Map, Number, Value};

use crate::crypto::Sha256Hash;
use crate::message::Message;
use crate::types::MsgId;

/// Integers above this magnitude are not exactly representable as doubles.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Encode a JSON value in canonical form.
pub fn encode(value: &Value) -> String {
    let mut buf = String::new();
    encode_value_to(&mut buf, value, 0);
    buf
}

/// Length of an encoding in UTF-16 code units, the unit message size limits
/// are expressed in.
pub fn encoded_len(encoded: &str) -> usize {
    encoded.encode_utf16().count()
}

/// The bytes an author signs: the message without its signature, UTF-8.
pub fn signing_bytes(message: &Message) -> Vec<u8> {
    encode(&message.unsigned_value()).into_bytes()
}

/// The bytes a message identifier hashes.
///
/// The full message is encoded and then projected to one byte per UTF-16
/// code unit (the low byte). For ASCII content this equals UTF-8.
pub fn id_bytes(message: &Message) -> Vec<u8> {
    latin1_projection(&encode(&message.to_value()))
}

/// Compute a message identifier.
pub fn id_of(message: &Message) -> MsgId {
    MsgId::from(Sha256Hash::hash(&id_bytes(message)))
}

fn latin1_projection(s: &str) -> Vec<u8> {
    s.encode_utf16().map(|unit| unit as u8).collect()
}

/// Recursively encode a value at the given nesting depth.
fn encode_value_to(buf: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => buf.push_str("null"),
        Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => buf.push_str(&format_number(n)),
        Value::String(s) => encode_str(buf, s),
        Value::Array(items) => encode_array(buf, items, depth),
        Value::Object(map) => encode_object(buf, map, depth),
    }
}

fn indent(buf: &mut String, depth: usize) {
    for _ in 0..depth {
        buf.push_str("  ");
    }
}

fn encode_array(buf: &mut String, items: &[Value], depth: usize) {
    if items.is_empty() {
        buf.push_str("[]");
        return;
    }
    buf.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push('\n');
        indent(buf, depth + 1);
        encode_value_to(buf, item, depth + 1);
    }
    buf.push('\n');
    indent(buf, depth);
    buf.push(']');
}

fn encode_object(buf: &mut String, map: &Map<String, Value>, depth: usize) {
    if map.is_empty() {
        buf.push_str("{}");
        return;
    }
    buf.push('{');
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push('\n');
        indent(buf, depth + 1);
        encode_str(buf, key);
        buf.push_str(": ");
        encode_value_to(buf, value, depth + 1);
    }
    buf.push('\n');
    indent(buf, depth);
    buf.push('}');
}

/// Encode a quoted, escaped string.
fn encode_str(buf: &mut String, s: &str) {
    buf.push('"');
    for c in s.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\u{08}' => buf.push_str("\\b"),
            '\u{0c}' => buf.push_str("\\f"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if (c as u32) < 0x20 => buf.push_str(&format!("\\u{:04x}", c as u32)),
            c => buf.push(c),
        }
    }
    buf.push('"');
}

/// Format a JSON number as a double would print.
fn format_number(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        if u <= MAX_SAFE_INTEGER {
            return u.to_string();
        }
    } else if let Some(i) = n.as_i64() {
        if i.unsigned_abs() <= MAX_SAFE_INTEGER {
            return i.to_string();
        }
    }
    // Finite by construction: serde_json numbers cannot hold NaN or infinity.
    format_double(n.as_f64().unwrap_or(0.0))
}

/// ECMAScript `Number.prototype.toString()` for finite doubles.
pub(crate) fn format_double(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if x < 0.0 {
        return format!("-{}", format_double(-x));
    }

    // `{:e}` yields the shortest round-trip digits: "d.ddde<exp>".
    let sci = format!("{:e}", x);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exp: i32 = exp.parse().unwrap_or(0);

    let k = digits.len() as i32;
    // Decimal point position: value = 0.digits * 10^n
    let n = exp + 1;

    if k <= n && n <= 21 {
        let mut out = digits;
        out.extend(std::iter::repeat('0').take((n - k) as usize));
        out
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{}.{}", int, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let e = n - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, e.abs())
        }
    }
}
