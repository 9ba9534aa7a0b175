//! Token helpers shared by the reader, the date parser and the xref remapping
//! done during imports.
//!
//! The extract functions follow one convention: they take the unparsed input and
//! return the extracted token together with the remainder. On failure the
//! lenient variants hand back the default and the untouched input.

use std::fmt::Write;

use crate::date::{DateValue, GREGORIAN_MONTHS};
use crate::error::{GedcomError, Result};
use crate::udn::Udn;

// ------------- XRef -------------

/// Splits a leading `@XREF@` token off `s`.
///
/// In strict mode a missing or unterminated pointer is a `MalformedXRef`. In
/// lenient mode `default` is returned along with the unchanged input.
pub fn extract_xref<'a>(s: &'a str, strict: bool, default: &str) -> Result<(String, &'a str)> {
    if let Some(rest) = s.strip_prefix('@') {
        if let Some(end) = rest.find('@') {
            return Ok((rest[..end].to_string(), &rest[end + 1..]));
        }
        if strict {
            return Err(GedcomError::MalformedXRef(format!("unterminated pointer in '{}'", s)));
        }
    } else if strict {
        return Err(GedcomError::MalformedXRef(format!("'{}' does not start with a pointer", s)));
    }
    Ok((default.to_string(), s))
}

pub fn clean_xref(xref: &str) -> &str {
    let xref = xref.strip_prefix('@').unwrap_or(xref);
    xref.strip_suffix('@').unwrap_or(xref)
}

pub fn enclose_xref(xref: &str) -> String {
    if xref.is_empty() {
        return String::new();
    }
    let mut result = String::with_capacity(xref.len() + 2);
    if !xref.starts_with('@') {
        result.push('@');
    }
    result.push_str(xref);
    if !xref.ends_with('@') {
        result.push('@');
    }
    result
}

pub fn is_pointer(value: &str) -> bool {
    value.len() > 2 && value.starts_with('@') && value.ends_with('@') && !value.starts_with("@#")
}

/// Drops a qualifier that FamilyTreeBuilder leaves in front of a date
/// bound, as in `BET ABT 1900 AND 1910`.
pub fn strip_stray_qualifier(s: &str) -> &str {
    const STRAY: [&str; 5] = ["AFT", "BEF", "ABT", "CAL", "EST"];
    let s = s.trim_start();
    match s.get(..3) {
        Some(head) if STRAY.iter().any(|q| head.eq_ignore_ascii_case(q)) && s[3..].starts_with(char::is_whitespace) => {
            s[3..].trim_start()
        }
        _ => s,
    }
}

// ------------- Tokens -------------

/// Takes everything up to the first space. A leading space yields the default.
pub fn extract_string<'a>(s: &'a str, default: &str) -> (String, &'a str) {
    if s.is_empty() || s.starts_with(' ') {
        return (default.to_string(), s);
    }
    match s.find(' ') {
        Some(pos) => (s[..pos].to_string(), &s[pos..]),
        None => (s.to_string(), ""),
    }
}

/// Strips up to `max` leading spaces, `max == 0` meaning all of them.
pub fn extract_delimiter(s: &str, max: usize) -> &str {
    extract_char(s, ' ', max)
}

pub fn extract_dot_delimiter(s: &str, max: usize) -> &str {
    extract_char(s, '.', max)
}

fn extract_char(s: &str, c: char, max: usize) -> &str {
    let mut rest = s;
    let mut count = 0;
    while let Some(next) = rest.strip_prefix(c) {
        if max > 0 && count >= max {
            break;
        }
        rest = next;
        count += 1;
    }
    rest
}

/// Reads leading decimal digits. Strict mode fails when there are none.
pub fn extract_number<'a>(s: &'a str, strict: bool, default: i32) -> Result<(i32, &'a str)> {
    let digits = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        if strict {
            return Err(GedcomError::DateFormat(format!("number expected in '{}'", s)));
        }
        return Ok((default, s));
    }
    match s[..digits].parse::<i32>() {
        Ok(value) => Ok((value, &s[digits..])),
        Err(_) if !strict => Ok((default, s)),
        Err(e) => Err(GedcomError::DateFormat(format!("'{}': {}", &s[..digits], e))),
    }
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_digit)
}

// control characters count as blanks in the wire format
pub fn trim_left(s: &str) -> &str {
    s.trim_start_matches(|c: char| c <= ' ')
}

pub fn trim_right(s: &str) -> &str {
    s.trim_end_matches(|c: char| c <= ' ')
}

// ------------- Checksum identifiers -------------

/// Hex-encodes `bytes` followed by two running checksum bytes.
///
/// The same routine produces record UIDs and the identifiers of cropped
/// regions inside multimedia items, so it works over any buffer.
pub fn encode_uid(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len() * 2 + 4);
    let mut check_a: u8 = 0;
    let mut check_b: u8 = 0;
    for &val in bytes {
        check_a = check_a.wrapping_add(val);
        check_b = check_b.wrapping_add(check_a);
        let _ = write!(result, "{:02X}", val);
    }
    let _ = write!(result, "{:02X}{:02X}", check_a, check_b);
    result
}

pub fn rect_uid(x1: u16, y1: u16, x2: u16, y2: u16) -> String {
    let mut buffer = [0u8; 8];
    for (i, v) in [x1, y1, x2, y2].iter().enumerate() {
        buffer[i * 2..i * 2 + 2].copy_from_slice(&v.to_le_bytes());
    }
    encode_uid(&buffer)
}

/// Identifier of a (possibly cropped) reference into a multimedia record.
pub fn multimedia_link_uid(media_uid: &str, cutout: Option<(u16, u16, u16, u16)>) -> String {
    let rect = match cutout {
        Some((x1, y1, x2, y2)) => rect_uid(x1, y1, x2, y2),
        None => String::new(),
    };
    format!("{}-{}", media_uid, rect)
}

// ------------- Dates from user input -------------

/// Turns `dd/mm/yyyy` style input into the canonical `DD MON YYYY` form.
///
/// Underscores stand for unknown parts, so `__/12/1980` becomes `DEC 1980`.
pub fn str_to_canonical(s: &str, strict: bool) -> Result<String> {
    if s.is_empty() {
        return Ok(String::new());
    }
    let normalized = s.replace('/', ".").replace('_', " ");
    let parts: Vec<&str> = normalized.split('.').collect();
    if parts.len() < 3 {
        if strict {
            return Err(GedcomError::DateFormat(format!("'{}' is not a day/month/year date", s)));
        }
        return Ok(String::new());
    }
    let day = parts[0].trim();
    let month = parts[1].trim();
    let year = parts[2].trim();
    let mut result = String::new();
    if !day.is_empty() {
        result.push_str(day);
        result.push(' ');
    }
    if !month.is_empty() {
        let name = month
            .parse::<usize>()
            .ok()
            .and_then(|m| m.checked_sub(1))
            .and_then(|m| GREGORIAN_MONTHS.get(m));
        match name {
            Some(name) => {
                result.push_str(name);
                result.push(' ');
            }
            None if strict => {
                return Err(GedcomError::DateFormat(format!("bad month '{}' in '{}'", month, s)));
            }
            None => return Ok(String::new()),
        }
    }
    result.push_str(year);
    Ok(result)
}

/// UDN of a `dd/mm/yyyy` style string; anything unparseable yields the empty UDN.
pub fn udn_of_str(s: &str) -> Udn {
    match str_to_canonical(s, false) {
        Ok(canonical) => DateValue::parse_lenient(&canonical).udn(),
        Err(_) => Udn::empty(),
    }
}
