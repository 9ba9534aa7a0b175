//! Date values as they appear in `DATE` tags.
//!
//! # Grammar
//! A date value is an optional qualifier (`ABT`, `CAL`, `EST`, `INT`, `BEF`,
//! `AFT`, `BET ... AND ...`, `FROM ... TO ...`) followed by one or two exact
//! dates. An exact date is `[@#D<CALENDAR>@] [day] [month] year[/modifier][B.C.]`
//! where the month token comes from the table of its own calendar.
//!
//! # Invariants
//! * Every [`DateExact`] carries a [`Calendar`]; formatting writes the calendar
//!   escape for anything but Gregorian.
//! * Formatting a parsed value reproduces the input, except that days are
//!   written with two digits and an empty dual-year suffix (`1716/`) is dropped.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use tracing::debug;

use crate::error::{GedcomError, Result};
use crate::udn::{Udn, UdnPrecision};
use crate::utils::strip_stray_qualifier;

pub const UNKNOWN_YEAR: i32 = -1;

pub const GREGORIAN_MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
pub const HEBREW_MONTHS: [&str; 13] = [
    "TSH", "CSH", "KSL", "TVT", "SHV", "ADR", "ADS", "NSN", "IYR", "SVN", "TMZ", "AAV", "ELL",
];
pub const FRENCH_MONTHS: [&str; 13] = [
    "VEND", "BRUM", "FRIM", "NIVO", "PLUV", "VENT", "GERM", "FLOR", "PRAI", "MESS", "THER",
    "FRUC", "COMP",
];

// ------------- Calendar -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Calendar {
    #[default]
    Gregorian,
    Julian,
    Hebrew,
    French,
    Roman,
    Unknown,
}

impl Calendar {
    pub fn escape(&self) -> &'static str {
        match self {
            Calendar::Gregorian => "@#DGREGORIAN@",
            Calendar::Julian => "@#DJULIAN@",
            Calendar::Hebrew => "@#DHEBREW@",
            Calendar::French => "@#DFRENCH R@",
            Calendar::Roman => "@#DROMAN@",
            Calendar::Unknown => "@#DUNKNOWN@",
        }
    }
    /// Resolves the text between `@#D` and the closing `@`.
    pub fn from_escape_name(name: &str) -> Option<Calendar> {
        match name.trim().to_ascii_uppercase().as_str() {
            "GREGORIAN" => Some(Calendar::Gregorian),
            "JULIAN" => Some(Calendar::Julian),
            "HEBREW" => Some(Calendar::Hebrew),
            "FRENCH R" | "FRENCH" => Some(Calendar::French),
            "ROMAN" => Some(Calendar::Roman),
            "UNKNOWN" => Some(Calendar::Unknown),
            _ => None,
        }
    }
    pub fn months(&self) -> &'static [&'static str] {
        match self {
            Calendar::Hebrew => &HEBREW_MONTHS,
            Calendar::French => &FRENCH_MONTHS,
            _ => &GREGORIAN_MONTHS,
        }
    }
    /// 1-based index of `token` in this calendar's month table.
    pub fn month_index(&self, token: &str) -> Option<u8> {
        let token = token.to_ascii_uppercase();
        self.months()
            .iter()
            .position(|m| *m == token)
            .map(|i| (i + 1) as u8)
    }
    pub fn allows_bc(&self) -> bool {
        matches!(self, Calendar::Gregorian | Calendar::Julian)
    }
    pub fn name(&self) -> &'static str {
        match self {
            Calendar::Gregorian => "Gregorian",
            Calendar::Julian => "Julian",
            Calendar::Hebrew => "Hebrew",
            Calendar::French => "French",
            Calendar::Roman => "Roman",
            Calendar::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ------------- DateExact -------------
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DateExact {
    calendar: Calendar,
    day: u8,
    month: u8,
    year: i32,
    year_bc: bool,
    year_modifier: String,
}

impl Default for DateExact {
    fn default() -> Self {
        Self {
            calendar: Calendar::Gregorian,
            day: 0,
            month: 0,
            year: UNKNOWN_YEAR,
            year_bc: false,
            year_modifier: String::new(),
        }
    }
}

impl DateExact {
    /// Builds a date from numeric parts, checking the month against the
    /// calendar's table. Zero day or month means the part is absent.
    pub fn new(calendar: Calendar, day: u8, month: u8, year: i32) -> Result<Self> {
        if month as usize > calendar.months().len() {
            return Err(GedcomError::CalendarConversion {
                calendar: calendar.to_string(),
                token: month.to_string(),
            });
        }
        if day > 31 {
            return Err(GedcomError::DateFormat(format!("day {} out of range", day)));
        }
        Ok(Self { calendar, day, month, year, ..Self::default() })
    }
    pub fn with_month_token(calendar: Calendar, day: u8, month: &str, year: i32) -> Result<Self> {
        let index = calendar
            .month_index(month)
            .ok_or_else(|| GedcomError::CalendarConversion {
                calendar: calendar.to_string(),
                token: month.to_string(),
            })?;
        Self::new(calendar, day, index, year)
    }
    /// Parses an exact date, including an optional leading calendar escape.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (calendar, body) = split_calendar_escape(s)?;
        Self::parse_body(calendar, body)
    }
    pub fn parse_body(calendar: Calendar, body: &str) -> Result<Self> {
        let mut tokens: Vec<&str> = body.split_whitespace().collect();
        let mut year_bc = false;
        if let Some(last) = tokens.last() {
            if is_bc_marker(last) {
                year_bc = true;
                tokens.pop();
            }
        }
        let (day_token, month_token, year_token) = match tokens.as_slice() {
            [] => return Ok(Self { calendar, ..Self::default() }),
            [y] => (None, None, *y),
            [m, y] => (None, Some(*m), *y),
            [d, m, y] => (Some(*d), Some(*m), *y),
            _ => return Err(GedcomError::DateFormat(format!("too many parts in '{}'", body))),
        };
        let day = match day_token {
            Some(token) => match token.parse::<u8>() {
                Ok(d) if (1..=31).contains(&d) => d,
                _ => return Err(GedcomError::DateFormat(format!("bad day '{}'", token))),
            },
            None => 0,
        };
        let month = match month_token {
            Some(token) => calendar.month_index(token).ok_or_else(|| {
                GedcomError::CalendarConversion {
                    calendar: calendar.to_string(),
                    token: token.to_string(),
                }
            })?,
            None => 0,
        };
        let (year, year_modifier, glued_bc) = parse_year(year_token)?;
        year_bc |= glued_bc;
        if year_bc && !calendar.allows_bc() {
            return Err(GedcomError::CalendarConversion {
                calendar: calendar.to_string(),
                token: "B.C.".to_string(),
            });
        }
        Ok(Self { calendar, day, month, year, year_bc, year_modifier })
    }
    pub fn from_naive_date(date: NaiveDate) -> Self {
        Self {
            calendar: Calendar::Gregorian,
            day: date.day() as u8,
            month: date.month() as u8,
            year: date.year(),
            ..Self::default()
        }
    }
    /// Only complete Gregorian dates have a chrono equivalent.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        if self.calendar != Calendar::Gregorian || self.year_bc || self.day == 0 || self.month == 0 {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)
    }
    // It's intentional to encapsulate the parts in the struct
    // and only expose them using "getters", so that a date can
    // never hold a month that is foreign to its calendar.
    pub fn calendar(&self) -> Calendar {
        self.calendar
    }
    pub fn day(&self) -> u8 {
        self.day
    }
    pub fn month(&self) -> u8 {
        self.month
    }
    pub fn month_name(&self) -> Option<&'static str> {
        self.calendar.months().get((self.month as usize).checked_sub(1)?).copied()
    }
    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn year_bc(&self) -> bool {
        self.year_bc
    }
    pub fn year_modifier(&self) -> &str {
        &self.year_modifier
    }
    pub fn set_year_modifier(&mut self, modifier: &str) {
        self.year_modifier = modifier.to_string();
    }
    pub fn set_year_bc(&mut self, bc: bool) -> Result<()> {
        if bc && !self.calendar.allows_bc() {
            return Err(GedcomError::CalendarConversion {
                calendar: self.calendar.to_string(),
                token: "B.C.".to_string(),
            });
        }
        self.year_bc = bc;
        Ok(())
    }
    pub fn set_gregorian(&mut self, day: u8, month: &str, year: i32) -> Result<()> {
        self.set(Calendar::Gregorian, day, month, year)
    }
    pub fn set_julian(&mut self, day: u8, month: &str, year: i32) -> Result<()> {
        self.set(Calendar::Julian, day, month, year)
    }
    pub fn set_hebrew(&mut self, day: u8, month: &str, year: i32) -> Result<()> {
        self.set(Calendar::Hebrew, day, month, year)
    }
    pub fn set_french(&mut self, day: u8, month: &str, year: i32) -> Result<()> {
        self.set(Calendar::French, day, month, year)
    }
    pub fn set_roman(&mut self, day: u8, month: &str, year: i32) -> Result<()> {
        self.set(Calendar::Roman, day, month, year)
    }
    pub fn set_unknown(&mut self, day: u8, month: &str, year: i32) -> Result<()> {
        self.set(Calendar::Unknown, day, month, year)
    }
    fn set(&mut self, calendar: Calendar, day: u8, month: &str, year: i32) -> Result<()> {
        *self = Self::with_month_token(calendar, day, month, year)?;
        Ok(())
    }
    pub fn clear(&mut self) {
        *self = Self::default();
    }
    pub fn is_empty(&self) -> bool {
        self.year == UNKNOWN_YEAR && self.month == 0 && self.day == 0
    }
    pub fn is_valid(&self) -> bool {
        !self.is_empty() && self.year != UNKNOWN_YEAR && (self.day == 0 || self.month != 0)
    }
    pub fn date_parts(&self) -> (i32, u8, u8, bool) {
        (self.year, self.month, self.day, self.year_bc)
    }
    pub fn relative_year(&self) -> i32 {
        match self.year {
            UNKNOWN_YEAR => 0,
            y if self.year_bc => -y,
            y => y,
        }
    }
    pub fn udn(&self, precision: UdnPrecision) -> Udn {
        Udn::from_exact(self, precision)
    }
}

impl fmt::Display for DateExact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if self.calendar != Calendar::Gregorian {
            parts.push(self.calendar.escape().to_string());
        }
        if self.day > 0 {
            parts.push(format!("{:02}", self.day));
        }
        if let Some(name) = self.month_name() {
            parts.push(name.to_string());
        }
        if self.year != UNKNOWN_YEAR {
            let mut year = self.year.to_string();
            if !self.year_modifier.is_empty() {
                year.push('/');
                year.push_str(&self.year_modifier);
            }
            if self.year_bc {
                year.push_str("B.C.");
            }
            parts.push(year);
        }
        write!(f, "{}", parts.join(" "))
    }
}

fn is_bc_marker(token: &str) -> bool {
    token.eq_ignore_ascii_case("B.C.") || token.eq_ignore_ascii_case("BC")
}

fn split_calendar_escape(s: &str) -> Result<(Calendar, &str)> {
    match s.strip_prefix("@#D") {
        Some(rest) => {
            let end = rest
                .find('@')
                .ok_or_else(|| GedcomError::DateFormat(format!("unterminated calendar escape in '{}'", s)))?;
            let calendar = Calendar::from_escape_name(&rest[..end])
                .ok_or_else(|| GedcomError::DateFormat(format!("unknown calendar in '{}'", s)))?;
            Ok((calendar, &rest[end + 1..]))
        }
        None => Ok((Calendar::Gregorian, s)),
    }
}

// year[/modifier][B.C.]
fn parse_year(token: &str) -> Result<(i32, String, bool)> {
    let digits = token.bytes().take_while(|b| b.is_ascii_digit()).count();
    let year = token[..digits]
        .parse::<i32>()
        .map_err(|_| GedcomError::DateFormat(format!("bad year '{}'", token)))?;
    let mut rest = &token[digits..];
    let mut modifier = String::new();
    if let Some(after_slash) = rest.strip_prefix('/') {
        let len = after_slash.bytes().take_while(|b| b.is_ascii_digit()).count();
        modifier = after_slash[..len].to_string();
        rest = &after_slash[len..];
    }
    let bc = if rest.is_empty() {
        false
    } else if is_bc_marker(rest) {
        true
    } else {
        return Err(GedcomError::DateFormat(format!("bad year '{}'", token)));
    };
    Ok((year, modifier, bc))
}

// ------------- DateValue -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApproxMode {
    Exact,
    About,
    Calculated,
    Estimated,
}

impl ApproxMode {
    pub fn prefix(&self) -> &'static str {
        match self {
            ApproxMode::Exact => "",
            ApproxMode::About => "ABT",
            ApproxMode::Calculated => "CAL",
            ApproxMode::Estimated => "EST",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum DateValue {
    #[default]
    Empty,
    Exact(DateExact),
    Approximated { date: DateExact, mode: ApproxMode },
    /// `BEF before`, `AFT after`
    Range { after: Option<DateExact>, before: Option<DateExact> },
    /// `BET from AND to`
    Between { from: DateExact, to: DateExact },
    /// `FROM from TO to`, either side optional
    Period { from: Option<DateExact>, to: Option<DateExact> },
    Interpreted { date: DateExact, phrase: String },
}

impl DateValue {
    /// Strict parse: anything outside the grammar is an error.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(DateValue::Empty);
        }
        let (head, rest) = match s.find(char::is_whitespace) {
            Some(pos) => (&s[..pos], s[pos..].trim()),
            None => (s, ""),
        };
        let value = match head.to_ascii_uppercase().as_str() {
            "ABT" => DateValue::Approximated { date: required(rest)?, mode: ApproxMode::About },
            "CAL" => DateValue::Approximated { date: required(rest)?, mode: ApproxMode::Calculated },
            "EST" => DateValue::Approximated { date: required(rest)?, mode: ApproxMode::Estimated },
            "INT" => {
                let (date_part, phrase) = match rest.find('(') {
                    Some(pos) => (&rest[..pos], strip_parentheses(&rest[pos..])),
                    None => (rest, String::new()),
                };
                DateValue::Interpreted { date: required(date_part)?, phrase }
            }
            "BEF" => DateValue::Range { after: None, before: Some(required(rest)?) },
            "AFT" => DateValue::Range { after: Some(required(rest)?), before: None },
            "BET" => {
                let (from, to) = split_keyword(rest, "AND")
                    .ok_or_else(|| GedcomError::DateFormat(format!("'{}' lacks AND", s)))?;
                DateValue::Between { from: required(from)?, to: required(to)? }
            }
            "FROM" => match split_keyword(rest, "TO") {
                Some((from, to)) => DateValue::Period { from: Some(required(from)?), to: Some(required(to)?) },
                None => DateValue::Period { from: Some(required(rest)?), to: None },
            },
            "TO" => DateValue::Period { from: None, to: Some(required(rest)?) },
            _ => DateValue::Exact(DateExact::parse(s)?),
        };
        Ok(value)
    }
    /// Field-level parse: a bad date is contained as an empty value.
    pub fn parse_lenient(s: &str) -> Self {
        match Self::parse(s) {
            Ok(value) => value,
            Err(e) => {
                debug!(value = s, error = %e, "unparseable date kept as empty");
                DateValue::Empty
            }
        }
    }
    pub fn from_naive_date(date: NaiveDate) -> Self {
        DateValue::Exact(DateExact::from_naive_date(date))
    }
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        self.primary()?.to_naive_date()
    }
    pub fn is_empty(&self) -> bool {
        match self {
            DateValue::Empty => true,
            DateValue::Exact(d) => d.is_empty(),
            DateValue::Approximated { date, .. } | DateValue::Interpreted { date, .. } => date.is_empty(),
            DateValue::Range { after, before } => {
                after.as_ref().is_none_or(DateExact::is_empty) && before.as_ref().is_none_or(DateExact::is_empty)
            }
            DateValue::Between { from, to } => from.is_empty() && to.is_empty(),
            DateValue::Period { from, to } => {
                from.as_ref().is_none_or(DateExact::is_empty) && to.as_ref().is_none_or(DateExact::is_empty)
            }
        }
    }
    pub fn clear(&mut self) {
        *self = DateValue::Empty;
    }
    /// The date that stands for the whole value when a single one is needed.
    pub fn primary(&self) -> Option<&DateExact> {
        match self {
            DateValue::Empty => None,
            DateValue::Exact(date)
            | DateValue::Approximated { date, .. }
            | DateValue::Interpreted { date, .. } => Some(date),
            DateValue::Range { after, before } => after.as_ref().or(before.as_ref()),
            DateValue::Between { from, .. } => Some(from),
            DateValue::Period { from, to } => from.as_ref().or(to.as_ref()),
        }
    }
    /// `(year, month, day, bc)`; empty values report `(-1, 0, 0, false)`.
    pub fn date_parts(&self) -> (i32, u8, u8, bool) {
        match self.primary() {
            Some(date) => date.date_parts(),
            None => (UNKNOWN_YEAR, 0, 0, false),
        }
    }
    pub fn relative_year(&self) -> i32 {
        self.primary().map_or(0, DateExact::relative_year)
    }
    pub fn udn(&self) -> Udn {
        match self {
            DateValue::Empty => Udn::empty(),
            DateValue::Exact(date) => date.udn(UdnPrecision::Exact),
            DateValue::Approximated { date, .. } | DateValue::Interpreted { date, .. } => {
                date.udn(UdnPrecision::Approximate)
            }
            DateValue::Range { after: None, before: Some(before) } => before.udn(UdnPrecision::Before),
            DateValue::Range { after: Some(after), before: None } => after.udn(UdnPrecision::After),
            DateValue::Range { after: Some(after), before: Some(before) } => {
                Udn::midpoint(&after.udn(UdnPrecision::Exact), &before.udn(UdnPrecision::Exact))
            }
            DateValue::Range { after: None, before: None } => Udn::empty(),
            DateValue::Between { from, to } => {
                Udn::midpoint(&from.udn(UdnPrecision::Exact), &to.udn(UdnPrecision::Exact))
            }
            DateValue::Period { from, to } => match from.as_ref().or(to.as_ref()) {
                Some(date) => date.udn(UdnPrecision::Exact),
                None => Udn::empty(),
            },
        }
    }
    /// Chronological comparison; an absent counterpart sorts after this value.
    pub fn compare_to(&self, other: Option<&DateValue>) -> Ordering {
        match other {
            Some(other) => self.udn().cmp(&other.udn()),
            None => Ordering::Less,
        }
    }
    pub fn approximation(&self) -> ApproxMode {
        match self {
            DateValue::Approximated { mode, .. } => *mode,
            _ => ApproxMode::Exact,
        }
    }
    /// Switches a single-date value between exact and the approximated forms.
    pub fn set_approximation(&mut self, mode: ApproxMode) {
        let date = match self {
            DateValue::Exact(date)
            | DateValue::Approximated { date, .. }
            | DateValue::Interpreted { date, .. } => std::mem::take(date),
            _ => return,
        };
        *self = match mode {
            ApproxMode::Exact => DateValue::Exact(date),
            mode => DateValue::Approximated { date, mode },
        };
    }
    pub fn phrase(&self) -> Option<&str> {
        match self {
            DateValue::Interpreted { phrase, .. } => Some(phrase),
            _ => None,
        }
    }
    /// Sets the interpretation phrase; surrounding parentheses are not doubled.
    pub fn set_phrase(&mut self, phrase: &str) {
        let phrase = strip_parentheses(phrase);
        match self {
            DateValue::Interpreted { phrase: current, .. } => *current = phrase,
            DateValue::Exact(date) | DateValue::Approximated { date, .. } => {
                let date = std::mem::take(date);
                *self = DateValue::Interpreted { date, phrase };
            }
            _ => {}
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DateValue::Empty => Ok(()),
            DateValue::Exact(date) => write!(f, "{}", date),
            DateValue::Approximated { date, mode } => write!(f, "{} {}", mode.prefix(), date),
            DateValue::Range { after: None, before: Some(before) } => write!(f, "BEF {}", before),
            DateValue::Range { after: Some(after), before: None } => write!(f, "AFT {}", after),
            DateValue::Range { after: Some(after), before: Some(before) } => {
                write!(f, "BET {} AND {}", after, before)
            }
            DateValue::Range { after: None, before: None } => Ok(()),
            DateValue::Between { from, to } => write!(f, "BET {} AND {}", from, to),
            DateValue::Period { from: Some(from), to: Some(to) } => write!(f, "FROM {} TO {}", from, to),
            DateValue::Period { from: Some(from), to: None } => write!(f, "FROM {}", from),
            DateValue::Period { from: None, to: Some(to) } => write!(f, "TO {}", to),
            DateValue::Period { from: None, to: None } => Ok(()),
            DateValue::Interpreted { date, phrase } if phrase.is_empty() => write!(f, "INT {}", date),
            DateValue::Interpreted { date, phrase } => write!(f, "INT {} ({})", date, phrase),
        }
    }
}

fn required(s: &str) -> Result<DateExact> {
    let date = DateExact::parse(strip_stray_qualifier(s))?;
    if date.is_empty() {
        return Err(GedcomError::DateFormat("qualifier without a date".to_string()));
    }
    Ok(date)
}

fn strip_parentheses(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix('(').unwrap_or(s);
    let s = s.strip_suffix(')').unwrap_or(s);
    s.trim().to_string()
}

// splits "x AND y" on a whole-word keyword, case-insensitively
fn split_keyword<'a>(s: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let upper = s.to_ascii_uppercase();
    let needle = format!(" {} ", keyword);
    let pos = upper.find(&needle)?;
    Some((&s[..pos], &s[pos + needle.len()..]))
}

// ------------- TimeValue -------------
/// Wall-clock time of a `TIME` tag, `HH:MM:SS[.fff]` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeValue {
    time: NaiveTime,
}

impl Default for TimeValue {
    fn default() -> Self {
        Self { time: NaiveTime::MIN }
    }
}

impl TimeValue {
    pub fn new(hour: u32, minute: u32, second: u32, fraction: u32) -> Option<Self> {
        NaiveTime::from_hms_milli_opt(hour, minute, second, fraction).map(|time| Self { time })
    }
    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self { time }
    }
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        ["%H:%M:%S%.f", "%H:%M"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
            .map(|time| Self { time })
            .ok_or_else(|| GedcomError::DateFormat(format!("bad time '{}'", s)))
    }
    pub fn time(&self) -> NaiveTime {
        self.time
    }
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }
    pub fn second(&self) -> u32 {
        self.time.second()
    }
    /// Milliseconds.
    pub fn fraction(&self) -> u32 {
        self.time.nanosecond() / 1_000_000
    }
    pub fn is_empty(&self) -> bool {
        self.time == NaiveTime::MIN
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            Ok(())
        } else if self.fraction() > 0 {
            write!(f, "{}", self.time.format("%H:%M:%S%.3f"))
        } else {
            write!(f, "{}", self.time.format("%H:%M:%S"))
        }
    }
}
