//! Unified Date Number: a day ordinal (Julian Day Number) plus a precision class.
//!
//! Every calendar is converted to the same ordinal so that dates written in
//! different calendars sort together. The empty UDN sorts first but the
//! matching engine never treats it as equal to anything.

use std::fmt;

use crate::date::{Calendar, DateExact, UNKNOWN_YEAR};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UdnPrecision {
    Before,
    Approximate,
    Exact,
    After,
}

impl UdnPrecision {
    pub fn prefix(&self) -> &'static str {
        match self {
            UdnPrecision::Before => "<",
            UdnPrecision::Approximate => "~",
            UdnPrecision::Exact => "",
            UdnPrecision::After => ">",
        }
    }
}

// field order matters: the derived ordering compares the ordinal first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Udn {
    value: Option<i64>,
    precision: UdnPrecision,
}

impl Udn {
    pub fn empty() -> Self {
        Self { value: None, precision: UdnPrecision::Exact }
    }
    pub fn new(value: i64, precision: UdnPrecision) -> Self {
        Self { value: Some(value), precision }
    }
    /// Ordinal of an exact date. Missing day and month count as the first one;
    /// a missing year gives the empty UDN.
    pub fn from_exact(date: &DateExact, precision: UdnPrecision) -> Self {
        if date.year() == UNKNOWN_YEAR {
            return Self::empty();
        }
        let month = date.month().max(1) as i64;
        let day = date.day().max(1) as i64;
        let mut year = date.year() as i64;
        if date.year_bc() {
            year = 1 - year;
        }
        let value = match date.calendar() {
            Calendar::Gregorian | Calendar::Unknown => gregorian_to_jdn(year, month, day),
            Calendar::Julian | Calendar::Roman => julian_to_jdn(year, month, day),
            Calendar::Hebrew => hebrew_to_jdn(year, month, day),
            Calendar::French => french_to_jdn(year, month, day),
        };
        Self::new(value, precision)
    }
    /// Floor midpoint of two ordinals; an empty side yields the other one.
    pub fn midpoint(a: &Udn, b: &Udn) -> Self {
        match (a.value, b.value) {
            (Some(x), Some(y)) => Self::new((x + y).div_euclid(2), UdnPrecision::Exact),
            (Some(x), None) | (None, Some(x)) => Self::new(x, UdnPrecision::Exact),
            (None, None) => Self::empty(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
    pub fn value(&self) -> Option<i64> {
        self.value
    }
    pub fn precision(&self) -> UdnPrecision {
        self.precision
    }
    pub fn with_precision(&self, precision: UdnPrecision) -> Self {
        Self { value: self.value, precision }
    }
    pub fn days_between(&self, other: &Udn) -> Option<i64> {
        Some((self.value? - other.value?).abs())
    }
    pub fn to_gregorian(&self) -> Option<(i64, u8, u8)> {
        self.value.map(jdn_to_gregorian)
    }
}

impl Default for Udn {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Udn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_gregorian() {
            Some((y, m, d)) => write!(f, "{}{:04}/{:02}/{:02}", self.precision.prefix(), y, m, d),
            None => Ok(()),
        }
    }
}

// ------------- Gregorian / Julian -------------
// years are astronomical: 1 BC is year 0

pub fn gregorian_to_jdn(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - y.div_euclid(100)
        + y.div_euclid(400)
        - 32045
}

pub fn julian_to_jdn(year: i64, month: i64, day: i64) -> i64 {
    let a = (14 - month).div_euclid(12);
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2).div_euclid(5) + 365 * y + y.div_euclid(4) - 32083
}

pub fn jdn_to_gregorian(jdn: i64) -> (i64, u8, u8) {
    let a = jdn + 32044;
    let b = (4 * a + 3).div_euclid(146097);
    let c = a - (146097 * b).div_euclid(4);
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2).div_euclid(153);
    let day = e - (153 * m + 2).div_euclid(5) + 1;
    let month = m + 3 - 12 * m.div_euclid(10);
    let year = 100 * b + d - 4800 + m.div_euclid(10);
    (year, month as u8, day as u8)
}

// ------------- Hebrew -------------
// Arithmetic calendar: months are counted from Nisan (1) with Tishri as 7,
// dates are first computed as fixed day numbers and then shifted to JDN.

const HEBREW_EPOCH: i64 = -1373427;
const FIXED_TO_JDN: i64 = 1721425;

fn hebrew_leap_year(year: i64) -> bool {
    (7 * year + 1).rem_euclid(19) < 7
}

fn hebrew_last_month(year: i64) -> i64 {
    if hebrew_leap_year(year) { 13 } else { 12 }
}

fn hebrew_elapsed_days(year: i64) -> i64 {
    let months_elapsed = (235 * year - 234).div_euclid(19);
    let parts_elapsed = 12084 + 13753 * months_elapsed;
    let day = 29 * months_elapsed + parts_elapsed.div_euclid(25920);
    if (3 * (day + 1)).rem_euclid(7) < 3 { day + 1 } else { day }
}

fn hebrew_new_year_delay(year: i64) -> i64 {
    let ny0 = hebrew_elapsed_days(year - 1);
    let ny1 = hebrew_elapsed_days(year);
    let ny2 = hebrew_elapsed_days(year + 1);
    if ny2 - ny1 == 356 {
        2
    } else if ny1 - ny0 == 382 {
        1
    } else {
        0
    }
}

fn hebrew_new_year(year: i64) -> i64 {
    HEBREW_EPOCH + hebrew_elapsed_days(year) + hebrew_new_year_delay(year)
}

fn hebrew_days_in_year(year: i64) -> i64 {
    hebrew_new_year(year + 1) - hebrew_new_year(year)
}

fn hebrew_days_in_month(year: i64, month: i64) -> i64 {
    let length = hebrew_days_in_year(year);
    match month {
        2 | 4 | 6 | 10 | 13 => 29,
        12 if !hebrew_leap_year(year) => 29,
        8 if length != 355 && length != 385 => 29,
        9 if length == 353 || length == 383 => 29,
        _ => 30,
    }
}

/// Maps the civil month order used in the wire format (TSH = 1 ... ELL = 13)
/// to the Nisan-based order used by the arithmetic.
fn hebrew_month_from_civil(year: i64, month: i64) -> i64 {
    match month {
        1..=5 => month + 6,
        6 => 12,
        7 if hebrew_leap_year(year) => 13,
        7 => 12,
        8..=13 => month - 7,
        _ => 7,
    }
}

pub fn hebrew_to_jdn(year: i64, civil_month: i64, day: i64) -> i64 {
    let month = hebrew_month_from_civil(year, civil_month);
    let mut fixed = hebrew_new_year(year) + day - 1;
    if month < 7 {
        for m in 7..=hebrew_last_month(year) {
            fixed += hebrew_days_in_month(year, m);
        }
        for m in 1..month {
            fixed += hebrew_days_in_month(year, m);
        }
    } else {
        for m in 7..month {
            fixed += hebrew_days_in_month(year, m);
        }
    }
    fixed + FIXED_TO_JDN
}

// ------------- French Republican -------------

const FRENCH_EPOCH: i64 = 2375840;

// sextile years follow the Gregorian rule shifted by one year (3, 7, 11, ...)
fn french_leap_days_before(year: i64) -> i64 {
    year.div_euclid(4) - year.div_euclid(100) + year.div_euclid(400)
}

pub fn french_to_jdn(year: i64, month: i64, day: i64) -> i64 {
    FRENCH_EPOCH + 365 * (year - 1) + french_leap_days_before(year) + 30 * (month - 1) + day - 1
}
