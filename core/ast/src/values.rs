//! Literal value cells.
//!
//! `Int64` and `Float64` wrap the payload of `INT64` and `FLOAT64` nodes and
//! give them ECMAScript-like comparison semantics: floating point comparisons
//! can be unordered when a NaN is involved. The string helpers at the bottom
//! implement the numeric tests used when a `STRING` literal gets coerced.

use std::fmt::{self, Display, Formatter};

/// Result of comparing two values or two literal nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareResult {
    Less,
    Equal,
    Greater,
    /// At least one side is NaN, or the values cannot be ordered.
    Unordered,
    /// One side is not a literal.
    Error,
}

impl CompareResult {
    #[must_use]
    pub fn is_ordered(self) -> bool {
        matches!(self, Self::Less | Self::Equal | Self::Greater)
    }
}

impl Display for CompareResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CompareResult::Less => write!(f, "less"),
            CompareResult::Equal => write!(f, "equal"),
            CompareResult::Greater => write!(f, "greater"),
            CompareResult::Unordered => write!(f, "unordered"),
            CompareResult::Error => write!(f, "error"),
        }
    }
}

/// How two literals of different kinds get compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareMode {
    /// `===`: different kinds are never ordered.
    Strict,
    /// `==`: different kinds are converted to numbers first.
    Loose,
    /// `~~`: like loose, but floats that are nearly equal compare equal.
    Smart,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Int64(i64);

impl Int64 {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    pub fn set(&mut self, value: i64) {
        self.0 = value;
    }

    /// Total order over 64 bit integers.
    #[must_use]
    pub fn compare(self, rhs: Int64) -> CompareResult {
        match self.0.cmp(&rhs.0) {
            std::cmp::Ordering::Less => CompareResult::Less,
            std::cmp::Ordering::Equal => CompareResult::Equal,
            std::cmp::Ordering::Greater => CompareResult::Greater,
        }
    }
}

impl Display for Int64 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Int64 {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Default epsilon used by [`Float64::nearly_equal`].
pub const DEFAULT_EPSILON: f64 = 0.000_01;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float64(f64);

impl Float64 {
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    pub fn set(&mut self, value: f64) {
        self.0 = value;
    }

    pub fn set_nan(&mut self) {
        self.0 = f64::NAN;
    }

    pub fn set_infinity(&mut self) {
        self.0 = f64::INFINITY;
    }

    #[must_use]
    pub fn is_nan(self) -> bool {
        self.0.is_nan()
    }

    #[must_use]
    pub fn is_infinity(self) -> bool {
        self.0.is_infinite()
    }

    #[must_use]
    pub fn is_positive_infinity(self) -> bool {
        self.0 == f64::INFINITY
    }

    #[must_use]
    pub fn is_negative_infinity(self) -> bool {
        self.0 == f64::NEG_INFINITY
    }

    /// Returns -1 for negative infinity, 1 for positive infinity, 0 otherwise.
    #[must_use]
    pub fn classified_infinity(self) -> i32 {
        if self.is_negative_infinity() {
            -1
        } else if self.is_positive_infinity() {
            1
        } else {
            0
        }
    }

    /// IEEE-754 ordering; any NaN makes the result unordered.
    #[must_use]
    pub fn compare(self, rhs: Float64) -> CompareResult {
        match self.0.partial_cmp(&rhs.0) {
            Some(std::cmp::Ordering::Less) => CompareResult::Less,
            Some(std::cmp::Ordering::Equal) => CompareResult::Equal,
            Some(std::cmp::Ordering::Greater) => CompareResult::Greater,
            None => CompareResult::Unordered,
        }
    }

    /// Relative comparison with [`DEFAULT_EPSILON`].
    #[must_use]
    pub fn nearly_equal(self, rhs: Float64) -> bool {
        self.nearly_equal_with(rhs, DEFAULT_EPSILON)
    }

    /// Relative comparison of two floats.
    ///
    /// NaN is never nearly equal to anything, two infinities of the same
    /// sign are. Near zero the difference is compared against the smallest
    /// normal value scaled by `epsilon`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn nearly_equal_with(self, rhs: Float64, epsilon: f64) -> bool {
        let (a, b) = (self.0, rhs.0);
        if a == b {
            // also catches both infinities with the same sign
            return true;
        }
        if a.is_nan() || b.is_nan() || a.is_infinite() || b.is_infinite() {
            return false;
        }
        let diff = (a - b).abs();
        if a == 0.0 || b == 0.0 || diff < f64::MIN_POSITIVE {
            return diff < epsilon * f64::MIN_POSITIVE;
        }
        diff / (a.abs() + b.abs()) < epsilon
    }
}

impl Display for Float64 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for Float64 {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

/// Decimal or `0x` hexadecimal integer, optionally signed. Surrounding
/// whitespace is ignored.
///
/// The empty string counts as a number (it converts to zero). `"0x"` alone
/// does not.
#[must_use]
pub fn string_is_int64(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return true;
    }
    let digits = strip_sign(s);
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Decimal floating point number: `[sign] digits [. digits] [e [sign] digits]`.
#[must_use]
pub fn string_is_float64(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return true;
    }
    let bytes = strip_sign(s).as_bytes();
    let mut pos = 0;
    let mut mantissa_digits = 0;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
        mantissa_digits += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        pos += 1;
        if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
            pos += 1;
        }
        let exponent_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == exponent_start {
            return false;
        }
    }
    pos == bytes.len()
}

#[must_use]
pub fn string_is_number(s: &str) -> bool {
    string_is_int64(s) || string_is_float64(s)
}

/// Integer value of a string; zero when the string is empty or not an
/// integer (including values that overflow 64 bits).
#[must_use]
pub fn string_to_int64(s: &str) -> i64 {
    let s = s.trim();
    if s.is_empty() || !string_is_int64(s) {
        return 0;
    }
    let negative = s.starts_with('-');
    let digits = strip_sign(s);
    let parsed = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    };
    match parsed {
        Ok(value) if negative => value.wrapping_neg(),
        Ok(value) => value,
        Err(_) => 0,
    }
}

/// Floating point value of a string; zero when empty, NaN when not a number.
#[must_use]
pub fn string_to_float64(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    if string_is_float64(s) {
        return s.parse::<f64>().unwrap_or(f64::NAN);
    }
    if string_is_int64(s) {
        #[allow(clippy::cast_precision_loss)]
        return string_to_int64(s) as f64;
    }
    f64::NAN
}

/// An empty string is false, anything else is true.
#[must_use]
pub fn string_is_true(s: &str) -> bool {
    !s.is_empty()
}
