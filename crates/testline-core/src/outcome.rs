use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Add;

/// Fixed result categories. Every aggregate report carries all six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    Ok,
    Error,
    Fail,
    Skip,
    ExpectedFail,
    UnexpectedSuccess,
}

impl Outcome {
    /// Canonical order, used for serialization.
    pub const ALL: [Outcome; 6] = [
        Outcome::Ok,
        Outcome::Error,
        Outcome::Fail,
        Outcome::Skip,
        Outcome::ExpectedFail,
        Outcome::UnexpectedSuccess,
    ];

    /// Category name as it appears in `stats`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Error => "error",
            Outcome::Fail => "fail",
            Outcome::Skip => "skip",
            Outcome::ExpectedFail => "expected fail",
            Outcome::UnexpectedSuccess => "unexpected success",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == name)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status word for a skipped test: `skipped 'reason'`.
/// The reason is quoted with Python `repr` rules.
pub fn skip_status(reason: &str) -> String {
    format!("skipped {}", repr_quote(reason))
}

fn repr_quote(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() || (c.is_whitespace() && c != ' ') => {
                let code = u32::from(c);
                if code <= 0xff {
                    out.push_str(&format!("\\x{:02x}", code));
                } else if code <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// A measurement value. Integers stay integers on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    pub fn is_finite(self) -> bool {
        match self {
            Numeric::Int(_) => true,
            Numeric::Float(f) => f.is_finite(),
        }
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::Int(0)
    }
}

impl Add for Numeric {
    type Output = Numeric;

    fn add(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Int(a), Numeric::Int(b)) => match a.checked_add(b) {
                Some(sum) => Numeric::Int(sum),
                None => Numeric::Float(a as f64 + b as f64),
            },
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Numeric::Int(i) => write!(f, "{}", i),
            Numeric::Float(v) if !v.is_finite() => write!(f, "{}", v),
            // same cut-over to exponent notation as Python's float repr
            Numeric::Float(v) if v != 0.0 && (v.abs() >= 1e16 || v.abs() < 1e-4) => {
                let sci = format!("{:e}", v);
                let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
                let exp: i32 = exp.parse().unwrap_or(0);
                let sign = if exp < 0 { '-' } else { '+' };
                write!(f, "{}e{}{:02}", mantissa, sign, exp.abs())
            }
            // keep the decimal point so floats read as floats
            Numeric::Float(v) if v.fract() == 0.0 => write!(f, "{:.1}", v),
            Numeric::Float(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match *self {
            Numeric::Int(i) => s.serialize_i64(i),
            Numeric::Float(v) => s.serialize_f64(v),
        }
    }
}

macro_rules! numeric_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Numeric {
            fn from(v: $t) -> Self {
                Numeric::Int(i64::from(v))
            }
        })*
    };
}

numeric_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Numeric {
    fn from(v: f32) -> Self {
        Numeric::Float(f64::from(v))
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Float(v)
    }
}
