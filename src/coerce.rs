//! Conversion of raw configuration text into field types.
//!
//! Every field type implements [`Coerce`]. The crate covers strings, `char`,
//! booleans, every integer width, floats, and `PathBuf`; applications add their
//! own types (enums, newtypes, URLs) by implementing the trait. Types without
//! an impl are rejected at compile time when the field is declared.
//!
//! Parsing follows the host conventions for configuration text:
//!
//! - strings are taken verbatim, including the empty string;
//! - booleans accept `true`/`false` in any letter case;
//! - numbers tolerate surrounding whitespace.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Identifies the native type a field converts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Char,
    Bool,
    Integer,
    Float,
    Path,
    /// A type supplied by the application, named by its Rust type name.
    Custom(&'static str),
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::String => f.write_str("string"),
            ScalarKind::Char => f.write_str("char"),
            ScalarKind::Bool => f.write_str("bool"),
            ScalarKind::Integer => f.write_str("integer"),
            ScalarKind::Float => f.write_str("float"),
            ScalarKind::Path => f.write_str("path"),
            ScalarKind::Custom(name) => f.write_str(name),
        }
    }
}

/// Raw text could not be converted into the requested type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    pub kind: ScalarKind,
    pub reason: String,
}

impl CoerceError {
    pub fn new(kind: ScalarKind, reason: impl fmt::Display) -> Self {
        Self {
            kind,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert to {}: {}", self.kind, self.reason)
    }
}

impl std::error::Error for CoerceError {}

/// Parse configuration text into `Self`.
pub trait Coerce: Sized {
    fn kind() -> ScalarKind {
        ScalarKind::Custom(std::any::type_name::<Self>())
    }

    fn coerce(raw: &str) -> Result<Self, CoerceError>;
}

impl Coerce for String {
    fn kind() -> ScalarKind {
        ScalarKind::String
    }

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        Ok(raw.to_string())
    }
}

impl Coerce for char {
    fn kind() -> ScalarKind {
        ScalarKind::Char
    }

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CoerceError::new(
                ScalarKind::Char,
                format!("expected exactly one character, got {raw:?}"),
            )),
        }
    }
}

impl Coerce for bool {
    fn kind() -> ScalarKind {
        ScalarKind::Bool
    }

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        let s = raw.trim();
        if s.eq_ignore_ascii_case("true") {
            return Ok(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return Ok(false);
        }
        Err(CoerceError::new(
            ScalarKind::Bool,
            format!("{raw:?} is not true or false"),
        ))
    }
}

impl Coerce for PathBuf {
    fn kind() -> ScalarKind {
        ScalarKind::Path
    }

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        if raw.is_empty() {
            return Err(CoerceError::new(ScalarKind::Path, "empty path"));
        }
        Ok(PathBuf::from(raw))
    }
}

fn parse_trimmed<T>(kind: ScalarKind, raw: &str) -> Result<T, CoerceError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| CoerceError::new(kind, format!("{raw:?}: {e}")))
}

macro_rules! coerce_via_from_str {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Coerce for $ty {
                fn kind() -> ScalarKind {
                    $kind
                }

                fn coerce(raw: &str) -> Result<Self, CoerceError> {
                    parse_trimmed($kind, raw)
                }
            }
        )+
    };
}

coerce_via_from_str!(ScalarKind::Integer => i8, i16, i32, i64, i128, isize);
coerce_via_from_str!(ScalarKind::Integer => u8, u16, u32, u64, u128, usize);
coerce_via_from_str!(ScalarKind::Float => f32, f64);
