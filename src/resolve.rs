//! Key resolution against a hierarchical source.
//!
//! Configuration sources conventionally flatten nested sections into keys
//! joined by `__` (`Section__Inner__Key`). Resolution tries the key verbatim
//! first; only when that misses does it split at the *first* delimiter, open
//! the named section, and resolve the remainder inside it. The remainder is not
//! pre-split, so `A__B__C` becomes `A` + `B__C`, and `B__C` again gets its own
//! verbatim attempt inside `A`.

use crate::source::ConfigSource;

/// Reserved delimiter between section names in a bound key.
pub const DELIMITER: &str = "__";

/// Resolve `key` in `source`, returning the raw text or `None` when absent.
///
/// Absence is an ordinary outcome here and never an error. A missing section
/// short-circuits to `None`.
pub fn resolve(source: &dyn ConfigSource, key: &str) -> Option<String> {
    if let Some(value) = source.get(key) {
        return Some(value.into_owned());
    }

    let (section_name, remainder) = key.split_once(DELIMITER)?;
    let section = source.section(section_name)?;
    resolve(section.as_ref(), remainder)
}
