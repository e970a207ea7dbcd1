//! Place-name comparison keys.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a place name to its comparison key: NFD, drop combining marks, lowercase.
///
/// "Göteborg", "GÖTEBORG" and "goteborg" all fold to `"goteborg"`.
/// Letters without a decomposition (e.g. `ø`, `ß`) are kept as-is.
pub fn normalize(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// True when two names fold to the same key.
pub fn same_place(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
