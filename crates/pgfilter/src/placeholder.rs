//! Positional placeholder (`$1`, `$2`, ...) arithmetic.
//!
//! Statements are never parsed: every `$` followed by digits counts as a
//! placeholder, including ones inside string literals.

use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::OnceLock;

// Shared by every rewriter: the pattern never varies with marker style or
// config, unlike the matchers owned by `Markers`.
fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE
        .get_or_init(|| Regex::new(r"\$(\d+)").expect("invalid built-in placeholder regex"))
}

/// Add `delta` to the index of every placeholder in `sql`.
///
/// Matches are rewritten left to right against the original text, so the
/// output is never re-scanned. The caller picks `delta` so that no index
/// drops below 1. Digit runs too large to be an index are left as-is.
///
/// ```
/// use pgfilter::shift_placeholders;
///
/// assert_eq!(shift_placeholders("a = $1 AND b = $2", 3), "a = $4 AND b = $5");
/// assert_eq!(shift_placeholders("a = $2", -1), "a = $1");
/// ```
pub fn shift_placeholders(sql: &str, delta: i64) -> String {
    if delta == 0 {
        return sql.to_string();
    }

    placeholder_re()
        .replace_all(sql, |caps: &Captures<'_>| match caps[1].parse::<i64>() {
            Ok(n) => format!("${}", n + delta),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

/// The distinct placeholder indices referenced by `sql`.
pub fn placeholder_indices(sql: &str) -> BTreeSet<usize> {
    placeholder_re()
        .captures_iter(sql)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .collect()
}

/// Highest placeholder index referenced by `sql`, or 0 if there is none.
pub fn max_placeholder(sql: &str) -> usize {
    placeholder_indices(sql).last().copied().unwrap_or(0)
}
