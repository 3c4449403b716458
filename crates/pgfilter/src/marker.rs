//! Locating the injection point inside a SQL template.
//!
//! Two marker styles exist:
//!
//! - **Comment**: a line comment carrying `:condition`, optionally with literal
//!   text on either side that is kept next to the injected condition:
//!
//!   ```sql
//!   SELECT * FROM users WHERE deleted_at IS NULL AND -- :condition
//!   SELECT * FROM users WHERE -- (:condition) ORDER BY id
//!   ```
//!
//! - **Sentinel**: the boolean expression `$1::void IS NULL`. It is rewritten to
//!   the comment marker first, and the statement's placeholders are moved down
//!   one slot because `$1` belonged to the sentinel.
//!
//! Text between two `-- exclude` lines is removed before either marker is
//! searched for, so documentation SQL inside it is never treated as live.

use crate::placeholder::{placeholder_indices, shift_placeholders};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The comment marker the sentinel is normalized to.
pub const CONDITION_MARKER: &str = "-- :condition";

/// Which marker a rewriter looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    /// `-- [prefix] :condition [suffix]`
    #[default]
    Comment,
    /// `$1::void IS NULL`
    Sentinel,
}

/// Where the condition goes, computed fresh for each statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPoint {
    /// Byte offset where the marker starts.
    pub start: usize,
    /// Byte offset one past the end of the marker line.
    pub end: usize,
    /// Literal text between `--` and `:condition`, trimmed.
    pub prefix: Option<String>,
    /// Literal text after `:condition` on the same line, trimmed.
    pub suffix: Option<String>,
}

impl InjectionPoint {
    /// Replace the marker span of `sql` with `condition`.
    ///
    /// Prefix and suffix text are re-attached around the condition with a single
    /// space. Semicolons are removed from every fragment so the result can never
    /// terminate early; this also removes semicolons inside string literals.
    pub fn splice(&self, sql: &str, condition: &str) -> String {
        let mut fragment = condition.trim().to_string();
        if let Some(prefix) = &self.prefix {
            fragment = format!("{prefix} {fragment}");
        }
        if let Some(suffix) = &self.suffix {
            fragment = format!("{fragment} {suffix}");
        }

        let mut out = String::with_capacity(sql.len() + fragment.len());
        out.push_str(&strip_semicolons(&sql[..self.start]));
        out.push_str(&strip_semicolons(&fragment));
        out.push_str(&strip_semicolons(&sql[self.end..]));
        out
    }
}

fn strip_semicolons(s: &str) -> Cow<'_, str> {
    if s.contains(';') {
        Cow::Owned(s.replace(';', ""))
    } else {
        Cow::Borrowed(s)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Precompiled marker matchers.
///
/// Immutable once built; share one instance per rewriter.
#[derive(Debug, Clone)]
pub struct Markers {
    condition: Regex,
    exclusion: Regex,
    sentinel: Regex,
}

impl Default for Markers {
    fn default() -> Self {
        Self::new()
    }
}

impl Markers {
    pub fn new() -> Self {
        Self {
            condition: Regex::new(r"(?im)--(.*?)[ \t]*:condition[ \t]*(.*)")
                .expect("invalid built-in condition regex"),
            exclusion: Regex::new(r"(?im)^\s*--\s*exclude\s*\n[\s\S]*?\n\s*--\s*exclude\s*\n?")
                .expect("invalid built-in exclusion regex"),
            sentinel: Regex::new(r"(?i)\$1::void\s+IS\s+NULL")
                .expect("invalid built-in sentinel regex"),
        }
    }

    /// Remove every `-- exclude` block.
    pub fn strip_exclusions<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        self.exclusion.replace_all(sql, "")
    }

    /// Find the first comment marker.
    pub fn locate(&self, sql: &str) -> Option<InjectionPoint> {
        let caps = self.condition.captures(sql)?;
        let whole = caps.get(0)?;
        Some(InjectionPoint {
            start: whole.start(),
            end: whole.end(),
            prefix: caps.get(1).and_then(|m| non_empty(m.as_str())),
            suffix: caps.get(2).and_then(|m| non_empty(m.as_str())),
        })
    }

    /// Rewrite the first sentinel to [`CONDITION_MARKER`].
    ///
    /// Returns `None` when the statement has no sentinel. When `$1` no longer
    /// appears afterwards, every remaining placeholder is shifted down by one.
    pub fn normalize_sentinel(&self, sql: &str) -> Option<String> {
        let found = self.sentinel.find(sql)?;

        let mut out = String::with_capacity(sql.len());
        out.push_str(&sql[..found.start()]);
        out.push_str(CONDITION_MARKER);
        out.push_str(&sql[found.end()..]);

        if placeholder_indices(&out).contains(&1) {
            Some(out)
        } else {
            Some(shift_placeholders(&out, -1))
        }
    }

    /// Normalize `sql` for `style` and find the injection point.
    pub fn prepare(&self, sql: &str, style: MarkerStyle) -> Option<(String, InjectionPoint)> {
        let sql = match style {
            MarkerStyle::Comment => sql.to_string(),
            MarkerStyle::Sentinel => self.normalize_sentinel(sql)?,
        };
        let point = self.locate(&sql)?;
        Some((sql, point))
    }
}
