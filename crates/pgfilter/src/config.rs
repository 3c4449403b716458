use crate::marker::MarkerStyle;
use serde::Deserialize;

/// Configuration for a [`FilterRewriter`](crate::FilterRewriter).
///
/// Deserializable so it can live in an application config file:
///
/// ```
/// use pgfilter::{MarkerStyle, RewriterConfig};
///
/// let config: RewriterConfig = serde_json::from_str(r#"{"marker_style": "sentinel"}"#).unwrap();
/// assert_eq!(config.marker_style, MarkerStyle::Sentinel);
/// assert!(config.strip_exclusions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Which marker to look for. Default is [`MarkerStyle::Comment`].
    pub marker_style: MarkerStyle,
    /// Remove `-- exclude` blocks before searching for the marker. Default is `true`.
    pub strip_exclusions: bool,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            marker_style: MarkerStyle::Comment,
            strip_exclusions: true,
        }
    }
}

impl RewriterConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marker style.
    pub fn with_marker_style(mut self, style: MarkerStyle) -> Self {
        self.marker_style = style;
        self
    }

    /// Enable `-- exclude` block removal.
    pub fn strip_exclusions(mut self) -> Self {
        self.strip_exclusions = true;
        self
    }

    /// Keep `-- exclude` blocks in the statement.
    pub fn keep_exclusions(mut self) -> Self {
        self.strip_exclusions = false;
        self
    }
}
