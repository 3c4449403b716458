//! Condition injection.
//!
//! A [`FilterRewriter`] is built once from a filter expression and a model
//! vocabulary and then applied to any number of statements:
//!
//! ```
//! use pgfilter::{FieldDescriptor, FieldKind, FilterRewriter, FilterValue, ModelDescriptor};
//!
//! let model = ModelDescriptor::new()
//!     .field(FieldDescriptor::new("id").column("id").kind(FieldKind::Int))
//!     .field(FieldDescriptor::new("role").column("role"));
//! let rewriter = FilterRewriter::from_descriptor("role = 'admin'", model);
//!
//! let (sql, args) = rewriter
//!     .rewrite(
//!         "SELECT * FROM users WHERE id > $1 AND -- :condition",
//!         vec![FilterValue::Int(10)],
//!     )
//!     .unwrap();
//! assert_eq!(sql, "SELECT * FROM users WHERE id > $1 AND role = $2");
//! assert_eq!(args, vec![FilterValue::Int(10), FilterValue::from("admin")]);
//! ```


use crate::config::RewriterConfig;
use crate::error::{DbError, FilterError, FilterResult};
use crate::filter::{FilterParser, MqlParser, ParseError, ParsedCondition};
use crate::marker::{MarkerStyle, Markers};
use crate::model::{FieldMap, FilterModel, ModelDescriptor};
use crate::placeholder::shift_placeholders;
use crate::value::FilterValue;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Injected in place of the marker when the filter expression is empty.
pub const TAUTOLOGY: &str = "TRUE";

/// Output of [`FilterRewriter::rewrite_sql`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rewritten {
    /// The statement to execute.
    pub sql: String,
    /// Values for the placeholders added by the condition. Bind them after the
    /// statement's own arguments.
    pub params: Vec<FilterValue>,
}

/// Injects a filter condition into parameterized statements.
///
/// Immutable once built and safe to share across threads. The expression is
/// parsed at most once, on first use; placeholders are renumbered per call.
pub struct FilterRewriter {
    expression: String,
    fields: FieldMap,
    config: RewriterConfig,
    markers: Markers,
    parser: Arc<dyn FilterParser>,
    parsed: OnceLock<Result<ParsedCondition, ParseError>>,
}

impl fmt::Debug for FilterRewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRewriter")
            .field("expression", &self.expression)
            .field("fields", &self.fields)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Clone for FilterRewriter {
    fn clone(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            fields: self.fields.clone(),
            config: self.config.clone(),
            markers: self.markers.clone(),
            parser: Arc::clone(&self.parser),
            parsed: self.parsed.clone(),
        }
    }
}

impl FilterRewriter {
    /// Create a rewriter whose vocabulary comes from model `M`.
    pub fn new<M: FilterModel + ?Sized>(expression: impl Into<String>) -> Self {
        Self::from_descriptor(expression, M::descriptor())
    }

    /// Create a rewriter from an explicit model descriptor.
    pub fn from_descriptor(expression: impl Into<String>, descriptor: ModelDescriptor) -> Self {
        Self {
            expression: expression.into(),
            fields: FieldMap::from_descriptor(&descriptor),
            config: RewriterConfig::default(),
            markers: Markers::new(),
            parser: Arc::new(MqlParser),
            parsed: OnceLock::new(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: RewriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the marker style.
    pub fn with_marker_style(mut self, style: MarkerStyle) -> Self {
        self.config.marker_style = style;
        self
    }

    /// Use a different filter language.
    pub fn with_parser(mut self, parser: impl FilterParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self.parsed = OnceLock::new();
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Whether the rewriter injects [`TAUTOLOGY`] instead of a parsed condition.
    pub fn is_unfiltered(&self) -> bool {
        self.expression.trim().is_empty()
    }

    /// Parse the expression now instead of on first use.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.is_unfiltered() {
            return Ok(());
        }
        self.condition().map(|_| ()).map_err(ParseError::clone)
    }

    fn condition(&self) -> Result<&ParsedCondition, &ParseError> {
        self.parsed
            .get_or_init(|| self.parser.parse(&self.expression, &self.fields))
            .as_ref()
    }

    /// Rewrite `sql`, whose own placeholders use `arg_count` arguments.
    ///
    /// Without a marker the statement is returned as is (minus any exclusion
    /// blocks) and no parameters are added. In [`MarkerStyle::Sentinel`]
    /// style `arg_count` excludes the sentinel's slot.
    pub fn rewrite_sql(&self, sql: &str, arg_count: usize) -> FilterResult<Rewritten> {
        let sql = if self.config.strip_exclusions {
            self.markers.strip_exclusions(sql)
        } else {
            Cow::Borrowed(sql)
        };

        let Some((prepared, point)) = self.markers.prepare(&sql, self.config.marker_style) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                target: "pgfilter.rewrite",
                style = ?self.config.marker_style,
                "no condition marker, statement passed through"
            );
            return Ok(Rewritten {
                sql: sql.into_owned(),
                params: Vec::new(),
            });
        };

        if self.is_unfiltered() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "pgfilter.rewrite",
                style = ?self.config.marker_style,
                existing = arg_count,
                injected = TAUTOLOGY,
                "empty filter expression, injected tautology"
            );
            return Ok(Rewritten {
                sql: point.splice(&prepared, TAUTOLOGY),
                params: Vec::new(),
            });
        }

        let condition = self.condition().map_err(|err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                target: "pgfilter.rewrite",
                expression = %self.expression,
                error = %err,
                "filter expression rejected"
            );
            FilterError::Parse(DbError::syntax(
                self.expression.as_str(),
                err.to_string(),
                prepared.as_str(),
            ))
        })?;

        let offset = i64::try_from(arg_count)
            .map_err(|_| FilterError::validation(format!("too many arguments: {arg_count}")))?;
        let sql = point.splice(&prepared, &shift_placeholders(&condition.sql, offset));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "pgfilter.rewrite",
            style = ?self.config.marker_style,
            existing = arg_count,
            added = condition.args.len(),
            "injected filter condition"
        );

        Ok(Rewritten {
            sql,
            params: condition.args.clone(),
        })
    }

    /// Rewrite `sql` and append the condition's values to `args`.
    ///
    /// On error nothing but the error is returned, so a partially rewritten
    /// statement can never be executed.
    pub fn rewrite<A: From<FilterValue>>(
        &self,
        sql: &str,
        mut args: Vec<A>,
    ) -> FilterResult<(String, Vec<A>)> {
        let rewritten = self.rewrite_sql(sql, args.len())?;
        args.extend(rewritten.params.into_iter().map(A::from));
        Ok((rewritten.sql, args))
    }
}
