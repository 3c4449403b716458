//! Filter expressions: a small, human-readable predicate language.
//!
//! ```text
//! role = 'admin'
//! perm >= 2 and (name % "ali" or role != guest)
//! ```
//!
//! - Comparisons: `=`, `!=`, `>`, `>=`, `<`, `<=`, and `%` (contains).
//! - `and` binds tighter than `or`; parentheses group.
//! - Values are quoted with `'`, `"` or `` ` `` (backslash escapes), or written bare.
//!
//! An expression is turned into a SQL condition with its own `$1..$k`
//! placeholders, plus the values for them. Columns are checked against the
//! model's [`FieldMap`] and literals are coerced to the field's [`FieldKind`].
//!
//! The rewriter only sees the [`FilterParser`] trait, so a different language
//! can be plugged in.

mod lexer;
mod parser;


pub use lexer::ComparisonOp;

use crate::model::{FieldKind, FieldMap, MappedField};
use crate::value::FilterValue;
use parser::{Comparison, Expr, Literal};
use thiserror::Error;

/// A condition produced by a [`FilterParser`].
///
/// Placeholders in `sql` are numbered from `$1` and match `args` in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCondition {
    pub sql: String,
    pub args: Vec<FilterValue>,
}

/// Why a filter expression was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty filter expression")]
    Empty,

    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("invalid column \"{0}\"")]
    InvalidColumn(String),

    #[error("invalid value \"{value}\" for column \"{column}\": expected {kind}")]
    InvalidValue {
        column: String,
        value: String,
        kind: FieldKind,
    },

    #[error("operator \"{op}\" is not supported for column \"{column}\"")]
    UnsupportedOperator { column: String, op: ComparisonOp },

    /// Raised by custom parsers.
    #[error("{0}")]
    Other(String),
}

impl ParseError {
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}

/// Turns a filter expression into a SQL condition.
///
/// Implementations must be pure: the same expression and field map always
/// produce the same result.
pub trait FilterParser: Send + Sync {
    fn parse(&self, expression: &str, fields: &FieldMap) -> Result<ParsedCondition, ParseError>;
}

impl<F> FilterParser for F
where
    F: Fn(&str, &FieldMap) -> Result<ParsedCondition, ParseError> + Send + Sync,
{
    fn parse(&self, expression: &str, fields: &FieldMap) -> Result<ParsedCondition, ParseError> {
        self(expression, fields)
    }
}

/// The built-in parser for the language described in the [module docs](self).
#[derive(Debug, Clone, Copy, Default)]
pub struct MqlParser;

impl FilterParser for MqlParser {
    fn parse(&self, expression: &str, fields: &FieldMap) -> Result<ParsedCondition, ParseError> {
        let expr = parser::parse(expression)?;
        let mut render = Render {
            fields,
            args: Vec::new(),
        };
        let sql = render.expr(&expr)?;
        Ok(ParsedCondition {
            sql,
            args: render.args,
        })
    }
}

struct Render<'a> {
    fields: &'a FieldMap,
    args: Vec<FilterValue>,
}

impl Render<'_> {
    fn expr(&mut self, expr: &Expr) -> Result<String, ParseError> {
        match expr {
            Expr::Compare(cmp) => self.comparison(cmp),
            Expr::And(operands) => self.group(operands, " AND "),
            Expr::Or(operands) => self.group(operands, " OR "),
        }
    }

    fn group(&mut self, operands: &[Expr], sep: &str) -> Result<String, ParseError> {
        let parts = operands
            .iter()
            .map(|e| self.expr(e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("({})", parts.join(sep)))
    }

    fn comparison(&mut self, cmp: &Comparison) -> Result<String, ParseError> {
        let field = self
            .fields
            .resolve(&cmp.column)
            .ok_or_else(|| ParseError::InvalidColumn(cmp.column.clone()))?;

        let (operator, value) = match cmp.op {
            ComparisonOp::Contains => match field.kind {
                FieldKind::Text | FieldKind::Any => {
                    ("LIKE", FilterValue::Text(format!("%{}%", cmp.value.raw)))
                }
                _ => {
                    return Err(ParseError::UnsupportedOperator {
                        column: cmp.column.clone(),
                        op: cmp.op,
                    });
                }
            },
            op => (op.as_str(), coerce(field, &cmp.value)?),
        };

        self.args.push(value);
        Ok(format!("{} {} ${}", field.column, operator, self.args.len()))
    }
}

/// Convert a literal to the kind of value `field` holds.
fn coerce(field: &MappedField, literal: &Literal) -> Result<FilterValue, ParseError> {
    let raw = literal.raw.as_str();
    let invalid = || ParseError::InvalidValue {
        column: field.key.clone(),
        value: raw.to_string(),
        kind: field.kind,
    };

    match field.kind {
        FieldKind::Text => Ok(FilterValue::Text(raw.to_string())),
        FieldKind::Int => raw.parse().map(FilterValue::Int).map_err(|_| invalid()),
        FieldKind::Float => raw.parse().map(FilterValue::Float).map_err(|_| invalid()),
        FieldKind::Bool => parse_bool(raw).map(FilterValue::Bool).ok_or_else(invalid),
        FieldKind::Any if literal.quoted => Ok(FilterValue::Text(raw.to_string())),
        FieldKind::Any => Ok(infer(raw)),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn infer(raw: &str) -> FilterValue {
    if let Ok(v) = raw.parse::<i64>() {
        FilterValue::Int(v)
    } else if looks_numeric(raw)
        && let Ok(v) = raw.parse::<f64>()
    {
        FilterValue::Float(v)
    } else if let Some(v) = parse_bool(raw) {
        FilterValue::Bool(v)
    } else {
        FilterValue::Text(raw.to_string())
    }
}

/// Digits, sign, decimal point and exponent only; `inf` and `nan` stay words.
fn looks_numeric(raw: &str) -> bool {
    raw.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}
