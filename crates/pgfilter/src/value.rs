//! Argument values produced by filter expressions.

use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type, WrongType};

/// A literal taken from a filter expression, bound as a statement parameter.
///
/// Values are typed by the field they are compared against, so
/// `perm > 5` yields `Int(5)` while `name = 5` yields `Text("5")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FilterValue {
    /// Whether this value can be encoded as a parameter of type `ty`.
    pub fn accepts_type(&self, ty: &Type) -> bool {
        match self {
            FilterValue::Text(_) => <String as ToSql>::accepts(ty),
            FilterValue::Int(_) => matches!(*ty, Type::INT2 | Type::INT4 | Type::INT8),
            FilterValue::Float(_) => matches!(*ty, Type::FLOAT4 | Type::FLOAT8),
            FilterValue::Bool(_) => *ty == Type::BOOL,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            FilterValue::Int(v) => write!(f, "{v}"),
            FilterValue::Float(v) => write!(f, "{v}"),
            FilterValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl ToSql for FilterValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            FilterValue::Text(v) => v.to_sql(ty, out),
            FilterValue::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            FilterValue::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            FilterValue::Bool(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <String as ToSql>::accepts(ty)
            || matches!(
                *ty,
                Type::INT2 | Type::INT4 | Type::INT8 | Type::FLOAT4 | Type::FLOAT8 | Type::BOOL
            )
    }

    // The static `accepts` covers every variant; the variant itself decides.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if !self.accepts_type(ty) {
            return Err(Box::new(WrongType::new::<FilterValue>(ty.clone())));
        }
        self.to_sql(ty, out)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v.into())
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_narrows_to_column_type() {
        let mut buf = BytesMut::new();
        FilterValue::Int(7)
            .to_sql_checked(&Type::INT4, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &7i32.to_be_bytes());
    }

    #[test]
    fn int_out_of_range_is_rejected() {
        let mut buf = BytesMut::new();
        let err = FilterValue::Int(i64::from(i16::MAX) + 1).to_sql_checked(&Type::INT2, &mut buf);
        assert!(err.is_err());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let mut buf = BytesMut::new();
        assert!(
            FilterValue::from("admin")
                .to_sql_checked(&Type::INT4, &mut buf)
                .is_err()
        );
        assert!(
            FilterValue::Bool(true)
                .to_sql_checked(&Type::TEXT, &mut buf)
                .is_err()
        );
    }

    #[test]
    fn text_encodes_as_utf8() {
        let mut buf = BytesMut::new();
        FilterValue::from("admin")
            .to_sql_checked(&Type::TEXT, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"admin");
    }

    #[test]
    fn display_quotes_text() {
        assert_eq!(FilterValue::from("O'Brien").to_string(), "'O''Brien'");
        assert_eq!(FilterValue::Int(3).to_string(), "3");
        assert_eq!(FilterValue::Bool(false).to_string(), "false");
    }
}
