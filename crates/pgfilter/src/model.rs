//! Data-model descriptors and the field vocabulary handed to the filter parser.
//!
//! A model declares, field by field, which storage column (if any) a filter
//! expression may reference. Descriptors are built statically, either by
//! `#[derive(FilterModel)]`, by hand with the builder methods, or deserialized
//! from configuration.
//!
//! # Example
//!
//! ```
//! use pgfilter::{FieldDescriptor, FieldKind, FieldMap, ModelDescriptor};
//!
//! let model = ModelDescriptor::new()
//!     .field(FieldDescriptor::new("id").column("id").kind(FieldKind::Int))
//!     .field(FieldDescriptor::new("role").column("role"))
//!     .field(FieldDescriptor::new("group").column("-"));
//!
//! let fields = FieldMap::from_descriptor(&model);
//! assert_eq!(fields.included().get("role").map(String::as_str), Some("role"));
//! assert!(fields.ignored().contains("group"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Column annotation that explicitly excludes a field.
pub const EXCLUDED_COLUMN: &str = "-";

/// The kind of value a field holds.
///
/// The built-in parser coerces expression literals to this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Int,
    Float,
    Bool,
    /// Unknown type: literals keep the type they were written as.
    #[default]
    Any,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Any => "any",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for a single model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Declared (logical) field name.
    pub name: String,
    /// Storage column, `None` or `"-"` when the field is not filterable.
    #[serde(default)]
    pub column: Option<String>,
    /// Externally exposed name used in filter expressions instead of `name`.
    #[serde(default)]
    pub expose: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Create a descriptor with no column (ignored until [`column`](Self::column) is set).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: None,
            expose: None,
            kind: FieldKind::Any,
        }
    }

    /// Set the storage column.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the exposed name.
    pub fn expose(mut self, name: impl Into<String>) -> Self {
        self.expose = Some(name.into());
        self
    }

    /// Set the value kind.
    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// The storage column, if the field is filterable.
    pub fn storage_column(&self) -> Option<&str> {
        self.column
            .as_deref()
            .filter(|c| !c.is_empty() && *c != EXCLUDED_COLUMN)
    }

    /// A field is included iff it declares a non-empty column other than `-`.
    pub fn is_included(&self) -> bool {
        self.storage_column().is_some()
    }

    /// The name filter expressions use for this field.
    pub fn key(&self) -> &str {
        self.expose
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.name)
    }
}

/// An ordered set of field descriptors.
///
/// The default value is the empty descriptor, used for models that are not
/// structs with named fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelDescriptor {
    fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a descriptor from fields in declaration order.
    pub fn from_fields(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// Append a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A type whose fields may be referenced by filter expressions.
///
/// Usually implemented with `#[derive(FilterModel)]`.
pub trait FilterModel {
    /// The field descriptors of this model.
    fn descriptor() -> ModelDescriptor;
}

impl FilterModel for () {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::default()
    }
}

impl<T: FilterModel + ?Sized> FilterModel for &T {
    fn descriptor() -> ModelDescriptor {
        T::descriptor()
    }
}

impl<T: FilterModel + ?Sized> FilterModel for &mut T {
    fn descriptor() -> ModelDescriptor {
        T::descriptor()
    }
}

impl<T: FilterModel + ?Sized> FilterModel for Box<T> {
    fn descriptor() -> ModelDescriptor {
        T::descriptor()
    }
}

impl<T: FilterModel + ?Sized> FilterModel for Arc<T> {
    fn descriptor() -> ModelDescriptor {
        T::descriptor()
    }
}

/// An included field as seen by the filter parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
    /// Name used in expressions (exposed name, else logical name).
    pub key: String,
    /// Declared field name.
    pub name: String,
    /// Storage column.
    pub column: String,
    pub kind: FieldKind,
}

/// The include/ignore vocabulary derived from a [`ModelDescriptor`].
///
/// Computed once per rewriter and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: Vec<MappedField>,
    ignored: BTreeSet<String>,
}

impl FieldMap {
    /// Split a descriptor into included fields and ignored names.
    pub fn from_descriptor(descriptor: &ModelDescriptor) -> Self {
        let mut fields = Vec::new();
        let mut ignored = BTreeSet::new();

        for field in descriptor.fields() {
            match field.storage_column() {
                Some(column) => fields.push(MappedField {
                    key: field.key().to_string(),
                    name: field.name.clone(),
                    column: column.to_string(),
                    kind: field.kind,
                }),
                None => {
                    ignored.insert(field.name.clone());
                }
            }
        }

        Self { fields, ignored }
    }

    /// Build the map for a model type.
    pub fn of<M: FilterModel + ?Sized>() -> Self {
        Self::from_descriptor(&M::descriptor())
    }

    /// Included fields in declaration order.
    pub fn fields(&self) -> &[MappedField] {
        &self.fields
    }

    /// Exposed-or-logical name → storage column.
    pub fn included(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.key.clone(), f.column.clone()))
            .collect()
    }

    /// Logical name → storage column.
    pub fn columns(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.column.clone()))
            .collect()
    }

    /// Logical names of fields that may not be filtered on.
    pub fn ignored(&self) -> &BTreeSet<String> {
        &self.ignored
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.ignored.is_empty()
    }

    /// Resolve an identifier from a filter expression.
    ///
    /// Matches the field key case-insensitively, then the storage column
    /// exactly. Ignored fields never resolve.
    pub fn resolve(&self, ident: &str) -> Option<&MappedField> {
        self.fields
            .iter()
            .find(|f| f.key.eq_ignore_ascii_case(ident))
            .or_else(|| self.fields.iter().find(|f| f.column == ident))
    }
}
