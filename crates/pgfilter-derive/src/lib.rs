//! Derive macros for pgfilter
//!
//! Provides `#[derive(FilterModel)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod filter_model;

/// Derive `FilterModel` for a struct.
///
/// # Example
///
/// ```ignore
/// use pgfilter::FilterModel;
///
/// #[derive(FilterModel)]
/// #[filter(rename_all = "camelCase")]
/// struct User {
///     #[filter(column = "id")]
///     id: i64,
///     #[filter(column = "user_role")]
///     user_role: String,
///     #[filter(column = "perm", expose = "level")]
///     permission: Option<i32>,
///     password_hash: String,
/// }
/// ```
///
/// Expressions may then reference `id`, `userRole` and `level`;
/// `password_hash` is not filterable.
///
/// # Attributes
///
/// - `#[filter(rename_all = "...")]` - Derive exposed names from field names
///   (`snake_case`, `camelCase`, `PascalCase`, `kebab-case`,
///   `SCREAMING_SNAKE_CASE`, `lowercase`, `UPPERCASE`)
/// - `#[filter(column = "name")]` - Storage column; `"-"` or absent excludes the field
/// - `#[filter(expose = "name")]` - Name used in filter expressions
/// - `#[filter(kind = "int")]` - Override the value kind inferred from the field type
///   (`text`, `int`, `float`, `bool`, `any`)
#[proc_macro_derive(FilterModel, attributes(filter))]
pub fn derive_filter_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    filter_model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
