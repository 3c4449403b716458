//! # pgfilter
//!
//! Inject human-readable filter expressions into parameterized PostgreSQL
//! statements.
//!
//! ## Features
//!
//! - **Marker based**: the statement says where the condition goes, with a
//!   `-- :condition` comment or a `$1::void IS NULL` sentinel
//! - **Placeholder safe**: the condition's `$n` are renumbered after the
//!   statement's own arguments, never colliding or leaving gaps
//! - **Model checked**: filters may only reference columns the model exposes
//! - **Pluggable**: bring your own filter language through [`FilterParser`]
//! - **Client friendly**: wrap any [`GenericClient`] in a [`FilteredClient`]
//!
//! ## Example
//!
//! ```ignore
//! use pgfilter::{FilterModel, FilterRewriter, FilteredClient};
//!
//! #[derive(FilterModel)]
//! #[filter(rename_all = "camelCase")]
//! struct User {
//!     #[filter(column = "id")]
//!     id: i64,
//!     #[filter(column = "user_role")]
//!     user_role: String,
//!     password_hash: String,
//! }
//!
//! let rewriter = FilterRewriter::new::<User>("userRole = 'admin' and id > 10");
//! let client = FilteredClient::new(client, rewriter);
//!
//! // SELECT * FROM users WHERE deleted_at IS NULL AND (user_role = $1 AND id > $2)
//! let rows = client
//!     .query("SELECT * FROM users WHERE deleted_at IS NULL AND -- :condition", &[])
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod filtered;
pub mod marker;
pub mod model;
pub mod placeholder;
pub mod rewrite;
pub mod value;

pub use client::GenericClient;
pub use config::RewriterConfig;
pub use error::{DbError, FilterError, FilterResult, SEVERITY_ERROR, SQLSTATE_SYNTAX_ERROR};
pub use filter::{ComparisonOp, FilterParser, MqlParser, ParseError, ParsedCondition};
pub use filtered::FilteredClient;
pub use marker::{CONDITION_MARKER, InjectionPoint, MarkerStyle, Markers};
pub use model::{
    EXCLUDED_COLUMN, FieldDescriptor, FieldKind, FieldMap, FilterModel, MappedField,
    ModelDescriptor,
};
pub use placeholder::{max_placeholder, placeholder_indices, shift_placeholders};
pub use rewrite::{FilterRewriter, Rewritten, TAUTOLOGY};
pub use value::FilterValue;

#[cfg(feature = "derive")]
pub use pgfilter_derive::FilterModel;
