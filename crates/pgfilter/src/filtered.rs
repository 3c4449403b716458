//! A client wrapper that filters every statement it executes.

use crate::client::GenericClient;
use crate::error::FilterResult;
use crate::rewrite::FilterRewriter;
use crate::value::FilterValue;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Wraps a [`GenericClient`] and passes each statement through a
/// [`FilterRewriter`] before it reaches the database.
///
/// The condition's values are bound after the caller's parameters. A rejected
/// filter expression fails the call without a round-trip.
///
/// ```ignore
/// let client = FilteredClient::new(pool.get().await?, rewriter);
/// let rows = client
///     .query("SELECT * FROM users WHERE org_id = $1 AND -- :condition", &[&org_id])
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct FilteredClient<C> {
    client: C,
    rewriter: Arc<FilterRewriter>,
}

impl<C: GenericClient> FilteredClient<C> {
    pub fn new(client: C, rewriter: impl Into<Arc<FilterRewriter>>) -> Self {
        Self {
            client,
            rewriter: rewriter.into(),
        }
    }

    /// Get a reference to the wrapped client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Unwrap the client.
    pub fn into_inner(self) -> C {
        self.client
    }

    pub fn rewriter(&self) -> &FilterRewriter {
        &self.rewriter
    }
}

fn bind<'a>(
    params: &[&'a (dyn ToSql + Sync)],
    extra: &'a [FilterValue],
) -> Vec<&'a (dyn ToSql + Sync)> {
    let mut bound = Vec::with_capacity(params.len() + extra.len());
    bound.extend_from_slice(params);
    bound.extend(extra.iter().map(|v| v as &(dyn ToSql + Sync)));
    bound
}

impl<C: GenericClient> GenericClient for FilteredClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<Vec<Row>> {
        let rewritten = self.rewriter.rewrite_sql(sql, params.len())?;
        let params = bind(params, &rewritten.params);
        self.client.query(&rewritten.sql, &params).await
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<Row> {
        let rewritten = self.rewriter.rewrite_sql(sql, params.len())?;
        let params = bind(params, &rewritten.params);
        self.client.query_one(&rewritten.sql, &params).await
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> FilterResult<Option<Row>> {
        let rewritten = self.rewriter.rewrite_sql(sql, params.len())?;
        let params = bind(params, &rewritten.params);
        self.client.query_opt(&rewritten.sql, &params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> FilterResult<u64> {
        let rewritten = self.rewriter.rewrite_sql(sql, params.len())?;
        let params = bind(params, &rewritten.params);
        self.client.execute(&rewritten.sql, &params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        self.client.cancel_token()
    }
}
