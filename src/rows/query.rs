//! Query builders for TableClient

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};

/// Everything a builder needs to issue its request
#[derive(Clone)]
pub(crate) struct RequestContext {
    pub(crate) url: String,
    pub(crate) key: String,
    pub(crate) client: Client,
    pub(crate) bearer: Option<String>,
}

impl RequestContext {
    fn apply<'a>(&self, mut fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        fetch = fetch.api_key(&self.key);
        if let Some(token) = &self.bearer {
            fetch = fetch.bearer_auth(token);
        }
        fetch
    }
}

/// Shared filter parameter map
#[derive(Debug, Clone, Default)]
struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    fn add(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }

    fn into_map(self) -> HashMap<String, String> {
        self.params
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    ctx: RequestContext,
    query: QueryParams,
}

impl SelectBuilder {
    pub(crate) fn new(ctx: RequestContext, columns: &str) -> Self {
        let mut query = QueryParams::default();
        query.add("select", columns);
        Self { ctx, query }
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(mut self, column: &str, value: T) -> Self {
        self.query.add(column, &format!("eq.{}", value.to_string()));
        self
    }

    /// Order the results by a column
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.query.add("order", &format!("{}.{}", column, direction));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, count: i32) -> Self {
        self.query.add("limit", &count.to_string());
        self
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        let fetch = self
            .ctx
            .apply(Fetch::get(&self.ctx.client, &self.ctx.url))
            .query(self.query.into_map());

        fetch.execute::<Vec<T>>().await
    }

    /// Execute the query and return the first row, if any
    pub async fn execute_one<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        let results = self.limit(1).execute::<T>().await?;
        Ok(results.into_iter().next())
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    ctx: RequestContext,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(ctx: RequestContext, values: T) -> Self {
        Self { ctx, values }
    }

    /// Execute the insert and return the stored rows
    pub async fn execute<R: DeserializeOwned>(self) -> Result<Vec<R>, Error> {
        let fetch = self
            .ctx
            .apply(Fetch::post(&self.ctx.client, &self.ctx.url))
            .header("Prefer", "return=representation")
            .json(&self.values)?;

        fetch.execute::<Vec<R>>().await
    }

    /// Execute the insert without returning the stored rows
    pub async fn execute_no_return(self) -> Result<(), Error> {
        let fetch = self
            .ctx
            .apply(Fetch::post(&self.ctx.client, &self.ctx.url))
            .header("Prefer", "return=minimal")
            .json(&self.values)?;

        fetch.execute_no_content().await
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    ctx: RequestContext,
    values: T,
    query: QueryParams,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(ctx: RequestContext, values: T) -> Self {
        Self {
            ctx,
            values,
            query: QueryParams::default(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        self.query.add(column, &format!("eq.{}", value.to_string()));
        self
    }

    /// Execute the update and return the affected rows
    pub async fn execute<R: DeserializeOwned>(self) -> Result<Vec<R>, Error> {
        let fetch = self
            .ctx
            .apply(Fetch::patch(&self.ctx.client, &self.ctx.url))
            .header("Prefer", "return=representation")
            .query(self.query.into_map())
            .json(&self.values)?;

        fetch.execute::<Vec<R>>().await
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    ctx: RequestContext,
    query: QueryParams,
}

impl DeleteBuilder {
    pub(crate) fn new(ctx: RequestContext) -> Self {
        Self {
            ctx,
            query: QueryParams::default(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        self.query.add(column, &format!("eq.{}", value.to_string()));
        self
    }

    /// Execute the delete and return the removed rows
    pub async fn execute<R: DeserializeOwned>(self) -> Result<Vec<R>, Error> {
        let fetch = self
            .ctx
            .apply(Fetch::delete(&self.ctx.client, &self.ctx.url))
            .header("Prefer", "return=representation")
            .query(self.query.into_map());

        fetch.execute::<Vec<R>>().await
    }
}
