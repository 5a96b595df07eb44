//! Row operations through the backend's REST API

mod query;

use reqwest::Client;
use serde::Serialize;

pub use query::*;

/// Client for row operations on a single table
#[derive(Clone)]
pub struct TableClient {
    /// The base URL for the backend
    url: String,

    /// The anonymous API key
    key: String,

    /// The table name
    table: String,

    /// HTTP client
    client: Client,

    /// Bearer token requests run under, when a user is signed in
    bearer: Option<String>,
}

impl TableClient {
    /// Create a new TableClient
    pub(crate) fn new(url: &str, key: &str, table: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            table: table.to_string(),
            client,
            bearer: None,
        }
    }

    /// Run subsequent requests under the given access token
    pub fn with_auth(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    /// Get the base URL for REST API requests
    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    fn request_context(&self) -> RequestContext {
        RequestContext {
            url: self.rest_url(),
            key: self.key.clone(),
            client: self.client.clone(),
            bearer: self.bearer.clone(),
        }
    }

    /// Select columns from the table
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.request_context(), columns)
    }

    /// Insert a row into the table
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.request_context(), values)
    }

    /// Update rows in the table
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.request_context(), values)
    }

    /// Delete rows from the table
    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.request_context())
    }
}
