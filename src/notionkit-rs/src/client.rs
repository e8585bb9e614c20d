use notionkit_core::{ClientConfig, Executor, Method, NotionError, Result, Transport};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::models::{CreatePageRequest, DatabaseQuery, PageParent, UpdatePageRequest};

/// Notion REST API Client
pub struct Client {
    executor: Executor,
}

impl Client {
    /// Create a client with the default endpoint, reading the key from
    /// `NOTION_API_KEY`
    pub fn new() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::builder().api_key(api_key).build()?)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            executor: Executor::new(config)?,
        })
    }

    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            executor: Executor::with_transport(config, transport)?,
        })
    }

    /// The underlying executor, for endpoints without a dedicated method
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// List the databases shared with the integration
    pub async fn list_databases(&self) -> Result<Value> {
        self.executor
            .execute(Method::Get, "databases", None, None)
            .await
    }

    /// Get a database's title, properties and other metadata
    pub async fn retrieve_database(&self, database_id: &str) -> Result<Value> {
        let path = format!("databases/{}", segment(database_id, "database id")?);
        self.executor.execute(Method::Get, &path, None, None).await
    }

    /// Query a database's rows
    pub async fn query_database(&self, database_id: &str, query: &DatabaseQuery) -> Result<Value> {
        let path = format!("databases/{}/query", segment(database_id, "database id")?);
        let body = to_body(query)?;
        self.executor
            .execute(Method::Post, &path, None, Some(body))
            .await
    }

    /// Get a page by ID
    pub async fn retrieve_page(&self, page_id: &str) -> Result<Value> {
        let path = format!("pages/{}", segment(page_id, "page id")?);
        self.executor.execute(Method::Get, &path, None, None).await
    }

    /// Create a page (a database row when the parent is a database).
    ///
    /// At least one of `database_id` and `page_id` must be given; nothing is
    /// sent otherwise.
    pub async fn create_page(
        &self,
        database_id: Option<&str>,
        page_id: Option<&str>,
        properties: Value,
    ) -> Result<Value> {
        let parent = PageParent::from_ids(database_id, page_id)?;
        self.create_page_under(&parent, properties).await
    }

    pub async fn create_page_under(&self, parent: &PageParent, properties: Value) -> Result<Value> {
        segment(parent.id(), "parent id")?;
        let body = to_body(&CreatePageRequest {
            parent,
            properties,
            children: Vec::new(),
        })?;
        self.executor
            .execute(Method::Post, "pages", None, Some(body))
            .await
    }

    /// Update a page's property values
    pub async fn update_page(&self, page_id: &str, properties: Value) -> Result<Value> {
        let path = format!("pages/{}", segment(page_id, "page id")?);
        let body = to_body(&UpdatePageRequest { properties })?;
        self.executor
            .execute(Method::Patch, &path, None, Some(body))
            .await
    }
}

/// Ids are spliced into the path, so they must be one non-empty segment.
fn segment<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    if id.is_empty() || id.contains(['/', '\\', '?', '#']) {
        return Err(NotionError::InvalidParameters(format!(
            "{what} {id:?} is not a valid identifier"
        )));
    }
    Ok(id)
}

fn to_body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| NotionError::InvalidParameters(format!("request body: {e}")))
}
