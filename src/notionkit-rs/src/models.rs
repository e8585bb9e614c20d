use notionkit_core::{NotionError, Result};
use serde::Serialize;
use serde_json::Value;

/// Container a new page is created under.
///
/// Serializes as `{"database_id": "..."}` or `{"page_id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageParent {
    DatabaseId(String),
    PageId(String),
}

impl PageParent {
    /// Pick the parent from optional ids. The database wins when both are
    /// given; empty ids count as absent.
    pub fn from_ids(database_id: Option<&str>, page_id: Option<&str>) -> Result<Self> {
        match (
            database_id.filter(|id| !id.is_empty()),
            page_id.filter(|id| !id.is_empty()),
        ) {
            (Some(id), _) => Ok(PageParent::DatabaseId(id.to_string())),
            (None, Some(id)) => Ok(PageParent::PageId(id.to_string())),
            (None, None) => Err(NotionError::InvalidParameters(
                "parent database id or page id required".to_string(),
            )),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PageParent::DatabaseId(id) | PageParent::PageId(id) => id,
        }
    }
}

/// Body of `POST databases/{id}/query`. Unset fields are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    20
}

impl Default for DatabaseQuery {
    fn default() -> Self {
        Self {
            filter: None,
            sorts: None,
            start_cursor: None,
            page_size: default_page_size(),
        }
    }
}

impl DatabaseQuery {
    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sorts(mut self, sorts: Value) -> Self {
        self.sorts = Some(sorts);
        self
    }

    pub fn start_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.start_cursor = Some(cursor.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

#[derive(Serialize)]
pub(crate) struct CreatePageRequest<'a> {
    pub parent: &'a PageParent,
    pub properties: Value,
    pub children: Vec<Value>,
}

#[derive(Serialize)]
pub(crate) struct UpdatePageRequest {
    pub properties: Value,
}
