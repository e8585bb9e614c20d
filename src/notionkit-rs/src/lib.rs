//! notionkit Client Library
//!
//! HTTP client for the Notion databases and pages API.

mod client;
mod models;

pub use client::Client;
pub use models::{DatabaseQuery, PageParent};
pub use notionkit_core::config::{API_KEY_ENV, DEFAULT_BASE_URL, NOTION_VERSION};
pub use notionkit_core::{
    ClientConfig, Executor, HeaderMap, Method, NotionError, OutboundRequest, RawResponse, Result,
    Transport, TransportOptions,
};
