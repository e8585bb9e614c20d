//! notionkit Core Library
//!
//! This crate provides the request layer of the Notion API client:
//! - Error taxonomy shared by every operation
//! - Client configuration and credential resolution
//! - Transport abstraction with a `reqwest` implementation
//! - The request executor that maps responses onto typed errors

pub mod config;
pub mod error;
pub mod executor;
pub mod transport;

// Re-export commonly used types
pub use config::{ClientConfig, ClientConfigBuilder, TransportOptions};
pub use error::{NotionError, Result};
pub use executor::Executor;
pub use transport::{HeaderMap, Method, OutboundRequest, RawResponse, ReqwestTransport, Transport};
