//! Source adapters and the crawl dispatcher.

pub mod dispatch;
pub mod error;
pub mod http;
pub mod source;

pub use dispatch::{DispatchEvent, DispatchOptions, DispatchReport, SourceFailure, dispatch};
pub use error::FetchError;
pub use http::{JsonEndpointSource, SourceEndpoint};
pub use source::{SourceAdapter, SourceRegistry, SourceSelection};
