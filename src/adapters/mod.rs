// Adapters layer: concrete implementations of the domain ports.

pub mod catalog;
pub mod http;

pub use catalog::SampleCatalog;
pub use http::ApiClient;
