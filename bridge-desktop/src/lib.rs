//! # Desktop Bridge Implementations
//!
//! Desktop-ready implementations of the `bridge-traits` contracts.
//!
//! Currently this is the reqwest-backed [`ReqwestHttpClient`]; hosts on
//! other platforms supply their own `HttpClient` adapter instead.

pub mod http;

pub use http::ReqwestHttpClient;
