//! Remote API client for box resolution and batch box mutations.
//!
//! [`BoxApi`] is the abstract set of remote operations the scan services
//! consume. [`GraphQlBoxApi`] implements it over GraphQL-on-HTTP using
//! [`reqwest`]. Wire DTOs live in [`wire`] and never leak past this crate.

pub mod api;
pub mod config;
pub mod error;
pub mod graphql;
pub mod wire;

pub use api::{BoxApi, CodeLookup, LabelLookup};
pub use config::ClientConfig;
pub use error::ApiError;
pub use graphql::GraphQlBoxApi;
