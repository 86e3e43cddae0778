//! `envstore` keeps an in-memory mirror of the environments a server exposes under
//! `/api/environment` and offers lookup, filter and CRUD operations that keep the mirror in
//! sync with the server.
//!
//! The entry point is [`environments::EnvironmentStore`]. It talks to the server through an
//! [`client::ApiConnector`] and loads environment policies through a
//! [`policies::PolicyFetcher`].

pub mod client;
pub mod config;
pub mod environments;
pub mod errors;
pub mod models;
pub mod policies;

pub use client::{ApiClient, ApiConnector};
pub use config::StoreConfig;
pub use environments::EnvironmentStore;
pub use errors::StoreError;
pub use policies::{PolicyFetcher, PolicyStore};
