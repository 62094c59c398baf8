//! # isilon-papi
//!
//! Async Rust client for the Isilon/OneFS Platform API (PAPI), the HTTP
//! management interface of a scale-out NAS cluster.
//!
//! ## Features
//!
//! - **Volumes**: list, inspect, create, copy and delete directories under a
//!   configurable volumes root, plus binary file upload/download
//! - **Quotas**: SmartQuotas hard directory quotas
//! - **Snapshots**: create, list, look up by id or name, remove, restore
//! - **ACLs**: owner and POSIX mode of volumes
//! - **Generic client**: ordered query parameters, JSON or binary payloads,
//!   basic auth, structured API errors, debug request/response dumps via
//!   `tracing`
//!
//! ## Quick Start
//!
//! ```no_run
//! use isilon_papi::{ClientConfig, IsilonClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("https://cluster.example.com:8080", "admin", "secret")
//!         .insecure(true);
//!     let client = IsilonClient::new(config).await?;
//!
//!     client.create_volume("scratch").await?;
//!     client.create_quota("scratch", true, 10 * 1024 * 1024 * 1024).await?;
//!
//!     let snapshot = client.create_snapshot("scratch", "scratch-before-upgrade").await?;
//!     println!("snapshot {} created", snapshot.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Environment
//!
//! [`IsilonClient::from_env`] reads `ISILON_ENDPOINT`, `ISILON_USERNAME`,
//! `ISILON_PASSWORD`, `ISILON_GROUP`, `ISILON_VOLUMESPATH`,
//! `ISILON_INSECURE`, `ISILON_TIMEOUT` and `ISILON_DEBUG`.
//!
//! ## Low-level access
//!
//! ```no_run
//! use isilon_papi::{ClientConfig, OrderedValues, RestClient};
//!
//! # async fn example() -> isilon_papi::Result<()> {
//! let api = RestClient::new(ClientConfig::from_env()?).await?;
//! let params = OrderedValues::from([("path", "/ifs/volumes/scratch")]);
//! let quotas: Option<serde_json::Value> = api
//!     .get("/platform/1/quota/quotas", "", Some(&params), &[])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod acls;
pub mod client;
pub mod config;
pub mod error;
pub mod ordered_values;
pub mod quotas;
pub mod rest_client;
pub mod snapshots;
pub mod types;
pub mod volumes;

// Re-export main types for convenience
pub use client::IsilonClient;
pub use config::{ClientConfig, ClientOptions, DEFAULT_VOLUMES_PATH};
pub use error::{ApiError, ApiErrorDetail, Error, Result};
pub use ordered_values::OrderedValues;
pub use rest_client::{build_url, Payload, RestClient};
pub use types::*;
