//! Kernel utilities shared by the server and the facade.
//! Keep this crate lightweight: config loading, the shared HTTP state and the
//! system routes live here; container semantics live in `cfgd-container`.
//!
//! ## Config loading
//! ```rust,no_run
//! use cfgd_kernel::config::load_config;
//! use cfgd_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap();
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use cfgd_domain as domain;
