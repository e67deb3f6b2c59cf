//! # Adaptavist Core Library
//!
//! Shared building blocks for the Adaptavist client: where the settings file
//! lives and how it is parsed, how credentials are discovered, how the server
//! URL is normalised, and which TLS verification policy a connection uses.
//! None of these helpers talk to the network.

pub mod config;
pub mod creds;
pub mod executor;
pub mod tls;
pub mod url;

// Re-export main types for the client crate
pub use config::{ConfigDirs, Settings, get_config_dirs};
pub use creds::Credentials;
pub use executor::current_executor;
pub use tls::Verification;
pub use url::{ensure_url_scheme, resolve_server_url};
