//! Gate.io spot exchange adapter
//!
//! Implements [`crate::exchange::Exchange`] over the Gate.io v4 REST API.
//!
//! # Environment Variables
//!
//! Credentials are read from `GATEIO_KEY` and `GATEIO_SECRET`, optionally
//! loaded from a `.env` file first:
//!
//! ```no_run
//! use std::path::Path;
//! use gate_ladder::gateio::{Credentials, GateClient};
//!
//! let credentials = Credentials::from_env_file(Path::new(".env"))?;
//! let client = GateClient::new(credentials)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`auth`]: HMAC-SHA512 request signing and credentials
//! - [`types`]: Request and response bodies
//! - [`client`]: Blocking API client

pub mod auth;
pub mod client;
pub mod types;

pub use auth::Credentials;
pub use client::{ClientConfig, GateClient, API_BASE_URL, API_PREFIX, TESTNET_BASE_URL};
