//! Async M-Pesa (Daraja) client: table-driven request builders on top of a cross-process,
//! stampede-safe access-token cache that many short-lived processes can share.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod lock;
pub mod msisdn;
pub mod obs;
pub mod operations;
pub mod payload;
pub mod security;
pub mod services;
pub mod store;
pub mod token;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::{Duration as StdDuration, Instant},
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

pub use client::Mpesa;
#[cfg(feature = "reqwest")] pub use client::ReqwestMpesa;
pub use config::{Environment, MpesaConfig};
pub use error::{Error, Result};
