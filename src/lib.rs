//! Async client for the Happiest Baby Snoo cloud—credential-managed request
//! pipeline, throttled device registry, and typed baby-care journal operations
//! in one crate built for integrations.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod http;
pub mod journal;
pub mod obs;
pub mod registry;

pub use client::{Client, login};
pub use error::{Error, Result};

#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for integration tests; enabled via
	//! `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Credential, TokenSecret},
		client::Client,
		endpoint::ServiceDescriptor,
		http::ReqwestTransport,
	};

	/// Username every test client logs in with.
	pub const TEST_USERNAME: &str = "tester@example.com";
	/// Password every test client logs in with.
	pub const TEST_PASSWORD: &str = "hunter2";

	/// Builds a client wired to mock service + identity endpoints, with the
	/// transport's retry budget trimmed so failure tests stay fast.
	pub fn build_test_client(base: &str, identity: &str) -> Client {
		let descriptor = ServiceDescriptor::default()
			.with_base_endpoint(Url::parse(base).expect("Failed to parse mock base endpoint."))
			.with_identity_endpoint(
				Url::parse(identity).expect("Failed to parse mock identity endpoint."),
			);

		Client::with_transport(
			descriptor,
			ReqwestTransport::default().with_max_attempts(2),
			TEST_USERNAME,
			TEST_PASSWORD,
		)
	}

	/// Seeds a bearer credential directly so requests skip the initial login.
	pub fn seed_credential(
		client: &Client,
		bearer: &str,
		refresh: Option<&str>,
		valid_for: Duration,
	) {
		let now = OffsetDateTime::now_utc();

		client.credential.replace(Credential {
			bearer: Some(TokenSecret::new(bearer)),
			refresh: refresh.map(TokenSecret::new),
			expires_at: Some(now + valid_for),
			last_refreshed_at: Some(now),
		});
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, snoo_client as _};
