//! OpenID Connect Authorization Code + PKCE client for hosted identity providers: authorization
//! request building, redirect callback validation, token vaults, identity extraction, and an
//! auth-state gate for the rest of the application.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod navigation;
pub mod oauth;
pub mod obs;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::ProviderConfig,
		flows::OidcClient,
		http::ReqwestHttpClient,
		navigation::MemoryNavigator,
		oauth::ReqwestTransportErrorMapper,
		store::{KeyValueStore, MemoryStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = OidcClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Handles to the in-memory collaborators wired into a test client.
	#[derive(Clone, Debug)]
	pub struct TestHarness {
		/// Durable store standing in for the browser's persistent storage.
		pub durable: Arc<MemoryStore>,
		/// Session store standing in for the tab-scoped storage.
		pub session: Arc<MemoryStore>,
		/// Navigator that records history replacements and navigations.
		pub navigator: Arc<MemoryNavigator>,
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Points a minimal provider configuration at the supplied hosted UI base (usually an
	/// `httpmock` server URL).
	pub fn test_provider_config(hosted_ui_base: &str) -> ProviderConfig {
		ProviderConfig::builder("eu-central-1", "eu-central-1_TestPool", "client-it", "test-domain")
			.redirect_uri("http://localhost:3000/callback")
			.logout_redirect_uri("http://localhost:3000")
			.scopes(["openid", "email", "phone", "profile"])
			.hosted_ui_base(Url::parse(hosted_ui_base).expect("Hosted UI base should parse."))
			.build()
			.expect("Test provider configuration should validate.")
	}

	/// Constructs an [`OidcClient`] backed by in-memory stores, a recording navigator, and the
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(config: ProviderConfig) -> (ReqwestTestClient, TestHarness) {
		let durable = Arc::new(MemoryStore::default());
		let session = Arc::new(MemoryStore::default());
		let navigator = Arc::new(MemoryNavigator::default());
		let durable_store: Arc<dyn KeyValueStore> = durable.clone();
		let session_store: Arc<dyn KeyValueStore> = session.clone();
		let client = OidcClient::with_http_client(
			config,
			durable_store,
			session_store,
			navigator.clone(),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(client, TestHarness { durable, session, navigator })
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{Arc, Weak},
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
