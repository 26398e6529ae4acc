//! Storage contracts and built-in key/value backends.
//!
//! Two scopes are in play: a durable store for issued tokens and a session store whose lifetime
//! is bounded by one sign-in attempt (nonce, state, PKCE verifier). Both speak the same
//! [`KeyValueStore`] contract; [`TokenVault`] and [`AttemptVault`] layer the typed key sets on
//! top.

pub mod file;
pub mod memory;
pub mod vault;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use vault::{AttemptVault, TokenVault};

// self
use crate::_prelude::*;

/// Storage keys shared with the hosting application.
pub mod keys {
	/// Durable access token key.
	pub const ACCESS_TOKEN: &str = "access_token";
	/// Durable identity token key.
	pub const ID_TOKEN: &str = "id_token";
	/// Durable refresh token key.
	pub const REFRESH_TOKEN: &str = "refresh_token";
	/// Session-scoped nonce key.
	pub const OIDC_NONCE: &str = "oidc_nonce";
	/// Session-scoped state key.
	pub const OIDC_STATE: &str = "oidc_state";
	/// Session-scoped PKCE verifier key.
	pub const OIDC_CODE_VERIFIER: &str = "oidc_code_verifier";

	/// Every durable token key.
	pub const TOKEN_KEYS: [&str; 3] = [ACCESS_TOKEN, ID_TOKEN, REFRESH_TOKEN];
	/// Every session-scoped attempt key.
	pub const ATTEMPT_KEYS: [&str; 3] = [OIDC_NONCE, OIDC_STATE, OIDC_CODE_VERIFIER];
}

/// Boxed future returned by [`KeyValueStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// String key/value storage backend.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Reads the value stored under `key`.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Writes every entry in one step; readers never observe a partial write.
	fn set_many(&self, entries: Vec<(String, String)>) -> StoreFuture<'_, ()>;

	/// Removes every listed key in one step. Missing keys are ignored.
	fn remove_many<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
