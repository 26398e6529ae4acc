//! Client-level error types shared across flows, configuration, and stores.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant is scoped to the flow attempt that raised it; none of them is fatal to the
/// hosting application.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Unexpected but non-fatal token endpoint response.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider declined the authorization request, or the user cancelled it.
	#[error(
		"Identity provider returned `{error}`: {}.",
		.description.as_deref().unwrap_or("no description supplied")
	)]
	ProviderAuthorization {
		/// OAuth `error` code from the redirect.
		error: String,
		/// OAuth `error_description` from the redirect, when present.
		description: Option<String>,
	},
	/// Redirect arrived without an authorization code.
	#[error("No authorization code received.")]
	MissingAuthorizationCode,
	/// Returned `state` does not match the value saved before the redirect.
	#[error("State parameter mismatch; possible cross-site request forgery.")]
	StateMismatch,
	/// Token endpoint answered with a non-success status.
	#[error("Token exchange failed with HTTP status {}.", .status.map_or_else(|| "unknown".into(), |s| s.to_string()))]
	TokenExchange {
		/// HTTP status code, when the transport captured one.
		status: Option<u16>,
	},
	/// Token endpoint response (or the token vault) carries no identity token.
	#[error("No identity token is available.")]
	MissingIdToken,
	/// Auth state was requested outside the lifetime of its session gate.
	#[error("Auth state requested outside of its session gate.")]
	ContextUnavailable,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A derived endpoint could not be parsed.
	#[error("The derived {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Redirect URI cannot be used by the OAuth client.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},

	/// A required field was left empty.
	#[error("Configuration field `{field}` must not be empty.")]
	EmptyField {
		/// Field name.
		field: &'static str,
	},
	/// A host label contains characters outside `[A-Za-z0-9-]`.
	#[error("Configuration field `{field}` is not a valid host label: {value}.")]
	InvalidLabel {
		/// Field name.
		field: &'static str,
		/// Offending value.
		value: String,
	},
	/// User pool identifier belongs to another region.
	#[error("User pool `{user_pool_id}` does not belong to region `{region}`.")]
	UserPoolRegionMismatch {
		/// Configured user pool identifier.
		user_pool_id: String,
		/// Configured region.
		region: String,
	},
	/// A configured URI could not be parsed.
	#[error("Configuration field `{field}` is not a valid URL: {value}.")]
	InvalidUri {
		/// Field name.
		field: &'static str,
		/// Offending value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// A URI uses a scheme other than `http` or `https`.
	#[error("Configuration field `{field}` must be an http(s) URL: {url}.")]
	UnsupportedScheme {
		/// Field name.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Requested scopes are invalid.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// PKCE verifier length outside of RFC 7636 bounds.
	#[error("Code verifier length {len} is outside the 43..=128 range.")]
	VerifierLength {
		/// Requested length.
		len: usize,
	},
	/// Configuration file could not be read.
	#[error("Failed to read configuration file {}.", .path.display())]
	Read {
		/// File path.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration document is malformed.")]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Unexpected token endpoint responses.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
