//! Sign-in flow orchestration.
//!
//! [`OidcClient`] owns the provider configuration, both vaults, the host navigator, and the token
//! endpoint transport. Each flow lives in its own module and adds methods to the client:
//! authorization request building ([`authorize`]), the code exchange ([`exchange`]), redirect
//! callback processing ([`callback`]), and sign-out ([`logout`]). [`pkce`] holds the random
//! value generators they share.

pub mod authorize;
pub mod callback;
pub mod exchange;
pub mod logout;
pub mod pkce;

pub use authorize::*;
pub use callback::*;
pub use pkce::*;

// self
use crate::{
	_prelude::*,
	auth::{self, UserIdentity},
	config::ProviderConfig,
	http::TokenHttpClient,
	navigation::Navigator,
	oauth::TransportErrorMapper,
	store::{AttemptVault, KeyValueStore, TokenVault},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Client specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestOidcClient = OidcClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Drives the Authorization Code + PKCE flow against a single provider configuration.
#[derive(Clone)]
pub struct OidcClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for the token endpoint.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Immutable provider configuration.
	pub config: Arc<ProviderConfig>,
	/// Durable token storage.
	pub tokens: TokenVault,
	/// Session-scoped storage for the in-flight attempt.
	pub attempt: AttemptVault,
	/// Host navigation capability.
	pub navigator: Arc<dyn Navigator>,
}
impl<C, M> OidcClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ProviderConfig,
		durable: Arc<dyn KeyValueStore>,
		session: Arc<dyn KeyValueStore>,
		navigator: Arc<dyn Navigator>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config: Arc::new(config),
			tokens: TokenVault::new(durable),
			attempt: AttemptVault::new(session),
			navigator,
		}
	}

	/// True when both the access token and the identity token are stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.tokens.is_authenticated().await?)
	}

	/// Stored access token, exposed for callers that attach it themselves.
	pub async fn access_token(&self) -> Result<Option<auth::TokenSecret>> {
		Ok(self.tokens.access_token().await?)
	}

	/// Claims of the stored identity token; `None` when signed out.
	pub async fn id_token_claims(&self) -> Result<Option<auth::Claims>> {
		Ok(self.tokens.id_token().await?.map(|token| auth::claims_or_empty(token.expose())))
	}

	/// Current user derived from the stored identity token.
	pub async fn current_user(&self) -> Result<Option<UserIdentity>> {
		auth::extract_user(&self.tokens).await
	}
}
#[cfg(feature = "reqwest")]
impl OidcClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(
		config: ProviderConfig,
		durable: Arc<dyn KeyValueStore>,
		session: Arc<dyn KeyValueStore>,
		navigator: Arc<dyn Navigator>,
	) -> Self {
		Self::with_http_client(
			config,
			durable,
			session,
			navigator,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for OidcClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OidcClient")
			.field("client_id", &self.config.client_id())
			.field("authorization_endpoint", &self.config.authorization_endpoint().as_str())
			.field("tokens", &self.tokens)
			.field("attempt", &self.attempt)
			.finish()
	}
}
