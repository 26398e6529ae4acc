//! `oauth2` facade for the authorization code exchange.

pub use oauth2;

// std
use std::time::Duration;
// crates.io
use oauth2::{
	AccessToken, AuthUrl, AuthorizationCode, Client, ClientId, EndpointNotSet, EndpointSet,
	HttpClientError, PkceCodeVerifier, RedirectUrl, RefreshToken, RequestTokenError, Scope,
	StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
		BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	config::ProviderConfig,
	error::{ConfigError, TransientError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};

/// Token endpoint response of an OIDC provider.
///
/// Only `access_token` is required on the wire. A missing `token_type` reads as `Bearer`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OidcTokenResponse {
	access_token: AccessToken,
	#[serde(default = "bearer", deserialize_with = "deserialize_token_type")]
	token_type: BasicTokenType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_token: Option<RefreshToken>,
	#[serde(
		rename = "scope",
		default,
		deserialize_with = "deserialize_scopes",
		serialize_with = "serialize_scopes",
		skip_serializing_if = "Option::is_none"
	)]
	scopes: Option<Vec<Scope>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	id_token: Option<String>,
}
impl OidcTokenResponse {
	/// Compact-serialized identity token, if the provider returned one.
	pub fn id_token(&self) -> Option<&str> {
		self.id_token.as_deref()
	}
}
impl TokenResponse for OidcTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &BasicTokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<Duration> {
		self.expires_in.map(Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		self.scopes.as_ref()
	}
}

fn bearer() -> BasicTokenType {
	BasicTokenType::Bearer
}

// Token types are case-insensitive.
fn deserialize_token_type<'de, D>(deserializer: D) -> Result<BasicTokenType, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?.to_ascii_lowercase();

	Ok(match raw.as_str() {
		"bearer" => BasicTokenType::Bearer,
		"mac" => BasicTokenType::Mac,
		_ => BasicTokenType::Extension(raw),
	})
}

fn deserialize_scopes<'de, D>(deserializer: D) -> Result<Option<Vec<Scope>>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<String>::deserialize(deserializer)?
		.map(|raw| raw.split_whitespace().map(|scope| Scope::new(scope.to_owned())).collect()))
}

fn serialize_scopes<S>(scopes: &Option<Vec<Scope>>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: serde::Serializer,
{
	match scopes {
		Some(scopes) => serializer.serialize_some(
			&scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" "),
		),
		None => serializer.serialize_none(),
	}
}

type OidcOAuthClient = Client<
	BasicErrorResponse,
	OidcTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type OidcRequestTokenError<E> = RequestTokenError<HttpClientError<E>, BasicErrorResponse>;

/// Maps HTTP transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a client error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransientError::TokenEndpoint {
				message: format!("HTTP client error: {message}"),
				status: meta_status(meta),
			}
			.into(),
			_ => TransientError::TokenEndpoint {
				message: "HTTP client error".into(),
				status: meta_status(meta),
			}
			.into(),
		}
	}
}

/// Public-client code exchange bound to one provider configuration.
pub(crate) struct CodeExchangeFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: OidcOAuthClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> CodeExchangeFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_config(
		config: &ProviderConfig,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(config.authorization_endpoint().to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "authorization", source })?;
		let token_url = TokenUrl::new(config.token_endpoint().to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "token", source })?;
		let redirect_url = RedirectUrl::new(config.redirect_uri().as_str().to_owned())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		// No client secret: `client_id` travels in the form body.
		let oauth_client = Client::new(ClientId::new(config.client_id().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Trades `code` and `verifier` for a [`TokenSet`].
	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		verifier: &str,
	) -> Result<TokenSet> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err, self.error_mapper.as_ref()))?;

		token_set_from_response(response)
	}
}

fn token_set_from_response(response: OidcTokenResponse) -> Result<TokenSet> {
	let id_token = response
		.id_token()
		.filter(|token| !token.is_empty())
		.ok_or(Error::MissingIdToken)?;
	let tokens = TokenSet::new(response.access_token().secret().to_owned(), id_token.to_owned());

	Ok(match response.refresh_token() {
		Some(refresh) => tokens.with_refresh_token(refresh.secret().to_owned()),
		None => tokens,
	})
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: OidcRequestTokenError<E>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		_ if meta_ref.is_some_and(ResponseMetadata::is_failure_status) =>
			Error::TokenExchange { status: meta_status(meta_ref) },
		RequestTokenError::ServerResponse(_) =>
			Error::TokenExchange { status: meta_status(meta_ref) },
		RequestTokenError::Parse(source, _body) =>
			TransientError::TokenResponseParse { source, status: meta_status(meta_ref) }.into(),
		RequestTokenError::Other(message) =>
			TransientError::TokenEndpoint { message, status: meta_status(meta_ref) }.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::TokenEndpoint {
			message: "request timed out".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
		}
		.into();
	}

	TransportError::from(err).into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

	fn config() -> ProviderConfig {
		ProviderConfig::builder("eu-central-1", "eu-central-1_Pool", "client-1", "tenant")
			.redirect_uri("https://app.example.com/callback")
			.logout_redirect_uri("https://app.example.com")
			.scopes(["openid"])
			.build()
			.expect("Provider configuration fixture should validate.")
	}

	fn parse(body: &str) -> OidcTokenResponse {
		serde_json::from_str(body).expect("Token response fixture should deserialize.")
	}

	#[test]
	fn builds_public_client_facade() {
		let facade = <CodeExchangeFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_config(
			&config(),
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		);

		assert!(facade.is_ok());
	}

	#[test]
	fn token_response_maps_into_token_set() {
		let tokens = token_set_from_response(parse(
			r#"{"access_token":"A","id_token":"I","refresh_token":"R","token_type":"Bearer","expires_in":3600}"#,
		))
		.expect("Complete responses should map.");

		assert_eq!(tokens.access_token.expose(), "A");
		assert_eq!(tokens.id_token.expose(), "I");
		assert_eq!(tokens.refresh_token.as_ref().map(|t| t.expose()), Some("R"));
	}

	#[test]
	fn token_type_is_optional_and_case_insensitive() {
		let tokens = token_set_from_response(parse(r#"{"access_token":"a","id_token":"h.e30.s"}"#))
			.expect("Responses without a token type should map.");

		assert_eq!(tokens.access_token.expose(), "a");
		assert_eq!(tokens.id_token.expose(), "h.e30.s");
		assert_eq!(
			parse(r#"{"access_token":"a","token_type":"BEARER"}"#).token_type(),
			&BasicTokenType::Bearer
		);

		let scoped = parse(r#"{"access_token":"a","token_type":"Bearer","scope":"openid email"}"#);

		assert_eq!(scoped.scopes().map(Vec::len), Some(2));
	}

	#[test]
	fn token_response_without_id_token_is_rejected() {
		let err = token_set_from_response(parse(r#"{"access_token":"A","token_type":"Bearer"}"#))
			.expect_err("Responses without an identity token must fail.");

		assert!(matches!(err, Error::MissingIdToken));
	}

	#[test]
	fn failure_status_wins_over_response_shape() {
		let meta = ResponseMetadata { status: Some(400) };
		let err = map_request_error::<ReqwestError, _>(
			Some(meta),
			RequestTokenError::Other("unexpected content type".into()),
			&ReqwestTransportErrorMapper,
		);

		assert!(matches!(err, Error::TokenExchange { status: Some(400) }));
	}

	#[test]
	fn unexpected_success_bodies_are_transient() {
		let err = map_request_error::<ReqwestError, _>(
			Some(ResponseMetadata { status: Some(200) }),
			RequestTokenError::Other("unexpected content type".into()),
			&ReqwestTransportErrorMapper,
		);

		assert!(matches!(err, Error::Transient(TransientError::TokenEndpoint { .. })));
	}
}
