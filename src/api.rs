//! Authorization contract for the downstream recommendation/feedback API.
//!
//! The API gateway authorizes callers with the raw identity token in the `Authorization` header
//! (no scheme prefix). Only request construction lives here; sending requests and handling the
//! responses is left to the host.

// self
use crate::{_prelude::*, auth::TokenSecret, store::TokenVault};
#[cfg(feature = "reqwest")]
use crate::config::ApiConfig;

/// Value for the `Authorization` header, or [`Error::MissingIdToken`] when signed out.
pub async fn authorization_header_value(tokens: &TokenVault) -> Result<TokenSecret> {
	tokens.id_token().await?.ok_or(Error::MissingIdToken)
}

/// Attaches `Authorization: <id_token>` to `builder`.
#[cfg(feature = "reqwest")]
pub async fn authorize_request(
	builder: reqwest::RequestBuilder,
	tokens: &TokenVault,
) -> Result<reqwest::RequestBuilder> {
	let id_token = authorization_header_value(tokens).await?;

	Ok(builder.header(reqwest::header::AUTHORIZATION, id_token.expose()))
}

/// Authorized `GET` for the recommendations collection.
#[cfg(feature = "reqwest")]
pub async fn recommendations_request(
	http: &ReqwestClient,
	api: &ApiConfig,
	tokens: &TokenVault,
) -> Result<reqwest::RequestBuilder> {
	authorize_request(http.get(api.recommendations_url()?), tokens).await
}

/// Authorized JSON `POST` of `feedback` to the feedback endpoint.
#[cfg(feature = "reqwest")]
pub async fn feedback_request<T>(
	http: &ReqwestClient,
	api: &ApiConfig,
	tokens: &TokenVault,
	feedback: &T,
) -> Result<reqwest::RequestBuilder>
where
	T: ?Sized + Serialize,
{
	let builder = http.post(api.feedback_url()?).json(feedback);

	authorize_request(builder, tokens).await
}
