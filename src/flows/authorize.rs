//! Authorization request construction.

// self
use crate::{
	_prelude::*,
	flows::{
		OidcClient,
		pkce::{self, DEFAULT_VERIFIER_LEN, PkceCodeChallengeMethod, PkcePair},
	},
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind},
};

/// Parameters callers may not replace through extra parameters.
///
/// Each one must match what the attempt saved or what the token exchange sends.
pub const PROTECTED_PARAMS: [&str; 5] =
	["redirect_uri", "nonce", "state", "code_challenge", "code_challenge_method"];

/// Sign-up entry hint understood by the hosted UI.
pub const SIGN_UP_PARAMS: [(&str, Option<&str>); 1] = [("prompt", Some("signup"))];

/// Fully-formed authorization request for one attempt.
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	/// URL the user agent should be sent to.
	pub authorize_url: Url,
	/// CSRF state saved for the callback.
	pub state: String,
	/// Nonce saved for the attempt.
	pub nonce: String,
	/// PKCE challenge sent with the request.
	pub code_challenge: String,
	/// PKCE challenge method.
	pub code_challenge_method: PkceCodeChallengeMethod,
}

impl<C, M> OidcClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the sign-in request and saves nonce, state, and verifier to the attempt.
	pub async fn authorization_url(&self) -> Result<AuthorizationRequest> {
		self.authorization_url_with(&[]).await
	}

	/// Builds the sign-up request (`prompt=signup`).
	pub async fn sign_up_url(&self) -> Result<AuthorizationRequest> {
		self.authorization_url_with(&SIGN_UP_PARAMS).await
	}

	/// Builds an authorization request with caller-supplied parameters merged last.
	///
	/// Extras replace defaults of the same name in place and are appended otherwise. Entries
	/// whose value is `None` are skipped, and [`PROTECTED_PARAMS`] can never be replaced.
	pub async fn authorization_url_with(
		&self,
		extra: &[(&str, Option<&str>)],
	) -> Result<AuthorizationRequest> {
		obs::observe(FlowKind::Authorize, "authorization_url", async {
			let nonce = pkce::generate_nonce(&self.attempt).await?;
			let state = pkce::generate_state(&self.attempt).await?;
			let pair = PkcePair::generate(DEFAULT_VERIFIER_LEN)?;

			self.attempt.set_code_verifier(pair.verifier()).await?;

			let mut params = vec![
				("client_id".to_owned(), self.config.client_id().to_owned()),
				("response_type".to_owned(), self.config.response_type().as_str().to_owned()),
				("scope".to_owned(), self.config.scopes().joined()),
				("redirect_uri".to_owned(), self.config.redirect_uri().as_str().to_owned()),
				("nonce".to_owned(), nonce.clone()),
				("state".to_owned(), state.clone()),
				("code_challenge".to_owned(), pair.challenge.clone()),
				("code_challenge_method".to_owned(), pair.method.as_str().to_owned()),
			];

			merge_extra_params(&mut params, extra);

			let mut authorize_url = self.config.authorization_endpoint().clone();

			authorize_url.query_pairs_mut().extend_pairs(params);

			Ok(AuthorizationRequest {
				authorize_url,
				state,
				nonce,
				code_challenge: pair.challenge,
				code_challenge_method: pair.method,
			})
		})
		.await
	}
}

fn merge_extra_params(params: &mut Vec<(String, String)>, extra: &[(&str, Option<&str>)]) {
	for (key, value) in extra {
		let Some(value) = value else { continue };

		if PROTECTED_PARAMS.contains(key) {
			continue;
		}

		match params.iter_mut().find(|(existing, _)| existing == key) {
			Some((_, slot)) => *slot = (*value).to_owned(),
			None => params.push(((*key).to_owned(), (*value).to_owned())),
		}
	}
}
