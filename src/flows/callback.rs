//! Redirect callback processing.
//!
//! One pass per redirect: parse the query, reject provider errors, require a code, check the
//! returned `state` against the saved one, exchange, then clean up the visible URL and navigate
//! to the application root. The attempt keys are erased on every terminal outcome once the
//! redirect has been parsed, so a replayed redirect can never pass state validation.

// crates.io
use subtle::ConstantTimeEq;
// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	flows::OidcClient,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind},
};

/// Route that failed callbacks link back to.
pub const SIGN_IN_PATH: &str = "/signin";

/// Query parameters carried by the provider redirect.
///
/// Empty values are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Returned CSRF state.
	pub state: Option<String>,
	/// OAuth error code.
	pub error: Option<String>,
	/// OAuth error description.
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Reads the first occurrence of each parameter from `url`'s query.
	pub fn from_url(url: &Url) -> Self {
		let mut params = Self::default();

		for (key, value) in url.query_pairs() {
			let slot = match key.as_ref() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			if slot.is_none() && !value.is_empty() {
				*slot = Some(value.into_owned());
			}
		}

		params
	}
}

/// User-facing rendering of a failed callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackFailure {
	/// Message shown to the user.
	pub message: String,
	/// Where the "back to sign in" link points.
	pub retry_path: &'static str,
}
impl CallbackFailure {
	/// Renders `err` with a link back to the sign-in entry point.
	pub fn from_error(err: &Error) -> Self {
		Self { message: err.to_string(), retry_path: SIGN_IN_PATH }
	}
}

impl<C, M> OidcClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Processes the provider redirect that landed on `callback_url`.
	///
	/// On success the tokens are saved, the visible URL is replaced with `/`, and the navigator
	/// performs a full navigation to the application root.
	pub async fn handle_callback(&self, callback_url: &Url) -> Result<TokenSet> {
		obs::observe(FlowKind::Callback, "handle_callback", async {
			let params = CallbackParams::from_url(callback_url);
			let outcome = self.validate_and_exchange(params).await;
			let cleared = self.attempt.clear().await;
			let tokens = outcome?;

			cleared?;

			self.navigator.replace_history("/");
			self.navigator.navigate(&self.config.app_root());

			Ok(tokens)
		})
		.await
	}

	async fn validate_and_exchange(&self, params: CallbackParams) -> Result<TokenSet> {
		if let Some(error) = params.error {
			return Err(Error::ProviderAuthorization {
				error,
				description: params.error_description,
			});
		}

		let code = params.code.ok_or(Error::MissingAuthorizationCode)?;
		let saved_state = self.attempt.state().await?;

		if !states_match(saved_state.as_deref(), params.state.as_deref()) {
			return Err(Error::StateMismatch);
		}

		self.exchange_code_for_tokens(&code).await
	}
}

// Both values must be present; the comparison time does not depend on where they differ.
fn states_match(saved: Option<&str>, returned: Option<&str>) -> bool {
	let saved = saved.unwrap_or_default();
	let returned = returned.unwrap_or_default();
	let equal: bool = saved.as_bytes().ct_eq(returned.as_bytes()).into();

	equal && !saved.is_empty()
}
