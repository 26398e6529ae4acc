//! Display-ready user identity derived from identity-token claims.

// self
use crate::{
	_prelude::*,
	auth::{Claims, ClaimsDecodeError, decode_payload},
	obs,
	store::TokenVault,
};

/// Placeholder shown when the token carries no `email` claim.
pub const MISSING_EMAIL: &str = "N/A";

/// User record recomputed from the current identity token; never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
	/// `email` claim, or [`MISSING_EMAIL`].
	pub email: String,
	/// Display name with its first character upper-cased.
	pub username: String,
	/// `sub` claim.
	pub subject: Option<String>,
	/// Raw provider username claim.
	pub provider_username: Option<String>,
	/// Every claim the token carried.
	pub claims: Claims,
}
impl UserIdentity {
	/// Derives the identity from decoded claims.
	///
	/// The display name is resolved as `name`, then the provider username, then the local part
	/// of the email address.
	pub fn from_claims(claims: Claims) -> Self {
		let email = claims.email().unwrap_or(MISSING_EMAIL).to_owned();
		let display = claims
			.name()
			.or_else(|| claims.provider_username())
			.unwrap_or_else(|| email_local_part(&email));
		let username = capitalize_first(display);

		Self {
			email,
			username,
			subject: claims.subject().map(str::to_owned),
			provider_username: claims.provider_username().map(str::to_owned),
			claims,
		}
	}
}

/// Decodes `id_token` claims, treating undecodable payloads as an empty claims object.
///
/// Failing open keeps a signed-in user signed in with placeholder details when the payload is
/// corrupt. Callers that would rather sign the user out should use [`decode_payload`] directly.
pub fn claims_or_empty(id_token: &str) -> Claims {
	decode_payload(id_token).unwrap_or_else(|err: ClaimsDecodeError| {
		obs::claims_decode_fallback(&err);

		Claims::default()
	})
}

/// Reads the stored identity token and derives the current user, if any.
pub async fn extract_user(tokens: &TokenVault) -> Result<Option<UserIdentity>> {
	let Some(id_token) = tokens.id_token().await? else {
		return Ok(None);
	};

	Ok(Some(UserIdentity::from_claims(claims_or_empty(id_token.expose()))))
}

fn email_local_part(email: &str) -> &str {
	email.split('@').next().unwrap_or(email)
}

fn capitalize_first(value: &str) -> String {
	let mut chars = value.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn claims(value: serde_json::Value) -> Claims {
		match value {
			serde_json::Value::Object(map) => Claims::new(map),
			_ => panic!("Claims fixture must be a JSON object."),
		}
	}

	#[test]
	fn username_prefers_name_then_provider_username_then_email() {
		let named = UserIdentity::from_claims(claims(json!({
			"name": "ada lovelace",
			"cognito:username": "ada",
			"email": "ada@example.com",
		})));

		assert_eq!(named.username, "Ada lovelace");

		let provider = UserIdentity::from_claims(claims(json!({
			"cognito:username": "grace",
			"email": "grace@example.com",
		})));

		assert_eq!(provider.username, "Grace");
		assert_eq!(provider.provider_username.as_deref(), Some("grace"));

		let email_only = UserIdentity::from_claims(claims(json!({ "email": "x@y.com" })));

		assert_eq!(email_only.email, "x@y.com");
		assert_eq!(email_only.username, "X");
	}

	#[test]
	fn empty_claims_fall_back_to_placeholders() {
		let user = UserIdentity::from_claims(Claims::default());

		assert_eq!(user.email, MISSING_EMAIL);
		assert_eq!(user.username, "N/A");
		assert_eq!(user.subject, None);
	}

	#[test]
	fn capitalization_handles_multibyte_characters() {
		assert_eq!(capitalize_first("émile"), "Émile");
		assert_eq!(capitalize_first("ß"), "SS");
		assert_eq!(capitalize_first(""), "");
	}

	#[test]
	fn undecodable_tokens_yield_empty_claims() {
		assert!(claims_or_empty("not-a-jwt").is_empty());
	}
}
