//! Token secrets and the token set issued by the provider.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the secret holds no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Consumes the wrapper and returns the raw value.
	pub fn into_inner(self) -> String {
		self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Tokens returned by a successful authorization code exchange.
///
/// The identity token is a three-part `header.payload.signature` structure; only its payload is
/// ever read by this crate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
	/// Access token for provider-protected resources.
	pub access_token: TokenSecret,
	/// Identity token asserting facts about the signed-in subject.
	pub id_token: TokenSecret,
	/// Refresh token, when the provider issued one.
	pub refresh_token: Option<TokenSecret>,
}
impl TokenSet {
	/// Creates a token set without a refresh token.
	pub fn new(access_token: impl Into<String>, id_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			id_token: TokenSecret::new(id_token),
			refresh_token: None,
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &self.access_token)
			.field("id_token", &self.id_token)
			.field("refresh_token_set", &self.refresh_token.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_redact_secrets() {
		let set = TokenSet::new("access", "header.payload.sig").with_refresh_token("refresh");
		let rendered = format!("{set:?}");

		assert!(!rendered.contains("access\""));
		assert!(!rendered.contains("payload"));
		assert!(rendered.contains("refresh_token_set: true"));
		assert_eq!(format!("{}", set.id_token), "<redacted>");
	}
}
