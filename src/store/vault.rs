//! Typed views over the durable token keys and the session-scoped attempt keys.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, TokenSet},
	store::{KeyValueStore, StoreError, keys},
};

/// Durable token storage.
///
/// Presence of both `access_token` and `id_token` is the only signal the rest of the application
/// uses to decide whether a user is signed in.
#[derive(Clone)]
pub struct TokenVault(Arc<dyn KeyValueStore>);
impl TokenVault {
	/// Wraps a durable backend.
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self(store)
	}

	/// Writes the token set in one step. A missing refresh token leaves any stored one untouched.
	pub async fn save(&self, tokens: &TokenSet) -> Result<(), StoreError> {
		let mut entries = vec![
			(keys::ACCESS_TOKEN.to_owned(), tokens.access_token.expose().to_owned()),
			(keys::ID_TOKEN.to_owned(), tokens.id_token.expose().to_owned()),
		];

		if let Some(refresh) = &tokens.refresh_token {
			entries.push((keys::REFRESH_TOKEN.to_owned(), refresh.expose().to_owned()));
		}

		self.0.set_many(entries).await
	}

	/// Stored access token.
	pub async fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.secret(keys::ACCESS_TOKEN).await
	}

	/// Stored identity token.
	pub async fn id_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.secret(keys::ID_TOKEN).await
	}

	/// Stored refresh token.
	pub async fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		self.secret(keys::REFRESH_TOKEN).await
	}

	/// Loads the full token set when both required tokens are present.
	pub async fn load(&self) -> Result<Option<TokenSet>, StoreError> {
		let (Some(access_token), Some(id_token)) =
			(self.access_token().await?, self.id_token().await?)
		else {
			return Ok(None);
		};

		Ok(Some(TokenSet { access_token, id_token, refresh_token: self.refresh_token().await? }))
	}

	/// True when both the access token and the identity token are stored.
	pub async fn is_authenticated(&self) -> Result<bool, StoreError> {
		Ok(self.access_token().await?.is_some() && self.id_token().await?.is_some())
	}

	/// Erases every token key.
	pub async fn clear(&self) -> Result<(), StoreError> {
		self.0.remove_many(&keys::TOKEN_KEYS).await
	}

	async fn secret(&self, key: &str) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.0.get(key).await?.filter(|value| !value.is_empty()).map(TokenSecret::new))
	}
}
impl Debug for TokenVault {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenVault(..)")
	}
}

/// Session-scoped storage for the in-flight authorization attempt.
#[derive(Clone)]
pub struct AttemptVault(Arc<dyn KeyValueStore>);
impl AttemptVault {
	/// Wraps a session-scoped backend.
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self(store)
	}

	/// Saves the nonce bound into the authorization request.
	pub async fn set_nonce(&self, nonce: &str) -> Result<(), StoreError> {
		self.set(keys::OIDC_NONCE, nonce).await
	}

	/// Saved nonce.
	pub async fn nonce(&self) -> Result<Option<String>, StoreError> {
		self.0.get(keys::OIDC_NONCE).await
	}

	/// Saves the CSRF state.
	pub async fn set_state(&self, state: &str) -> Result<(), StoreError> {
		self.set(keys::OIDC_STATE, state).await
	}

	/// Saved CSRF state.
	pub async fn state(&self) -> Result<Option<String>, StoreError> {
		self.0.get(keys::OIDC_STATE).await
	}

	/// Saves the PKCE verifier.
	pub async fn set_code_verifier(&self, verifier: &str) -> Result<(), StoreError> {
		self.set(keys::OIDC_CODE_VERIFIER, verifier).await
	}

	/// Saved PKCE verifier.
	pub async fn code_verifier(&self) -> Result<Option<String>, StoreError> {
		self.0.get(keys::OIDC_CODE_VERIFIER).await
	}

	/// Erases the attempt.
	pub async fn clear(&self) -> Result<(), StoreError> {
		self.0.remove_many(&keys::ATTEMPT_KEYS).await
	}

	async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.0.set_many(vec![(key.to_owned(), value.to_owned())]).await
	}
}
impl Debug for AttemptVault {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AttemptVault(..)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	fn vault() -> (TokenVault, Arc<MemoryStore>) {
		let backend = Arc::new(MemoryStore::default());

		(TokenVault::new(backend.clone()), backend)
	}

	#[tokio::test]
	async fn save_writes_refresh_token_only_when_present() {
		let (vault, backend) = vault();

		vault.save(&TokenSet::new("a", "i")).await.expect("Saving tokens should succeed.");

		assert_eq!(backend.keys(), vec!["access_token".to_string(), "id_token".to_string()]);

		vault
			.save(&TokenSet::new("a2", "i2").with_refresh_token("r"))
			.await
			.expect("Saving tokens should succeed.");

		let loaded = vault.load().await.expect("Load should succeed.").expect("Tokens are stored.");

		assert_eq!(loaded.access_token.expose(), "a2");
		assert_eq!(loaded.refresh_token.as_ref().map(TokenSecret::expose), Some("r"));
	}

	#[tokio::test]
	async fn authentication_requires_both_tokens() {
		let (vault, backend) = vault();

		assert!(!vault.is_authenticated().await.expect("Check should succeed."));

		backend
			.set_many(vec![("access_token".into(), "a".into())])
			.await
			.expect("Seeding the backend should succeed.");

		assert!(!vault.is_authenticated().await.expect("Check should succeed."));

		backend
			.set_many(vec![("id_token".into(), String::new())])
			.await
			.expect("Seeding the backend should succeed.");

		assert!(
			!vault.is_authenticated().await.expect("Check should succeed."),
			"Empty identity tokens must not count as signed in."
		);

		vault.save(&TokenSet::new("a", "i")).await.expect("Saving tokens should succeed.");

		assert!(vault.is_authenticated().await.expect("Check should succeed."));

		vault.clear().await.expect("Clearing should succeed.");

		assert!(backend.keys().is_empty());
	}

	#[tokio::test]
	async fn attempt_round_trip_and_clear() {
		let backend = Arc::new(MemoryStore::default());
		let attempt = AttemptVault::new(backend.clone());

		attempt.set_state("S1").await.expect("Saving state should succeed.");
		attempt.set_nonce("N1").await.expect("Saving nonce should succeed.");
		attempt.set_code_verifier("V1").await.expect("Saving verifier should succeed.");

		assert_eq!(attempt.state().await.expect("Read should succeed."), Some("S1".into()));
		assert_eq!(backend.peek("oidc_code_verifier"), Some("V1".into()));

		attempt.clear().await.expect("Clearing should succeed.");

		assert!(backend.keys().is_empty());
	}
}
