//! Authorization code exchange.

// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	flows::OidcClient,
	http::TokenHttpClient,
	oauth::{CodeExchangeFacade, TransportErrorMapper},
	obs::{self, FlowKind},
};

impl<C, M> OidcClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Trades `code` for tokens and saves them to the token vault.
	///
	/// The saved PKCE verifier is sent as-is; a missing verifier is sent as an empty string and
	/// left for the provider to reject. One request per call, never retried. Any non-success
	/// status fails with [`Error::TokenExchange`], and a response without an identity token
	/// fails with [`Error::MissingIdToken`] without touching the vault.
	pub async fn exchange_code_for_tokens(&self, code: &str) -> Result<TokenSet> {
		obs::observe(FlowKind::Exchange, "exchange_code_for_tokens", async {
			let verifier = self.attempt.code_verifier().await?.unwrap_or_default();
			let facade = <CodeExchangeFacade<C, M>>::from_config(
				&self.config,
				self.http_client.clone(),
				self.transport_mapper.clone(),
			)?;
			let tokens = facade.exchange_authorization_code(code, &verifier).await?;

			self.tokens.save(&tokens).await?;

			Ok(tokens)
		})
		.await
	}
}
