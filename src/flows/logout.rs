//! Local sign-out followed by the provider's logout redirect.

// self
use crate::{
	_prelude::*,
	flows::OidcClient,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind},
};

impl<C, M> OidcClient<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Erases every token and attempt key, then navigates to the provider logout endpoint.
	///
	/// Returns the logout URL. Storage failures propagate before any navigation happens so the
	/// host can show a blocking notification.
	pub async fn logout(&self) -> Result<Url> {
		obs::observe(FlowKind::Logout, "logout", async {
			self.tokens.clear().await?;
			self.attempt.clear().await?;

			let logout_url = self.config.logout_endpoint().clone();

			self.navigator.navigate(&logout_url);

			Ok(logout_url)
		})
		.await
	}
}
