//! Interactive sign-in against a hosted identity provider.
//!
//! ```sh
//! cargo run --example sign_in -- provider.json
//! ```
//!
//! Open the printed URL, sign in, then paste the full callback URL the browser landed on.

// std
use std::{env, io, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use oidc_pkce_client::{
	config::ProviderConfig,
	flows::{CallbackFailure, ReqwestOidcClient},
	navigation::Navigator,
	session::SessionGate,
	store::{FileStore, MemoryStore},
	url::Url,
};

struct PrintingNavigator;
impl Navigator for PrintingNavigator {
	fn replace_history(&self, path: &str) {
		println!("(history) {path}");
	}

	fn navigate(&self, url: &Url) {
		println!("(navigate) {url}");
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let path = env::args().nth(1).ok_or_else(|| eyre!("usage: sign_in <provider.json>"))?;
	let config = ProviderConfig::from_path(&path)?;
	let durable = Arc::new(FileStore::open(env::temp_dir().join("oidc_pkce_client_tokens.json"))?);
	let client = ReqwestOidcClient::new(
		config,
		durable,
		Arc::new(MemoryStore::default()),
		Arc::new(PrintingNavigator),
	);
	let (gate, _poller) =
		SessionGate::start(client.tokens.clone(), SessionGate::DEFAULT_POLL_INTERVAL).await;

	if gate.snapshot().is_authenticated {
		println!("Already signed in; signing out first.");
		client.logout().await?;
	}

	let request = client.authorization_url().await?;

	println!("Open this URL to sign in:\n{}\n", request.authorize_url);
	println!("Paste the callback URL:");

	let mut line = String::new();

	io::stdin().read_line(&mut line)?;

	let callback = Url::parse(line.trim())?;

	if let Err(err) = client.handle_callback(&callback).await {
		let failure = CallbackFailure::from_error(&err);

		return Err(eyre!("{} (retry at {})", failure.message, failure.retry_path));
	}

	let state = gate.recompute().await;

	match state.user {
		Some(user) => println!("Signed in as {} <{}>.", user.username, user.email),
		None => println!("Signed in, but no identity is available."),
	}

	Ok(())
}
