#![cfg(feature = "reqwest")]

// self
use oidc_pkce_client::{
	_preludet::*,
	flows::{self, PkceCodeChallengeMethod},
	store::keys,
};

const HOSTED_UI: &str = "https://auth.example.test";

fn query(url: &Url) -> Vec<(String, String)> {
	url.query_pairs().into_owned().collect()
}

#[tokio::test]
async fn authorization_url_carries_ordered_parameters_and_persists_attempt() {
	let (client, harness) = build_reqwest_test_client(test_provider_config(HOSTED_UI));
	let request =
		client.authorization_url().await.expect("Authorization request should build successfully.");

	assert_eq!(request.authorize_url.origin().ascii_serialization(), HOSTED_UI);
	assert_eq!(request.authorize_url.path(), "/oauth2/authorize");
	assert_eq!(request.code_challenge_method, PkceCodeChallengeMethod::S256);

	let pairs = query(&request.authorize_url);
	let names = pairs.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();

	assert_eq!(
		names,
		[
			"client_id",
			"response_type",
			"scope",
			"redirect_uri",
			"nonce",
			"state",
			"code_challenge",
			"code_challenge_method",
		]
	);
	assert_eq!(pairs[0].1, "client-it");
	assert_eq!(pairs[1].1, "code");
	assert_eq!(pairs[2].1, "openid email phone profile");
	assert_eq!(pairs[3].1, "http://localhost:3000/callback");
	assert_eq!(pairs[5].1, request.state);
	assert_eq!(pairs[7].1, "S256");

	let verifier = harness
		.session
		.peek(keys::OIDC_CODE_VERIFIER)
		.expect("The PKCE verifier should be saved for the callback.");

	assert!((43..=128).contains(&verifier.len()));
	assert_eq!(flows::generate_code_challenge(&verifier), request.code_challenge);
	assert_eq!(harness.session.peek(keys::OIDC_STATE), Some(request.state.clone()));
	assert_eq!(harness.session.peek(keys::OIDC_NONCE), Some(request.nonce.clone()));
	assert!(harness.durable.keys().is_empty(), "Building a request must not touch tokens.");
}

#[tokio::test]
async fn consecutive_requests_rotate_every_secret() {
	let (client, _harness) = build_reqwest_test_client(test_provider_config(HOSTED_UI));
	let first = client.authorization_url().await.expect("First request should build.");
	let second = client.authorization_url().await.expect("Second request should build.");

	assert_ne!(first.state, second.state);
	assert_ne!(first.nonce, second.nonce);
	assert_ne!(first.code_challenge, second.code_challenge);
}

#[tokio::test]
async fn sign_up_appends_prompt_and_extras_cannot_replace_state() {
	let (client, harness) = build_reqwest_test_client(test_provider_config(HOSTED_UI));
	let sign_up = client.sign_up_url().await.expect("Sign-up request should build.");
	let pairs = query(&sign_up.authorize_url);

	assert_eq!(pairs.last(), Some(&("prompt".to_owned(), "signup".to_owned())));

	let request = client
		.authorization_url_with(&[
			("state", Some("attacker")),
			("scope", Some("openid")),
			("lang", None),
			("identity_provider", Some("Google")),
		])
		.await
		.expect("Request with extras should build.");
	let pairs = query(&request.authorize_url);
	let value = |name: &str| pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

	assert_eq!(value("state"), Some(request.state.as_str()));
	assert_eq!(value("scope"), Some("openid"));
	assert_eq!(value("lang"), None);
	assert_eq!(value("identity_provider"), Some("Google"));
	assert_eq!(harness.session.peek(keys::OIDC_STATE), Some(request.state));
}
