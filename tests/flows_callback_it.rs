#![cfg(feature = "reqwest")]

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::prelude::*;
// self
use oidc_pkce_client::{
	_preludet::*,
	config::ProviderConfig,
	flows::CallbackFailure,
	navigation::NavigationEvent,
	store::{KeyValueStore, keys},
};

fn id_token(claims: &str) -> String {
	format!("eyJhbGciOiJSUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(claims))
}

fn callback(query: &str) -> Url {
	Url::parse(&format!("http://localhost:3000/callback?{query}"))
		.expect("Callback URL fixture should parse successfully.")
}

async fn seed_attempt(harness: &TestHarness, state: &str) {
	harness
		.session
		.set_many(vec![
			(keys::OIDC_STATE.into(), state.into()),
			(keys::OIDC_NONCE.into(), "nonce-it".into()),
			(keys::OIDC_CODE_VERIFIER.into(), "verifier-it".into()),
		])
		.await
		.expect("Seeding the attempt should succeed.");
}

#[tokio::test]
async fn successful_callback_saves_tokens_clears_attempt_and_navigates_home() {
	let server = MockServer::start_async().await;
	let (client, harness) = build_reqwest_test_client(test_provider_config(&server.base_url()));
	let token = id_token(r#"{"email":"x@y.com","sub":"user-1"}"#);
	let body = format!(
		"{{\"access_token\":\"access-it\",\"id_token\":\"{token}\",\"refresh_token\":\"refresh-it\",\"token_type\":\"Bearer\",\"expires_in\":3600}}"
	);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("client_id", "client-it")
				.form_urlencoded_tuple("code", "abc")
				.form_urlencoded_tuple("redirect_uri", "http://localhost:3000/callback")
				.form_urlencoded_tuple("code_verifier", "verifier-it");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;

	seed_attempt(&harness, "S1").await;

	let tokens = client
		.handle_callback(&callback("code=abc&state=S1"))
		.await
		.expect("Callback with matching state should succeed.");

	mock.assert_async().await;

	assert_eq!(tokens.access_token.expose(), "access-it");
	assert_eq!(harness.durable.keys(), ["access_token", "id_token", "refresh_token"]);
	assert_eq!(harness.durable.peek(keys::ID_TOKEN), Some(token));
	assert!(harness.session.keys().is_empty(), "Attempt keys must be erased after success.");
	assert_eq!(
		harness.navigator.events(),
		vec![
			NavigationEvent::ReplaceHistory("/".into()),
			NavigationEvent::Navigate(
				Url::parse("http://localhost:3000/").expect("App root should parse."),
			),
		]
	);

	let user = client
		.current_user()
		.await
		.expect("Reading the user should succeed.")
		.expect("A signed-in user should be available.");

	assert_eq!(user.email, "x@y.com");
	assert_eq!(user.username, "X");
}

#[tokio::test]
async fn state_mismatch_never_reaches_token_endpoint() {
	let server = MockServer::start_async().await;
	let (client, harness) = build_reqwest_test_client(test_provider_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;

	seed_attempt(&harness, "S2").await;

	let err = client
		.handle_callback(&callback("code=abc&state=S1"))
		.await
		.expect_err("Mismatched state must abort the flow.");

	assert!(matches!(err, Error::StateMismatch));

	let err = client
		.handle_callback(&callback("code=abc"))
		.await
		.expect_err("Missing state on both sides must abort the flow.");

	assert!(matches!(err, Error::StateMismatch));

	mock.assert_calls_async(0).await;

	assert!(harness.durable.keys().is_empty());
	assert!(harness.session.keys().is_empty(), "A rejected attempt cannot be replayed.");
	assert!(harness.navigator.events().is_empty());
	assert_eq!(CallbackFailure::from_error(&err).retry_path, "/signin");
}

#[tokio::test]
async fn provider_errors_and_missing_codes_fail_before_exchange() {
	let server = MockServer::start_async().await;
	let (client, harness) = build_reqwest_test_client(test_provider_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;

	seed_attempt(&harness, "S1").await;

	let err = client
		.handle_callback(&callback("error=access_denied&error_description=User+cancelled&state=S1"))
		.await
		.expect_err("Provider errors must surface.");

	match err {
		Error::ProviderAuthorization { error, description } => {
			assert_eq!(error, "access_denied");
			assert_eq!(description.as_deref(), Some("User cancelled"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	seed_attempt(&harness, "S1").await;

	let err = client
		.handle_callback(&callback("state=S1"))
		.await
		.expect_err("Callbacks without a code must fail.");

	assert!(matches!(err, Error::MissingAuthorizationCode));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn non_success_status_surfaces_as_token_exchange_error() {
	let server = MockServer::start_async().await;
	let (client, harness) = build_reqwest_test_client(test_provider_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;

	seed_attempt(&harness, "S1").await;

	let err = client
		.handle_callback(&callback("code=stale&state=S1"))
		.await
		.expect_err("Rejected codes must fail.");

	mock.assert_calls_async(1).await;

	assert!(matches!(err, Error::TokenExchange { status: Some(400) }));
	assert!(harness.durable.keys().is_empty());
	assert!(harness.session.keys().is_empty());
	assert!(harness.navigator.events().is_empty());
}

#[tokio::test]
async fn responses_without_identity_token_leave_store_untouched() {
	let server = MockServer::start_async().await;
	let (client, harness) = build_reqwest_test_client(test_provider_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-only\",\"token_type\":\"Bearer\"}");
		})
		.await;
	let err = client
		.exchange_code_for_tokens("abc")
		.await
		.expect_err("Responses without an identity token must fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::MissingIdToken));
	assert!(harness.durable.keys().is_empty());
}

#[tokio::test]
async fn exchange_without_saved_verifier_sends_empty_verifier() {
	let server = MockServer::start_async().await;
	let (client, harness) = build_reqwest_test_client(test_provider_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token").form_urlencoded_tuple("code_verifier", "");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"a\",\"id_token\":\"h.e30.s\",\"token_type\":\"Bearer\"}",
			);
		})
		.await;
	let tokens = client
		.exchange_code_for_tokens("abc")
		.await
		.expect("Exchange should proceed without a saved verifier.");

	mock.assert_async().await;

	assert!(tokens.refresh_token.is_none());
	assert_eq!(harness.durable.keys(), ["access_token", "id_token"]);
}

#[tokio::test]
async fn origin_only_redirect_uri_is_sent_verbatim() {
	let server = MockServer::start_async().await;
	let config = ProviderConfig::builder("eu-central-1", "eu-central-1_Pool", "cid", "domain")
		.redirect_uri("https://d84l1y8p4kdic.cloudfront.net")
		.logout_redirect_uri("http://localhost:3000")
		.scopes(["openid"])
		.hosted_ui_base(Url::parse(&server.base_url()).expect("Mock server URL should parse."))
		.build()
		.expect("Origin-only URIs should validate.");
	let (client, harness) = build_reqwest_test_client(config);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/token")
				.form_urlencoded_tuple("redirect_uri", "https://d84l1y8p4kdic.cloudfront.net");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"a\",\"id_token\":\"h.e30.s\"}");
		})
		.await;
	let request = client.authorization_url().await.expect("Authorization request should build.");
	let redirect = request
		.authorize_url
		.query_pairs()
		.find(|(key, _)| key == "redirect_uri")
		.map(|(_, value)| value.into_owned());

	assert_eq!(redirect.as_deref(), Some("https://d84l1y8p4kdic.cloudfront.net"));

	client
		.handle_callback(&callback(&format!("code=abc&state={}", request.state)))
		.await
		.expect("Responses without a token type should still be accepted.");

	mock.assert_async().await;

	assert_eq!(harness.durable.keys(), ["access_token", "id_token"]);

	let logout_url = client.logout().await.expect("Logout should succeed.");

	assert!(logout_url.as_str().ends_with("logout_uri=http%3A%2F%2Flocalhost%3A3000"));
}
