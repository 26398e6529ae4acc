//! Provider and downstream API configuration.
//!
//! [`ProviderConfig`] is resolved once at startup, either through
//! [`ProviderConfig::builder`] or from a JSON document, and is immutable afterwards. Every
//! endpoint URL is derived from the base fields when the configuration is built, so the
//! endpoints can never drift from the region/domain/client they describe.

// std
use std::path::Path;
// self
use crate::{_prelude::*, auth::ScopeList, error::ConfigError};

/// OAuth `response_type` requested from the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
	#[default]
	/// Authorization Code flow.
	Code,
}
impl ResponseType {
	/// Wire value for the `response_type` parameter.
	pub fn as_str(self) -> &'static str {
		match self {
			ResponseType::Code => "code",
		}
	}
}

/// Client authentication method used at the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// Public client; possession is proven with PKCE instead of a secret.
	None,
}

/// URI registered with the provider, kept exactly as configured.
///
/// The provider matches `redirect_uri` and `logout_uri` against its registration byte for byte,
/// so the configured text is what goes on the wire. The parsed [`Url`] only serves validation
/// and origin lookups; serializing it would add a trailing `/` to origin-only URIs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredUri {
	raw: String,
	url: Url,
}
impl RegisteredUri {
	/// Validates `raw` as an http(s) URL for `field` and keeps the original text.
	pub fn parse(field: &'static str, raw: impl Into<String>) -> Result<Self, ConfigError> {
		let raw = raw.into();
		let url = Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidUri { field, value: raw.clone(), source })?;

		validate_web_url(field, &url)?;

		Ok(Self { raw, url })
	}

	/// The URI exactly as configured.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Parsed form of the URI.
	pub fn url(&self) -> &Url {
		&self.url
	}
}
impl Display for RegisteredUri {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.raw)
	}
}

/// Provider endpoints derived from the base configuration fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedEndpoints {
	/// OIDC issuer identifier.
	pub issuer: Url,
	/// OIDC discovery document.
	pub discovery: Url,
	/// Hosted UI authorization endpoint.
	pub authorization: Url,
	/// Token endpoint.
	pub token: Url,
	/// Userinfo endpoint.
	pub userinfo: Url,
	/// Logout endpoint including `client_id` and the encoded `logout_uri`.
	pub logout: Url,
}
impl DerivedEndpoints {
	/// Derives every endpoint from the base fields.
	///
	/// `hosted_ui_base` replaces the `https://{domain}.auth.{region}.amazoncognito.com` origin
	/// when set, which is how local provider emulators are targeted.
	pub fn derive(
		region: &str,
		user_pool_id: &str,
		client_id: &str,
		cognito_domain: &str,
		logout_redirect_uri: &RegisteredUri,
		hosted_ui_base: Option<&Url>,
	) -> Result<Self, ConfigError> {
		let issuer = parse_endpoint(
			"issuer",
			&format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}"),
		)?;
		let discovery = parse_endpoint(
			"discovery",
			&format!("{}/.well-known/openid-configuration", issuer.as_str().trim_end_matches('/')),
		)?;
		let base = match hosted_ui_base {
			Some(base) => base.as_str().trim_end_matches('/').to_owned(),
			None => format!("https://{cognito_domain}.auth.{region}.amazoncognito.com"),
		};
		let authorization = parse_endpoint("authorization", &format!("{base}/oauth2/authorize"))?;
		let token = parse_endpoint("token", &format!("{base}/oauth2/token"))?;
		let userinfo = parse_endpoint("userinfo", &format!("{base}/oauth2/userInfo"))?;
		let mut logout = parse_endpoint("logout", &format!("{base}/logout"))?;

		logout
			.query_pairs_mut()
			.append_pair("client_id", client_id)
			.append_pair("logout_uri", logout_redirect_uri.as_str());

		Ok(Self { issuer, discovery, authorization, token, userinfo, logout })
	}
}

/// Immutable identity provider configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProviderConfigDocument", into = "ProviderConfigDocument")]
pub struct ProviderConfig {
	region: String,
	user_pool_id: String,
	client_id: String,
	cognito_domain: String,
	redirect_uri: RegisteredUri,
	logout_redirect_uri: RegisteredUri,
	scopes: ScopeList,
	response_type: ResponseType,
	client_auth_method: ClientAuthMethod,
	hosted_ui_base: Option<Url>,
	endpoints: DerivedEndpoints,
}
impl ProviderConfig {
	/// Starts a builder from the identifiers every configuration needs.
	pub fn builder(
		region: impl Into<String>,
		user_pool_id: impl Into<String>,
		client_id: impl Into<String>,
		cognito_domain: impl Into<String>,
	) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(region, user_pool_id, client_id, cognito_domain)
	}

	/// Parses and validates a JSON configuration document.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(json);
		let document: ProviderConfigDocument = serde_path_to_error::deserialize(de)?;

		document.try_into()
	}

	/// Reads, parses, and validates a JSON configuration file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let json = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

		Self::from_json_str(&json)
	}

	/// Provider region.
	pub fn region(&self) -> &str {
		&self.region
	}

	/// User pool identifier (`{region}_{id}`).
	pub fn user_pool_id(&self) -> &str {
		&self.user_pool_id
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Hosted UI domain prefix.
	pub fn cognito_domain(&self) -> &str {
		&self.cognito_domain
	}

	/// Redirect URI registered for the callback route.
	pub fn redirect_uri(&self) -> &RegisteredUri {
		&self.redirect_uri
	}

	/// Where the provider sends the browser after logout.
	pub fn logout_redirect_uri(&self) -> &RegisteredUri {
		&self.logout_redirect_uri
	}

	/// Requested scopes, in request order.
	pub fn scopes(&self) -> &ScopeList {
		&self.scopes
	}

	/// Requested response type.
	pub fn response_type(&self) -> ResponseType {
		self.response_type
	}

	/// Token endpoint client authentication method.
	pub fn client_auth_method(&self) -> ClientAuthMethod {
		self.client_auth_method
	}

	/// All derived endpoints.
	pub fn endpoints(&self) -> &DerivedEndpoints {
		&self.endpoints
	}

	/// OIDC issuer identifier.
	pub fn issuer(&self) -> &Url {
		&self.endpoints.issuer
	}

	/// OIDC discovery document URL.
	pub fn discovery_url(&self) -> &Url {
		&self.endpoints.discovery
	}

	/// Authorization endpoint.
	pub fn authorization_endpoint(&self) -> &Url {
		&self.endpoints.authorization
	}

	/// Token endpoint.
	pub fn token_endpoint(&self) -> &Url {
		&self.endpoints.token
	}

	/// Userinfo endpoint.
	pub fn userinfo_endpoint(&self) -> &Url {
		&self.endpoints.userinfo
	}

	/// Logout endpoint with `client_id` and `logout_uri` attached.
	pub fn logout_endpoint(&self) -> &Url {
		&self.endpoints.logout
	}

	/// Application root on the redirect URI's origin.
	pub fn app_root(&self) -> Url {
		let mut root = self.redirect_uri.url().clone();

		root.set_path("/");
		root.set_query(None);
		root.set_fragment(None);

		root
	}
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	/// Provider region, e.g. `eu-central-1`.
	pub region: String,
	/// User pool identifier.
	pub user_pool_id: String,
	/// OAuth client identifier.
	pub client_id: String,
	/// Hosted UI domain prefix.
	pub cognito_domain: String,
	/// Callback redirect URI, sent verbatim.
	pub redirect_uri: Option<String>,
	/// Post-logout redirect URI, sent verbatim.
	pub logout_redirect_uri: Option<String>,
	/// Requested scopes.
	pub scopes: Vec<String>,
	/// Requested response type.
	pub response_type: ResponseType,
	/// Token endpoint client authentication.
	pub client_auth_method: ClientAuthMethod,
	/// Optional hosted UI origin override.
	pub hosted_ui_base: Option<Url>,
}
impl ProviderConfigBuilder {
	/// Creates a new builder seeded with the provided identifiers.
	pub fn new(
		region: impl Into<String>,
		user_pool_id: impl Into<String>,
		client_id: impl Into<String>,
		cognito_domain: impl Into<String>,
	) -> Self {
		Self {
			region: region.into(),
			user_pool_id: user_pool_id.into(),
			client_id: client_id.into(),
			cognito_domain: cognito_domain.into(),
			redirect_uri: None,
			logout_redirect_uri: None,
			scopes: Vec::new(),
			response_type: ResponseType::default(),
			client_auth_method: ClientAuthMethod::default(),
			hosted_ui_base: None,
		}
	}

	/// Sets the callback redirect URI.
	pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(uri.into());

		self
	}

	/// Sets the post-logout redirect URI.
	pub fn logout_redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.logout_redirect_uri = Some(uri.into());

		self
	}

	/// Replaces the requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the hosted UI origin (local emulators, custom domains).
	pub fn hosted_ui_base(mut self, url: Url) -> Self {
		self.hosted_ui_base = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		validate_label("region", &self.region)?;
		validate_label("cognito_domain", &self.cognito_domain)?;
		validate_non_empty("user_pool_id", &self.user_pool_id)?;
		validate_non_empty("client_id", &self.client_id)?;

		if !self
			.user_pool_id
			.strip_prefix(&self.region)
			.is_some_and(|rest| rest.len() > 1 && rest.starts_with('_'))
		{
			return Err(ConfigError::UserPoolRegionMismatch {
				user_pool_id: self.user_pool_id,
				region: self.region,
			});
		}

		let redirect_uri = RegisteredUri::parse(
			"redirect_uri",
			self.redirect_uri.ok_or(ConfigError::EmptyField { field: "redirect_uri" })?,
		)?;
		let logout_redirect_uri = RegisteredUri::parse(
			"logout_redirect_uri",
			self.logout_redirect_uri
				.ok_or(ConfigError::EmptyField { field: "logout_redirect_uri" })?,
		)?;

		if let Some(base) = self.hosted_ui_base.as_ref() {
			validate_web_url("hosted_ui_base", base)?;
		}

		let scopes = ScopeList::new(self.scopes)?;

		if scopes.is_empty() {
			return Err(ConfigError::EmptyField { field: "scopes" });
		}

		let endpoints = DerivedEndpoints::derive(
			&self.region,
			&self.user_pool_id,
			&self.client_id,
			&self.cognito_domain,
			&logout_redirect_uri,
			self.hosted_ui_base.as_ref(),
		)?;

		Ok(ProviderConfig {
			region: self.region,
			user_pool_id: self.user_pool_id,
			client_id: self.client_id,
			cognito_domain: self.cognito_domain,
			redirect_uri,
			logout_redirect_uri,
			scopes,
			response_type: self.response_type,
			client_auth_method: self.client_auth_method,
			hosted_ui_base: self.hosted_ui_base,
			endpoints,
		})
	}
}

/// Wire shape of a provider configuration document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProviderConfigDocument {
	region: String,
	user_pool_id: String,
	client_id: String,
	cognito_domain: String,
	redirect_uri: String,
	logout_redirect_uri: String,
	scopes: Vec<String>,
	#[serde(default)]
	response_type: ResponseType,
	#[serde(default)]
	client_auth_method: ClientAuthMethod,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	hosted_ui_base: Option<Url>,
}
impl TryFrom<ProviderConfigDocument> for ProviderConfig {
	type Error = ConfigError;

	fn try_from(doc: ProviderConfigDocument) -> Result<Self, Self::Error> {
		let mut builder = ProviderConfigBuilder::new(
			doc.region,
			doc.user_pool_id,
			doc.client_id,
			doc.cognito_domain,
		)
		.redirect_uri(doc.redirect_uri)
		.logout_redirect_uri(doc.logout_redirect_uri)
		.scopes(doc.scopes);

		builder.response_type = doc.response_type;
		builder.client_auth_method = doc.client_auth_method;
		builder.hosted_ui_base = doc.hosted_ui_base;

		builder.build()
	}
}
impl From<ProviderConfig> for ProviderConfigDocument {
	fn from(config: ProviderConfig) -> Self {
		Self {
			region: config.region,
			user_pool_id: config.user_pool_id,
			client_id: config.client_id,
			cognito_domain: config.cognito_domain,
			redirect_uri: config.redirect_uri.raw,
			logout_redirect_uri: config.logout_redirect_uri.raw,
			scopes: config.scopes.into(),
			response_type: config.response_type,
			client_auth_method: config.client_auth_method,
			hosted_ui_base: config.hosted_ui_base,
		}
	}
}

/// Downstream recommendation/feedback API location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
	/// API base, including any stage prefix (e.g. `https://host/api`).
	pub endpoint: Url,
	/// Recommendations collection path.
	#[serde(default = "ApiConfig::default_recommendations_path")]
	pub recommendations_path: String,
	/// Feedback submission path.
	#[serde(default = "ApiConfig::default_feedback_path")]
	pub feedback_path: String,
}
impl ApiConfig {
	/// Creates a configuration with the default resource paths.
	pub fn new(endpoint: Url) -> Self {
		Self {
			endpoint,
			recommendations_path: Self::default_recommendations_path(),
			feedback_path: Self::default_feedback_path(),
		}
	}

	/// Appends `path` to the endpoint verbatim, keeping any stage prefix.
	pub fn url_for(&self, path: &str) -> Result<Url, ConfigError> {
		parse_endpoint("api", &format!("{}{path}", self.endpoint.as_str().trim_end_matches('/')))
	}

	/// Recommendations collection URL.
	pub fn recommendations_url(&self) -> Result<Url, ConfigError> {
		self.url_for(&self.recommendations_path)
	}

	/// Feedback submission URL.
	pub fn feedback_url(&self) -> Result<Url, ConfigError> {
		self.url_for(&self.feedback_path)
	}

	fn default_recommendations_path() -> String {
		"/recommendations".into()
	}

	fn default_feedback_path() -> String {
		"/feedback".into()
	}
}

fn parse_endpoint(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })
}

fn validate_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.trim().is_empty() { Err(ConfigError::EmptyField { field }) } else { Ok(()) }
}

fn validate_label(field: &'static str, value: &str) -> Result<(), ConfigError> {
	validate_non_empty(field, value)?;

	let valid = value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
		&& !value.starts_with('-')
		&& !value.ends_with('-');

	if valid {
		Ok(())
	} else {
		Err(ConfigError::InvalidLabel { field, value: value.to_owned() })
	}
}

fn validate_web_url(field: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ConfigError::UnsupportedScheme { field, url: url.to_string() }),
	}
}
