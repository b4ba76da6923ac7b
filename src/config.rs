//! Immutable application configuration for the sign-in flow.
//!
//! [`AppConfig`] is passed explicitly to every flow call instead of living inside the
//! client, so concurrent sign-in attempts never share mutable state. The builder validates
//! the endpoint derivation at `build()` time; afterwards the config is plain data.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet, Secret, TenantId},
	error::ConfigError,
};

/// Authority base URL every config starts from.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/";
/// Microsoft Graph profile resource queried after the token exchange.
pub const DEFAULT_PROFILE_ENDPOINT: &str = "https://graph.microsoft.com/v1.0/me";

/// Whether the application is a public or a confidential OAuth client.
///
/// The distinction is explicit so no call site ever hard-codes whether `client_secret`
/// accompanies the token request: public clients never send one, confidential clients
/// always do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
	/// Public (mobile/desktop) client; a client secret is never sent.
	Public,
	/// Confidential client registered with a secret that accompanies token requests.
	Confidential {
		/// Registered client secret.
		secret: Secret,
	},
}
impl ClientKind {
	/// Returns the client secret for confidential clients.
	pub fn secret(&self) -> Option<&Secret> {
		match self {
			ClientKind::Public => None,
			ClientKind::Confidential { secret } => Some(secret),
		}
	}
}

/// `prompt` values understood by the Microsoft identity platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
	/// Force a fresh credential prompt.
	Login,
	/// Fail silently when interaction would be required.
	None,
	/// Force the consent dialog.
	Consent,
	/// Show the account picker.
	SelectAccount,
}
impl Prompt {
	/// Returns the wire value for the `prompt` query parameter.
	pub const fn as_str(self) -> &'static str {
		match self {
			Prompt::Login => "login",
			Prompt::None => "none",
			Prompt::Consent => "consent",
			Prompt::SelectAccount => "select_account",
		}
	}
}

/// Immutable sign-in configuration supplied by the caller at the start of a flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
	/// Azure AD tenant the authorization request addresses.
	pub tenant: TenantId,
	/// Application (client) identifier from the app registration.
	pub client_id: ClientId,
	/// Public/confidential designation controlling `client_secret` emission.
	pub client_kind: ClientKind,
	/// Scopes requested during authorization and repeated in the token exchange.
	pub scope: ScopeSet,
	/// Redirect URI registered for the application.
	pub redirect_url: Url,
	/// Return URL handed to the browser session; falls back to
	/// [`redirect_url`](Self::redirect_url) when absent.
	pub return_url: Option<Url>,
	/// Optional `domain_hint` forwarded to the authorization endpoint.
	pub domain_hint: Option<String>,
	/// Optional `prompt` behavior forwarded to the authorization endpoint.
	pub prompt: Option<Prompt>,
	/// Authority base URL the tenant endpoints are derived from.
	pub authority: Url,
	/// Profile resource queried with the granted bearer token.
	pub profile_endpoint: Url,
}
impl AppConfig {
	/// Creates a builder for the four mandatory fields; everything else defaults.
	pub fn builder(
		tenant: TenantId,
		client_id: ClientId,
		scope: ScopeSet,
		redirect_url: Url,
	) -> AppConfigBuilder {
		AppConfigBuilder {
			tenant,
			client_id,
			scope,
			redirect_url,
			client_kind: ClientKind::Public,
			return_url: None,
			domain_hint: None,
			prompt: None,
			authority: None,
			profile_endpoint: None,
		}
	}

	/// Return URL handed to the browser session.
	pub fn session_return_url(&self) -> &Url {
		self.return_url.as_ref().unwrap_or(&self.redirect_url)
	}

	/// Tenant-scoped authorization endpoint.
	pub fn authorize_endpoint(&self) -> Result<Url, ConfigError> {
		self.tenant_endpoint("authorize")
	}

	/// Tenant-scoped token endpoint.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		self.tenant_endpoint("token")
	}

	fn tenant_endpoint(&self, leaf: &str) -> Result<Url, ConfigError> {
		self.authority.join(&format!("{}/oauth2/v2.0/{leaf}", self.tenant.as_ref())).map_err(
			|source| ConfigError::InvalidAuthority { tenant: self.tenant.to_string(), source },
		)
	}
}

/// Builder producing validated [`AppConfig`] values.
#[derive(Clone, Debug)]
pub struct AppConfigBuilder {
	tenant: TenantId,
	client_id: ClientId,
	scope: ScopeSet,
	redirect_url: Url,
	client_kind: ClientKind,
	return_url: Option<Url>,
	domain_hint: Option<String>,
	prompt: Option<Prompt>,
	authority: Option<Url>,
	profile_endpoint: Option<Url>,
}
impl AppConfigBuilder {
	/// Sets the public/confidential designation.
	pub fn client_kind(mut self, kind: ClientKind) -> Self {
		self.client_kind = kind;

		self
	}

	/// Marks the client confidential with the provided secret.
	pub fn client_secret(self, secret: impl Into<String>) -> Self {
		self.client_kind(ClientKind::Confidential { secret: Secret::new(secret) })
	}

	/// Overrides the return URL handed to the browser session.
	pub fn return_url(mut self, url: Url) -> Self {
		self.return_url = Some(url);

		self
	}

	/// Sets the `domain_hint` authorization parameter.
	pub fn domain_hint(mut self, hint: impl Into<String>) -> Self {
		self.domain_hint = Some(hint.into());

		self
	}

	/// Sets the `prompt` authorization parameter.
	pub fn prompt(mut self, prompt: Prompt) -> Self {
		self.prompt = Some(prompt);

		self
	}

	/// Overrides the authority base URL (sovereign clouds, tests).
	pub fn authority(mut self, authority: Url) -> Self {
		self.authority = Some(authority);

		self
	}

	/// Overrides the profile resource URL (national Graph deployments, tests).
	pub fn profile_endpoint(mut self, endpoint: Url) -> Self {
		self.profile_endpoint = Some(endpoint);

		self
	}

	/// Validates and assembles the final [`AppConfig`].
	pub fn build(self) -> Result<AppConfig, ConfigError> {
		if let Some(hint) = &self.domain_hint
			&& hint.trim().is_empty()
		{
			return Err(ConfigError::EmptyDomainHint);
		}

		let authority = match self.authority {
			Some(value) => value,
			None => parse_default(DEFAULT_AUTHORITY)?,
		};
		let profile_endpoint = match self.profile_endpoint {
			Some(value) => value,
			None => parse_default(DEFAULT_PROFILE_ENDPOINT)?,
		};
		let config = AppConfig {
			tenant: self.tenant,
			client_id: self.client_id,
			client_kind: self.client_kind,
			scope: self.scope,
			redirect_url: self.redirect_url,
			return_url: self.return_url,
			domain_hint: self.domain_hint,
			prompt: self.prompt,
			authority,
			profile_endpoint,
		};

		// Surfaces cannot-be-a-base authorities at build time instead of mid-flow.
		config.authorize_endpoint()?;
		config.token_endpoint()?;

		Ok(config)
	}
}

fn parse_default(value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint { source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base_builder() -> AppConfigBuilder {
		AppConfig::builder(
			TenantId::new("t1").expect("Tenant fixture should be valid."),
			ClientId::new("c1").expect("Client fixture should be valid."),
			ScopeSet::new(["openid"]).expect("Scope fixture should be valid."),
			Url::parse("https://app.example.com/redirect")
				.expect("Redirect fixture should parse successfully."),
		)
	}

	#[test]
	fn endpoints_derive_from_tenant() {
		let config = base_builder().build().expect("Config should build successfully.");

		assert_eq!(
			config.authorize_endpoint().expect("Authorize endpoint should derive.").as_str(),
			"https://login.microsoftonline.com/t1/oauth2/v2.0/authorize"
		);
		assert_eq!(
			config.token_endpoint().expect("Token endpoint should derive.").as_str(),
			"https://login.microsoftonline.com/t1/oauth2/v2.0/token"
		);
		assert_eq!(config.profile_endpoint.as_str(), DEFAULT_PROFILE_ENDPOINT);
	}

	#[test]
	fn authority_override_keeps_tenant_path() {
		let config = base_builder()
			.authority(
				Url::parse("https://login.microsoftonline.us/")
					.expect("Authority fixture should parse."),
			)
			.build()
			.expect("Config should build successfully.");

		assert_eq!(
			config.token_endpoint().expect("Token endpoint should derive.").as_str(),
			"https://login.microsoftonline.us/t1/oauth2/v2.0/token"
		);
	}

	#[test]
	fn cannot_be_a_base_authority_fails_at_build() {
		let result = base_builder()
			.authority(Url::parse("data:text/plain,nope").expect("Data URL should parse."))
			.build();

		assert!(matches!(result, Err(ConfigError::InvalidAuthority { .. })));
	}

	#[test]
	fn empty_domain_hint_is_rejected() {
		let result = base_builder().domain_hint("  ").build();

		assert!(matches!(result, Err(ConfigError::EmptyDomainHint)));
	}

	#[test]
	fn session_return_url_falls_back_to_redirect() {
		let config = base_builder().build().expect("Config should build successfully.");

		assert_eq!(config.session_return_url(), &config.redirect_url);

		let with_return = base_builder()
			.return_url(
				Url::parse("https://app.example.com/return")
					.expect("Return URL fixture should parse."),
			)
			.build()
			.expect("Config should build successfully.");

		assert_eq!(
			with_return.session_return_url().as_str(),
			"https://app.example.com/return"
		);
	}

	#[test]
	fn client_kind_exposes_secret_only_when_confidential() {
		let public = base_builder().build().expect("Config should build successfully.");

		assert_eq!(public.client_kind.secret(), None);

		let confidential =
			base_builder().client_secret("s3cr3t").build().expect("Config should build.");

		assert_eq!(
			confidential.client_kind.secret().map(|secret| secret.expose()),
			Some("s3cr3t")
		);
	}
}
