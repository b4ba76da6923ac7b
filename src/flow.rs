//! Interactive sign-in flow orchestration.
//!
//! The flow runs three stages in order: launch the authorization session in a
//! [`BrowserSession`], exchange the returned authorization code at the token endpoint, then
//! fetch the signed-in user's profile with the granted access token.

pub mod authorize;
pub use authorize::AuthorizationOutcome;

pub mod profile;
pub use profile::Profile;

pub mod token;
pub use token::TokenGrant;

// self
use crate::{
	_prelude::*,
	browser::BrowserSession,
	config::AppConfig,
	http::FlowHttpClient,
	oauth::{CodeExchangeFacade, TransportErrorMapper},
	obs::FlowSpan,
};
#[cfg(feature = "reqwest")] use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// [`AuthClient`] backed by the bundled reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestAuthClient = AuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Client driving the full interactive sign-in flow.
///
/// Cloning is cheap; the transport and error mapper are shared behind [`Arc`]s.
pub struct AuthClient<C, M>
where
	C: ?Sized + FlowHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP transport used for the token and profile requests.
	pub http_client: Arc<C>,
	/// Mapper translating transport failures into flow errors.
	pub transport_mapper: Arc<M>,
}
impl<C, M> AuthClient<C, M>
where
	C: ?Sized + FlowHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client from a custom transport and error mapper.
	pub fn with_http_client<IC, IM>(http_client: IC, transport_mapper: IM) -> Self
	where
		IC: Into<Arc<C>>,
		IM: Into<Arc<M>>,
	{
		Self { http_client: http_client.into(), transport_mapper: transport_mapper.into() }
	}

	/// Runs the whole flow and returns the signed-in user's profile.
	///
	/// Cancellation and authorization denials surface as [`Error::Cancelled`] and
	/// [`Error::AuthorizationDenied`]; the later stages are skipped in both cases.
	pub async fn authenticate(
		&self,
		config: &AppConfig,
		browser: &dyn BrowserSession,
	) -> Result<Profile> {
		let code = match self.authorize(config, browser).await? {
			AuthorizationOutcome::Granted { code } => code,
			AuthorizationOutcome::Cancelled => return Err(Error::Cancelled),
			AuthorizationOutcome::Denied { code, description } =>
				return Err(Error::AuthorizationDenied { code, description }),
		};
		let grant = self.exchange_code(config, &code).await?;

		self.fetch_profile(config, &grant).await
	}

	/// Launches the authorization session and interprets its redirect.
	pub async fn authorize(
		&self,
		config: &AppConfig,
		browser: &dyn BrowserSession,
	) -> Result<AuthorizationOutcome> {
		FlowSpan::new(Stage::Authorize).instrument(authorize::launch(config, browser)).await
	}

	/// Exchanges an authorization code for a token grant.
	pub async fn exchange_code(&self, config: &AppConfig, code: &str) -> Result<TokenGrant> {
		let facade = CodeExchangeFacade::from_config(
			config,
			self.http_client.clone(),
			self.transport_mapper.clone(),
		)?;

		FlowSpan::new(Stage::Token)
			.instrument(facade.exchange_authorization_code(code, &config.redirect_url))
			.await
	}

	/// Fetches the signed-in user's profile with the granted access token.
	pub async fn fetch_profile(&self, config: &AppConfig, grant: &TokenGrant) -> Result<Profile> {
		FlowSpan::new(Stage::Profile)
			.instrument(profile::fetch(
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				&config.profile_endpoint,
				&grant.access_token,
			))
			.await
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestAuthClient {
	/// Creates a client with the default reqwest transport.
	pub fn new() -> Self {
		Self::with_http_client(ReqwestHttpClient::default(), ReqwestTransportErrorMapper)
	}

	/// Creates a client whose token and profile requests abort after `timeout`.
	pub fn with_request_timeout(timeout: std::time::Duration) -> Self {
		Self::with_http_client(
			ReqwestHttpClient::default().with_timeout(timeout),
			ReqwestTransportErrorMapper,
		)
	}
}
#[cfg(feature = "reqwest")]
impl Default for ReqwestAuthClient {
	fn default() -> Self {
		Self::new()
	}
}
impl<C, M> Clone for AuthClient<C, M>
where
	C: ?Sized + FlowHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
		}
	}
}
impl<C, M> Debug for AuthClient<C, M>
where
	C: ?Sized + FlowHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient").finish_non_exhaustive()
	}
}
