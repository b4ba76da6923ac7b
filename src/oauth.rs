//! Internal facade over the `oauth2` crate for the authorization-code exchange.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AccessToken, AuthType, AuthUrl, AuthorizationCode, Client as OAuthClient,
	ClientId as OAuthClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RefreshToken, RequestTokenError, Scope, StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
	helpers,
};
// self
use crate::{
	_prelude::*,
	config::AppConfig,
	error::{ConfigError, ResponseError, TransportError},
	flow::token::TokenGrant,
	http::{FlowHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

/// Opaque pass-through fields preserved from the token endpoint response body.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueTokenFields(pub BTreeMap<String, serde_json::Value>);

/// Token endpoint response shaped like [`oauth2::StandardTokenResponse`], with one deviation:
/// a missing `token_type` defaults to `Bearer` instead of failing deserialization. Azure AD's
/// responses carry the field, but the contract only guarantees `access_token`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphTokenResponse {
	access_token: AccessToken,
	#[serde(
		default = "default_token_type",
		deserialize_with = "helpers::deserialize_untagged_enum_case_insensitive"
	)]
	token_type: BasicTokenType,
	#[serde(skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	refresh_token: Option<RefreshToken>,
	#[serde(
		default,
		rename = "scope",
		deserialize_with = "helpers::deserialize_space_delimited_vec",
		serialize_with = "helpers::serialize_space_delimited_vec",
		skip_serializing_if = "Option::is_none"
	)]
	scopes: Option<Vec<Scope>>,
	#[serde(flatten)]
	extra_fields: OpaqueTokenFields,
}
impl GraphTokenResponse {
	pub(crate) fn extra_fields(&self) -> &OpaqueTokenFields {
		&self.extra_fields
	}
}
impl TokenResponse for GraphTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &BasicTokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<std::time::Duration> {
		self.expires_in.map(std::time::Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		self.scopes.as_ref()
	}
}

fn default_token_type() -> BasicTokenType {
	BasicTokenType::Bearer
}

type UnconfiguredClient = OAuthClient<
	BasicErrorResponse,
	GraphTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
>;
type ConfiguredClient = OAuthClient<
	BasicErrorResponse,
	GraphTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Maps HTTP transport failures into flow [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a flow error.
	fn map_transport_error(
		&self,
		stage: Stage,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		stage: Stage,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(stage, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io { stage, source: inner }.into(),
			HttpClientError::Other(message) => ResponseError::Unexpected {
				stage,
				message: format!("HTTP client error occurred: {message}"),
				status: meta_status(meta),
			}
			.into(),
			_ => ResponseError::Unexpected {
				stage,
				message: "HTTP client error occurred.".into(),
				status: meta_status(meta),
			}
			.into(),
		}
	}
}

pub(crate) struct CodeExchangeFacade<C, M>
where
	C: ?Sized + FlowHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredClient,
	scope: String,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> CodeExchangeFacade<C, M>
where
	C: ?Sized + FlowHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_config(
		config: &AppConfig,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let auth_url = AuthUrl::from_url(config.authorize_endpoint()?);
		let token_url = TokenUrl::from_url(config.token_endpoint()?);
		// Azure's v2.0 token endpoint accepts client credentials in the form body, which is
		// also where the source application always sent them.
		let mut oauth_client =
			UnconfiguredClient::new(OAuthClientId::new(config.client_id.to_string()))
				.set_auth_type(AuthType::RequestBody)
				.set_auth_uri(auth_url)
				.set_token_uri(token_url);

		if let Some(secret) = config.client_kind.secret() {
			oauth_client =
				oauth_client.set_client_secret(ClientSecret::new(secret.expose().to_owned()));
		}

		Ok(Self {
			oauth_client,
			scope: config.scope.normalized(),
			http_client,
			error_mapper,
		})
	}

	pub(crate) fn exchange_authorization_code<'a, 'code, 'redirect>(
		&'a self,
		code: &'code str,
		redirect_uri: &'redirect Url,
	) -> FacadeFuture<'a, TokenGrant>
	where
		'code: 'a,
		'redirect: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let redirect_url = oauth2::RedirectUrl::from_url(redirect_uri.clone());
			let mut request = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.set_redirect_uri(Cow::Owned(redirect_url));

			if !self.scope.is_empty() {
				request = request.add_extra_param("scope", self.scope.as_str());
			}

			let response = request.request_async(&instrumented).await.map_err(|err| {
				map_request_error(meta.take(), err, self.error_mapper.as_ref())
			})?;

			Ok(TokenGrant::from_response(response))
		})
	}
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(Stage::Token, meta_ref, error),
		RequestTokenError::Parse(error, _body) => ResponseError::MalformedJson {
			stage: Stage::Token,
			status: meta_status(meta_ref),
			source: error,
		}
		.into(),
		RequestTokenError::Other(message) => ResponseError::Unexpected {
			stage: Stage::Token,
			message,
			status: meta_status(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let code = response.error().as_ref().to_owned();
	let reason = if let Some(description) = response.error_description() {
		format!("{code}: {description}")
	} else {
		code.clone()
	};

	match code.as_str() {
		"invalid_grant" | "invalid_request" | "expired_token" => Error::InvalidGrant { reason },
		"invalid_client" | "unauthorized_client" => Error::InvalidClient { reason },
		_ => ResponseError::Unexpected {
			stage: Stage::Token,
			message: format!("Token endpoint returned an OAuth error: {reason}"),
			status: meta_status(meta),
		}
		.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(stage: Stage, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { stage }.into();
	}

	TransportError::network(stage, err).into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::{ClientId, ScopeSet, TenantId},
		http::ReqwestHttpClient,
	};

	fn config(confidential: bool) -> AppConfig {
		let builder = AppConfig::builder(
			TenantId::new("t1").expect("Tenant fixture should be valid."),
			ClientId::new("c1").expect("Client fixture should be valid."),
			ScopeSet::new(["openid"]).expect("Scope fixture should be valid."),
			Url::parse("https://app.example.com/redirect")
				.expect("Redirect fixture should parse successfully."),
		);
		let builder = if confidential { builder.client_secret("s3cr3t") } else { builder };

		builder.build().expect("Config fixture should build successfully.")
	}

	#[test]
	fn facade_builds_for_public_and_confidential_clients() {
		for confidential in [false, true] {
			let result =
				<CodeExchangeFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_config(
					&config(confidential),
					Arc::new(ReqwestHttpClient::default()),
					Arc::new(ReqwestTransportErrorMapper),
				);

			assert!(result.is_ok());
		}
	}

	#[test]
	fn token_response_defaults_missing_token_type_to_bearer() {
		let minimal: GraphTokenResponse = serde_json::from_str("{\"access_token\":\"tok1\"}")
			.expect("A token response carrying only access_token should deserialize.");

		assert_eq!(minimal.access_token().secret(), "tok1");
		assert_eq!(minimal.token_type(), &BasicTokenType::Bearer);
		assert_eq!(minimal.expires_in(), None);

		let cased: GraphTokenResponse =
			serde_json::from_str("{\"access_token\":\"tok2\",\"token_type\":\"Bearer\"}")
				.expect("A capitalized token type should deserialize.");

		assert_eq!(cased.token_type(), &BasicTokenType::Bearer);
	}

	#[test]
	fn server_errors_classify_into_grant_and_client_failures() {
		let grant: BasicErrorResponse = serde_json::from_str(
			"{\"error\":\"invalid_grant\",\"error_description\":\"code already redeemed\"}",
		)
		.expect("Error response fixture should deserialize.");

		assert!(matches!(
			map_server_response_error(grant, None),
			Error::InvalidGrant { .. }
		));

		let client: BasicErrorResponse = serde_json::from_str("{\"error\":\"invalid_client\"}")
			.expect("Error response fixture should deserialize.");

		assert!(matches!(
			map_server_response_error(client, None),
			Error::InvalidClient { .. }
		));

		let other: BasicErrorResponse =
			serde_json::from_str("{\"error\":\"temporarily_unavailable\"}")
				.expect("Error response fixture should deserialize.");

		assert!(matches!(
			map_server_response_error(other, Some(&ResponseMetadata { status: Some(503) })),
			Error::InvalidResponse(ResponseError::Unexpected { status: Some(503), .. })
		));
	}
}
