//! Flow-level error types shared across every sign-in stage.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Network stage that produced a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Browser-driven authorization step.
	Authorize,
	/// Authorization-code exchange against the token endpoint.
	Token,
	/// Profile fetch against Microsoft Graph.
	Profile,
}
impl Stage {
	/// Returns a stable label suitable for span fields and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Authorize => "authorize",
			Stage::Token => "token",
			Stage::Profile => "profile",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Canonical sign-in error exposed by public APIs.
///
/// Every failure is returned as an `Err` value; nothing escapes
/// [`AuthClient::authenticate`](crate::flow::AuthClient::authenticate) as a panic. The flow
/// fails fast at the first failing stage and never retries.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Endpoint answered with something other than the expected payload.
	#[error(transparent)]
	InvalidResponse(#[from] ResponseError),

	/// User dismissed or cancelled the browser session before any redirect.
	#[error("User cancelled the sign-in session before authorization completed.")]
	Cancelled,
	/// Authorization endpoint redirected back with an `error` parameter, or the browser
	/// mechanism itself failed.
	#[error("Authorization was denied: {code}.")]
	AuthorizationDenied {
		/// OAuth `error` code carried by the redirect.
		code: String,
		/// Optional `error_description` carried by the redirect.
		description: Option<String>,
	},
	/// Token endpoint rejected the authorization code grant.
	#[error("Token endpoint rejected the grant: {reason}.")]
	InvalidGrant {
		/// Endpoint-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or the credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Endpoint-supplied reason string.
		reason: String,
	},
}

/// Configuration and validation failures raised before any network call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Authority base URL cannot address the tenant's endpoints.
	#[error("Authority base URL cannot address tenant `{tenant}`.")]
	InvalidAuthority {
		/// Tenant identifier string.
		tenant: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Domain hint is set but carries no content.
	#[error("Domain hint cannot be empty.")]
	EmptyDomainHint,
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeout), tagged with the failing stage.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {stage} endpoint.")]
	Network {
		/// Stage whose request failed.
		stage: Stage,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded the caller-configured timeout.
	#[error("The {stage} request exceeded the configured timeout.")]
	Timeout {
		/// Stage whose request timed out.
		stage: Stage,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the {stage} endpoint.")]
	Io {
		/// Stage whose request failed.
		stage: Stage,
		/// Underlying IO error.
		#[source]
		source: std::io::Error,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error for the given stage.
	pub fn network(stage: Stage, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { stage, source: Box::new(src) }
	}
}

/// Responses that reached the client but could not be accepted.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Endpoint responded with malformed JSON.
	#[error("The {stage} endpoint returned malformed JSON.")]
	MalformedJson {
		/// Stage whose response failed to parse.
		stage: Stage,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
	/// Endpoint responded with a non-success status.
	#[error("The {stage} endpoint returned HTTP {status}.")]
	Status {
		/// Stage whose request was rejected.
		stage: Stage,
		/// HTTP status code.
		status: u16,
		/// Truncated response body, when one was present.
		body: Option<String>,
	},
	/// Endpoint returned an unexpected but well-formed response.
	#[error("The {stage} endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Stage whose response was rejected.
		stage: Stage,
		/// Endpoint- or client-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
