//! Token stage types: the grant obtained from the token endpoint.

// crates.io
use oauth2::{TokenResponse as _, basic::BasicTokenType};
// self
use crate::{_prelude::*, auth::Secret, oauth::GraphTokenResponse};

/// Access grant returned by the token endpoint.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Bearer access token; redacted from `Debug` output.
	pub access_token: Secret,
	/// Token type as reported by the endpoint, normally `Bearer`.
	pub token_type: String,
	/// Lifetime granted to the access token, when the endpoint reported one.
	pub expires_in: Option<Duration>,
	/// Space-delimited scopes actually granted, when the endpoint reported them.
	pub scope: Option<String>,
	/// Instant at which the grant was obtained; pairs with `expires_in` for expiry checks.
	pub obtained_at: OffsetDateTime,
	/// Additional response fields passed through untouched, e.g. `ext_expires_in`.
	pub extra: BTreeMap<String, serde_json::Value>,
}
impl TokenGrant {
	pub(crate) fn from_response(response: GraphTokenResponse) -> Self {
		let token_type = match response.token_type() {
			BasicTokenType::Bearer => "Bearer",
			BasicTokenType::Mac => "Mac",
			BasicTokenType::Extension(value) => value.as_str(),
		}
		.to_owned();
		let scope = response
			.scopes()
			.map(|scopes| scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" "));

		Self {
			access_token: Secret::new(response.access_token().secret().clone()),
			token_type,
			expires_in: response.expires_in().and_then(|lifetime| Duration::try_from(lifetime).ok()),
			scope,
			obtained_at: OffsetDateTime::now_utc(),
			extra: response.extra_fields().0.clone(),
		}
	}

	/// Whether the grant has expired as of `now`.
	///
	/// Grants without a reported lifetime never expire from this method's point of view.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_in.map(|lifetime| self.obtained_at + lifetime <= now).unwrap_or(false)
	}
}
