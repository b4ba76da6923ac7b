//! Profile stage: fetches the signed-in user's Microsoft Graph profile.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{Method, Request, header::AUTHORIZATION},
};
// self
use crate::{
	_prelude::*,
	auth::Secret,
	error::{ConfigError, ResponseError},
	http::{FlowHttpClient, ResponseMetadataSlot},
	oauth::TransportErrorMapper,
};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Signed-in user's profile as returned by Microsoft Graph `/me`.
///
/// Every field Graph may omit is optional; anything unrecognized lands in [`extra`](Self::extra).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	/// Directory object identifier.
	#[serde(default)]
	pub id: Option<String>,
	/// Display name.
	#[serde(default)]
	pub display_name: Option<String>,
	/// Given (first) name.
	#[serde(default)]
	pub given_name: Option<String>,
	/// Surname (last name).
	#[serde(default)]
	pub surname: Option<String>,
	/// User principal name, usually the sign-in address.
	#[serde(default)]
	pub user_principal_name: Option<String>,
	/// Primary SMTP address.
	#[serde(default)]
	pub mail: Option<String>,
	/// Job title.
	#[serde(default)]
	pub job_title: Option<String>,
	/// Office location.
	#[serde(default)]
	pub office_location: Option<String>,
	/// Preferred language, e.g. `en-US`.
	#[serde(default)]
	pub preferred_language: Option<String>,
	/// Mobile phone number.
	#[serde(default)]
	pub mobile_phone: Option<String>,
	/// Business phone numbers.
	#[serde(default)]
	pub business_phones: Vec<String>,
	/// Response fields not modeled above, preserved verbatim.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

pub(crate) async fn fetch<C, M>(
	http_client: &C,
	mapper: &M,
	endpoint: &Url,
	access_token: &Secret,
) -> Result<Profile>
where
	C: ?Sized + FlowHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let meta = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(meta.clone());
	let request = Request::builder()
		.method(Method::GET)
		.uri(endpoint.as_str())
		.header(AUTHORIZATION, format!("Bearer {}", access_token.expose()))
		.body(Vec::new())
		.map_err(ConfigError::HttpRequest)?;
	let response = handle.call(request).await.map_err(|err| {
		let captured = meta.take();

		mapper.map_transport_error(Stage::Profile, captured.as_ref(), err)
	})?;
	let status = response.status();

	if !status.is_success() {
		return Err(ResponseError::Status {
			stage: Stage::Profile,
			status: status.as_u16(),
			body: body_preview(response.body()),
		}
		.into());
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		Error::from(ResponseError::MalformedJson {
			stage: Stage::Profile,
			status: Some(status.as_u16()),
			source,
		})
	})
}

fn body_preview(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	let text = String::from_utf8_lossy(body);
	let mut preview = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	if text.chars().count() > BODY_PREVIEW_LIMIT {
		preview.push_str("...");
	}

	Some(preview)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unknown_fields_are_preserved() {
		let profile: Profile = serde_json::from_str(
			"{\"id\":\"u1\",\"displayName\":\"Alice Example\",\"businessPhones\":[\"+1 555\"],\
			 \"@odata.context\":\"https://graph.microsoft.com/v1.0/$metadata#users/$entity\"}",
		)
		.expect("Profile fixture should deserialize successfully.");

		assert_eq!(profile.id.as_deref(), Some("u1"));
		assert_eq!(profile.display_name.as_deref(), Some("Alice Example"));
		assert_eq!(profile.business_phones, ["+1 555"]);
		assert!(profile.extra.contains_key("@odata.context"));
		assert_eq!(profile.mail, None);
	}

	#[test]
	fn body_preview_truncates_long_bodies() {
		assert_eq!(body_preview(b""), None);
		assert_eq!(body_preview(b"short").as_deref(), Some("short"));

		let long = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = body_preview(long.as_bytes()).expect("Preview should be produced.");

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 3);
		assert!(preview.ends_with("..."));
	}
}
