//! External browser-session collaborator seam.
//!
//! The crate never opens a browser itself. Callers supply a [`BrowserSession`]
//! implementation (system browser plus loopback listener, embedded webview, a platform auth
//! session, ...) and the flow treats it as opaque: it hands over the authorize URL and the
//! return URL, then receives either the captured redirect parameters or a cancellation
//! signal.

// self
use crate::_prelude::*;

/// Boxed error produced by browser-session implementations.
pub type SessionError = Box<dyn StdError + Send + Sync>;
/// Future returned by [`BrowserSession::start`].
pub type SessionFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RedirectResponse, SessionError>> + 'a + Send>>;

/// Outcome reported by the browser-session mechanism.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedirectResponse {
	/// The session reached the return URL; query parameters captured from the redirect.
	Redirect {
		/// Query parameters carried by the redirect URL.
		params: BTreeMap<String, String>,
	},
	/// The user cancelled the session before any redirect.
	Cancelled,
	/// The session window was dismissed without completing authorization.
	Dismissed,
}

/// Abstraction over the external mechanism that presents the consent screen and intercepts
/// the redirect back to the application.
///
/// Implementations must be `Send + Sync` so one session handler can serve concurrent
/// sign-in attempts. An error returned from [`start`](Self::start) is caught by the flow
/// and surfaced as an authorization-stage denial; implementations should therefore prefer
/// [`RedirectResponse::Cancelled`]/[`RedirectResponse::Dismissed`] for user-driven exits
/// and reserve `Err` for mechanism faults.
pub trait BrowserSession: Send + Sync {
	/// Presents `authorize_url` and resolves once the session redirects to `return_url`, is
	/// cancelled, or fails.
	fn start<'a>(&'a self, authorize_url: &'a Url, return_url: &'a Url) -> SessionFuture<'a>;
}

/// Extracts the query parameters of a captured redirect URL into the map shape expected by
/// [`RedirectResponse::Redirect`].
pub fn redirect_params_from_url(redirect: &Url) -> BTreeMap<String, String> {
	redirect.query_pairs().into_owned().collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn redirect_params_decode_query_pairs() {
		let redirect = Url::parse(
			"https://app.example.com/redirect?code=abc&session_state=xyz&error_description=user%20declined",
		)
		.expect("Redirect fixture should parse successfully.");
		let params = redirect_params_from_url(&redirect);

		assert_eq!(params.get("code").map(String::as_str), Some("abc"));
		assert_eq!(params.get("session_state").map(String::as_str), Some("xyz"));
		assert_eq!(params.get("error_description").map(String::as_str), Some("user declined"));
	}

	#[test]
	fn redirect_params_handle_missing_query() {
		let redirect = Url::parse("https://app.example.com/redirect")
			.expect("Redirect fixture should parse successfully.");

		assert!(redirect_params_from_url(&redirect).is_empty());
	}
}
