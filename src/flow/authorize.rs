//! Authorization stage: builds the authorize URL, runs the browser session, and interprets the
//! redirect it returns.

// self
use crate::{
	_prelude::*,
	browser::{BrowserSession, RedirectResponse},
	config::AppConfig,
};

/// Result of the authorization stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationOutcome {
	/// The user signed in and Azure AD issued an authorization code.
	Granted {
		/// Single-use authorization code to redeem at the token endpoint.
		code: String,
	},
	/// Azure AD redirected back with an error, or the session itself broke down.
	Denied {
		/// OAuth error code, e.g. `access_denied`, or a synthetic code such as `session_error`.
		code: String,
		/// Human-readable detail, when one was provided.
		description: Option<String>,
	},
	/// The user closed or backed out of the session before completing sign-in.
	Cancelled,
}

pub(crate) async fn launch(
	config: &AppConfig,
	browser: &dyn BrowserSession,
) -> Result<AuthorizationOutcome> {
	let authorize_url = build_authorize_url(config)?;
	let outcome = match browser.start(&authorize_url, config.session_return_url()).await {
		Ok(RedirectResponse::Redirect { params }) => interpret_redirect(params),
		Ok(RedirectResponse::Cancelled) | Ok(RedirectResponse::Dismissed) =>
			AuthorizationOutcome::Cancelled,
		// The session never reached Azure AD; report it as a denial so callers see one shape
		// for every non-granted ending.
		Err(source) => AuthorizationOutcome::Denied {
			code: "session_error".into(),
			description: Some(source.to_string()),
		},
	};

	Ok(outcome)
}

fn interpret_redirect(mut params: BTreeMap<String, String>) -> AuthorizationOutcome {
	// An error parameter wins over a stray code.
	if let Some(code) = params.remove("error") {
		return AuthorizationOutcome::Denied { code, description: params.remove("error_description") };
	}
	if let Some(code) = params.remove("code") {
		return AuthorizationOutcome::Granted { code };
	}

	AuthorizationOutcome::Denied {
		code: "invalid_callback".into(),
		description: Some("Redirect carried neither a code nor an error parameter.".into()),
	}
}

pub(crate) fn build_authorize_url(config: &AppConfig) -> Result<Url> {
	let mut url = config.authorize_endpoint()?;
	let scope = config.scope.normalized();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("client_id", &config.client_id);
	pairs.append_pair("response_type", "code");

	if !scope.is_empty() {
		pairs.append_pair("scope", &scope);
	}
	if let Some(domain_hint) = &config.domain_hint {
		pairs.append_pair("domain_hint", domain_hint);
	}
	if let Some(prompt) = &config.prompt {
		pairs.append_pair("prompt", prompt.as_str());
	}

	pairs.append_pair("redirect_uri", config.redirect_url.as_str());

	drop(pairs);

	Ok(url)
}
