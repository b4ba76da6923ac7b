//! Typed, async Azure AD authorization-code sign-in—launch the browser consent hop, exchange the
//! code, and fetch the Microsoft Graph profile in one call.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod browser;
pub mod config;
pub mod error;
pub mod flow;
pub mod http;
pub mod oauth;
pub mod obs;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientId, ScopeSet, TenantId},
		browser::{BrowserSession, RedirectResponse, SessionError, SessionFuture},
		config::{AppConfig, ClientKind},
		flow::AuthClient,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
	};

	/// Auth client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestAuthClient = AuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`AuthClient`] backed by the insecure test transport.
	pub fn build_reqwest_test_auth_client() -> ReqwestTestAuthClient {
		AuthClient::with_http_client(
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Constructs an [`AuthClient`] whose transport applies `timeout` to every request.
	pub fn build_reqwest_test_auth_client_with_timeout(
		timeout: std::time::Duration,
	) -> ReqwestTestAuthClient {
		AuthClient::with_http_client(
			test_reqwest_http_client().with_timeout(timeout),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Builds the fixture config used across integration tests: tenant `t1`, client `c1`, scope
	/// `openid`, redirect `https://app.example.com/redirect`, with the authority and profile
	/// endpoints pointed at the provided bases (typically a mock server).
	pub fn test_app_config(
		authority: &str,
		profile_endpoint: &str,
		client_kind: ClientKind,
	) -> AppConfig {
		AppConfig::builder(
			TenantId::new("t1").expect("Tenant fixture should be valid."),
			ClientId::new("c1").expect("Client fixture should be valid."),
			ScopeSet::new(["openid"]).expect("Scope fixture should be valid."),
			Url::parse("https://app.example.com/redirect")
				.expect("Redirect fixture should parse successfully."),
		)
		.client_kind(client_kind)
		.authority(Url::parse(authority).expect("Authority fixture should parse successfully."))
		.profile_endpoint(
			Url::parse(profile_endpoint).expect("Profile endpoint fixture should parse."),
		)
		.build()
		.expect("Config fixture should build successfully.")
	}

	#[derive(Clone)]
	enum ScriptedOutcome {
		Redirect(BTreeMap<String, String>),
		Cancelled,
		Dismissed,
		Fail(String),
	}

	/// Browser-session double that replays one scripted outcome and records every launch.
	pub struct ScriptedBrowser {
		outcome: ScriptedOutcome,
		launches: Mutex<Vec<(Url, Url)>>,
	}
	impl ScriptedBrowser {
		/// Replays a successful redirect carrying the provided query parameters.
		pub fn redirect<I, K, V>(params: I) -> Self
		where
			I: IntoIterator<Item = (K, V)>,
			K: Into<String>,
			V: Into<String>,
		{
			Self::with_outcome(ScriptedOutcome::Redirect(
				params.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
			))
		}

		/// Replays a user cancellation.
		pub fn cancelled() -> Self {
			Self::with_outcome(ScriptedOutcome::Cancelled)
		}

		/// Replays a dismissed session window.
		pub fn dismissed() -> Self {
			Self::with_outcome(ScriptedOutcome::Dismissed)
		}

		/// Replays a browser-mechanism failure with the provided message.
		pub fn failing(message: impl Into<String>) -> Self {
			Self::with_outcome(ScriptedOutcome::Fail(message.into()))
		}

		/// Returns the `(authorize_url, return_url)` pairs captured so far.
		pub fn launches(&self) -> Vec<(Url, Url)> {
			self.launches.lock().clone()
		}

		fn with_outcome(outcome: ScriptedOutcome) -> Self {
			Self { outcome, launches: Mutex::new(Vec::new()) }
		}
	}
	impl BrowserSession for ScriptedBrowser {
		fn start<'a>(&'a self, authorize_url: &'a Url, return_url: &'a Url) -> SessionFuture<'a> {
			self.launches.lock().push((authorize_url.clone(), return_url.clone()));

			let outcome = self.outcome.clone();

			Box::pin(async move {
				match outcome {
					ScriptedOutcome::Redirect(params) => Ok(RedirectResponse::Redirect { params }),
					ScriptedOutcome::Cancelled => Ok(RedirectResponse::Cancelled),
					ScriptedOutcome::Dismissed => Ok(RedirectResponse::Dismissed),
					ScriptedOutcome::Fail(message) => Err(SessionError::from(message)),
				}
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result, Stage};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
#[cfg(test)] use azure_graph_auth as _;
