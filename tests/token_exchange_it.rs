#![cfg(feature = "reqwest")]

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use azure_graph_auth::{
	_preludet::*,
	auth::Secret,
	config::ClientKind,
	error::{Error, ResponseError, Stage, TransportError},
};

const TOKEN_PATH: &str = "/t1/oauth2/v2.0/token";
const PROFILE_PATH: &str = "/v1.0/me";

#[tokio::test]
async fn public_client_never_sends_a_client_secret() {
	let server = MockServer::start_async().await;
	let config =
		test_app_config(&server.url("/"), &server.url(PROFILE_PATH), ClientKind::Public);
	let client = build_reqwest_test_auth_client();
	// Register the narrower matcher first so a leaked secret is counted against it.
	let secret_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).body_includes("client_secret=");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"leak\",\"token_type\":\"bearer\"}");
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.body_includes("client_id=c1")
				.body_includes("grant_type=authorization_code");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-public\",\"token_type\":\"bearer\"}");
		})
		.await;
	let grant = client
		.exchange_code(&config, "code-public")
		.await
		.expect("Public client exchange should succeed.");

	assert_eq!(secret_mock.hits_async().await, 0);
	token_mock.assert_async().await;
	assert_eq!(grant.access_token.expose(), "access-public");
	assert_eq!(grant.token_type, "Bearer");
}

#[tokio::test]
async fn confidential_client_sends_its_secret_in_the_form_body() {
	let server = MockServer::start_async().await;
	let config = test_app_config(
		&server.url("/"),
		&server.url(PROFILE_PATH),
		ClientKind::Confidential { secret: Secret::new("s3cr3t".to_owned()) },
	);
	let client = build_reqwest_test_auth_client();
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("client_id=c1")
				.body_includes("client_secret=s3cr3t")
				.body_includes("grant_type=authorization_code")
				.body_includes("code=code-confidential")
				.body_includes("scope=openid")
				.body_includes("redirect_uri=https%3A%2F%2Fapp.example.com%2Fredirect");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-confidential\",\"token_type\":\"bearer\",\
				 \"expires_in\":3600,\"scope\":\"openid\",\"ext_expires_in\":7200}",
			);
		})
		.await;
	let grant = client
		.exchange_code(&config, "code-confidential")
		.await
		.expect("Confidential client exchange should succeed.");

	token_mock.assert_async().await;
	assert_eq!(grant.scope.as_deref(), Some("openid"));
	assert_eq!(grant.expires_in, Some(time::Duration::seconds(3_600)));
	assert_eq!(
		grant.extra.get("ext_expires_in"),
		Some(&serde_json::Value::from(7_200))
	);
}

#[tokio::test]
async fn malformed_token_json_is_reported_and_profile_is_never_fetched() {
	let server = MockServer::start_async().await;
	let config =
		test_app_config(&server.url("/"), &server.url(PROFILE_PATH), ClientKind::Public);
	let client = build_reqwest_test_auth_client();
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body("not json at all");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH);
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let browser = ScriptedBrowser::redirect([("code", "code-bad-json")]);
	let result = client.authenticate(&config, &browser).await;

	assert!(matches!(
		result,
		Err(Error::InvalidResponse(ResponseError::MalformedJson { stage: Stage::Token, .. }))
	));
	assert_eq!(profile_mock.hits_async().await, 0);
}

#[tokio::test]
async fn invalid_grant_and_invalid_client_are_classified() {
	let server = MockServer::start_async().await;
	let config =
		test_app_config(&server.url("/"), &server.url(PROFILE_PATH), ClientKind::Public);
	let client = build_reqwest_test_auth_client();
	let _grant_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).body_includes("code=code-redeemed");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"AADSTS70008: The code has expired.\"}",
			);
		})
		.await;
	let _client_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).body_includes("code=code-bad-client");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;

	match client.exchange_code(&config, "code-redeemed").await {
		Err(Error::InvalidGrant { reason }) => {
			assert!(reason.starts_with("invalid_grant: AADSTS70008"));
		},
		other => panic!("Expected an invalid grant error, got {other:?}."),
	}
	match client.exchange_code(&config, "code-bad-client").await {
		Err(Error::InvalidClient { reason }) => assert_eq!(reason, "invalid_client"),
		other => panic!("Expected an invalid client error, got {other:?}."),
	}
}

#[tokio::test]
async fn slow_token_endpoint_times_out() {
	let server = MockServer::start_async().await;
	let config =
		test_app_config(&server.url("/"), &server.url(PROFILE_PATH), ClientKind::Public);
	let client = build_reqwest_test_auth_client_with_timeout(Duration::from_millis(250));
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"late\",\"token_type\":\"bearer\"}")
				.delay(Duration::from_secs(2));
		})
		.await;
	let result = client.exchange_code(&config, "code-slow").await;

	assert!(matches!(
		result,
		Err(Error::Transport(TransportError::Timeout { stage: Stage::Token }))
	));
}
