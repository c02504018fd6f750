// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use snoo_client::{_preludet::*, endpoint, error::Error, reqwest::Method};

fn identity_response(id_token: &str) -> serde_json::Value {
	json!({
		"AuthenticationResult": {
			"IdToken": id_token,
			"RefreshToken": "refresh-1",
			"ExpiresIn": 3600,
			"TokenType": "Bearer",
		}
	})
}

#[tokio::test]
async fn request_recovers_a_single_401_with_a_fresh_token() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.url("/"), &server.url("/identity"));

	seed_credential(&client, "Bearer stale", None, Duration::minutes(30));

	let identity = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(identity_response("fresh-id"));
		})
		.await;
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/me/devices").header("authorization", "Bearer stale");
			then.status(401);
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/me/devices").header("authorization", "Bearer fresh-id");
			then.status(200).header("content-type", "application/json").json_body(json!([]));
		})
		.await;
	let url = client.descriptor().api_url(endpoint::DEVICES).expect("Devices path should join.");
	let (status, body) = client
		.request(Method::GET, url, None, None)
		.await
		.expect("Request should succeed after the recovery cycle.");

	rejected.assert_async().await;
	identity.assert_async().await;
	accepted.assert_async().await;

	assert_eq!(status.as_u16(), 200);
	assert_eq!(body, json!([]));
	assert_eq!(
		client.credential().bearer.as_ref().map(|secret| secret.expose().to_owned()),
		Some("Bearer fresh-id".to_owned())
	);
}

#[tokio::test]
async fn second_401_surfaces_authentication_and_clears_the_token() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.url("/"), &server.url("/identity"));

	seed_credential(&client, "Bearer stale", None, Duration::minutes(30));

	let identity = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(identity_response("fresh-id"));
		})
		.await;
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/me/devices");
			then.status(401);
		})
		.await;
	let url = client.descriptor().api_url(endpoint::DEVICES).expect("Devices path should join.");
	let err = client
		.request(Method::GET, url, None, None)
		.await
		.expect_err("A second 401 must not be retried again.");

	// Original attempt plus exactly one post-re-authentication retry.
	rejected.assert_hits_async(2).await;
	identity.assert_async().await;

	assert!(matches!(err, Error::Authentication { .. }));
	assert!(client.credential().bearer.is_none());
	assert!(client.credential().last_refreshed_at.is_some());
}

#[tokio::test]
async fn concurrent_requests_share_one_login() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.url("/"), &server.url("/identity"));
	let identity = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity");
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(200))
				.json_body(identity_response("fresh-id"));
		})
		.await;
	let _api = server
		.mock_async(|when, then| {
			when.method(GET).path("/me/devices");
			then.status(200).header("content-type", "application/json").json_body(json!([]));
		})
		.await;
	let url = client.descriptor().api_url(endpoint::DEVICES).expect("Devices path should join.");
	let (first, second) = tokio::join!(
		client.request(Method::GET, url.clone(), None, None),
		client.request(Method::GET, url.clone(), None, None),
	);

	first.expect("First concurrent request should succeed.");
	second.expect("Second concurrent request should succeed.");

	// Both callers must have funneled through a single authentication.
	identity.assert_async().await;
}

#[tokio::test]
async fn near_expiry_refreshes_in_the_background() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.url("/"), &server.url("/identity"));

	// The proactive threshold has passed but the bearer itself is still valid.
	seed_credential(&client, "Bearer old", Some("refresh-old"), Duration::seconds(-1));

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/us/v2/refresh").json_body(json!({
				"refresh_token": "refresh-old",
			}));
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(100))
				.json_body(json!({
				"token_type": "Bearer",
				"access_token": "newer",
				"refresh_token": "refresh-new",
				"expires_in": 10_800,
			}));
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/me/devices").header("authorization", "Bearer old");
			then.status(200).header("content-type", "application/json").json_body(json!([]));
		})
		.await;
	let url = client.descriptor().api_url(endpoint::DEVICES).expect("Devices path should join.");

	client
		.request(Method::GET, url, None, None)
		.await
		.expect("Request should proceed with the still-valid token.");

	// The request went out with the old token while the refresh ran behind it.
	api.assert_async().await;

	// Joining the in-flight task makes the background outcome deterministic.
	client.authenticate(true).await.expect("Background refresh should succeed when joined.");

	refresh.assert_async().await;

	assert_eq!(
		client.credential().bearer.as_ref().map(|secret| secret.expose().to_owned()),
		Some("Bearer newer".to_owned())
	);
	assert_eq!(
		client.credential().refresh.as_ref().map(|secret| secret.expose().to_owned()),
		Some("refresh-new".to_owned())
	);
}

#[tokio::test]
async fn invalid_credentials_fail_before_any_network_call() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server.url("/"), &server.url("/identity"));
	let identity = server
		.mock_async(|when, then| {
			when.method(POST).path("/identity");
			then.status(200);
		})
		.await;

	client.mark_credentials_invalid();

	let err = client.authenticate(true).await.expect_err("Latched credentials must fail fast.");

	assert!(matches!(err, Error::InvalidCredentials { .. }));
	identity.assert_hits_async(0).await;

	// Resupplying a password lifts the latch.
	client.set_password("new-password");

	let empty = build_test_client(&server.url("/"), &server.url("/identity"));

	empty.set_username("");

	let err = empty.authenticate(true).await.expect_err("Empty username must fail fast.");

	assert!(matches!(err, Error::InvalidCredentials { .. }));
	identity.assert_hits_async(0).await;
}
