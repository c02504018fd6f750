// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use snoo_client::{
	error::{Error, RequestError},
	http::ReqwestTransport,
	reqwest::{Method, header::HeaderMap},
	url::Url,
};

fn url(server: &MockServer, path: &str) -> Url {
	Url::parse(&server.url(path)).expect("Failed to parse mock server URL.")
}

#[tokio::test]
async fn first_attempt_success_needs_no_retry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/ok");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "ok": true }));
		})
		.await;
	let transport = ReqwestTransport::default();
	let (status, body) = transport
		.send_json(Method::GET, &url(&server, "/ok"), &HeaderMap::new(), None, None)
		.await
		.expect("A clean 200 should not error.");

	mock.assert_async().await;

	assert_eq!(status.as_u16(), 200);
	assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn transient_failures_are_retried_and_the_last_error_surfaces() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/broken");
			then.status(503);
		})
		.await;
	let transport = ReqwestTransport::default().with_max_attempts(2);
	let err = transport
		.send(Method::GET, &url(&server, "/broken"), &HeaderMap::new(), None, None)
		.await
		.expect_err("A persistent 503 must exhaust the retry budget.");

	mock.assert_hits_async(2).await;

	match err {
		Error::Request(RequestError::Status { status, .. }) => assert_eq!(status, 503),
		other => panic!("expected the last captured status error, got {other:?}"),
	}
}

#[tokio::test]
async fn unauthorized_is_never_retried() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/secure");
			then.status(401);
		})
		.await;
	let transport = ReqwestTransport::default();
	let err = transport
		.send(Method::GET, &url(&server, "/secure"), &HeaderMap::new(), None, None)
		.await
		.expect_err("A 401 must surface immediately.");

	mock.assert_async().await;

	assert!(err.is_unauthorized());
}

#[tokio::test]
async fn network_failures_are_wrapped() {
	// Nothing listens on this port; reqwest reports a connect error.
	let dead = Url::parse("http://127.0.0.1:9/dead").expect("Static URL should parse.");
	let transport = ReqwestTransport::default().with_max_attempts(1);
	let err = transport
		.send(Method::GET, &dead, &HeaderMap::new(), None, None)
		.await
		.expect_err("An unreachable host must error.");

	assert!(matches!(err, Error::Request(RequestError::Network { .. })));
}

#[tokio::test]
async fn json_parse_failures_carry_position_and_document() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/garbled");
			then.status(200).header("content-type", "application/json").body("{\"a\": nope}");
		})
		.await;
	let transport = ReqwestTransport::default();
	let err = transport
		.send_json(Method::GET, &url(&server, "/garbled"), &HeaderMap::new(), None, None)
		.await
		.expect_err("A garbled body must be a request error.");

	match err {
		Error::Request(RequestError::Json { line, column, document, .. }) => {
			assert_eq!(line, 1);
			assert!(column > 1);
			assert_eq!(document, "{\"a\": nope}");
		},
		other => panic!("expected a JSON parse error, got {other:?}"),
	}
}
