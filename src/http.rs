//! Transport primitives for the service: one HTTP dispatch with bounded
//! backoff retry on transient failures.
//!
//! A 401 is never retried here; it is surfaced immediately so the request
//! gateway can recover it via re-authentication. Every other HTTP or network
//! failure is retried up to [`DEFAULT_REQUEST_RETRIES`] attempts with a capped
//! exponential backoff.

// std
use std::ops::Deref;
// crates.io
use reqwest::{Method, Response, StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::RequestError, obs};

/// Retry bound applied to every transient failure.
pub const DEFAULT_REQUEST_RETRIES: u32 = 5;
/// Upper bound on the exponential backoff, in seconds.
pub const BACKOFF_CAP_SECS: u64 = 5;

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one
/// place. The wrapper owns the retry/backoff policy; callers that need a
/// custom TLS or proxy setup pass their own client via
/// [`with_client`](Self::with_client).
#[derive(Clone)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	max_attempts: u32,
}
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, max_attempts: DEFAULT_REQUEST_RETRIES }
	}

	/// Overrides the retry attempt bound. Intended for tests that exercise the
	/// retry loop without paying the full backoff schedule.
	pub fn with_max_attempts(mut self, attempts: u32) -> Self {
		self.max_attempts = attempts.max(1);

		self
	}

	/// Sends one request, retrying transient failures with a capped backoff.
	///
	/// The backoff before attempt `n + 1` is `min(2^n, 5)` seconds, i.e.
	/// 2s, 4s, 5s, 5s across the default five attempts.
	pub async fn send(
		&self,
		method: Method,
		url: &Url,
		headers: &HeaderMap,
		params: Option<&[(&str, String)]>,
		body: Option<&Value>,
	) -> Result<Response> {
		let mut attempt = 0;
		let mut last_error = None;

		while attempt < self.max_attempts {
			if attempt != 0 {
				let wait = 2_u64.saturating_pow(attempt).min(BACKOFF_CAP_SECS);

				obs::debug_event(
					obs::FlowKind::Request,
					&format!(
						"request failed (attempt #{attempt}/{}); trying again in {wait} seconds",
						self.max_attempts
					),
				);
				tokio::time::sleep(std::time::Duration::from_secs(wait)).await;
			}

			attempt += 1;

			let mut request = self.client.request(method.clone(), url.clone()).headers(headers.clone());

			if let Some(params) = params {
				request = request.query(params);
			}
			if let Some(body) = body {
				request = request.json(body);
			}

			match request.send().await {
				Ok(response) => {
					let status = response.status();

					if status.is_success() {
						return Ok(response);
					}
					if status == StatusCode::UNAUTHORIZED {
						return Err(RequestError::Status {
							url: url.to_string(),
							status: status.as_u16(),
						}
						.into());
					}

					obs::debug_event(
						obs::FlowKind::Request,
						&format!("attempt {attempt} failed with status {status}"),
					);

					last_error =
						Some(RequestError::Status { url: url.to_string(), status: status.as_u16() });
				},
				Err(err) => {
					obs::debug_event(
						obs::FlowKind::Request,
						&format!("attempt {attempt} failed with a network error: {err}"),
					);

					last_error = Some(RequestError::network(url.as_str(), err));
				},
			}
		}

		match last_error {
			Some(err) => Err(err.into()),
			None => Err(RequestError::Exhausted { url: url.to_string() }.into()),
		}
	}

	/// Sends one request and parses the response body as JSON.
	///
	/// A parse failure is reported as a [`RequestError::Json`] carrying the
	/// offending line/column and the raw document.
	pub async fn send_json(
		&self,
		method: Method,
		url: &Url,
		headers: &HeaderMap,
		params: Option<&[(&str, String)]>,
		body: Option<&Value>,
	) -> Result<(StatusCode, Value)> {
		let response = self.send(method, url, headers, params, body).await?;
		let status = response.status();
		let text = response.text().await.map_err(|err| RequestError::network(url.as_str(), err))?;
		let value = parse_json(&text, url.as_str())?;

		Ok((status, value))
	}
}
impl Default for ReqwestTransport {
	fn default() -> Self {
		Self::with_client(ReqwestClient::default())
	}
}
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestTransport").field("max_attempts", &self.max_attempts).finish()
	}
}

/// Deserializes a response document, mapping failures into [`RequestError::Json`].
pub(crate) fn parse_json<T>(text: &str, url: &str) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(text);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
		let (line, column) = (err.inner().line(), err.inner().column());

		RequestError::Json {
			url: url.to_owned(),
			line,
			column,
			document: text.to_owned(),
			source: err,
		}
		.into()
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_json_reports_line_and_column() {
		let err = parse_json::<Value>("{\"ok\": tru", "https://example.com/x").unwrap_err();

		match err {
			Error::Request(RequestError::Json { line, column, document, .. }) => {
				assert_eq!(line, 1);
				assert!(column > 0);
				assert_eq!(document, "{\"ok\": tru");
			},
			other => panic!("expected a JSON parse error, got {other:?}"),
		}
	}

	#[test]
	fn attempt_bound_never_drops_below_one() {
		let transport = ReqwestTransport::default().with_max_attempts(0);

		assert_eq!(transport.max_attempts, 1);
	}
}
