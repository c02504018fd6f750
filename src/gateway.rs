//! The authenticated request pipeline.
//!
//! Every outbound call funnels through one serializing critical section per
//! client instance, so at most one request is being dispatched or
//! authenticated at a time. Inside the gate the pipeline harvests any
//! finished background authentication, checks the credential's proactive
//! expiry (blocking on a fresh login only when no bearer token exists at
//! all), attaches the `Authorization` header, and dispatches through the
//! retrying transport. A 401 is recovered exactly once: clear the token
//! fields, re-authenticate synchronously, resend. A second 401 surfaces as an
//! authentication failure with the credential left cleared.

// crates.io
use reqwest::{
	Method, StatusCode,
	header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::AuthTaskError,
	client::Client,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Client {
	/// Dispatches an authenticated request and parses the response as JSON.
	///
	/// Callers receive either the parsed body or one of the four public error
	/// kinds; transient transport failures are retried below this layer and a
	/// single 401 is recovered here via re-authentication.
	pub async fn request(
		&self,
		method: Method,
		url: Url,
		params: Option<&[(&str, String)]>,
		body: Option<&Value>,
	) -> Result<(StatusCode, Value)> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "request");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.request_gated(method, url, params, body)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Convenience wrapper dispatching a GET for an API path with no
	/// parameters and returning the body only.
	pub(crate) async fn get_api(&self, path: &str) -> Result<Value> {
		let url = self.descriptor.api_url(path)?;

		Ok(self.request(Method::GET, url, None, None).await?.1)
	}

	async fn request_gated(
		&self,
		method: Method,
		url: Url,
		params: Option<&[(&str, String)]>,
		body: Option<&Value>,
	) -> Result<(StatusCode, Value)> {
		let _gate = self.request_gate.lock().await;

		// Harvest a finished background authentication; a transient failure is
		// only logged, it will be retried on the next use.
		if let Some(outcome) = self.auth_task.harvest() {
			match outcome {
				Ok(()) =>
					obs::debug_event(FlowKind::Request, "scheduled token refresh completed"),
				Err(AuthTaskError::Cancelled) => {},
				Err(err) => obs::debug_event(
					FlowKind::Request,
					&format!("scheduled token refresh failed: {err}"),
				),
			}
		}

		if self.credential.is_expired_at(OffsetDateTime::now_utc()) {
			if self.credential.bearer().is_none() {
				// No token at all: the request cannot proceed without one.
				obs::debug_event(
					FlowKind::Request,
					&format!(
						"waiting for an updated token, last refresh was {:?}",
						self.credential.snapshot().last_refreshed_at
					),
				);
				self.authenticate(true).await?;
			} else {
				// Only the proactive-refresh threshold was reached; keep using
				// the still-valid token and refresh in the background.
				self.authenticate(false).await?;
			}
		}

		let outcome = self
			.transport
			.send_json(method.clone(), &url, &self.auth_headers()?, params, body)
			.await;

		match outcome {
			Err(err) if err.is_unauthorized() => {
				obs::debug_event(FlowKind::Request, "status 401 received, re-authenticating");
				self.credential.clear_tokens();
				self.authenticate(true).await?;

				// Re-authentication worked; resend the request that failed,
				// exactly once.
				match self.transport.send_json(method, &url, &self.auth_headers()?, params, body).await
				{
					Err(err) if err.is_unauthorized() => {
						// One re-authentication cycle per request; a second 401
						// propagates with the credential left cleared.
						self.credential.clear_tokens();

						Err(Error::authentication(format!(
							"request to {url} was rejected with status 401 after re-authentication"
						)))
					},
					retried => retried,
				}
			},
			outcome => outcome,
		}
	}

	fn auth_headers(&self) -> Result<HeaderMap> {
		let mut headers = HeaderMap::new();

		if let Some(bearer) = self.credential.bearer() {
			let value = HeaderValue::from_str(bearer.expose()).map_err(|_| {
				Error::authentication("stored bearer token is not a valid header value")
			})?;

			headers.insert(AUTHORIZATION, value);
		}

		Ok(headers)
	}
}
