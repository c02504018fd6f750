//! Credential manager: the shared bearer credential, the single-slot
//! authentication task, and the login/refresh exchanges that feed it.
//!
//! [`Client::authenticate`] coordinates at most one in-flight authentication.
//! The spawned task picks a **refresh exchange** when the stored expiry has
//! passed and a refresh token is on hand, and a **fresh password login**
//! otherwise. On success the credential is replaced wholesale, with the local
//! expiry set to half the provider-declared lifetime so proactive refresh
//! fires well before a request can hit a hard 401.

pub mod credential;
pub mod secret;
pub mod task;

pub use credential::{Credential, CredentialStore};
pub use secret::TokenSecret;
pub use task::{AuthTaskError, AuthTaskSlot};

pub(crate) use credential::LoginCredentials;

// crates.io
use reqwest::{
	Method,
	header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
// self
use crate::{
	_prelude::*,
	client::Client,
	endpoint::{self, ServiceDescriptor},
	error::RequestError,
	http::{self, ReqwestTransport},
	obs::{self, AuthMetrics, FlowKind, FlowOutcome, FlowSpan},
};

/// Identity provider `InitiateAuth` response envelope.
#[derive(Debug, Deserialize)]
struct InitiateAuthResponse {
	#[serde(rename = "AuthenticationResult")]
	authentication_result: Option<AuthenticationResult>,
}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
	id_token: Option<String>,
	refresh_token: Option<String>,
	expires_in: Option<i64>,
	token_type: Option<String>,
}

/// Refresh endpoint response body.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
	token_type: Option<String>,
	access_token: Option<String>,
	refresh_token: Option<String>,
	expires_in: Option<Value>,
}

/// Token material produced by either exchange.
struct IssuedToken {
	bearer: String,
	refresh: Option<String>,
	lifetime_secs: i64,
}

impl Client {
	/// Ensures an authentication task is running, optionally joining it.
	///
	/// Fails immediately with [`Error::InvalidCredentials`] when no
	/// username/password is configured or a previous attempt latched the
	/// credentials invalid — no network call is made. With `wait`, the caller
	/// blocks on the shared task, any failure is translated to
	/// [`Error::Authentication`], and the task slot is cleared regardless of
	/// outcome. Without `wait`, the task keeps running in the background and
	/// its outcome is harvested by the next request through the gateway.
	pub async fn authenticate(&self, wait: bool) -> Result<()> {
		{
			let login = self.login.read();

			if login.username.is_empty() || login.password.is_empty() {
				return Err(Error::invalid_credentials("no username/password is configured"));
			}
			if login.invalid {
				return Err(Error::invalid_credentials(
					"credentials were rejected previously; update username/password to retry",
				));
			}
		}

		let task = self.auth_task.obtain(run_authentication(
			self.transport.clone(),
			self.descriptor.clone(),
			self.credential.clone(),
			self.login.clone(),
			self.auth_metrics.clone(),
		));

		if wait {
			let outcome = task.await;

			self.auth_task.clear();
			outcome.map_err(|err| Error::authentication(err.to_string()))?;
		}

		Ok(())
	}
}

/// Body of the single authentication task.
async fn run_authentication(
	transport: ReqwestTransport,
	descriptor: ServiceDescriptor,
	credential: CredentialStore,
	login: Arc<RwLock<LoginCredentials>>,
	metrics: Arc<AuthMetrics>,
) -> Result<()> {
	metrics.record_attempt();

	let now = OffsetDateTime::now_utc();
	let snapshot = credential.snapshot();
	let refresh_due =
		snapshot.expires_at.is_some_and(|at| at < now) && snapshot.refresh.is_some();
	let (kind, exchange) = if let (true, Some(refresh)) = (refresh_due, snapshot.refresh) {
		(FlowKind::Refresh, refresh_exchange(&transport, &descriptor, &refresh).await)
	} else {
		let (username, password) = {
			let login = login.read();

			(login.username.clone(), login.password.clone())
		};

		(FlowKind::Login, password_login(&transport, &descriptor, &username, &password).await)
	};

	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let issued = match exchange {
		Ok(issued) => issued,
		Err(err) => {
			obs::record_flow_outcome(kind, FlowOutcome::Failure);
			metrics.record_failure();

			return Err(err);
		},
	};

	obs::debug_event(
		kind,
		&format!("received a token that will expire in {} seconds", issued.lifetime_secs),
	);
	credential.install(
		issued.bearer,
		issued.refresh,
		issued.lifetime_secs,
		OffsetDateTime::now_utc(),
	);
	obs::record_flow_outcome(kind, FlowOutcome::Success);
	metrics.record_success();

	Ok(())
}

/// Submits a password login to the identity provider.
async fn password_login(
	transport: &ReqwestTransport,
	descriptor: &ServiceDescriptor,
	username: &str,
	password: &str,
) -> Result<IssuedToken> {
	let span = FlowSpan::new(FlowKind::Login, "password_login");

	span.instrument(async move {
		let url = descriptor.identity_endpoint.clone();
		let body = serde_json::json!({
			"AuthParameters": {
				"PASSWORD": password,
				"USERNAME": username,
			},
			"AuthFlow": "USER_PASSWORD_AUTH",
			"ClientId": descriptor.identity_client_id,
		});

		obs::debug_event(FlowKind::Login, "performing identity provider authentication");

		// One-shot call: login failures must surface immediately instead of
		// burning the transport's retry budget.
		let response = transport
			.as_ref()
			.post(url.clone())
			.header("Content-Type", "application/x-amz-json-1.1")
			.header("X-Amz-Target", "AWSCognitoIdentityProviderService.InitiateAuth")
			.header(USER_AGENT, endpoint::IDENTITY_USER_AGENT)
			.json(&body)
			.send()
			.await
			.map_err(|err| RequestError::network(url.as_str(), err))?;
		let status = response.status();
		let text = response
			.text()
			.await
			.map_err(|err| RequestError::network(url.as_str(), err))?;

		if !status.is_success() {
			return Err(
				RequestError::Status { url: url.to_string(), status: status.as_u16() }.into()
			);
		}

		let envelope = http::parse_json::<InitiateAuthResponse>(&text, url.as_str())?;
		let result = envelope.authentication_result.ok_or_else(|| {
			Error::authentication("identity response did not contain an authentication result")
		})?;
		let id_token = result
			.id_token
			.ok_or_else(|| Error::authentication("identity response did not contain an id token"))?;
		let token_type = result.token_type.unwrap_or_else(|| "Bearer".into());

		Ok(IssuedToken {
			bearer: format!("{token_type} {id_token}"),
			refresh: result.refresh_token,
			lifetime_secs: result.expires_in.unwrap_or(endpoint::DEFAULT_TOKEN_LIFETIME_SECS),
		})
	})
	.await
}

/// Exchanges the stored refresh token for a new bearer token.
async fn refresh_exchange(
	transport: &ReqwestTransport,
	descriptor: &ServiceDescriptor,
	refresh: &TokenSecret,
) -> Result<IssuedToken> {
	let span = FlowSpan::new(FlowKind::Refresh, "refresh_exchange");

	span.instrument(async move {
		let url = descriptor.api_url(endpoint::REFRESH)?;
		let body = serde_json::json!({ "refresh_token": refresh.expose() });
		let mut headers = HeaderMap::new();

		headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
		headers.insert(USER_AGENT, HeaderValue::from_static(endpoint::REFRESH_USER_AGENT));

		obs::debug_event(FlowKind::Refresh, "refreshing token");

		let (_, value) =
			transport.send_json(Method::POST, &url, &headers, None, Some(&body)).await?;
		let response: RefreshResponse = serde_json::from_value(value)
			.map_err(|err| Error::authentication(format!("malformed refresh response: {err}")))?;
		let access_token = response.access_token.ok_or_else(|| {
			Error::authentication("refresh response did not contain an access token")
		})?;
		let token_type = response.token_type.unwrap_or_else(|| "Bearer".into());
		let lifetime_secs = clamp_refresh_lifetime(response.expires_in);

		Ok(IssuedToken {
			bearer: format!("{token_type} {access_token}"),
			refresh: response.refresh_token,
			lifetime_secs,
		})
	})
	.await
}

/// Normalizes the refresh endpoint's `expires_in`, which has been observed as
/// both a number and a string, and floors it at twice the default lifetime.
fn clamp_refresh_lifetime(expires_in: Option<Value>) -> i64 {
	let floor = endpoint::DEFAULT_TOKEN_LIFETIME_SECS * 2;
	let declared = match expires_in {
		Some(Value::Number(number)) => number.as_i64(),
		Some(Value::String(text)) => text.parse().ok(),
		_ => None,
	};
	let lifetime = declared.unwrap_or(floor);

	if lifetime < floor {
		obs::debug_event(
			FlowKind::Refresh,
			&format!("declared lifetime {lifetime} is below the floor, using {floor} instead"),
		);

		floor
	} else {
		lifetime
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn refresh_lifetime_clamps_to_the_floor() {
		assert_eq!(clamp_refresh_lifetime(Some(Value::from(60))), 7200);
		assert_eq!(clamp_refresh_lifetime(Some(Value::from(10_800))), 10_800);
		assert_eq!(clamp_refresh_lifetime(Some(Value::from("9000"))), 9000);
		assert_eq!(clamp_refresh_lifetime(Some(Value::from("not-a-number"))), 7200);
		assert_eq!(clamp_refresh_lifetime(None), 7200);
	}
}
