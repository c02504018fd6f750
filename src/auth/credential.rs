//! Bearer credential state shared between the gateway and the authentication task.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Snapshot of the short-lived service credential.
///
/// The bearer value is the full `Authorization` header payload
/// (`"<TokenType> <token>"`). Invariant: `bearer` and `expires_at` are set
/// together or both absent. The record is replaced wholesale on every
/// successful (re)authentication and has its token fields nulled on a 401,
/// keeping only `last_refreshed_at`.
#[derive(Clone, Default)]
pub struct Credential {
	/// Authorization header value attached to every authenticated request.
	pub bearer: Option<TokenSecret>,
	/// Longer-lived secret used to mint a new bearer without a password login.
	pub refresh: Option<TokenSecret>,
	/// Proactive expiry instant (half the provider-declared lifetime).
	pub expires_at: Option<OffsetDateTime>,
	/// Instant of the last successful (re)authentication.
	pub last_refreshed_at: Option<OffsetDateTime>,
}
impl Credential {
	/// Returns `true` when the proactive expiry is unset or has passed.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|at| at <= instant)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
			.field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("last_refreshed_at", &self.last_refreshed_at)
			.finish()
	}
}

/// Shared, lock-guarded [`Credential`] cell.
///
/// Mutation happens only inside the authentication task or under the request
/// gate, so readers never observe a half-written record.
#[derive(Clone, Debug, Default)]
pub struct CredentialStore(Arc<RwLock<Credential>>);
impl CredentialStore {
	/// Returns a point-in-time copy of the credential.
	pub fn snapshot(&self) -> Credential {
		self.0.read().clone()
	}

	/// Returns the current bearer secret, if any.
	pub fn bearer(&self) -> Option<TokenSecret> {
		self.0.read().bearer.clone()
	}

	/// Returns `true` when the proactive expiry is unset or has passed.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.0.read().is_expired_at(instant)
	}

	/// Replaces the credential wholesale.
	pub fn replace(&self, credential: Credential) {
		*self.0.write() = credential;
	}

	/// Installs a freshly issued token pair.
	///
	/// The locally recorded expiry is half the provider-declared lifetime so a
	/// proactive refresh fires well before the token truly expires.
	pub(crate) fn install(
		&self,
		bearer: impl Into<String>,
		refresh: Option<String>,
		lifetime_secs: i64,
		now: OffsetDateTime,
	) {
		*self.0.write() = Credential {
			bearer: Some(TokenSecret::new(bearer)),
			refresh: refresh.map(TokenSecret::new),
			expires_at: Some(now + Duration::seconds(lifetime_secs / 2)),
			last_refreshed_at: Some(now),
		};
	}

	/// Nulls the token fields after a 401, retaining `last_refreshed_at`.
	pub fn clear_tokens(&self) {
		let mut credential = self.0.write();

		credential.bearer = None;
		credential.refresh = None;
		credential.expires_at = None;
	}
}

/// Username/password pair plus the invalid-credentials latch.
///
/// The latch stays set until the caller resupplies a username or password,
/// making repeated doomed logins impossible.
#[derive(Clone, Debug, Default)]
pub(crate) struct LoginCredentials {
	pub username: String,
	pub password: String,
	pub invalid: bool,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn empty_credential_counts_as_expired() {
		let store = CredentialStore::default();

		assert!(store.is_expired_at(datetime!(2024-01-01 00:00 UTC)));
		assert!(store.bearer().is_none());
	}

	#[test]
	fn install_halves_the_declared_lifetime() {
		let store = CredentialStore::default();
		let now = datetime!(2024-01-01 00:00 UTC);

		store.install("Bearer abc", Some("refresh".into()), 3600, now);

		let snapshot = store.snapshot();

		assert_eq!(snapshot.expires_at, Some(now + Duration::minutes(30)));
		assert_eq!(snapshot.last_refreshed_at, Some(now));
		assert!(!store.is_expired_at(now + Duration::minutes(29)));
		assert!(store.is_expired_at(now + Duration::minutes(30)));
	}

	#[test]
	fn clearing_tokens_retains_the_refresh_timestamp() {
		let store = CredentialStore::default();
		let now = datetime!(2024-01-01 00:00 UTC);

		store.install("Bearer abc", Some("refresh".into()), 3600, now);
		store.clear_tokens();

		let snapshot = store.snapshot();

		assert!(snapshot.bearer.is_none());
		assert!(snapshot.refresh.is_none());
		assert!(snapshot.expires_at.is_none());
		assert_eq!(snapshot.last_refreshed_at, Some(now));
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let store = CredentialStore::default();

		store.install("Bearer abc", Some("refresh".into()), 3600, OffsetDateTime::now_utc());

		let rendered = format!("{:?}", store.snapshot());

		assert!(!rendered.contains("abc"));
		assert!(rendered.contains("<redacted>"));
	}
}
