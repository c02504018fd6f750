//! Client assembly: shared state, constructors, and the login convenience
//! entry point.

// self
use crate::{
	_prelude::*,
	auth::{AuthTaskSlot, Credential, CredentialStore, LoginCredentials},
	endpoint::ServiceDescriptor,
	http::ReqwestTransport,
	obs::AuthMetrics,
	registry::DeviceRegistry,
};

/// Async client for the Happiest Baby cloud service.
///
/// The client owns the HTTP transport, the service descriptor, the shared
/// credential, and the device registry; every piece of state is reference
/// counted, so clones observe the same credential and registry. All
/// authenticated calls funnel through a single serializing gate (see
/// [`request`](Client::request)), which keeps credential refresh race-free at
/// the cost of serialized request latency.
///
/// Requests are dispatched on the ambient Tokio runtime; background
/// authentication uses [`tokio::spawn`].
#[derive(Clone)]
pub struct Client {
	pub(crate) transport: ReqwestTransport,
	pub(crate) descriptor: ServiceDescriptor,
	pub(crate) login: Arc<RwLock<LoginCredentials>>,
	pub(crate) credential: CredentialStore,
	pub(crate) auth_task: AuthTaskSlot,
	pub(crate) auth_metrics: Arc<AuthMetrics>,
	pub(crate) request_gate: Arc<AsyncMutex<()>>,
	pub(crate) registry: DeviceRegistry,
	pub(crate) account: Arc<RwLock<Option<Value>>>,
	pub(crate) baby: Arc<RwLock<Option<Value>>>,
}
impl Client {
	/// Creates a client against the production service endpoints.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self::with_transport(
			ServiceDescriptor::default(),
			ReqwestTransport::default(),
			username,
			password,
		)
	}

	/// Creates a client that reuses the caller-provided descriptor + transport pair.
	pub fn with_transport(
		descriptor: ServiceDescriptor,
		transport: ReqwestTransport,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self {
			transport,
			descriptor,
			login: Arc::new(RwLock::new(LoginCredentials {
				username: username.into(),
				password: password.into(),
				invalid: false,
			})),
			credential: CredentialStore::default(),
			auth_task: AuthTaskSlot::default(),
			auth_metrics: Arc::new(AuthMetrics::default()),
			request_gate: Arc::new(AsyncMutex::new(())),
			registry: DeviceRegistry::default(),
			account: Arc::new(RwLock::new(None)),
			baby: Arc::new(RwLock::new(None)),
		}
	}

	/// Returns the service descriptor this client talks to.
	pub fn descriptor(&self) -> &ServiceDescriptor {
		&self.descriptor
	}

	/// Returns the configured account username.
	pub fn username(&self) -> String {
		self.login.read().username.clone()
	}

	/// Replaces the username and lifts the invalid-credentials latch.
	pub fn set_username(&self, username: impl Into<String>) {
		let mut login = self.login.write();

		login.username = username.into();
		login.invalid = false;
	}

	/// Replaces the password and lifts the invalid-credentials latch.
	pub fn set_password(&self, password: impl Into<String>) {
		let mut login = self.login.write();

		login.password = password.into();
		login.invalid = false;
	}

	/// Latches the credentials invalid so every authentication attempt fails
	/// fast until a new username or password is supplied.
	pub fn mark_credentials_invalid(&self) {
		self.login.write().invalid = true;
	}

	/// Returns a point-in-time copy of the shared credential.
	pub fn credential(&self) -> Credential {
		self.credential.snapshot()
	}

	/// Returns the authentication attempt counters.
	pub fn auth_metrics(&self) -> &AuthMetrics {
		&self.auth_metrics
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let login = self.login.read();

		f.debug_struct("Client")
			.field("descriptor", &self.descriptor)
			.field("username", &login.username)
			.field("password_set", &!login.password.is_empty())
			.field("credential", &self.credential.snapshot())
			.finish()
	}
}

/// Logs in to the service and primes the device registry.
///
/// Performs a blocking authentication followed by an initial device refresh,
/// mirroring what the vendor application does on startup.
pub async fn login(
	username: impl Into<String>,
	password: impl Into<String>,
) -> Result<Client> {
	let client = Client::new(username, password);

	client.authenticate(true).await?;
	client.update_device_info().await?;

	Ok(client)
}
