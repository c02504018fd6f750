//! Single-slot in-flight authentication task with join/await semantics.

// crates.io
use futures::{
	FutureExt,
	future::{BoxFuture, Shared},
};
// self
use crate::_prelude::*;

/// Cloneable outcome published by the shared authentication task.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthTaskError {
	/// The task was aborted before completing.
	#[error("Authentication task was cancelled.")]
	Cancelled,
	/// The task finished with an authentication or request failure.
	#[error("{0}")]
	Failed(String),
}

type SharedAuthFuture = Shared<BoxFuture<'static, Result<(), AuthTaskError>>>;

/// Holds at most one in-flight "obtain a new credential" task.
///
/// Late joiners clone and await the same shared future instead of starting a
/// duplicate authentication. A background task that nobody joins simply
/// completes unread; its outcome is consumed lazily via [`harvest`](Self::harvest).
#[derive(Clone, Default)]
pub struct AuthTaskSlot(Arc<Mutex<Option<SharedAuthFuture>>>);
impl Debug for AuthTaskSlot {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthTaskSlot").field("in_flight", &self.is_running()).finish()
	}
}
impl AuthTaskSlot {
	/// Returns the running task, spawning `fut` onto the Tokio runtime when the
	/// slot is empty.
	pub(crate) fn obtain<F>(&self, fut: F) -> SharedAuthFuture
	where
		F: Future<Output = Result<()>> + Send + 'static,
	{
		let mut slot = self.0.lock();

		if let Some(task) = slot.as_ref() {
			return task.clone();
		}

		let handle = tokio::spawn(fut);
		let task = async move {
			match handle.await {
				Ok(outcome) => outcome.map_err(|err| AuthTaskError::Failed(err.to_string())),
				Err(join_err) if join_err.is_cancelled() => Err(AuthTaskError::Cancelled),
				Err(join_err) => Err(AuthTaskError::Failed(join_err.to_string())),
			}
		}
		.boxed()
		.shared();

		*slot = Some(task.clone());

		task
	}

	/// Returns `true` while a task occupies the slot.
	pub fn is_running(&self) -> bool {
		self.0.lock().is_some()
	}

	/// Empties the slot so the next [`obtain`](Self::obtain) starts fresh.
	pub(crate) fn clear(&self) {
		*self.0.lock() = None;
	}

	/// Consumes the outcome of a finished task, if any.
	///
	/// An unfinished task stays in the slot untouched.
	pub(crate) fn harvest(&self) -> Option<Result<(), AuthTaskError>> {
		let mut slot = self.0.lock();
		let finished = slot.as_ref().and_then(|task| task.peek().cloned());

		if finished.is_some() {
			*slot = None;
		}

		finished
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn concurrent_obtains_share_one_task() {
		let slot = AuthTaskSlot::default();
		let first = slot.obtain(async { Ok(()) });
		let second = slot.obtain(async { panic!("second task must never be spawned") });

		assert!(slot.is_running());
		assert_eq!(first.await, Ok(()));
		assert_eq!(second.await, Ok(()));
	}

	#[tokio::test]
	async fn harvest_consumes_only_finished_tasks() {
		let slot = AuthTaskSlot::default();
		let task = slot.obtain(async { Ok(()) });

		task.await.unwrap();

		assert_eq!(slot.harvest(), Some(Ok(())));
		assert_eq!(slot.harvest(), None);
		assert!(!slot.is_running());
	}

	#[tokio::test]
	async fn failures_surface_to_every_joiner() {
		let slot = AuthTaskSlot::default();
		let first = slot.obtain(async { Err(crate::error::Error::authentication("boom")) });
		let second = slot.obtain(async { Ok(()) });

		assert!(matches!(first.await, Err(AuthTaskError::Failed(_))));
		assert!(matches!(second.await, Err(AuthTaskError::Failed(_))));
	}
}
