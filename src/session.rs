//! Application-wide authentication state.
//!
//! A [`SessionGate`] is constructed once at startup and shared as an `Arc`. Consumers receive an
//! [`AuthHandle`], a weak handle that fails with [`Error::ContextUnavailable`] once the gate has
//! been dropped. The gate recomputes its [`AuthState`] from the token vault on demand and,
//! through [`SessionGate::spawn_poller`], on a fixed interval so sign-outs that happen elsewhere
//! are eventually observed.
//!
//! Recomputation is serialized by an async mutex but is not exclusive with token writes from a
//! callback. That is fine: recomputing twice over the same stored tokens yields the same state.

// std
use std::time::Duration;
// crates.io
use tokio::{
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};
// self
use crate::{
	_prelude::*,
	auth::{self, UserIdentity},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::TokenVault,
};

/// Snapshot exposed to the rest of the application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
	/// Identity derived from the stored identity token.
	pub user: Option<UserIdentity>,
	/// Both tokens are stored.
	pub is_authenticated: bool,
	/// No recomputation has finished yet.
	pub loading: bool,
}
impl AuthState {
	/// State before the first recomputation.
	pub const fn loading() -> Self {
		Self { user: None, is_authenticated: false, loading: true }
	}

	/// Settled, signed-out state.
	pub const fn signed_out() -> Self {
		Self { user: None, is_authenticated: false, loading: false }
	}

	/// True once loading finished with a signed-in user.
	pub fn is_ready_and_authenticated(&self) -> bool {
		!self.loading && self.is_authenticated
	}

	/// Decision for a route that requires a signed-in user.
	pub fn route_access(&self) -> RouteAccess {
		match (self.loading, self.is_authenticated) {
			(true, _) => RouteAccess::Loading,
			(false, true) => RouteAccess::Granted,
			(false, false) => RouteAccess::Denied,
		}
	}
}
impl Default for AuthState {
	fn default() -> Self {
		Self::loading()
	}
}

/// Outcome of a protected-route check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
	/// Authentication status is not known yet; show a loading indicator.
	Loading,
	/// Render the protected content.
	Granted,
	/// Render the sign-in entry point instead.
	Denied,
}

/// Owner of the application-wide [`AuthState`].
pub struct SessionGate {
	tokens: TokenVault,
	state: RwLock<AuthState>,
	recompute_guard: AsyncMutex<()>,
}
impl SessionGate {
	/// Interval used by [`SessionGate::spawn_default_poller`].
	pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

	/// Creates a gate in the loading state.
	pub fn new(tokens: TokenVault) -> Arc<Self> {
		Arc::new(Self {
			tokens,
			state: RwLock::new(AuthState::loading()),
			recompute_guard: AsyncMutex::new(()),
		})
	}

	/// Creates a gate, settles its initial state, and starts polling every `period`.
	///
	/// The gate has left the loading state by the time this returns. Must be called inside a
	/// Tokio runtime.
	pub async fn start(tokens: TokenVault, period: Duration) -> (Arc<Self>, SessionPoller) {
		let gate = Self::new(tokens);

		gate.recompute().await;

		let poller = gate.spawn_poller(period);

		(gate, poller)
	}

	/// Current state without touching storage.
	pub fn snapshot(&self) -> AuthState {
		self.state.read().clone()
	}

	/// Weak consumer handle.
	pub fn handle(self: &Arc<Self>) -> AuthHandle {
		AuthHandle(Arc::downgrade(self))
	}

	/// Re-reads the token vault and publishes the resulting state.
	///
	/// A storage failure publishes the signed-out state; it never leaves the gate loading.
	pub async fn recompute(&self) -> AuthState {
		const KIND: FlowKind = FlowKind::SessionCheck;

		let _serialized = self.recompute_guard.lock().await;

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let next = match FlowSpan::new(KIND, "recompute").instrument(self.read_state()).await {
			Ok(next) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				next
			},
			Err(err) => {
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				obs::session_check_degraded(&err);

				AuthState::signed_out()
			},
		};

		obs::record_signed_in(next.is_authenticated);

		*self.state.write() = next.clone();

		next
	}

	/// Recomputes every `period` until the poller is dropped or the gate goes away.
	///
	/// The first recomputation happens one full `period` after spawning; [`SessionGate::start`]
	/// covers the initial one. Must be called inside a Tokio runtime.
	pub fn spawn_poller(self: &Arc<Self>, period: Duration) -> SessionPoller {
		let gate = Arc::downgrade(self);
		let task = tokio::spawn(async move {
			let mut ticker = time::interval_at(Instant::now() + period, period);

			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				ticker.tick().await;

				let Some(gate) = gate.upgrade() else { break };

				gate.recompute().await;
			}
		});

		SessionPoller(task)
	}

	/// [`SessionGate::spawn_poller`] with [`SessionGate::DEFAULT_POLL_INTERVAL`].
	pub fn spawn_default_poller(self: &Arc<Self>) -> SessionPoller {
		self.spawn_poller(Self::DEFAULT_POLL_INTERVAL)
	}

	async fn read_state(&self) -> Result<AuthState> {
		if !self.tokens.is_authenticated().await? {
			return Ok(AuthState::signed_out());
		}

		let user = auth::extract_user(&self.tokens).await?;

		Ok(AuthState { user, is_authenticated: true, loading: false })
	}
}
impl Debug for SessionGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionGate").field("state", &*self.state.read()).finish()
	}
}

/// Consumer handle onto a [`SessionGate`].
#[derive(Clone, Debug)]
pub struct AuthHandle(Weak<SessionGate>);
impl AuthHandle {
	/// Current state; fails once the gate has been dropped.
	pub fn state(&self) -> Result<AuthState> {
		self.gate().map(|gate| gate.snapshot())
	}

	/// Protected-route decision for the current state.
	pub fn require_authenticated(&self) -> Result<RouteAccess> {
		Ok(self.state()?.route_access())
	}

	/// Asks the gate to recompute now.
	pub async fn refresh(&self) -> Result<AuthState> {
		Ok(self.gate()?.recompute().await)
	}

	fn gate(&self) -> Result<Arc<SessionGate>> {
		self.0.upgrade().ok_or(Error::ContextUnavailable)
	}
}

/// Background recomputation task; aborted when dropped.
#[derive(Debug)]
pub struct SessionPoller(JoinHandle<()>);
impl SessionPoller {
	/// Stops polling.
	pub fn abort(&self) {
		self.0.abort();
	}

	/// True once the task has stopped.
	pub fn is_finished(&self) -> bool {
		self.0.is_finished()
	}
}
impl Drop for SessionPoller {
	fn drop(&mut self) {
		self.0.abort();
	}
}
