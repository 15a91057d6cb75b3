//! Session state machine
//!
//! Derives exactly one UI root state from the auth provider's event
//! stream. The machine is an explicitly constructed instance injected
//! into the UI layer; it owns its own generation counter and publishes
//! through a `watch` channel, so frontends always observe the latest
//! state and never an intermediate one.
//!
//! ## Staleness rule
//!
//! Every call to [`SessionStateMachine::on_auth_event`] bumps a
//! generation counter. A `SignedIn` hands back a [`ProfileFetch`] tagged
//! with that generation; when the fetch completes, its result is applied
//! only if the counter has not moved since. A slow fetch from a stale
//! sign-in can therefore never overwrite the state derived from a later
//! sign-out or re-sign-in, nor repopulate the profile cache that the
//! sign-out cleared — the in-flight request still completes, its result
//! is simply dropped.

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use sana_core::effects::auth::AuthEvent;
use sana_core::effects::local::{keys, LocalPersistence};
use sana_core::effects::store::RemoteStore;
use sana_core::identifiers::UserId;
use sana_core::profile::{Role, UserProfile};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::profile::ProfileStore;

/// Root UI state derived from the session.
///
/// Exactly one state is current at any instant. `Loading` is always
/// transient: every fetch path resolves to one of the other three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A sign-in is being resolved (or the app has not seen an auth
    /// event yet).
    Loading,
    Unauthenticated,
    Patient {
        user: UserId,
    },
    Doctor {
        user: UserId,
        /// Doctor account still awaiting moderation; the UI shows the
        /// pending-verification screen instead of the doctor dashboard.
        pending_verification: bool,
    },
}

impl SessionState {
    /// Whether a user is signed in (in any role).
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Patient { .. } | Self::Doctor { .. })
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&UserId> {
        match self {
            Self::Patient { user } | Self::Doctor { user, .. } => Some(user),
            Self::Loading | Self::Unauthenticated => None,
        }
    }

    /// Role resolution: derive the UI state from a fetched profile.
    fn derived_from(profile: &UserProfile) -> Self {
        match profile.role {
            Role::Doctor => Self::Doctor {
                user: profile.id.clone(),
                pending_verification: profile.verification_status.is_pending(),
            },
            Role::Patient => Self::Patient {
                user: profile.id.clone(),
            },
        }
    }
}

/// A profile fetch pending resolution, tagged with the generation of the
/// sign-in event that triggered it.
#[derive(Debug)]
pub struct ProfileFetch {
    generation: u64,
    user: UserId,
}

impl ProfileFetch {
    /// The user whose profile is being resolved.
    pub fn user(&self) -> &UserId {
        &self.user
    }
}

/// Owns the authentication-to-UI-state derivation for one session.
pub struct SessionStateMachine<S> {
    generation: AtomicU64,
    profiles: Arc<ProfileStore<S>>,
    local: Arc<dyn LocalPersistence>,
    states: watch::Sender<SessionState>,
}

impl<S: RemoteStore + 'static> SessionStateMachine<S> {
    /// Create a machine over the given profile store and device
    /// persistence. The published state starts as [`SessionState::Loading`].
    pub fn new(profiles: Arc<ProfileStore<S>>, local: Arc<dyn LocalPersistence>) -> Self {
        let (states, _) = watch::channel(SessionState::Loading);
        Self {
            generation: AtomicU64::new(0),
            profiles,
            local,
            states,
        }
    }

    /// Subscribe to published session states.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.states.subscribe()
    }

    /// The currently published state.
    pub fn current_state(&self) -> SessionState {
        self.states.borrow().clone()
    }

    /// Cold-start path: seed the profile cache from the last persisted
    /// snapshot and publish the state derived from it, so the UI has
    /// something to render before the first auth event arrives.
    ///
    /// A no-op once any auth event has been seen — the snapshot is a
    /// convenience, never a source of truth.
    pub fn restore_cached_session(&self) {
        if self.generation.load(Ordering::SeqCst) != 0 {
            return;
        }
        if self.local.load(keys::SESSION_USER).is_none() {
            return;
        }
        let Some(snapshot) = self.local.load(keys::PROFILE_SNAPSHOT) else {
            return;
        };
        match serde_json::from_str::<UserProfile>(&snapshot) {
            Ok(profile) => {
                let state = SessionState::derived_from(&profile);
                // Seed the cache too, so profile-dependent commands work
                // before the first auth event re-resolves the session.
                self.profiles.install(Arc::new(profile));
                self.states.send_replace(state);
            }
            Err(error) => {
                tracing::trace!(%error, "ignoring undecodable persisted profile snapshot");
            }
        }
    }

    /// The sole entry point for auth events. Safe to call repeatedly and
    /// out of order relative to in-flight fetches from earlier events.
    ///
    /// `SignedOut` resolves synchronously: the cache and persisted session
    /// are cleared and `Unauthenticated` is published unconditionally.
    /// `SignedIn` publishes `Loading` and returns the fetch to resolve via
    /// [`resolve_fetch`](Self::resolve_fetch).
    pub fn on_auth_event(&self, event: AuthEvent) -> Option<ProfileFetch> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match event {
            AuthEvent::SignedOut => {
                self.profiles.clear();
                self.local.remove(keys::SESSION_USER);
                self.local.remove(keys::PROFILE_SNAPSHOT);
                self.states.send_replace(SessionState::Unauthenticated);
                None
            }
            AuthEvent::SignedIn { user } => {
                self.local.store(keys::SESSION_USER, user.as_str());
                self.states.send_replace(SessionState::Loading);
                Some(ProfileFetch { generation, user })
            }
        }
    }

    /// Run a pending fetch to completion and apply its result — unless a
    /// later auth event has superseded it, in which case the result is
    /// discarded silently.
    ///
    /// A fetch failure degrades to `Patient` rather than blocking the
    /// user out: the appointment flows remain usable and the role is
    /// re-resolved on the next sign-in. Deliberate availability-over-
    /// correctness behaviour, covered by tests.
    pub async fn resolve_fetch(&self, fetch: ProfileFetch) {
        let result = self.profiles.fetch(&fetch.user).await;

        if self.generation.load(Ordering::SeqCst) != fetch.generation {
            tracing::trace!(
                generation = fetch.generation,
                user = %fetch.user,
                "discarding stale profile fetch result"
            );
            return;
        }

        let state = match result {
            Ok(profile) => {
                // The cache is written only here, past the generation
                // check, so a stale fetch can never undo the clear that
                // a sign-out already performed.
                self.profiles.install(Arc::clone(&profile));
                if let Ok(snapshot) = serde_json::to_string(profile.as_ref()) {
                    self.local.store(keys::PROFILE_SNAPSHOT, &snapshot);
                }
                SessionState::derived_from(&profile)
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    user = %fetch.user,
                    "profile fetch failed; continuing session as patient"
                );
                SessionState::Patient { user: fetch.user }
            }
        };
        self.states.send_replace(state);
    }

    /// Drive the machine from an ordered auth event stream.
    ///
    /// Events are consumed as they arrive while fetch resolutions run
    /// concurrently, so a `SignedOut` is processed even when a profile
    /// fetch from an earlier `SignedIn` is still in flight. Returns when
    /// the event channel closes and all pending fetches have resolved.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<AuthEvent>) {
        let mut pending: FuturesUnordered<BoxFuture<'static, ()>> = FuturesUnordered::new();
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(fetch) = self.on_auth_event(event) {
                            let machine = Arc::clone(&self);
                            pending.push(async move { machine.resolve_fetch(fetch).await }.boxed());
                        }
                    }
                    None => break,
                },
                Some(()) = pending.next() => {}
            }
        }
        // Drain fetches still in flight; their generations decide whether
        // the results are applied.
        while pending.next().await.is_some() {}
    }
}
