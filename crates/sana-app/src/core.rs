//! Application core facade
//!
//! The narrow surface frontends construct and hold: session states to
//! subscribe to, and command functions for booking, cancelling, and
//! favorites. Everything is keyed off the current session — frontends
//! never pass user ids around.

use chrono::NaiveDate;
use sana_core::appointment::{Appointment, DoctorRecord};
use sana_core::effects::auth::AuthEvent;
use sana_core::effects::local::LocalPersistence;
use sana_core::effects::store::RemoteStore;
use sana_core::errors::StoreError;
use sana_core::identifiers::{AppointmentId, DoctorId, UserId};
use sana_core::profile::UserProfile;
use std::sync::Arc;
use tokio::sync::watch;

use crate::appointments::{AppointmentLifecycle, BookingError, CancelAck, CancelError};
use crate::favorites::{FavoriteToggle, FavoriteToggles, ToggleError};
use crate::profile::ProfileStore;
use crate::session::{SessionState, SessionStateMachine};
use crate::views::AppointmentsState;

/// Headless application core for one device session.
pub struct AppCore<S> {
    profiles: Arc<ProfileStore<S>>,
    session: Arc<SessionStateMachine<S>>,
    appointments: AppointmentLifecycle<S>,
    favorites: FavoriteToggles<S>,
}

impl<S: RemoteStore + 'static> AppCore<S> {
    /// Wire the core over a remote store and device persistence, and
    /// restore the last known session so cold start is not blank.
    pub fn new(store: Arc<S>, local: Arc<dyn LocalPersistence>) -> Self {
        let profiles = Arc::new(ProfileStore::new(Arc::clone(&store)));
        let session = Arc::new(SessionStateMachine::new(Arc::clone(&profiles), local));
        session.restore_cached_session();
        Self {
            appointments: AppointmentLifecycle::new(Arc::clone(&store)),
            favorites: FavoriteToggles::new(store, Arc::clone(&profiles)),
            profiles,
            session,
        }
    }

    /// The session machine, for frontends that run their own event driver.
    pub fn session(&self) -> &Arc<SessionStateMachine<S>> {
        &self.session
    }

    /// Read-only session state stream.
    pub fn session_states(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Immutable snapshot of the current profile, if one is cached.
    pub fn profile(&self) -> Option<Arc<UserProfile>> {
        self.profiles.cached()
    }

    /// Consume one auth event and resolve any fetch it triggers.
    ///
    /// Convenience for frontends without a driver task; callers needing
    /// sign-out to interleave with in-flight fetches should use
    /// [`SessionStateMachine::run`] instead.
    pub async fn handle_auth_event(&self, event: AuthEvent) {
        if let Some(fetch) = self.session.on_auth_event(event) {
            self.session.resolve_fetch(fetch).await;
        }
    }

    /// Book an appointment with `doctor` for the signed-in patient.
    pub async fn book_appointment(
        &self,
        doctor: &DoctorRecord,
        date: NaiveDate,
        time_label: &str,
    ) -> Result<Appointment, BookingError> {
        let user = self.signed_in_user().ok_or(BookingError::NotSignedIn)?;
        let patient_name = self
            .profiles
            .cached()
            .filter(|profile| profile.id == user)
            .map(|profile| profile.display_name.clone())
            .unwrap_or_default();
        self.appointments
            .book(doctor, date, time_label, &patient_name, &user)
            .await
    }

    /// Cancel an appointment; idempotent for already-cancelled ones.
    pub async fn cancel_appointment(&self, id: &AppointmentId) -> Result<CancelAck, CancelError> {
        self.appointments.cancel(id).await
    }

    /// Load the signed-in user's appointments into view state.
    pub async fn load_appointments(&self) -> Result<AppointmentsState, StoreError> {
        let user = self
            .signed_in_user()
            .ok_or_else(|| StoreError::permission_denied("no signed-in user"))?;
        let appointments = self.appointments.list(&user).await?;
        Ok(AppointmentsState::from_appointments(appointments))
    }

    /// Toggle a doctor in the signed-in user's favorite set.
    pub async fn toggle_favorite(&self, doctor: &DoctorId) -> Result<FavoriteToggle, ToggleError> {
        let user = self.signed_in_user().ok_or(ToggleError::NoProfile)?;
        self.favorites.toggle(&user, doctor).await
    }

    fn signed_in_user(&self) -> Option<UserId> {
        self.session.current_state().user().cloned()
    }
}
