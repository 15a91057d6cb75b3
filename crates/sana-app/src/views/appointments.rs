//! Appointments view state
//!
//! Holds the fetched appointment list and the upcoming/past partition
//! the schedule screens render. The partition is state, not styling: it
//! decides which rows legally offer a cancel action.

use chrono::NaiveDate;
use sana_core::appointment::{Appointment, AppointmentStatus};
use sana_core::identifiers::AppointmentId;
use serde::{Deserialize, Serialize};

/// Appointments state for the current user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentsState {
    appointments: Vec<Appointment>,
}

impl AppointmentsState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a fetched list.
    pub fn from_appointments(appointments: impl IntoIterator<Item = Appointment>) -> Self {
        Self {
            appointments: appointments.into_iter().collect(),
        }
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// All appointments in fetch order.
    pub fn all(&self) -> impl Iterator<Item = &Appointment> {
        self.appointments.iter()
    }

    /// Look up an appointment by id.
    pub fn get(&self, id: &AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| &a.id == id)
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Appointments still ahead of the user, soonest first. Same-day rows
    /// tiebreak on booking time; the time label is free text and does not
    /// sort chronologically.
    pub fn upcoming(&self, today: NaiveDate) -> Vec<&Appointment> {
        let mut upcoming: Vec<&Appointment> = self
            .appointments
            .iter()
            .filter(|a| a.is_upcoming_on(today))
            .collect();
        upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.created_at.cmp(&b.created_at)));
        upcoming
    }

    /// Everything that is not upcoming (completed, cancelled, or past
    /// its date), newest first.
    pub fn past(&self, today: NaiveDate) -> Vec<&Appointment> {
        let mut past: Vec<&Appointment> = self
            .appointments
            .iter()
            .filter(|a| !a.is_upcoming_on(today))
            .collect();
        past.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        past
    }

    /// Whether the UI may offer a cancel action for this appointment.
    pub fn can_cancel(&self, id: &AppointmentId, today: NaiveDate) -> bool {
        self.get(id).is_some_and(|a| a.is_upcoming_on(today))
    }

    // =========================================================================
    // Mutation Methods
    // =========================================================================

    /// Apply an appointment (upsert by id).
    pub fn apply(&mut self, appointment: Appointment) {
        match self.appointments.iter_mut().find(|a| a.id == appointment.id) {
            Some(existing) => *existing = appointment,
            None => self.appointments.push(appointment),
        }
    }

    /// Mark an appointment cancelled in place, if present.
    pub fn mark_cancelled(&mut self, id: &AppointmentId) {
        if let Some(appointment) = self.appointments.iter_mut().find(|a| &a.id == id) {
            appointment.status = AppointmentStatus::Cancelled;
        }
    }

    /// Drop all appointments (sign-out path).
    pub fn clear(&mut self) {
        self.appointments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sana_core::identifiers::{DoctorId, UserId};

    fn appointment(id: &str, status: AppointmentStatus, date: NaiveDate) -> Appointment {
        Appointment {
            id: AppointmentId::new(id),
            doctor_id: DoctorId::new("d1"),
            patient_id: UserId::new("u1"),
            patient_name: "Ana".into(),
            doctor_name: "Dr. Silva".into(),
            doctor_image: None,
            doctor_speciality: "Cardiology".into(),
            date,
            time_label: "9:00 AM".into(),
            status,
            location: "Clinic A".into(),
            created_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn partitions_by_status_and_date() {
        let today = day(15);
        let state = AppointmentsState::from_appointments([
            appointment("future", AppointmentStatus::Upcoming, day(20)),
            appointment("today", AppointmentStatus::Upcoming, day(15)),
            appointment("stale", AppointmentStatus::Upcoming, day(10)),
            appointment("done", AppointmentStatus::Completed, day(20)),
            appointment("void", AppointmentStatus::Cancelled, day(25)),
        ]);

        let upcoming: Vec<_> = state.upcoming(today).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(upcoming, vec!["today", "future"]);

        let past: Vec<_> = state.past(today).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(past, vec!["void", "done", "stale"]);
    }

    #[test]
    fn same_day_rows_order_by_booking_time_not_label() {
        let today = day(15);
        let at_hour = |h| Utc.with_ymd_and_hms(2026, 6, 1, h, 0, 0).unwrap();
        let slot = |id: &str, label: &str, booked_hour| {
            let mut a = appointment(id, AppointmentStatus::Upcoming, day(20));
            a.time_label = label.into();
            a.created_at = at_hour(booked_hour);
            a
        };

        // "10:30 AM" sorts before "9:00 AM" lexicographically; booking
        // time must decide instead.
        let state = AppointmentsState::from_appointments([
            slot("later", "10:30 AM", 12),
            slot("earlier", "9:00 AM", 9),
        ]);

        let upcoming: Vec<_> = state.upcoming(today).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(upcoming, vec!["earlier", "later"]);
    }

    #[test]
    fn cancel_is_only_legal_for_upcoming_rows() {
        let today = day(15);
        let state = AppointmentsState::from_appointments([
            appointment("future", AppointmentStatus::Upcoming, day(20)),
            appointment("done", AppointmentStatus::Completed, day(20)),
            appointment("stale", AppointmentStatus::Upcoming, day(10)),
        ]);

        assert!(state.can_cancel(&AppointmentId::new("future"), today));
        assert!(!state.can_cancel(&AppointmentId::new("done"), today));
        assert!(!state.can_cancel(&AppointmentId::new("stale"), today));
        assert!(!state.can_cancel(&AppointmentId::new("missing"), today));
    }

    #[test]
    fn apply_upserts_by_id() {
        let mut state = AppointmentsState::new();
        state.apply(appointment("a", AppointmentStatus::Upcoming, day(20)));
        state.apply(appointment("a", AppointmentStatus::Cancelled, day(20)));
        assert_eq!(state.len(), 1);
        assert_eq!(
            state.get(&AppointmentId::new("a")).unwrap().status,
            AppointmentStatus::Cancelled
        );
    }

    #[test]
    fn mark_cancelled_updates_in_place() {
        let mut state =
            AppointmentsState::from_appointments([appointment("a", AppointmentStatus::Upcoming, day(20))]);
        state.mark_cancelled(&AppointmentId::new("a"));
        assert!(state.upcoming(day(15)).is_empty());
    }
}
