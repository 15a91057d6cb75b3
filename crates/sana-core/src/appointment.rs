//! Appointment and doctor-directory data model
//!
//! Appointments are historical snapshots: the doctor's display fields are
//! copied from the directory entry at booking time and never re-joined.
//! A later change to the doctor record must not rewrite history.

use crate::identifiers::{AppointmentId, DoctorId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Status of an appointment.
///
/// Transitions are one-directional: `Upcoming → Cancelled` (user-initiated)
/// or `Upcoming → Completed` (time-based, applied externally). Terminal
/// statuses permit no further transition. Records are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Whether this status permits no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// A doctor directory entry.
///
/// The source of the denormalized snapshot fields copied onto an
/// [`Appointment`] at booking time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: DoctorId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub speciality: String,
    pub location: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// One appointment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Assigned by the remote store on insert.
    pub id: AppointmentId,
    pub doctor_id: DoctorId,
    pub patient_id: UserId,
    pub patient_name: String,
    // Booking-time snapshot of the doctor directory entry.
    pub doctor_name: String,
    #[serde(default)]
    pub doctor_image: Option<String>,
    pub doctor_speciality: String,
    pub date: NaiveDate,
    /// Free-text slot label ("10:30 AM"); the store does not interpret it.
    pub time_label: String,
    pub status: AppointmentStatus,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether the appointment still counts as upcoming on the given day.
    ///
    /// Terminal appointments and past dates are never upcoming, whatever
    /// their stored status says.
    pub fn is_upcoming_on(&self, today: NaiveDate) -> bool {
        self.status == AppointmentStatus::Upcoming && self.date >= today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: AppointmentStatus, date: NaiveDate) -> Appointment {
        Appointment {
            id: AppointmentId::new("a1"),
            doctor_id: DoctorId::new("d1"),
            patient_id: UserId::new("u1"),
            patient_name: "Ana".into(),
            doctor_name: "Dr. Silva".into(),
            doctor_image: None,
            doctor_speciality: "Cardiology".into(),
            date,
            time_label: "10:30 AM".into(),
            status,
            location: "Room 4".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!AppointmentStatus::Upcoming.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn upcoming_depends_on_status_and_date() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let tomorrow = today.succ_opt().unwrap();
        let yesterday = today.pred_opt().unwrap();

        assert!(sample(AppointmentStatus::Upcoming, tomorrow).is_upcoming_on(today));
        assert!(sample(AppointmentStatus::Upcoming, today).is_upcoming_on(today));
        assert!(!sample(AppointmentStatus::Upcoming, yesterday).is_upcoming_on(today));
        assert!(!sample(AppointmentStatus::Cancelled, tomorrow).is_upcoming_on(today));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Upcoming).unwrap(),
            "\"upcoming\""
        );
    }
}
