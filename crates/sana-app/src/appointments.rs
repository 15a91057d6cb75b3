//! Appointment lifecycle
//!
//! Create, cancel, and list appointments against the remote store.
//!
//! Booking copies the doctor's display fields onto the appointment at
//! call time: appointments are historical snapshots, not live joins, so a
//! later edit to the doctor record leaves past bookings untouched. No
//! slot-conflict check is performed — the store does not prevent
//! double-booking and neither does this layer.

use chrono::{NaiveDate, Utc};
use sana_core::appointment::{Appointment, AppointmentStatus, DoctorRecord};
use sana_core::effects::store::{collections, Filter, Order, RemoteStore};
use sana_core::errors::StoreError;
use sana_core::identifiers::{AppointmentId, DoctorId, UserId};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Failure to create an appointment.
///
/// On any failure no appointment record exists — the insert either
/// happened atomically or not at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// No authenticated session; only signed-in patients can book.
    #[error("booking requires a signed-in user")]
    NotSignedIn,

    #[error("doctor {0} is not accepting bookings")]
    DoctorUnavailable(DoctorId),

    #[error(transparent)]
    Remote(#[from] StoreError),
}

/// Successful cancellation outcome.
///
/// `AlreadyCancelled` makes cancel idempotent from the caller's point of
/// view: cancelling twice acknowledges rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelAck {
    Cancelled,
    AlreadyCancelled,
}

/// Failure to cancel an appointment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CancelError {
    #[error("appointment {0} not found")]
    NotFound(AppointmentId),

    /// The appointment reached a terminal status other than cancelled
    /// (i.e. it was completed); its status is left untouched.
    #[error("appointment {id} is already {status:?} and cannot be cancelled")]
    AlreadyTerminal {
        id: AppointmentId,
        status: AppointmentStatus,
    },

    #[error(transparent)]
    Remote(StoreError),
}

/// Create/cancel/list operations over the appointments collection.
pub struct AppointmentLifecycle<S> {
    store: Arc<S>,
}

impl<S: RemoteStore> AppointmentLifecycle<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Book an appointment with `doctor` for the given slot.
    ///
    /// The returned appointment carries the store-assigned id and the
    /// booking-time snapshot of the doctor's display fields.
    pub async fn book(
        &self,
        doctor: &DoctorRecord,
        date: NaiveDate,
        time_label: &str,
        patient_name: &str,
        patient: &UserId,
    ) -> Result<Appointment, BookingError> {
        if !doctor.available {
            return Err(BookingError::DoctorUnavailable(doctor.id.clone()));
        }

        let mut appointment = Appointment {
            // Placeholder until the store assigns the real id below.
            id: AppointmentId::new(""),
            doctor_id: doctor.id.clone(),
            patient_id: patient.clone(),
            patient_name: patient_name.to_string(),
            doctor_name: doctor.name.clone(),
            doctor_image: doctor.image_url.clone(),
            doctor_speciality: doctor.speciality.clone(),
            date,
            time_label: time_label.to_string(),
            status: AppointmentStatus::Upcoming,
            location: doctor.location.clone(),
            created_at: Utc::now(),
        };

        let record = serde_json::to_value(&appointment)
            .map_err(|error| StoreError::transient(format!("unencodable appointment: {error}")))?;
        let id = self.store.insert(collections::APPOINTMENTS, record).await?;
        appointment.id = AppointmentId::new(id);
        Ok(appointment)
    }

    /// Cancel an upcoming appointment.
    ///
    /// Idempotent for already-cancelled appointments; completed
    /// appointments are terminal and refuse the transition.
    pub async fn cancel(&self, id: &AppointmentId) -> Result<CancelAck, CancelError> {
        let document = self
            .store
            .get(collections::APPOINTMENTS, id.as_str())
            .await
            .map_err(|error| match error {
                StoreError::NotFound { .. } => CancelError::NotFound(id.clone()),
                other => CancelError::Remote(other),
            })?;
        let appointment: Appointment = serde_json::from_value(document).map_err(|error| {
            CancelError::Remote(StoreError::transient(format!(
                "undecodable appointment document: {error}"
            )))
        })?;

        match appointment.status {
            AppointmentStatus::Cancelled => Ok(CancelAck::AlreadyCancelled),
            AppointmentStatus::Completed => Err(CancelError::AlreadyTerminal {
                id: id.clone(),
                status: appointment.status,
            }),
            AppointmentStatus::Upcoming => {
                self.store
                    .update(
                        collections::APPOINTMENTS,
                        id.as_str(),
                        json!({ "status": AppointmentStatus::Cancelled }),
                    )
                    .await
                    .map_err(|error| match error {
                        StoreError::NotFound { .. } => CancelError::NotFound(id.clone()),
                        other => CancelError::Remote(other),
                    })?;
                Ok(CancelAck::Cancelled)
            }
        }
    }

    /// List a patient's appointments, newest date first.
    ///
    /// Documents that fail to decode are skipped with a warning rather
    /// than failing the whole listing.
    pub async fn list(&self, patient: &UserId) -> Result<Vec<Appointment>, StoreError> {
        let documents = self
            .store
            .query(
                collections::APPOINTMENTS,
                &Filter::new().field_eq("patient_id", patient.as_str()),
                Some(&Order::desc("date")),
                None,
            )
            .await?;

        Ok(documents
            .into_iter()
            .filter_map(|document| match serde_json::from_value(document) {
                Ok(appointment) => Some(appointment),
                Err(error) => {
                    tracing::warn!(%error, "skipping undecodable appointment document");
                    None
                }
            })
            .collect())
    }
}
