//! Core identifier types used across the Sana client
//!
//! All identifiers are opaque strings assigned by the backing store or the
//! auth provider; the client never parses or derives meaning from them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from its backend representation.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw identifier string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Identifier of a signed-in user (patient or doctor account)
    ///
    /// Assigned by the auth provider at registration and used as the
    /// document id of the user's profile record.
    UserId,
    "user-"
);

string_id!(
    /// Identifier of a doctor directory entry
    DoctorId,
    "doctor-"
);

string_id!(
    /// Identifier of an appointment record
    ///
    /// Assigned by the remote store on insert; never client-generated.
    AppointmentId,
    "appointment-"
);
