// ── Role-based access control ──
//
// Every privileged store operation calls `authorize` with the capability
// it needs. The role→capability table below is the single source of
// truth; nothing else inspects roles directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::model::{Email, Reservation, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Capability {
    /// Create reservations and manage one's own bookings.
    Book,
    /// Check guests in and out, record payments, reissue QR codes.
    FrontDesk,
    /// Set room status (cleaning, maintenance, ...).
    ManageRoomStatus,
    /// Read, edit, and delete any guest's reservations.
    ManageAnyReservation,
    /// Create, edit, and delete rooms.
    ManageInventory,
    /// List, edit, and delete user accounts.
    ManageUsers,
    ViewReports,
    ViewAuditLog,
}

impl Role {
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Admin => &[
                Capability::Book,
                Capability::FrontDesk,
                Capability::ManageRoomStatus,
                Capability::ManageAnyReservation,
                Capability::ManageInventory,
                Capability::ManageUsers,
                Capability::ViewReports,
                Capability::ViewAuditLog,
            ],
            Role::Staff => &[
                Capability::Book,
                Capability::FrontDesk,
                Capability::ManageRoomStatus,
                Capability::ManageAnyReservation,
                Capability::ViewReports,
                Capability::ViewAuditLog,
            ],
            Role::Guest => &[Capability::Book],
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// An authenticated actor. Passed explicitly to every privileged call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub email: Email,
    pub role: Role,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }

    /// Whether this session may read or modify `reservation`: its owner,
    /// or anyone holding [`Capability::ManageAnyReservation`].
    pub fn owns_or_manages(&self, reservation: &Reservation) -> bool {
        reservation.guest_email == self.email || self.can(Capability::ManageAnyReservation)
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::iter().filter(|c| self.can(*c)).collect()
    }
}

/// Fail with [`CoreError::Forbidden`] unless `session` holds `capability`.
pub fn authorize(session: &Session, capability: Capability) -> Result<()> {
    if session.can(capability) {
        Ok(())
    } else {
        tracing::debug!(email = %session.email, %capability, "capability denied");
        Err(CoreError::Forbidden { capability })
    }
}

/// Owner-or-manager check for a single reservation.
pub(crate) fn authorize_reservation(session: &Session, reservation: &Reservation) -> Result<()> {
    if session.owns_or_manages(reservation) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            capability: Capability::ManageAnyReservation,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            id: Uuid::nil(),
            email: Email::new("someone@reef.cl"),
            role,
            started_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn guests_only_book() {
        let guest = session(Role::Guest);
        assert_eq!(guest.capabilities(), vec![Capability::Book]);
        assert!(authorize(&guest, Capability::FrontDesk).is_err());
    }

    #[test]
    fn staff_cannot_manage_inventory_or_users() {
        let staff = session(Role::Staff);
        assert!(authorize(&staff, Capability::FrontDesk).is_ok());
        assert!(authorize(&staff, Capability::ManageRoomStatus).is_ok());
        assert!(authorize(&staff, Capability::ManageInventory).is_err());
        assert!(authorize(&staff, Capability::ManageUsers).is_err());
    }

    #[test]
    fn admin_holds_everything() {
        let admin = session(Role::Admin);
        assert!(Capability::iter().all(|c| admin.can(c)));
    }

    #[test]
    fn forbidden_names_capability() {
        let err = authorize(&session(Role::Guest), Capability::ViewReports).unwrap_err();
        assert_eq!(err.to_string(), "Permission denied: view-reports required");
    }
}
