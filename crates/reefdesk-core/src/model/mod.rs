// ── Domain model ──
//
// Canonical types persisted by the reservation store.

pub mod action_log;
pub mod entity_id;
pub mod reservation;
pub mod room;
pub mod user;

pub use action_log::{ActionDetails, ActionLog};
pub use entity_id::{Email, ReservationId, RoomId};
pub use reservation::{
    DeskStamp, GuestDetails, PaymentMethod, PaymentStatus, QrToken, Reservation, percent_paid,
};
pub use room::{Room, RoomStatus, RoomType};
pub use user::{Role, User};
