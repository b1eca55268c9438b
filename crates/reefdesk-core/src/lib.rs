//! reefdesk-core: reservation store and front-desk state machine.
//!
//! A [`ReservationStore`] owns four persisted collections (users, rooms,
//! reservations, and the front-desk action log) over a pluggable
//! key-value backend. Every privileged operation takes an explicit
//! [`Session`]; capabilities are derived from the session's role in
//! [`access`].

pub mod access;
pub mod availability;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod qr;
pub mod reports;
pub mod requests;
pub mod reservation_store;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access::{Capability, Session, authorize};
pub use availability::{DateRange, ranges_overlap};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{SeedAccount, SeedConfig, StorageLocation, StoreConfig};
pub use error::{CoreError, ErrorKind};
pub use reports::{CheckInSummary, MonthlyTotal, Overbooking, ReportView, RoomBookings, StatusCount};
pub use requests::{NewReservation, PaymentIntent, RoomDraft, RoomSearch, UpdateUserRequest};
pub use reservation_store::ReservationStore;
pub use store::{DirectoryBackend, KeyValueBackend, MemoryBackend, MigrationOutcome};
pub use stream::{EntityStream, Snapshot};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ActionDetails, ActionLog, DeskStamp, Email, GuestDetails, PaymentMethod, PaymentStatus,
    QrToken, Reservation, ReservationId, Role, Room, RoomId, RoomStatus, RoomType, User,
};
