// ── First-run seed data ──

use chrono::{DateTime, Utc};

use super::data_store::DataStore;
use crate::config::{SeedAccount, SeedConfig};
use crate::credentials::PasswordHash;
use crate::model::{Role, Room, RoomId, RoomType, User};

/// Populate `state` with the seed accounts and, on a fresh store, the
/// three starter rooms. Existing accounts are never overwritten.
pub(crate) fn apply(state: &mut DataStore, config: &SeedConfig, fresh: bool, now: DateTime<Utc>) {
    if !config.enabled {
        return;
    }

    ensure_account(state, &config.admin, Role::Admin, None, now);
    ensure_account(state, &config.staff, Role::Staff, Some("morning"), now);

    if fresh && state.rooms.is_empty() {
        for room in starter_rooms() {
            state.claim_room_id(room.id);
            state.rooms.upsert(room.id, room);
        }
        tracing::info!(rooms = state.rooms.len(), "seeded starter rooms");
    }
}

fn ensure_account(
    state: &mut DataStore,
    account: &SeedAccount,
    role: Role,
    shift: Option<&str>,
    now: DateTime<Utc>,
) {
    if state.users.contains_key(&account.email) {
        return;
    }
    let user = User {
        email: account.email.clone(),
        password_hash: PasswordHash::new(&account.password),
        role,
        name: Some(account.name.clone()),
        created_at: now,
        phone: (role == Role::Staff).then(|| "+56987654321".to_owned()),
        shift: shift.map(str::to_owned),
    };
    state.users.upsert(account.email.clone(), user);
    tracing::info!(email = %account.email, %role, "seeded account");
}

fn starter_rooms() -> Vec<Room> {
    let mut basic = Room::new(RoomId::new(1), "Basic Garden View", RoomType::Basic, 45_000);
    basic.description = Some("Cozy room overlooking the tropical garden.".into());
    basic.capacity = Some(2);
    basic.beds = Some("1 queen bed".into());
    basic.amenities = vec!["TV".into(), "Wi-Fi".into(), "Private bathroom".into()];
    basic.images = vec![
        "https://images.unsplash.com/photo-1631049307264-da0ec9d70304?w=800".into(),
        "https://images.unsplash.com/photo-1566665797739-1674de7a421a?w=800".into(),
    ];

    let mut medium = Room::new(RoomId::new(2), "Medium Partial Sea View", RoomType::Medium, 78_000);
    medium.description = Some("Spacious room with a partial view of the Pacific.".into());
    medium.capacity = Some(3);
    medium.beds = Some("1 king bed + 1 single bed".into());
    medium.amenities = vec![
        "TV".into(),
        "Wi-Fi".into(),
        "Minibar".into(),
        "Balcony".into(),
        "Private bathroom".into(),
    ];
    medium.images = vec![
        "https://images.unsplash.com/photo-1590490360182-c33d57733427?w=800".into(),
        "https://images.unsplash.com/photo-1582719478250-c89cae4dc85b?w=800".into(),
    ];

    let mut premium = Room::new(RoomId::new(3), "Premium Full Sea View", RoomType::Premium, 125_000);
    premium.description = Some("Luxury suite with panoramic ocean views.".into());
    premium.capacity = Some(4);
    premium.beds = Some("1 king bed + sofa bed".into());
    premium.amenities = vec![
        "Smart TV".into(),
        "Wi-Fi".into(),
        "Minibar".into(),
        "Jacuzzi".into(),
        "Terrace".into(),
        "Room service".into(),
    ];
    premium.images = vec![
        "https://images.unsplash.com/photo-1578683010236-d716f9a3f461?w=800".into(),
        "https://images.unsplash.com/photo-1591088398332-8a7791972843?w=800".into(),
    ];

    vec![basic, medium, premium]
}
