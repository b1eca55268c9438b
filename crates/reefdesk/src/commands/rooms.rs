//! Room inventory handlers.

use std::sync::Arc;

use tabled::Tabled;

use reefdesk_core::{ReservationStore, Room, RoomDraft, RoomSearch, RoomStatus};

use crate::cli::{GlobalOpts, RoomFields, RoomsArgs, RoomsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    room_type: String,
    #[tabled(rename = "Price/Night")]
    price: String,
    #[tabled(rename = "Guests")]
    capacity: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl RoomRow {
    fn new(r: &Arc<Room>, color: bool) -> Self {
        Self {
            id: r.id.to_string(),
            name: r.name.clone(),
            room_type: r.room_type.to_string(),
            price: output::money(r.price_per_night),
            capacity: r.capacity.map(|c| c.to_string()).unwrap_or_default(),
            status: output::room_status(r.status(), color),
        }
    }
}

pub(super) fn detail(r: &Room, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", r.id),
        format!("Name:        {}", r.name),
        format!("Type:        {}", r.room_type),
        format!("Price/Night: {}", output::money(r.price_per_night)),
        format!("Status:      {}", output::room_status(r.status(), color)),
        format!("Bookable:    {}", if r.is_available() { "yes" } else { "no" }),
    ];
    if let Some(cap) = r.capacity {
        lines.push(format!("Guests:      {cap}"));
    }
    if let Some(beds) = &r.beds {
        lines.push(format!("Beds:        {beds}"));
    }
    if !r.amenities.is_empty() {
        lines.push(format!("Amenities:   {}", r.amenities.join(", ")));
    }
    if let Some(desc) = &r.description {
        lines.push(format!("Description: {desc}"));
    }
    lines.join("\n")
}

fn apply_fields(draft: &mut RoomDraft, fields: RoomFields) {
    if fields.capacity.is_some() {
        draft.capacity = fields.capacity;
    }
    if fields.beds.is_some() {
        draft.beds = fields.beds;
    }
    if fields.description.is_some() {
        draft.description = fields.description;
    }
    if !fields.images.is_empty() {
        draft.images = fields.images;
    }
    if !fields.amenities.is_empty() {
        draft.amenities = fields.amenities;
    }
    if let Some(status) = fields.status {
        draft.status = Some(RoomStatus::from(status));
    }
}

fn print_rooms(rooms: &[Arc<Room>], global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        rooms,
        |r| RoomRow::new(r, color),
        |r| r.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn print_room(room: &Arc<Room>, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, room, |r| detail(r, color), |r| r.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &mut ReservationStore, args: RoomsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RoomsCommand::List => {
            print_rooms(&store.list_rooms(), global);
            Ok(())
        }

        RoomsCommand::Get { id } => {
            let room = store.room(util::parse_room_id(&id)?)?;
            print_room(&room, global);
            Ok(())
        }

        RoomsCommand::Create {
            name,
            room_type,
            price,
            fields,
        } => {
            let session = util::session(store)?;
            let mut draft = RoomDraft::new(name, room_type.into(), price);
            apply_fields(&mut draft, fields);
            let room = store.upsert_room(&session, draft)?;
            print_room(&room, global);
            Ok(())
        }

        RoomsCommand::Update {
            id,
            name,
            room_type,
            price,
            fields,
        } => {
            let session = util::session(store)?;
            let current = store.room(util::parse_room_id(&id)?)?;
            let mut draft = RoomDraft::from(current.as_ref());
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(room_type) = room_type {
                draft.room_type = room_type.into();
            }
            if let Some(price) = price {
                draft.price_per_night = price;
            }
            apply_fields(&mut draft, fields);
            let room = store.upsert_room(&session, draft)?;
            print_room(&room, global);
            Ok(())
        }

        RoomsCommand::Delete { id } => {
            let session = util::session(store)?;
            let room_id = util::parse_room_id(&id)?;
            if !util::confirm(&format!("Delete room {room_id}?"), global.yes)? {
                return Ok(());
            }
            let room = store.delete_room(&session, room_id)?;
            output::notice(&format!("Deleted room {} ({})", room.id, room.name), global.quiet);
            Ok(())
        }

        RoomsCommand::Status { id, status } => {
            let session = util::session(store)?;
            let room = store.set_room_status(&session, util::parse_room_id(&id)?, status.into())?;
            output::notice(&format!("Room {} is now {}", room.id, room.status()), global.quiet);
            Ok(())
        }

        RoomsCommand::Available {
            arrival,
            departure,
            room_type,
            guests,
        } => {
            let search = RoomSearch {
                arrival: util::parse_date("arrival", &arrival)?,
                departure: util::parse_date("departure", &departure)?,
                room_type: room_type.map(Into::into),
                guests,
            };
            print_rooms(&store.search_available_rooms(&search)?, global);
            Ok(())
        }
    }
}
