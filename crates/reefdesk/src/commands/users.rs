//! User administration handlers.

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;
use tabled::Tabled;

use reefdesk_core::{Email, ReservationStore, UpdateUserRequest, User};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

/// Public view of an account; never carries the password hash.
#[derive(Serialize)]
struct UserView {
    email: String,
    name: Option<String>,
    role: String,
    phone: Option<String>,
    shift: Option<String>,
    created_at: String,
}

impl From<&Arc<User>> for UserView {
    fn from(u: &Arc<User>) -> Self {
        Self {
            email: u.email.to_string(),
            name: u.name.clone(),
            role: u.role.to_string(),
            phone: u.phone.clone(),
            shift: u.shift.clone(),
            created_at: u.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Shift")]
    shift: String,
    #[tabled(rename = "Since")]
    created_at: String,
}

impl From<&UserView> for UserRow {
    fn from(u: &UserView) -> Self {
        Self {
            email: u.email.clone(),
            name: u.name.clone().unwrap_or_default(),
            role: u.role.clone(),
            phone: u.phone.clone().unwrap_or_default(),
            shift: u.shift.clone().unwrap_or_default(),
            created_at: u.created_at.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &mut ReservationStore, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::session(store)?;

    match args.command {
        UsersCommand::List { staff } => {
            let users = if staff {
                store.list_staff(&session)?
            } else {
                store.list_users(&session)?
            };
            let views: Vec<UserView> = users.iter().map(UserView::from).collect();
            let out = output::render_list(&global.output, &views, |u| UserRow::from(u), |u| u.email.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Update {
            email,
            name,
            role,
            phone,
            shift,
            password,
        } => {
            let request = UpdateUserRequest {
                name,
                role: role.map(Into::into),
                phone,
                shift,
                password: password.map(SecretString::from),
            };
            let user = store.update_user(&session, &Email::new(&email), request)?;
            output::notice(&format!("Updated {} ({})", user.email, user.role), global.quiet);
            Ok(())
        }

        UsersCommand::Delete { email } => {
            let email = Email::new(&email);
            if !util::confirm(&format!("Delete {email} and all their reservations?"), global.yes)? {
                return Ok(());
            }
            let removed = store.delete_user(&session, &email)?;
            output::notice(
                &format!("Deleted {email} ({removed} reservation(s) removed)"),
                global.quiet,
            );
            Ok(())
        }
    }
}
