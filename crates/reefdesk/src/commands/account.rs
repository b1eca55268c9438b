//! Account command handlers.

use serde::Serialize;

use reefdesk_core::{ReservationStore, Session};

use crate::cli::{AccountArgs, AccountCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct WhoAmI {
    email: String,
    name: Option<String>,
    role: String,
    signed_in_at: String,
    capabilities: Vec<String>,
}

impl WhoAmI {
    fn new(store: &ReservationStore, session: &Session) -> Self {
        let name = store.account(session).ok().and_then(|u| u.name.clone());
        Self {
            email: session.email.to_string(),
            name,
            role: session.role.to_string(),
            signed_in_at: session.started_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            capabilities: session.capabilities().iter().map(ToString::to_string).collect(),
        }
    }
}

fn detail(w: &WhoAmI) -> String {
    [
        format!("Email:        {}", w.email),
        format!("Name:         {}", w.name.as_deref().unwrap_or("-")),
        format!("Role:         {}", w.role),
        format!("Signed in:    {}", w.signed_in_at),
        format!("Capabilities: {}", w.capabilities.join(", ")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(store: &mut ReservationStore, args: AccountArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AccountCommand::Register { email, password } => {
            let password = util::password(password.password, "Password: ")?;
            let user = store.register(&email, &password)?;
            output::notice(
                &format!("Account {} created. Sign in with: reefdesk account login {}", user.email, user.email),
                global.quiet,
            );
            Ok(())
        }

        AccountCommand::Login { email, password } => {
            let password = util::password(password.password, "Password: ")?;
            let session = store.login(&email, &password)?.ok_or(CliError::AuthFailed)?;
            output::notice(
                &format!("Signed in as {} ({})", session.email, session.role),
                global.quiet,
            );
            Ok(())
        }

        AccountCommand::Logout => {
            store.logout()?;
            output::notice("Signed out", global.quiet);
            Ok(())
        }

        AccountCommand::Whoami => {
            let session = util::session(store)?;
            let who = WhoAmI::new(store, &session);
            let out = output::render_single(&global.output, &who, detail, |w| w.email.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AccountCommand::ChangePassword { current, new } => {
            let session = util::session(store)?;
            let current = util::password(current, "Current password: ")?;
            let new = util::password(new, "New password: ")?;
            store.change_password(&session, &current, &new)?;
            output::notice("Password changed", global.quiet);
            Ok(())
        }

        AccountCommand::Delete => {
            let session = util::session(store)?;
            if !util::confirm(
                &format!("Delete account {} and all its reservations?", session.email),
                global.yes,
            )? {
                return Ok(());
            }
            let removed = store.delete_account(&session)?;
            output::notice(
                &format!("Account deleted ({removed} reservation(s) removed)"),
                global.quiet,
            );
            Ok(())
        }
    }
}
