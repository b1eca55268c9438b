// ── Identity & access operations ──

use std::sync::Arc;

use secrecy::SecretString;
use uuid::Uuid;

use super::ReservationStore;
use crate::access::{Capability, Session, authorize};
use crate::credentials::{PasswordHash, validate_email, validate_password};
use crate::error::{CoreError, Result};
use crate::model::{Email, Role, User};
use crate::requests::UpdateUserRequest;
use crate::store::{DataStore, SessionMarker};

impl ReservationStore {
    /// Create a guest account.
    pub fn register(&mut self, email: &str, password: &SecretString) -> Result<Arc<User>> {
        let email = Email::new(email);
        validate_email(&email)?;
        validate_password(password)?;

        let user = self.transact(|state, now| {
            if state.users.contains_key(&email) {
                return Err(CoreError::EmailTaken {
                    email: email.to_string(),
                });
            }
            let user = User {
                email: email.clone(),
                password_hash: PasswordHash::new(password),
                role: Role::Guest,
                name: None,
                created_at: now,
                phone: None,
                shift: None,
            };
            state.users.upsert(email.clone(), user);
            state
                .users
                .get_by_key(&email)
                .ok_or_else(|| CoreError::not_found("User", &email))
        })?;

        tracing::info!(email = %user.email, "registered account");
        Ok(user)
    }

    /// Verify credentials and persist a session marker.
    ///
    /// Returns `Ok(None)` for an unknown email or wrong password.
    pub fn login(&mut self, email: &str, password: &SecretString) -> Result<Option<Session>> {
        let email = Email::new(email);
        let Some(user) = self.state.users.get_by_key(&email) else {
            tracing::warn!(%email, "login for unknown account");
            return Ok(None);
        };
        if !user.password_hash.verify(password) {
            tracing::warn!(%email, "login with wrong password");
            return Ok(None);
        }

        let marker = SessionMarker {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            started_at: self.now(),
        };
        let session = Session {
            id: marker.id,
            email: marker.email.clone(),
            role: user.role,
            started_at: marker.started_at,
        };
        self.transact(|state, _| {
            state.set_session(Some(marker));
            Ok(())
        })?;

        tracing::info!(%email, role = %user.role, "signed in");
        Ok(Some(session))
    }

    /// Clear the persisted session marker. Succeeds when nobody is signed in.
    pub fn logout(&mut self) -> Result<()> {
        if self.state.session.is_none() {
            return Ok(());
        }
        self.transact(|state, _| {
            state.set_session(None);
            Ok(())
        })?;
        tracing::info!("signed out");
        Ok(())
    }

    /// The persisted session, with the role resolved from the current
    /// users collection. `None` if nobody is signed in or the account is gone.
    pub fn current_session(&self) -> Option<Session> {
        let marker = self.state.session.as_ref()?;
        let user = self.state.users.get_by_key(&marker.email)?;
        Some(Session {
            id: marker.id,
            email: marker.email.clone(),
            role: user.role,
            started_at: marker.started_at,
        })
    }

    /// [`current_session`](Self::current_session) or [`CoreError::NotAuthenticated`].
    pub fn require_session(&self) -> Result<Session> {
        self.current_session().ok_or(CoreError::NotAuthenticated)
    }

    /// Role check for `email`, or for the signed-in account when `None`.
    pub fn is_admin(&self, email: Option<&Email>) -> bool {
        self.role_of(email) == Some(Role::Admin)
    }

    /// True for staff and for admins.
    pub fn is_staff(&self, email: Option<&Email>) -> bool {
        matches!(self.role_of(email), Some(Role::Staff | Role::Admin))
    }

    fn role_of(&self, email: Option<&Email>) -> Option<Role> {
        let email = match email {
            Some(e) => e.clone(),
            None => self.state.session.as_ref()?.email.clone(),
        };
        self.state.users.get_by_key(&email).map(|u| u.role)
    }

    /// Re-authenticate with `current`, then replace it with `new`.
    pub fn change_password(
        &mut self,
        session: &Session,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<()> {
        let user = self.account(session)?;
        if !user.password_hash.verify(current) {
            tracing::warn!(email = %session.email, "password change with wrong current password");
            return Err(CoreError::InvalidCredentials);
        }
        validate_password(new)?;

        self.transact(|state, _| {
            let mut updated = (*user).clone();
            updated.password_hash = PasswordHash::new(new);
            state.users.upsert(updated.email.clone(), updated);
            Ok(())
        })?;
        tracing::info!(email = %session.email, "password changed");
        Ok(())
    }

    /// Delete the signed-in account and every reservation it owns.
    /// Returns the number of reservations removed.
    pub fn delete_account(&mut self, session: &Session) -> Result<usize> {
        self.account(session)?;
        let email = session.email.clone();
        self.transact(|state, _| Ok(delete_user_cascade(state, &email)))
    }

    // ── Administration ───────────────────────────────────────────────

    /// All accounts, ordered by email.
    pub fn list_users(&self, session: &Session) -> Result<Vec<Arc<User>>> {
        authorize(session, Capability::ManageUsers)?;
        Ok(self.state.users.snapshot())
    }

    /// Staff and admin accounts, ordered by email.
    pub fn list_staff(&self, session: &Session) -> Result<Vec<Arc<User>>> {
        authorize(session, Capability::ManageUsers)?;
        Ok(self
            .state
            .users
            .values()
            .filter(|u| matches!(u.role, Role::Staff | Role::Admin))
            .cloned()
            .collect())
    }

    pub fn update_user(
        &mut self,
        session: &Session,
        email: &Email,
        request: UpdateUserRequest,
    ) -> Result<Arc<User>> {
        authorize(session, Capability::ManageUsers)?;
        let existing = self
            .state
            .users
            .get_by_key(email)
            .ok_or_else(|| CoreError::not_found("User", email))?;
        if let Some(password) = &request.password {
            validate_password(password)?;
        }

        let mut updated = (*existing).clone();
        if let Some(name) = request.name {
            updated.name = Some(name);
        }
        if let Some(role) = request.role {
            updated.role = role;
        }
        if let Some(phone) = request.phone {
            updated.phone = Some(phone);
        }
        if let Some(shift) = request.shift {
            updated.shift = Some(shift);
        }
        if let Some(password) = &request.password {
            updated.password_hash = PasswordHash::new(password);
        }

        let key = email.clone();
        let user = self.transact(|state, _| {
            state.users.upsert(key.clone(), updated);
            state
                .users
                .get_by_key(&key)
                .ok_or_else(|| CoreError::not_found("User", &key))
        })?;
        tracing::info!(email = %user.email, role = %user.role, by = %session.email, "updated account");
        Ok(user)
    }

    /// Delete any account and cascade its reservations.
    pub fn delete_user(&mut self, session: &Session, email: &Email) -> Result<usize> {
        authorize(session, Capability::ManageUsers)?;
        if !self.state.users.contains_key(email) {
            return Err(CoreError::not_found("User", email));
        }
        let email = email.clone();
        self.transact(|state, _| Ok(delete_user_cascade(state, &email)))
    }

    /// The signed-in account's own record.
    pub fn account(&self, session: &Session) -> Result<Arc<User>> {
        self.state
            .users
            .get_by_key(&session.email)
            .ok_or_else(|| CoreError::not_found("User", &session.email))
    }
}

/// Remove `email` and its reservations; sign out if it was the active session.
fn delete_user_cascade(state: &mut DataStore, email: &Email) -> usize {
    state.users.remove(email);
    let removed = state.reservations.remove_where(|r| &r.guest_email == email);
    if state.session.as_ref().is_some_and(|m| &m.email == email) {
        state.set_session(None);
    }
    tracing::info!(%email, reservations = removed, "deleted account");
    removed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_support::*;
    use crate::error::{CoreError, ErrorKind};
    use crate::model::{Email, Role};
    use crate::requests::UpdateUserRequest;

    #[test]
    fn weak_password_is_rejected() {
        let mut store = store_on("2025-06-01");
        let err = store.register("ana@test.cl", &secret("abcdefgh")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store.register("ana@test.cl", &secret("Abcdefg1")).is_ok());
    }

    #[test]
    fn duplicate_email_is_a_conflict_regardless_of_case() {
        let mut store = store_on("2025-06-01");
        store.register("ana@test.cl", &secret("Abcdefg1")).unwrap();
        let err = store.register("ANA@test.cl", &secret("Abcdefg1")).unwrap_err();
        assert!(matches!(err, CoreError::EmailTaken { .. }));
    }

    #[test]
    fn login_is_case_insensitive_and_persists_session() {
        let mut store = store_on("2025-06-01");
        store.register("ana@test.cl", &secret("Abcdefg1")).unwrap();

        assert!(store.login("ana@test.cl", &secret("wrong")).unwrap().is_none());
        assert!(store.current_session().is_none());

        let session = store.login("  Ana@Test.CL ", &secret("Abcdefg1")).unwrap().unwrap();
        assert_eq!(session.role, Role::Guest);
        assert_eq!(store.current_session(), Some(session));

        store.logout().unwrap();
        assert!(store.current_session().is_none());
    }

    #[test]
    fn role_checks_default_to_current_session() {
        let mut store = store_on("2025-06-01");
        assert!(!store.is_staff(None));
        admin(&mut store);
        assert!(store.is_admin(None));
        assert!(store.is_staff(None));
        assert!(store.is_staff(Some(&Email::new("recepcion@pacificreef.cl"))));
        assert!(!store.is_admin(Some(&Email::new("recepcion@pacificreef.cl"))));
    }

    #[test]
    fn change_password_requires_current() {
        let mut store = store_on("2025-06-01");
        let session = guest(&mut store, "ana@test.cl");

        let err = store
            .change_password(&session, &secret("Nope1234"), &secret("Newpass99"))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));

        store
            .change_password(&session, &secret("Secure123"), &secret("Newpass99"))
            .unwrap();
        assert!(store.login("ana@test.cl", &secret("Secure123")).unwrap().is_none());
        assert!(store.login("ana@test.cl", &secret("Newpass99")).unwrap().is_some());
    }

    #[test]
    fn delete_account_signs_out() {
        let mut store = store_on("2025-06-01");
        let session = guest(&mut store, "ana@test.cl");
        store.delete_account(&session).unwrap();
        assert!(store.current_session().is_none());
        assert!(store.login("ana@test.cl", &secret("Secure123")).unwrap().is_none());
    }

    #[test]
    fn admin_can_promote_and_staff_cannot() {
        let mut store = store_on("2025-06-01");
        guest(&mut store, "ana@test.cl");
        let staff = staff(&mut store);
        let ana = Email::new("ana@test.cl");

        let promote = || UpdateUserRequest {
            role: Some(Role::Staff),
            ..UpdateUserRequest::default()
        };
        assert_eq!(
            store.update_user(&staff, &ana, promote()).unwrap_err().kind(),
            ErrorKind::Auth
        );

        let admin = admin(&mut store);
        let updated = store.update_user(&admin, &ana, promote()).unwrap();
        assert_eq!(updated.role, Role::Staff);
        assert_eq!(store.list_staff(&admin).unwrap().len(), 3);
    }

    #[test]
    fn users_are_listed_by_email() {
        let mut store = store_on("2025-06-01");
        guest(&mut store, "zoe@test.cl");
        let admin = admin(&mut store);
        let emails: Vec<String> = store
            .list_users(&admin)
            .unwrap()
            .iter()
            .map(|u| u.email.to_string())
            .collect();
        assert_eq!(
            emails,
            vec!["admin@pacificreef.cl", "recepcion@pacificreef.cl", "zoe@test.cl"]
        );
    }
}
