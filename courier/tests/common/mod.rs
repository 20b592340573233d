#![allow(dead_code)]

use courier::{
    BoxError, CancellationExt, CancellationToken, Command, CommandHandler, Envelope, Event,
    EventHandler, Message, Query, QueryHandler, uuid::Uuid,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

// ============================================================================
// Test Message Types
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

pub struct RegisterUser {
    pub envelope: Envelope,
    pub email: String,
    pub password: String,
}

impl RegisterUser {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            envelope: Envelope::new(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Message for RegisterUser {
    fn envelope(&self) -> Option<&Envelope> {
        Some(&self.envelope)
    }
}

impl Command for RegisterUser {
    type Output = Uuid;
}

pub struct ChangeUserPassword {
    pub user_id: Uuid,
    pub password: String,
}

impl Message for ChangeUserPassword {}
impl Command for ChangeUserPassword {
    type Output = ();
}

#[derive(Clone, Debug)]
pub struct UserCreated {
    pub user_id: Uuid,
}

impl Message for UserCreated {}
impl Event for UserCreated {}

pub struct GetUserById {
    pub id: Uuid,
}

impl Message for GetUserById {}
impl Query for GetUserById {
    type Output = Option<User>;
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("{0}")]
pub struct InvalidOperation(pub String);

// ============================================================================
// Store and Handlers
// ============================================================================

#[derive(Clone, Default)]
pub struct UserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn email_taken(&self, email: &str) -> bool {
        self.users.lock().unwrap().values().any(|u| u.email == email)
    }
}

pub struct RegisterUserHandler {
    pub store: UserStore,
    pub next_id: Uuid,
}

impl CommandHandler<RegisterUser> for RegisterUserHandler {
    async fn handle(&self, cmd: &RegisterUser, cancel: &CancellationToken) -> Result<Uuid, BoxError> {
        cancel.ensure_active()?;
        if self.store.email_taken(&cmd.email) {
            return Err(InvalidOperation("duplicated".into()).into());
        }
        self.store.insert(User {
            id: self.next_id,
            email: cmd.email.clone(),
            password: cmd.password.clone(),
        });
        Ok(self.next_id)
    }
}

pub struct ChangeUserPasswordHandler {
    pub store: UserStore,
}

impl CommandHandler<ChangeUserPassword> for ChangeUserPasswordHandler {
    async fn handle(
        &self,
        cmd: &ChangeUserPassword,
        cancel: &CancellationToken,
    ) -> Result<(), BoxError> {
        cancel.ensure_active()?;
        let mut user = self
            .store
            .get(cmd.user_id)
            .ok_or_else(|| InvalidOperation("not found".into()))?;
        user.password = cmd.password.clone();
        self.store.insert(user);
        Ok(())
    }
}

pub struct GetUserByIdHandler {
    pub store: UserStore,
}

impl QueryHandler<GetUserById> for GetUserByIdHandler {
    async fn handle(
        &self,
        query: &GetUserById,
        cancel: &CancellationToken,
    ) -> Result<Option<User>, BoxError> {
        cancel.ensure_active()?;
        Ok(self.store.get(query.id))
    }
}

/// Fails every event with the given message.
pub struct FailingEventHandler(pub &'static str);

impl EventHandler<UserCreated> for FailingEventHandler {
    async fn handle(&self, _evt: &UserCreated, _cancel: &CancellationToken) -> Result<(), BoxError> {
        Err(InvalidOperation(self.0.into()).into())
    }
}

/// Waits for the token, then reports cancellation.
pub struct AwaitCancellation;

impl CommandHandler<RegisterUser> for AwaitCancellation {
    async fn handle(
        &self,
        _cmd: &RegisterUser,
        cancel: &CancellationToken,
    ) -> Result<Uuid, BoxError> {
        cancel.guard(std::future::pending::<()>()).await?;
        Ok(Uuid::nil())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub const G1: Uuid = Uuid::from_u128(0x6f1c_2a9e_0000_4000_8000_0000_0000_00a1);

pub fn existing_user(store: &UserStore) -> User {
    let user = User {
        id: G1,
        email: "a@b".into(),
        password: "x".into(),
    };
    store.insert(user.clone());
    user
}
