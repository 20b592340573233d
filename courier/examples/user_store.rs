//! User registration through the mediator.
//!
//! Run with `cargo run -p courier --example user_store --features tracing`.
//! Set `RUST_LOG` to change verbosity; press Ctrl-C to cancel the run.

use courier::{
    BoxError, CancellationExt, CancellationToken, Command, Envelope, Event, EventHandler,
    LoggingFilter, Mediator, Message, Query, RegistryBuilder, delegate, uuid::Uuid,
};
use futures::FutureExt;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Clone, Debug, Default)]
struct User {
    email: String,
    password: String,
}

type Store = Arc<Mutex<HashMap<Uuid, User>>>;

struct RegisterUser {
    envelope: Envelope,
    email: String,
    password: String,
}

impl Message for RegisterUser {
    fn envelope(&self) -> Option<&Envelope> {
        Some(&self.envelope)
    }
}

impl Command for RegisterUser {
    type Output = Uuid;
}

struct ChangeUserPassword {
    user_id: Uuid,
    old_password: String,
    new_password: String,
}

impl Message for ChangeUserPassword {}
impl Command for ChangeUserPassword {
    type Output = ();
}

struct UserCreated {
    user_id: Uuid,
}

impl Message for UserCreated {}
impl Event for UserCreated {}

struct GetUserById(Uuid);

impl Message for GetUserById {}
impl Query for GetUserById {
    type Output = Option<User>;
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct InvalidOperation(String);

struct Welcome;

impl EventHandler<UserCreated> for Welcome {
    async fn handle(&self, evt: &UserCreated, _cancel: &CancellationToken) -> Result<(), BoxError> {
        info!(user_id = %evt.user_id, "sending welcome mail");
        Ok(())
    }
}

fn registry(store: &Store) -> Result<courier::Registry, courier::RegistryError> {
    let register = store.clone();
    let change = store.clone();
    let lookup = store.clone();

    RegistryBuilder::new()
        .filter(LoggingFilter::named("user_store"))
        .command::<RegisterUser, _>(delegate::command::<RegisterUser, _>(move |cmd, cancel| {
            let store = register.clone();
            async move {
                if store
                    .lock()
                    .unwrap()
                    .values()
                    .any(|u| u.email.eq_ignore_ascii_case(&cmd.email))
                {
                    return Err(InvalidOperation("duplicated user email".into()).into());
                }

                cancel.guard(tokio::time::sleep(Duration::from_secs(1))).await?;

                let user_id = Uuid::new_v4();
                store.lock().unwrap().insert(
                    user_id,
                    User {
                        email: cmd.email.clone(),
                        password: cmd.password.clone(),
                    },
                );
                Ok::<_, BoxError>(user_id)
            }
            .boxed()
        }))
        .command::<ChangeUserPassword, _>(delegate::command::<ChangeUserPassword, _>(
            move |cmd, cancel| {
                let store = change.clone();
                async move {
                    let current = store.lock().unwrap().get(&cmd.user_id).cloned();
                    let Some(mut user) = current else {
                        return Err(InvalidOperation(format!(
                            "user id '{}' could not be found",
                            cmd.user_id
                        ))
                        .into());
                    };
                    if user.password != cmd.old_password {
                        return Err(InvalidOperation(format!(
                            "invalid password for user id '{}'",
                            cmd.user_id
                        ))
                        .into());
                    }

                    cancel.guard(tokio::time::sleep(Duration::from_secs(1))).await?;

                    user.password = cmd.new_password.clone();
                    store.lock().unwrap().insert(cmd.user_id, user);
                    Ok::<_, BoxError>(())
                }
                .boxed()
            },
        ))
        .query::<GetUserById, _>(delegate::query::<GetUserById, _>(move |query, _cancel| {
            let found = lookup.lock().unwrap().get(&query.0).cloned();
            async move { Ok(found) }.boxed()
        }))
        .event::<UserCreated, _>(Welcome)
        .build()
}

async fn run(mediator: &Mediator, cancel: &CancellationToken) -> Result<(), courier::Error> {
    let user_id = mediator
        .send(
            &RegisterUser {
                envelope: Envelope::new().created_by("demo"),
                email: "john.doe@example.com".into(),
                password: "123456".into(),
            },
            cancel,
        )
        .await?;
    info!(%user_id, "user registered");
    mediator.broadcast(&UserCreated { user_id }, cancel).await?;

    let duplicate = RegisterUser {
        envelope: Envelope::new(),
        email: "JOHN.DOE@example.com".into(),
        password: "654321".into(),
    };
    if let Err(err) = mediator.send(&duplicate, cancel).await {
        warn!(%err, "second registration rejected");
    }

    let wrong = ChangeUserPassword {
        user_id,
        old_password: "nope".into(),
        new_password: "abcdef".into(),
    };
    if let Err(err) = mediator.send(&wrong, cancel).await {
        warn!(%err, "password change rejected");
    }

    mediator
        .send(
            &ChangeUserPassword {
                user_id,
                old_password: "123456".into(),
                new_password: "abcdef".into(),
            },
            cancel,
        )
        .await?;

    let user = mediator.fetch(&GetUserById(user_id), cancel).await?;
    info!(?user, "user after password change");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let store = Store::default();
    let mediator = Mediator::new(registry(&store)?);

    info!("application started");
    match run(&mediator, &cancel).await {
        Ok(()) => info!(users = store.lock().unwrap().len(), "application finished"),
        Err(err) if err.is_canceled() => warn!("the run has been canceled"),
        Err(err) => error!(%err, "fatal error"),
    }
    Ok(())
}
