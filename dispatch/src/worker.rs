use crate::Job;
use entity_api::error::EntityApiErrorKind;
use entity_api::{notification, user};
use log::*;
use push::{Manager, OutboundEvent};
use sea_orm::DatabaseConnection;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Fallback actor label when the acting account no longer exists.
const ANONYMOUS_ACTOR: &str = "Someone";

/// Failure of a single delivery attempt.
#[derive(Debug)]
pub enum DeliveryError {
    /// The recipient account no longer exists. Terminal: retrying cannot
    /// succeed, the job is dropped.
    RecipientNotFound { recipient: String },
    /// The store rejected the write; worth retrying.
    Store(entity_api::error::Error),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeliveryError::RecipientNotFound { recipient } => {
                write!(f, "recipient {recipient} not found")
            }
            DeliveryError::Store(err) => write!(f, "notification store error: {err}"),
        }
    }
}

impl StdError for DeliveryError {}

/// Consumes dispatch jobs: persists the notification, then publishes it to
/// the recipient's live sessions. One worker task per process.
pub struct Worker {
    db: Arc<DatabaseConnection>,
    push_manager: Arc<Manager>,
    max_attempts: u32,
    base_backoff: Duration,
}

impl Worker {
    pub fn new(
        db: Arc<DatabaseConnection>,
        push_manager: Arc<Manager>,
        max_attempts: u32,
        base_backoff: Duration,
    ) -> Self {
        Self {
            db,
            push_manager,
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    pub async fn run(self, mut rx: UnboundedReceiver<Job>) {
        info!("Dispatch worker started");

        while let Some(job) = rx.recv().await {
            self.process_with_retry(job).await;
        }

        info!("Dispatch worker stopped: queue closed");
    }

    async fn process_with_retry(&self, job: Job) {
        let mut attempt = 1;

        loop {
            match self.process(&job).await {
                Ok(delivered) => {
                    debug!(
                        "Dispatch job done: recipient={} action={} request_id={} live_deliveries={delivered}",
                        job.recipient, job.action, job.request_id
                    );
                    return;
                }
                Err(err @ DeliveryError::RecipientNotFound { .. }) => {
                    warn!(
                        "Dropping dispatch job: {err} (action={} request_id={})",
                        job.action, job.request_id
                    );
                    return;
                }
                Err(err) if attempt >= self.max_attempts => {
                    error!(
                        "Giving up on dispatch job after {attempt} attempts: {err} \
                         (recipient={} action={} request_id={})",
                        job.recipient, job.action, job.request_id
                    );
                    return;
                }
                Err(err) => {
                    let backoff = self.base_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "Dispatch job failed (attempt {attempt}): {err}; retrying in {backoff:?}"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One delivery attempt. Returns the live-session delivery count; the
    /// persisted row is the source of truth, so a zero count still succeeds.
    async fn process(&self, job: &Job) -> Result<usize, DeliveryError> {
        let db = self.db.as_ref();

        let recipient = match user::find_by_member_id(db, &job.recipient).await {
            Ok(user) => user,
            Err(err) if err.error_kind == EntityApiErrorKind::RecordNotFound => {
                return Err(DeliveryError::RecipientNotFound {
                    recipient: job.recipient.clone(),
                });
            }
            Err(err) => return Err(DeliveryError::Store(err)),
        };

        // A deleted actor degrades to the anonymous label instead of failing
        let actor = match &job.actor {
            Some(actor_id) => user::find_by_member_id(db, actor_id).await.ok(),
            None => None,
        };

        let (verb, message) =
            compose_verb_message(&job.action, actor.as_ref().map(|a| a.username.as_str()));

        let notification = notification::create(
            db,
            recipient.member_id.clone(),
            actor.map(|a| a.member_id),
            verb,
            message,
        )
        .await
        .map_err(DeliveryError::Store)?;

        let payload = match serde_json::to_value(&notification) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "Failed to serialize notification {} for live push: {err}",
                    notification.id
                );
                return Ok(0);
            }
        };

        Ok(self
            .push_manager
            .publish(&job.recipient, OutboundEvent::Notification { data: payload }))
    }
}

/// Maps an action name to the stored verb and the human-readable message.
pub fn compose_verb_message(action: &str, actor_name: Option<&str>) -> (String, String) {
    let name = actor_name.unwrap_or(ANONYMOUS_ACTOR);

    match action {
        "accepted" => (
            "accepted your connection request".to_owned(),
            format!("{name} accepted your connection request."),
        ),
        "rejected" => (
            "rejected your connection request".to_owned(),
            format!("{name} rejected your connection request."),
        ),
        other => (other.to_owned(), format!("{name}: {other}")),
    }
}


#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::Job;
    use entity::{notifications, users, Id};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_model(member_id: &str, username: &str) -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: Id::new_v4(),
            member_id: member_id.to_owned(),
            username: username.to_owned(),
            email: format!("{username}@spcconnect.com"),
            full_name: username.to_owned(),
            contact: "+15550100".to_owned(),
            company_name: String::new(),
            password: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn job(recipient: &str, actor: Option<&str>) -> Job {
        Job {
            recipient: recipient.to_owned(),
            actor: actor.map(str::to_owned),
            action: "accepted".to_owned(),
            request_id: Id::new_v4(),
        }
    }

    #[tokio::test]
    async fn process_persists_and_counts_zero_live_deliveries() {
        let recipient = user_model("SPC-20240915-a1b2c3", "alice");
        let actor = user_model("SPC-20240915-d4e5f6", "bob");

        let now = chrono::Utc::now();
        let stored = notifications::Model {
            id: Id::new_v4(),
            recipient_member_id: recipient.member_id.clone(),
            actor_member_id: Some(actor.member_id.clone()),
            verb: "accepted your connection request".to_owned(),
            message: "bob accepted your connection request.".to_owned(),
            read: false,
            created_at: now.into(),
        };

        // Queries in order: recipient lookup, actor lookup, insert RETURNING
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![recipient.clone()]])
            .append_query_results(vec![vec![actor.clone()]])
            .append_query_results(vec![vec![stored.clone()]])
            .into_connection();

        let worker = Worker::new(
            Arc::new(db),
            Arc::new(Manager::new()),
            3,
            Duration::from_millis(1),
        );

        let delivered = worker
            .process(&job(&recipient.member_id, Some(&actor.member_id)))
            .await
            .unwrap();

        // No live sessions are open, which is still a successful delivery
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn process_is_terminal_when_recipient_is_gone() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<users::Model>::new()])
            .into_connection();

        let worker = Worker::new(
            Arc::new(db),
            Arc::new(Manager::new()),
            3,
            Duration::from_millis(1),
        );

        let err = worker
            .process(&job("SPC-20240915-000000", None))
            .await
            .unwrap_err();

        assert!(matches!(err, DeliveryError::RecipientNotFound { .. }));
    }
}
