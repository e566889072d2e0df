use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use senbetsu_core::error::SenbetsuError;
use senbetsu_core::filter::{ReleaseGroupFilter, Verdict};
use senbetsu_core::models::EntityId;
use senbetsu_core::storage::Storage;

/// Allow and deny lists of one show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterLists {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

/// Async handle to the filter actor. Cloning shares the same actor.
#[derive(Clone)]
pub struct FilterHandle {
    tx: mpsc::UnboundedSender<FilterCommand>,
}

enum FilterCommand {
    GetLists {
        entity: EntityId,
        reply: oneshot::Sender<Result<FilterLists, SenbetsuError>>,
    },
    SetAllow {
        entity: EntityId,
        values: Vec<String>,
        reply: oneshot::Sender<Result<(), SenbetsuError>>,
    },
    SetDeny {
        entity: EntityId,
        values: Vec<String>,
        reply: oneshot::Sender<Result<(), SenbetsuError>>,
    },
    Evaluate {
        entity: EntityId,
        release_group: Option<String>,
        reply: oneshot::Sender<Result<Verdict, SenbetsuError>>,
    },
    GetEntities {
        reply: oneshot::Sender<Result<Vec<EntityId>, SenbetsuError>>,
    },
}

impl FilterHandle {
    /// Open the database at `path` and start the actor thread.
    pub fn open(path: &Path) -> Result<Self, SenbetsuError> {
        let storage = Storage::open(path).inspect_err(|e| {
            tracing::error!("Failed to open database: {e}");
        })?;
        Self::with_storage(storage)
    }

    /// Start the actor thread on an already opened store.
    pub fn with_storage(storage: Storage) -> Result<Self, SenbetsuError> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("filter-actor".into())
            .spawn(move || actor_loop(storage, rx))
            .inspect_err(|e| tracing::error!("Failed to spawn filter thread: {e}"))?;

        Ok(Self { tx })
    }

    pub async fn lists(&self, entity: EntityId) -> Result<FilterLists, SenbetsuError> {
        let (reply, rx) = oneshot::channel();
        self.send(FilterCommand::GetLists { entity, reply })?;
        rx.await.unwrap_or(Err(SenbetsuError::ActorClosed))
    }

    pub async fn set_allow(
        &self,
        entity: EntityId,
        values: Vec<String>,
    ) -> Result<(), SenbetsuError> {
        let (reply, rx) = oneshot::channel();
        self.send(FilterCommand::SetAllow {
            entity,
            values,
            reply,
        })?;
        rx.await.unwrap_or(Err(SenbetsuError::ActorClosed))
    }

    pub async fn set_deny(&self, entity: EntityId, values: Vec<String>) -> Result<(), SenbetsuError> {
        let (reply, rx) = oneshot::channel();
        self.send(FilterCommand::SetDeny {
            entity,
            values,
            reply,
        })?;
        rx.await.unwrap_or(Err(SenbetsuError::ActorClosed))
    }

    /// Evaluate a release group against the show's current lists.
    pub async fn evaluate(
        &self,
        entity: EntityId,
        release_group: Option<String>,
    ) -> Result<Verdict, SenbetsuError> {
        let (reply, rx) = oneshot::channel();
        self.send(FilterCommand::Evaluate {
            entity,
            release_group,
            reply,
        })?;
        rx.await.unwrap_or(Err(SenbetsuError::ActorClosed))
    }

    pub async fn is_accepted(
        &self,
        entity: EntityId,
        release_group: Option<String>,
    ) -> Result<bool, SenbetsuError> {
        Ok(self.evaluate(entity, release_group).await?.is_accepted())
    }

    /// Shows that have at least one keyword configured.
    pub async fn entities(&self) -> Result<Vec<EntityId>, SenbetsuError> {
        let (reply, rx) = oneshot::channel();
        self.send(FilterCommand::GetEntities { reply })?;
        rx.await.unwrap_or(Err(SenbetsuError::ActorClosed))
    }

    fn send(&self, cmd: FilterCommand) -> Result<(), SenbetsuError> {
        self.tx.send(cmd).map_err(|_| SenbetsuError::ActorClosed)
    }
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<FilterCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            FilterCommand::GetLists { entity, reply } => {
                let result = ReleaseGroupFilter::for_entity(entity, &storage).map(|f| FilterLists {
                    allow: f.allow_list().to_vec(),
                    deny: f.deny_list().to_vec(),
                });
                let _ = reply.send(result);
            }
            FilterCommand::SetAllow {
                entity,
                values,
                reply,
            } => {
                let result = ReleaseGroupFilter::for_entity(entity, &storage)
                    .and_then(|mut f| f.set_allow(values));
                if let Err(e) = &result {
                    tracing::warn!("Failed to set allow list: {e}");
                }
                let _ = reply.send(result);
            }
            FilterCommand::SetDeny {
                entity,
                values,
                reply,
            } => {
                let result = ReleaseGroupFilter::for_entity(entity, &storage)
                    .and_then(|mut f| f.set_deny(values));
                if let Err(e) = &result {
                    tracing::warn!("Failed to set deny list: {e}");
                }
                let _ = reply.send(result);
            }
            FilterCommand::Evaluate {
                entity,
                release_group,
                reply,
            } => {
                let result = ReleaseGroupFilter::for_entity(entity, &storage)
                    .map(|f| f.evaluate(&release_group.as_deref()));
                let _ = reply.send(result);
            }
            FilterCommand::GetEntities { reply } => {
                let _ = reply.send(storage.entities_with_keywords());
            }
        }
    }
    tracing::debug!("filter actor stopped");
}
