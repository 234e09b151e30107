use crate::db::RecordStore;
use crate::error::ChurchError;
use crate::service::summary::{AtRiskPolicy, SummaryOutcome, compute_at_risk};

use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Messages handled by the summary actor.
#[derive(Debug)]
pub enum SummaryMessage {
    /// Rebuild the at-risk table now and reply with the outcome.
    Rebuild(RpcReplyPort<Result<SummaryOutcome, ChurchError>>),
    /// Rebuild in the background; failures are only logged.
    RequestRebuild,
}

/// Handle for interacting with the summary actor.
#[derive(Clone)]
pub struct SummaryHandle {
    actor: ActorRef<SummaryMessage>,
}

impl SummaryHandle {
    pub async fn rebuild(&self) -> Result<SummaryOutcome, ChurchError> {
        ractor::call!(self.actor, SummaryMessage::Rebuild)
            .map_err(|e| ChurchError::RactorError(format!("Rebuild RPC failed: {e}")))?
    }

    pub fn request_rebuild(&self) {
        if let Err(e) = ractor::cast!(self.actor, SummaryMessage::RequestRebuild) {
            warn!("failed to queue at-risk rebuild: {}", e);
        }
    }
}

/// Internal state held by the summary actor
struct SummaryActorState {
    store: Arc<dyn RecordStore>,
    policy: AtRiskPolicy,
}

/// Rebuilds run one at a time inside the actor, so the summary table is
/// never written by two rebuilds at once.
struct SummaryActor;

#[ractor::async_trait]
impl Actor for SummaryActor {
    type Msg = SummaryMessage;
    type State = SummaryActorState;
    type Arguments = SummaryActorState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!(
            window = state.policy.window,
            missed_threshold = state.policy.missed_threshold,
            "SummaryActor started"
        );
        Ok(state)
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SummaryMessage::Rebuild(rp) => {
                let res = rebuild(state).await;
                let _ = rp.send(res);
            }
            SummaryMessage::RequestRebuild => {
                if let Err(e) = rebuild(state).await {
                    warn!("background at-risk rebuild failed: {}", e);
                }
            }
        }
        Ok(())
    }
}

async fn rebuild(state: &SummaryActorState) -> Result<SummaryOutcome, ChurchError> {
    let members = state.store.list_members().await?;
    let attendance = state.store.list_attendance().await?;

    match compute_at_risk(&members, &attendance, state.policy, Utc::now()) {
        Err(have) => {
            let need = state.policy.window.max(1);
            debug!(have, need, "not enough services for at-risk summary");
            Ok(SummaryOutcome::NotEnoughServices { have, need })
        }
        Ok(rows) => {
            state.store.replace_summary(&rows).await?;
            info!(at_risk = rows.len(), "at-risk summary rebuilt");
            Ok(SummaryOutcome::Rebuilt {
                at_risk: rows.len(),
            })
        }
    }
}

/// Async spawn of the summary actor and return a handle.
pub async fn spawn(
    store: Arc<dyn RecordStore>,
    policy: AtRiskPolicy,
) -> Result<SummaryHandle, ChurchError> {
    let (actor, _jh) = Actor::spawn(None, SummaryActor, SummaryActorState { store, policy })
        .await
        .map_err(|e| ChurchError::RactorError(format!("failed to spawn SummaryActor: {e}")))?;
    Ok(SummaryHandle { actor })
}
