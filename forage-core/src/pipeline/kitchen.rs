//! Generate-then-save flow for one session.

use std::sync::Arc;

use super::{Orchestrator, PersistenceGateway};
use crate::config::DEFAULT_IDENTITY_TEMPLATE;
use crate::error::{GenerationError, PersistError};
use crate::identity::IdentityProvider;
use crate::session::{GenerationInputs, Session};
use crate::types::{CompleteDraft, PersistStep, PersistedRecipe};

/// Result of a successful generation attempt.
///
/// `saved` is the persistence outcome. A failed save does not undo the
/// generation: the draft is still shown to the user and stays unsynced on
/// the session.
#[derive(Debug, Clone)]
pub struct CookOutcome {
    pub draft: CompleteDraft,
    pub saved: Result<PersistedRecipe, PersistError>,
}

pub struct Kitchen {
    orchestrator: Orchestrator,
    gateway: PersistenceGateway,
    identity: Arc<dyn IdentityProvider>,
    identity_template: String,
}

impl Kitchen {
    pub fn new(
        orchestrator: Orchestrator,
        gateway: PersistenceGateway,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            orchestrator,
            gateway,
            identity,
            identity_template: DEFAULT_IDENTITY_TEMPLATE.to_string(),
        }
    }

    pub fn with_identity_template(mut self, template: impl Into<String>) -> Self {
        self.identity_template = template.into();
        self
    }

    /// Generate a recipe and save it.
    ///
    /// Generation failures are returned as errors and nothing is saved.
    pub async fn cook(&self, session: &mut Session) -> Result<CookOutcome, GenerationError> {
        let draft = self.orchestrator.generate(session).await?;
        Ok(self.save(session, draft).await)
    }

    /// Regenerate with a flushed cache, then save the new recipe.
    pub async fn recook(&self, session: &mut Session) -> Result<CookOutcome, GenerationError> {
        let draft = self.orchestrator.regenerate(session).await?;
        Ok(self.save(session, draft).await)
    }

    /// Try again to save a generated recipe whose save failed.
    ///
    /// The record is built from the ingredients and meal type the draft was
    /// generated from, even if the session's selection changed since.
    /// Returns `None` when the session has nothing waiting to be saved.
    pub async fn retry_save(
        &self,
        session: &mut Session,
    ) -> Option<Result<PersistedRecipe, PersistError>> {
        if !session.has_unsynced_result() {
            return None;
        }
        let draft = session.draft().complete()?;
        Some(self.save(session, draft).await.saved)
    }

    async fn save(&self, session: &mut Session, draft: CompleteDraft) -> CookOutcome {
        let saved = match session.generated_from().cloned() {
            Some(inputs) => self.persist(&draft, &inputs).await,
            None => Err(PersistError::new(
                PersistStep::Create,
                "draft has no recorded generation inputs",
            )),
        };

        if let Err(e) = &saved {
            tracing::warn!(title = %draft.title(), error = %e, "Recipe generated but not saved");
        }
        session.record_persist_result(&saved);
        CookOutcome { draft, saved }
    }

    async fn persist(
        &self,
        draft: &CompleteDraft,
        inputs: &GenerationInputs,
    ) -> Result<PersistedRecipe, PersistError> {
        let token = self.identity.token(&self.identity_template).await;
        self.gateway
            .persist(draft, &inputs.ingredients, inputs.meal_type, token.as_deref())
            .await
    }
}
