use thiserror::Error;

use crate::types::{GenerationStage, PersistStep};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown ingredient id: {0}")]
    UnknownIngredient(u32),
}

/// Why a single generation stage produced nothing usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageFailure {
    #[error("service returned an empty result")]
    Empty,

    #[error("service call failed: {0}")]
    Service(String),
}

/// Failure of a generation attempt. Aborts the whole attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No ingredients selected")]
    EmptySelection,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Error generating {stage}: {reason}")]
    Stage {
        stage: GenerationStage,
        reason: StageFailure,
    },
}

impl GenerationError {
    /// The stage that failed, if the attempt got as far as calling the service.
    pub fn stage(&self) -> Option<GenerationStage> {
        match self {
            GenerationError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub(crate) fn empty(stage: GenerationStage) -> Self {
        GenerationError::Stage {
            stage,
            reason: StageFailure::Empty,
        }
    }

    pub(crate) fn service(stage: GenerationStage, message: impl Into<String>) -> Self {
        GenerationError::Stage {
            stage,
            reason: StageFailure::Service(message.into()),
        }
    }
}

/// Failure of one persistence step.
///
/// Only `PersistStep::Create` ever reaches callers of the gateway; upload and
/// backfill failures are logged and absorbed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Recipe {step} step failed: {message}")]
pub struct PersistError {
    pub step: PersistStep,
    pub message: String,
}

impl PersistError {
    pub fn new(step: PersistStep, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
        }
    }
}
