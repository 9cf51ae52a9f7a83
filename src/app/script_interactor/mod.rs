// Script interactor - Plans the narration script from clip descriptions

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::error::MovieResult;
use crate::ports::GenerativePort;

/// Interactor for the planning stage
pub struct ScriptInteractor {
    generative: Arc<dyn GenerativePort>,
}

impl ScriptInteractor {
    pub fn new(generative: Arc<dyn GenerativePort>) -> Self {
        Self { generative }
    }

    /// Ask the model for an ordered subset of clips with narration.
    ///
    /// The returned order is authoritative downstream. Clip paths are not checked here.
    pub async fn plan(
        &self,
        descriptions: &[ClipDescription],
        guidance: &str,
        model: &str,
    ) -> MovieResult<Vec<ScriptEntry>> {
        let context = clip_records_json(descriptions)?;
        info!("Planning script from {} clip descriptions", descriptions.len());

        let raw = self
            .generative
            .structured_complete(guidance, &context, SCRIPT_SCHEMA_HINT, model)
            .await?;

        let entries = parse_script_response(&raw).inspect_err(|e| {
            error!(error = %e, "Planner response rejected");
        })?;
        info!("Script has {} entries", entries.len());
        Ok(entries)
    }
}
