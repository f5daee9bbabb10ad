//! # ordo-llm
//!
//! Language-model clients implementing
//! [`LanguageModel`](ordo_core::traits::LanguageModel):
//!
//! - `MistralClient`: the hosted chat-completions API
//! - `OfflineModel`: deterministic, no network
//!
//! `model_from_settings` is shaped to be used as the agent's model factory.

pub mod mistral;
pub mod offline;

use std::sync::Arc;

use tracing::info;

use ordo_contracts::error::OrdoResult;
use ordo_core::{config::LlmSettings, traits::LanguageModel};

pub use mistral::MistralClient;
pub use offline::OfflineModel;

/// Build the configured model.
///
/// `offline` selects `OfflineModel`. Otherwise a `MistralClient` is built,
/// or `None` when no API key is configured.
pub fn model_from_settings(
    settings: &LlmSettings,
    offline: bool,
) -> OrdoResult<Option<Arc<dyn LanguageModel>>> {
    if offline {
        info!("using offline model");
        return Ok(Some(Arc::new(OfflineModel)));
    }

    match MistralClient::from_settings(settings)? {
        Some(client) => {
            info!(model = %client.model(), "using Mistral model");
            Ok(Some(Arc::new(client)))
        }
        None => Ok(None),
    }
}
