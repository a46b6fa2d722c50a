#[cfg(test)]
use crate::api::gemini::GenerateContentRequest;
#[cfg(test)]
use crate::core::app::App;
#[cfg(test)]
use crate::core::attachment::AttachmentEncoder;
#[cfg(test)]
use crate::core::gemini::ChatProvider;
#[cfg(test)]
use crate::core::provider_error::ProviderError;
#[cfg(test)]
use crate::core::session::Orchestrator;
#[cfg(test)]
use crate::utils::logging::LoggingState;
#[cfg(test)]
use std::path::PathBuf;
#[cfg(test)]
use std::sync::Arc;

/// Primary provider that always answers with the same text.
#[cfg(test)]
pub struct ScriptedProvider {
    pub reply: String,
}

#[cfg(test)]
#[async_trait::async_trait]
impl ChatProvider for ScriptedProvider {
    async fn generate(&self, _request: &GenerateContentRequest) -> Result<String, ProviderError> {
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
pub fn create_test_app(reply: &str) -> App {
    let orchestrator = Orchestrator::new(
        Arc::new(ScriptedProvider {
            reply: reply.to_string(),
        }),
        None,
    );
    App::new(
        Arc::new(orchestrator),
        AttachmentEncoder::default(),
        LoggingState::new(None).unwrap(),
        "test-model",
    )
}

#[cfg(test)]
pub fn write_temp_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
