use std::sync::Arc;

use squeezer_core::{Config, MediaSkill, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    skill: Arc<MediaSkill>,
}

impl AppState {
    pub fn new(config: Config, skill: Arc<MediaSkill>) -> Self {
        Self { config, skill }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn skill(&self) -> &MediaSkill {
        self.skill.as_ref()
    }
}
