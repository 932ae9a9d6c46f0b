use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub store_name: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub store_name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
}

impl From<crate::models::settings::Settings> for SettingsResponse {
    fn from(settings: crate::models::settings::Settings) -> Self {
        Self {
            store_name: settings.store_name,
            primary_color: settings.primary_color,
            secondary_color: settings.secondary_color,
            accent_color: settings.accent_color,
        }
    }
}
