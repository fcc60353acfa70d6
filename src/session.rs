use crate::device::DeviceClass;
use crate::labels::Labels;

/// Location reported before any lookup has succeeded.
pub const LOCATION_UNAUTHORIZED: &str = "Localização não autorizada";

pub struct Session {
    pub language: String,
    pub labels: Labels,
    pub user_location: String,
    pub device: DeviceClass,
}

impl Session {
    pub fn new(language: &str, device: DeviceClass) -> Self {
        Self {
            language: language.to_string(),
            labels: Labels::for_language(language),
            user_location: LOCATION_UNAUTHORIZED.to_string(),
            device,
        }
    }

    pub fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
        self.labels = Labels::for_language(language);
    }
}
