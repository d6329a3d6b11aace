//! Per-user accessibility and notification settings.

use serde::{Deserialize, Serialize};

/// One-to-one with a user; document id equals the user id.
/// Created lazily with these defaults on first read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    pub user_id: String,
    /// Text-to-speech voice name; empty means browser default.
    #[serde(default)]
    pub tts_voice: String,
    #[serde(default = "default_tts_rate")]
    pub tts_rate: f64,
    #[serde(default = "default_tts_volume")]
    pub tts_volume: f64,
    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default = "default_true")]
    pub application_updates: bool,
    /// Offset in points applied on top of the base font size.
    #[serde(default)]
    pub font_size_offset: i32,
    #[serde(default)]
    pub high_contrast: bool,
}

fn default_tts_rate() -> f64 {
    1.0
}

fn default_tts_volume() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl UserSettings {
    /// Defaults for a user who has never saved settings.
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            tts_voice: String::new(),
            tts_rate: 1.0,
            tts_volume: 1.0,
            email_notifications: true,
            application_updates: true,
            font_size_offset: 0,
            high_contrast: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_notification_on_and_neutral_display() {
        let s = UserSettings::defaults_for("u1");
        assert!(s.email_notifications);
        assert!(s.application_updates);
        assert_eq!(s.font_size_offset, 0);
        assert!(!s.high_contrast);
        assert_eq!(s.tts_rate, 1.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: UserSettings =
            serde_json::from_str(r#"{"user_id":"u1","high_contrast":true}"#).unwrap();
        assert!(s.high_contrast);
        assert!(s.email_notifications);
        assert_eq!(s.tts_volume, 1.0);
    }
}
