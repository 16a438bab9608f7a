//! Per-identity theme preferences.
//!
//! Stored under `theme_preferences_{id}` next to the credentials, with
//! `guest` standing in for the id when nobody is signed in. They are not
//! part of the session and are left in place on logout.

use serde::{Deserialize, Serialize};

pub const GUEST_ID: &str = "guest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorPalette {
    Default,
    DarkElegant,
    Vibrant,
    Creative,
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreferences {
    pub mode: ThemeMode,
    pub palette: ColorPalette,
}

impl Default for ThemePreferences {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Dark,
            palette: ColorPalette::Default,
        }
    }
}

/// Storage key for an identity's preferences.
pub fn theme_key(identity_id: Option<&str>) -> String {
    format!("theme_preferences_{}", identity_id.unwrap_or(GUEST_ID))
}
