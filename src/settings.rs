use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use crate::apps::default_blocked_apps;
use crate::models::BlockedApp;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GateSettings {
    /// Seed list for the registry; order is the display order.
    pub blocked_apps: Vec<BlockedApp>,
    /// Package of the control surface. Its focus events settle a redirect.
    pub control_surface_package: String,
    /// Program and arguments that raise the control surface. When unset,
    /// redirects are only logged.
    pub control_surface_command: Option<Vec<String>>,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            blocked_apps: default_blocked_apps(),
            control_surface_package: "com.example.app".into(),
            control_surface_command: None,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<GateSettings>,
}

impl SettingsStore {
    /// Loads settings, writing the defaults out on first run so they can be
    /// edited. A malformed file falls back to defaults and is left untouched.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed settings at {}: {err}", path.display());
                GateSettings::default()
            })
        } else {
            let defaults = GateSettings::default();
            persist(&path, &defaults)?;
            defaults
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> GateSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update(&self, settings: GateSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        persist(&self.path, &settings)?;
        *guard = settings;
        Ok(())
    }
}

fn persist(path: &Path, data: &GateSettings) -> Result<()> {
    let serialized = serde_json::to_string_pretty(data)?;
    fs::write(path, serialized)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.get(), GateSettings::default());
        assert!(path.exists());

        let reread = SettingsStore::new(path).unwrap();
        assert_eq!(reread.get().blocked_apps.len(), 3);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"blockedApps":[{"name":"TikTok","packageIdentifier":"com.zhiliaoapp.musically"}]}"#,
        )
        .unwrap();

        let settings = SettingsStore::new(path).unwrap().get();
        assert_eq!(settings.blocked_apps.len(), 1);
        assert!(!settings.blocked_apps[0].is_selected);
        assert_eq!(settings.control_surface_package, "com.example.app");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(store.get(), GateSettings::default());
        assert_eq!(fs::read_to_string(path).unwrap(), "{ not json");
    }

    #[test]
    fn update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.get();
        settings.control_surface_command = Some(vec!["true".into()]);
        store.update(settings.clone()).unwrap();

        assert_eq!(SettingsStore::new(path).unwrap().get(), settings);
    }
}
