use crate::error::{GateError, Result};
use crate::models::BlockedApp;

/// Apps gated out of the box.
pub fn default_blocked_apps() -> Vec<BlockedApp> {
    vec![
        BlockedApp::new("Instagram", "com.instagram.android"),
        BlockedApp::new("YouTube", "com.google.android.youtube"),
        BlockedApp::new("Facebook", "com.facebook.katana"),
    ]
}

/// The single list of gated apps, read by both the interception check and
/// the toggle list.
#[derive(Debug, Clone, Default)]
pub struct BlockedAppRegistry {
    apps: Vec<BlockedApp>,
}

impl BlockedAppRegistry {
    /// Seeds the registry, keeping the first entry for a repeated identifier.
    pub fn seeded(seed: impl IntoIterator<Item = BlockedApp>) -> Self {
        let mut apps: Vec<BlockedApp> = Vec::new();
        for app in seed {
            if app.package_identifier.trim().is_empty() {
                log::warn!("Skipping blocked app '{}' with empty package identifier", app.name);
                continue;
            }
            if apps
                .iter()
                .any(|existing| existing.package_identifier == app.package_identifier)
            {
                log::warn!("Duplicate blocked app '{}' ignored", app.package_identifier);
                continue;
            }
            apps.push(app);
        }
        Self { apps }
    }

    pub fn list_apps(&self) -> &[BlockedApp] {
        &self.apps
    }

    /// Flips `is_selected`. The caller passes a freshly evaluated unlock
    /// state; while locked nothing is touched.
    pub fn toggle_selection(
        &mut self,
        package_identifier: &str,
        currently_unlocked: bool,
    ) -> Result<BlockedApp> {
        if !currently_unlocked {
            return Err(GateError::LockedState);
        }
        let app = self
            .apps
            .iter_mut()
            .find(|app| app.package_identifier == package_identifier)
            .ok_or_else(|| GateError::AppNotFound(package_identifier.to_string()))?;
        app.is_selected = !app.is_selected;
        Ok(app.clone())
    }

    /// Re-applies a persisted selection flag. Unknown identifiers are skipped.
    pub fn restore_selection(&mut self, package_identifier: &str, is_selected: bool) -> bool {
        match self
            .apps
            .iter_mut()
            .find(|app| app.package_identifier == package_identifier)
        {
            Some(app) => {
                app.is_selected = is_selected;
                true
            }
            None => false,
        }
    }

    /// Membership alone gates interception; `is_selected` does not.
    pub fn is_blocked(&self, package_identifier: &str) -> bool {
        self.apps
            .iter()
            .any(|app| app.package_identifier == package_identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seeding_drops_duplicates_and_blank_ids() {
        let registry = BlockedAppRegistry::seeded(vec![
            BlockedApp::new("Instagram", "com.instagram.android"),
            BlockedApp::new("Insta again", "com.instagram.android"),
            BlockedApp::new("Nothing", "  "),
            BlockedApp::new("Facebook", "com.facebook.katana"),
        ]);
        let ids: Vec<_> = registry
            .list_apps()
            .iter()
            .map(|app| app.package_identifier.as_str())
            .collect();
        assert_eq!(ids, ["com.instagram.android", "com.facebook.katana"]);
        assert_eq!(registry.list_apps()[0].name, "Instagram");
    }

    #[test]
    fn toggle_while_locked_is_rejected() {
        let mut registry = BlockedAppRegistry::seeded(default_blocked_apps());
        assert_eq!(
            registry.toggle_selection("com.instagram.android", false),
            Err(GateError::LockedState)
        );
        assert!(!registry.list_apps()[0].is_selected);
    }

    #[test]
    fn toggle_while_unlocked_flips() {
        let mut registry = BlockedAppRegistry::seeded(default_blocked_apps());
        let app = registry.toggle_selection("com.google.android.youtube", true).unwrap();
        assert!(app.is_selected);
        let app = registry.toggle_selection("com.google.android.youtube", true).unwrap();
        assert!(!app.is_selected);
    }

    #[test]
    fn toggle_unknown_app_is_not_found() {
        let mut registry = BlockedAppRegistry::seeded(default_blocked_apps());
        let err = registry.toggle_selection("org.example.unknown", true).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn membership_ignores_selection() {
        let mut registry = BlockedAppRegistry::seeded(default_blocked_apps());
        assert!(registry.is_blocked("com.facebook.katana"));
        registry.restore_selection("com.facebook.katana", true);
        assert!(registry.is_blocked("com.facebook.katana"));
        assert!(!registry.is_blocked("com.whatsapp"));
        assert!(!registry.restore_selection("com.whatsapp", true));
    }

    proptest! {
        #[test]
        fn locked_toggle_never_changes_selection(
            initial in prop::collection::vec(any::<bool>(), 3),
            target in 0usize..3,
        ) {
            let mut registry = BlockedAppRegistry::seeded(default_blocked_apps());
            let ids: Vec<String> = registry
                .list_apps()
                .iter()
                .map(|app| app.package_identifier.clone())
                .collect();
            for (id, selected) in ids.iter().zip(&initial) {
                registry.restore_selection(id, *selected);
            }
            let before = registry.list_apps().to_vec();

            prop_assert_eq!(
                registry.toggle_selection(&ids[target], false),
                Err(GateError::LockedState)
            );
            prop_assert_eq!(registry.list_apps(), before.as_slice());
        }
    }
}
