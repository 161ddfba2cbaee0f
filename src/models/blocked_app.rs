use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlockedApp {
    pub name: String,
    /// Platform identifier matched against focus events.
    pub package_identifier: String,
    #[serde(default)]
    pub is_selected: bool,
}

impl BlockedApp {
    pub fn new(name: impl Into<String>, package_identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_identifier: package_identifier.into(),
            is_selected: false,
        }
    }
}
