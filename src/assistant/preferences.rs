use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Assistant preferences. Records persisted by older clients use `autoSave`
/// and may still carry an API key field; the key is ignored on load and
/// never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub notifications: bool,
    #[serde(alias = "autoSave")]
    pub auto_save: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            notifications: true,
            auto_save: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PreferencesPatch {
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
    pub auto_save: Option<bool>,
}

impl Preferences {
    /// Applies the set fields; returns whether anything changed.
    pub fn apply(&mut self, patch: PreferencesPatch) -> bool {
        let before = self.clone();
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(n) = patch.notifications {
            self.notifications = n;
        }
        if let Some(a) = patch.auto_save {
            self.auto_save = a;
        }
        *self != before
    }
}
