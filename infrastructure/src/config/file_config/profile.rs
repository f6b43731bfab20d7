//! User profile from TOML (`[profile]` section)

use reentry_domain::UserInfo;
use serde::{Deserialize, Serialize};

/// Raw profile configuration from TOML
///
/// Sent as `userInfo` with every turn when at least one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProfileConfig {
    pub county: Option<String>,
    pub release_date: Option<String>,
    pub age_18_plus: Option<bool>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl FileProfileConfig {
    /// Profile for outgoing turns, or `None` if nothing is filled in.
    pub fn to_user_info(&self) -> Option<UserInfo> {
        let info = UserInfo {
            county: non_blank(&self.county),
            release_date: non_blank(&self.release_date),
            age_18_plus: self.age_18_plus,
            gender: non_blank(&self.gender),
            email: non_blank(&self.email),
            phone: non_blank(&self.phone),
        };
        (!info.is_empty()).then_some(info)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
