pub mod rest;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use types::SlackProfile;

/// A channel resolved by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// Provider-agnostic view of a member's profile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemberProfile {
    pub real_name: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: String,
}

impl From<SlackProfile> for MemberProfile {
    fn from(p: SlackProfile) -> Self {
        let avatar_url = p
            .image_192
            .filter(|u| !u.is_empty())
            .or(p.image_72)
            .unwrap_or_default();
        Self {
            real_name: p.real_name,
            display_name: p.display_name,
            email: p.email.filter(|e| !e.is_empty()),
            avatar_url,
        }
    }
}

/// Read-only access to a chat workspace's channels and people.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    async fn find_channel(&self, name: &str) -> Result<Channel>;
    async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>>;
    async fn profile(&self, member_id: &str) -> Result<MemberProfile>;
    /// Member id -> handle for every active user in the workspace.
    async fn usernames(&self) -> Result<HashMap<String, String>>;
}

/// Channel names are compared without a leading `#` and case-insensitively.
pub fn normalize_channel_name(name: &str) -> String {
    name.trim().trim_start_matches('#').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_prefers_192() {
        let profile = MemberProfile::from(SlackProfile {
            real_name: "Grace Hopper".to_string(),
            image_192: Some("https://x/192.png".to_string()),
            image_72: Some("https://x/72.png".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.avatar_url, "https://x/192.png");
    }

    #[test]
    fn test_avatar_falls_back_to_72() {
        let profile = MemberProfile::from(SlackProfile {
            image_192: Some(String::new()),
            image_72: Some("https://x/72.png".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.avatar_url, "https://x/72.png");
    }

    #[test]
    fn test_empty_email_becomes_none() {
        let profile = MemberProfile::from(SlackProfile {
            email: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(profile.email, None);
        assert_eq!(profile.avatar_url, "");
    }

    #[test]
    fn test_normalize_channel_name() {
        assert_eq!(normalize_channel_name("#G39DS_Platte "), "g39ds_platte");
        assert_eq!(normalize_channel_name("general"), "general");
    }
}
