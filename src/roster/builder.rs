use anyhow::{Context, Result};
use futures_util::{stream, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};

use super::RosterEntry;
use crate::config::RosterConfig;
use crate::slack::{Channel, ChatDirectory, MemberProfile};

/// Which members are excluded from the roster by email.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterFilter {
    /// Lower-cased domain without the `@`; `None` disables filtering.
    staff_domain: Option<String>,
}

impl RosterFilter {
    pub fn new(staff_domain: Option<&str>) -> Self {
        let staff_domain = staff_domain
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty());
        Self { staff_domain }
    }

    pub fn from_config(config: &RosterConfig) -> Self {
        if config.filter_staff {
            Self::new(Some(&config.staff_email_domain))
        } else {
            Self::new(None)
        }
    }

    pub fn staff_domain(&self) -> Option<&str> {
        self.staff_domain.as_deref()
    }

    /// Members without an email are never excluded.
    pub fn excludes(&self, email: Option<&str>) -> bool {
        match (&self.staff_domain, email) {
            (Some(domain), Some(email)) => email.to_lowercase().contains(&format!("@{}", domain)),
            _ => false,
        }
    }
}

fn display_name(member_id: &str, profile: &MemberProfile) -> String {
    [profile.real_name.trim(), profile.display_name.trim()]
        .into_iter()
        .find(|n| !n.is_empty())
        .unwrap_or(member_id)
        .to_string()
}

/// Fetch the channel's members and turn them into roster entries, in
/// channel order, with duplicates and filtered members removed.
pub async fn build_roster(
    directory: &dyn ChatDirectory,
    channel_name: &str,
    filter: &RosterFilter,
    concurrency: usize,
) -> Result<(Channel, Vec<RosterEntry>)> {
    let channel = directory.find_channel(channel_name).await?;

    let mut member_ids = directory
        .channel_members(&channel.id)
        .await
        .with_context(|| format!("failed to list members of #{}", channel.name))?;
    let fetched = member_ids.len();
    let mut seen = HashSet::new();
    member_ids.retain(|id| seen.insert(id.clone()));
    tracing::info!(channel = %channel.name, fetched, unique = member_ids.len(), "channel members listed");

    let profiles: Vec<(String, MemberProfile)> = stream::iter(member_ids)
        .map(move |id| async move {
            let profile = directory.profile(&id).await?;
            Ok::<_, anyhow::Error>((id, profile))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let usernames = match directory.usernames().await {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(error = %e, "username lookup failed, continuing without handles");
            HashMap::new()
        }
    };

    let mut excluded = 0usize;
    let entries: Vec<RosterEntry> = profiles
        .into_iter()
        .filter(|(id, profile)| {
            let drop = filter.excludes(profile.email.as_deref());
            if drop {
                excluded += 1;
                tracing::debug!(member = %id, "excluded by staff email filter");
            }
            !drop
        })
        .map(|(id, profile)| RosterEntry {
            username: usernames.get(&id).cloned(),
            name: display_name(&id, &profile),
            avatar_url: profile.avatar_url,
            count: 0,
            last_picked: None,
            member_id: id,
        })
        .collect();

    tracing::info!(
        channel = %channel.name,
        kept = entries.len(),
        excluded,
        domain = filter.staff_domain().unwrap_or("-"),
        "roster built"
    );

    if entries.is_empty() {
        anyhow::bail!("#{} has no eligible members after filtering", channel.name);
    }

    Ok((channel, entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_domain_case_insensitively() {
        let filter = RosterFilter::new(Some("@Galvanize.com"));
        assert!(filter.excludes(Some("Frank.B@GALVANIZE.COM")));
        assert!(!filter.excludes(Some("student@gmail.com")));
        assert!(!filter.excludes(None));
    }

    #[test]
    fn test_disabled_filter_keeps_everyone() {
        let filter = RosterFilter::new(None);
        assert!(!filter.excludes(Some("staff@galvanize.com")));
        assert_eq!(RosterFilter::new(Some("  ")), RosterFilter::new(None));
    }

    #[test]
    fn test_from_config_respects_toggle() {
        let mut config = RosterConfig::default();
        assert_eq!(RosterFilter::from_config(&config).staff_domain(), Some("galvanize.com"));
        config.filter_staff = false;
        assert_eq!(RosterFilter::from_config(&config).staff_domain(), None);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut profile = MemberProfile {
            real_name: "Ada Lovelace".to_string(),
            display_name: "ada".to_string(),
            ..Default::default()
        };
        assert_eq!(display_name("U1", &profile), "Ada Lovelace");
        profile.real_name = " ".to_string();
        assert_eq!(display_name("U1", &profile), "ada");
        profile.display_name.clear();
        assert_eq!(display_name("U1", &profile), "U1");
    }
}
