use super::types::*;
use super::{normalize_channel_name, Channel, ChatDirectory, MemberProfile};
use crate::config::SlackConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

const PAGE_LIMIT: &str = "200";

pub struct SlackRest {
    client: Client,
    token: String,
    base_url: String,
    channel_types: &'static str,
}

/// `conversations.list` types to search. Private channels need the
/// `groups:read` scope, which a bot token with only `channels:read` lacks.
pub fn channel_types(config: &SlackConfig) -> &'static str {
    if config.include_private_channels {
        "public_channel,private_channel"
    } else {
        "public_channel"
    }
}

impl SlackRest {
    pub fn new(token: String, config: &SlackConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_max_idle_per_host(config.profile_concurrency.max(1))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            token,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            channel_types: channel_types(config),
        })
    }

    /// Call a Web API method with bearer auth and decode the body once
    /// Slack has confirmed `ok`.
    async fn call<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("{} request failed", method))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("{} failed ({}): {}", method, status, body);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to read {} response", method))?;
        check_ok(method, &body)?;
        serde_json::from_value(body).with_context(|| format!("failed to parse {} response", method))
    }
}

/// Slack reports most failures as HTTP 200 with `"ok": false`.
pub fn check_ok(method: &str, body: &serde_json::Value) -> Result<()> {
    if body.get("ok").and_then(|v| v.as_bool()) == Some(true) {
        return Ok(());
    }
    let error = body
        .get("error")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown_error");
    anyhow::bail!("Slack {} returned error: {}", method, error)
}

#[async_trait]
impl ChatDirectory for SlackRest {
    /// Walk every page of `conversations.list` until a channel matches.
    async fn find_channel(&self, name: &str) -> Result<Channel> {
        let wanted = normalize_channel_name(name);
        let mut cursor: Option<String> = None;
        let mut scanned = 0usize;

        loop {
            let mut query = vec![
                ("types", self.channel_types),
                ("exclude_archived", "true"),
                ("limit", PAGE_LIMIT),
            ];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.as_str()));
            }

            let page: ConversationsListResponse = self.call("conversations.list", &query).await?;
            scanned += page.channels.len();
            if let Some(found) = page
                .channels
                .into_iter()
                .find(|c| !c.is_archived && normalize_channel_name(&c.name) == wanted)
            {
                tracing::debug!(channel = %found.name, id = %found.id, scanned, "channel resolved");
                return Ok(Channel { id: found.id, name: found.name });
            }

            match next_cursor(&page.response_metadata) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        anyhow::bail!("channel #{} not found ({} channels visible to this token)", wanted, scanned)
    }

    async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>> {
        let mut all_members = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("channel", channel_id), ("limit", PAGE_LIMIT)];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.as_str()));
            }

            let page: ConversationsMembersResponse =
                self.call("conversations.members", &query).await?;
            let done = page.members.is_empty();
            all_members.extend(page.members);
            match next_cursor(&page.response_metadata) {
                Some(next) if !done => cursor = Some(next),
                _ => break,
            }
        }

        Ok(all_members)
    }

    async fn profile(&self, member_id: &str) -> Result<MemberProfile> {
        let resp: UsersProfileResponse = self
            .call("users.profile.get", &[("user", member_id)])
            .await
            .with_context(|| format!("profile lookup for {} failed", member_id))?;
        Ok(resp.profile.into())
    }

    async fn usernames(&self) -> Result<HashMap<String, String>> {
        let mut map = HashMap::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("limit", PAGE_LIMIT)];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.as_str()));
            }

            let page: UsersListResponse = self.call("users.list", &query).await?;
            let done = page.members.is_empty();
            map.extend(
                page.members
                    .into_iter()
                    .filter(|u| !u.deleted && !u.name.is_empty())
                    .map(|u| (u.id, u.name)),
            );
            match next_cursor(&page.response_metadata) {
                Some(next) if !done => cursor = Some(next),
                _ => break,
            }
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_ok_passes() {
        assert!(check_ok("users.list", &json!({"ok": true, "members": []})).is_ok());
    }

    #[test]
    fn test_check_ok_reports_slack_error() {
        let err = check_ok("conversations.list", &json!({"ok": false, "error": "invalid_auth"}))
            .unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("conversations.list"));
        assert!(msg.contains("invalid_auth"));
    }

    #[test]
    fn test_check_ok_missing_flag_is_error() {
        let err = check_ok("users.profile.get", &json!({})).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown_error"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = SlackConfig {
            api_base: "https://slack.example/api/".to_string(),
            ..Default::default()
        };
        let rest = SlackRest::new("xoxb-test".to_string(), &config).unwrap();
        assert_eq!(rest.base_url, "https://slack.example/api");
    }

    #[test]
    fn test_channel_types_default_to_public() {
        let mut config = SlackConfig::default();
        assert_eq!(channel_types(&config), "public_channel");
        config.include_private_channels = true;
        assert_eq!(channel_types(&config), "public_channel,private_channel");
    }

    /// Hits the real Slack API with `SLACK_TOKEN`.
    /// Run with: SLACK_CHANNEL=general cargo test slack_live --ignored -- --nocapture
    #[tokio::test]
    #[ignore]
    async fn slack_live_lookup() {
        let token = std::env::var("SLACK_TOKEN").unwrap();
        let channel = std::env::var("SLACK_CHANNEL").unwrap_or_else(|_| "general".to_string());
        let rest = SlackRest::new(token, &SlackConfig::default()).unwrap();
        match rest.find_channel(&channel).await {
            Ok(ch) => {
                let members = rest.channel_members(&ch.id).await.unwrap();
                println!("#{} ({}) has {} members", ch.name, ch.id, members.len());
            }
            Err(e) => println!("lookup failed: {:#}", e),
        }
    }
}
