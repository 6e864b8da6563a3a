use serde::{Deserialize, Serialize};

/// Tier reported when the account carries none.
pub const UNKNOWN_TIER: &str = "Unknown";

/// Gated payment buttons; never an outbound link.
pub const COMMERCE_PAY: &str = "COMMERCE_PAY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

impl Link {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(rename = "url")]
    pub source_url: String,
    pub avatar_image: String,
    #[serde(rename = "id")]
    pub account_id: i64,
    pub tier: String,
    pub is_active: bool,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub links: Vec<Link>,
}

impl Profile {
    /// A profile with every secondary field at its default.
    pub fn new(username: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            source_url: source_url.into(),
            avatar_image: String::new(),
            account_id: 0,
            tier: UNKNOWN_TIER.to_string(),
            is_active: false,
            description: String::new(),
            created_at: 0,
            updated_at: 0,
            links: Vec::new(),
        }
    }
}

/// How a raw link entry was classified during partitioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinkEntry {
    Visible(Link),
    Censored(i64),
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_serializes_with_snake_case_keys() {
        let mut profile = Profile::new("alice", "https://linktr.ee/alice");
        profile.account_id = 7;
        profile.links.push(Link::new("https://a.example"));

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["username"], json!("alice"));
        assert_eq!(value["url"], json!("https://linktr.ee/alice"));
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["tier"], json!("Unknown"));
        assert_eq!(value["is_active"], json!(false));
        assert_eq!(value["avatar_image"], json!(""));
        assert_eq!(value["links"], json!([{"url": "https://a.example"}]));
    }
}
