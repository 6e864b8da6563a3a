//! Two-phase link resolution.
//!
//! Links flagged as sensitive come without a `url` in the page payload. They
//! are revealed by POSTing their ids to the gates endpoint, and the unlocked
//! links are appended after every directly visible one.

use crate::config::ScraperConfig;
use crate::error::ProfileError;
use crate::model::{COMMERCE_PAY, Link, LinkEntry};
use linkpeek_scanner::node::{as_array, as_bool, as_integer};
use linkpeek_scanner::{CallContext, Fetcher, ScanError, UntypedNode};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Link resolution stopped early. `resolved` holds what was usable before the error.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ResolutionFailure {
    pub resolved: Vec<Link>,
    #[source]
    pub error: ProfileError,
}

impl ResolutionFailure {
    fn empty(error: ProfileError) -> Self {
        Self {
            resolved: Vec::new(),
            error,
        }
    }
}

/// Links shown on the page, plus ids of the locked ones still to be unlocked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub visible: Vec<Link>,
    pub censored: Vec<i64>,
}

/// Split the raw `links` array, preserving order. Duplicate censored ids are kept once.
pub fn partition(raw_links: &UntypedNode) -> Result<Partition, ProfileError> {
    let entries = as_array(raw_links)
        .ok_or_else(|| ProfileError::Schema("invalid links structure".to_string()))?;

    let mut partition = Partition::default();
    for (index, entry) in entries.iter().enumerate() {
        match classify(index, entry)? {
            LinkEntry::Visible(link) => partition.visible.push(link),
            LinkEntry::Censored(id) => {
                if !partition.censored.contains(&id) {
                    partition.censored.push(id);
                }
            }
            LinkEntry::Skipped => {}
        }
    }

    debug!(
        "Partitioned {} link entries: {} visible, {} censored",
        entries.len(),
        partition.visible.len(),
        partition.censored.len()
    );
    Ok(partition)
}

fn classify(index: usize, entry: &UntypedNode) -> Result<LinkEntry, ProfileError> {
    if !entry.is_object() {
        return Err(ProfileError::Schema(format!(
            "links[{}] is not an object",
            index
        )));
    }

    if entry.get("type").and_then(UntypedNode::as_str) == Some(COMMERCE_PAY) {
        return Ok(LinkEntry::Skipped);
    }

    if let Some(url) = entry.get("url").and_then(UntypedNode::as_str) {
        return Ok(LinkEntry::Visible(Link::new(url)));
    }

    let locked = entry.get("locked").and_then(as_bool).unwrap_or(false);
    if !locked {
        return Ok(LinkEntry::Skipped);
    }

    // A locked entry is only resolvable through its id.
    let id = entry.get("id");
    match id.and_then(as_integer) {
        Some(id) => Ok(LinkEntry::Censored(id)),
        None => Err(ProfileError::Coercion {
            field: format!("links[{}].id", index),
            found: id.map_or_else(|| "missing".to_string(), |v| v.to_string()),
        }),
    }
}

/// Body accepted by the gates endpoint.
pub fn gate_request_body(account_id: i64, censored: &[i64]) -> UntypedNode {
    json!({
        "accountId": account_id,
        "validationInput": {
            "acceptedSensitiveContent": censored,
        },
        "requestSource": {
            "referrer": null,
        },
    })
}

/// Read `links[*].url` from a gates response. Entries without a string url are skipped
/// and a response without a `links` array unlocks nothing.
pub fn parse_gate_response(body: &[u8]) -> Result<Vec<Link>, ScanError> {
    let response: UntypedNode = serde_json::from_slice(body)
        .map_err(|e| ScanError::ParseError(format!("gate response is not JSON: {}", e)))?;

    let Some(entries) = response.get("links").and_then(as_array) else {
        warn!("Gate response carries no links array");
        return Ok(Vec::new());
    };

    Ok(entries
        .iter()
        .filter_map(|entry| entry.get("url").and_then(UntypedNode::as_str))
        .map(Link::new)
        .collect())
}

pub struct LinkResolver<'a> {
    fetcher: &'a dyn Fetcher,
    config: &'a ScraperConfig,
}

impl<'a> LinkResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, config: &'a ScraperConfig) -> Self {
        Self { fetcher, config }
    }

    /// Visible links in page order, followed by the unlocked ones in response order.
    pub async fn resolve_links(
        &self,
        account_id: i64,
        raw_links: &UntypedNode,
        ctx: &CallContext,
    ) -> Result<Vec<Link>, ResolutionFailure> {
        let Partition {
            mut visible,
            censored,
        } = partition(raw_links).map_err(ResolutionFailure::empty)?;

        if censored.is_empty() {
            return Ok(visible);
        }

        match self.unlock(account_id, &censored, ctx).await {
            Ok(unlocked) => {
                info!(
                    "Unlocked {} of {} sensitive links",
                    unlocked.len(),
                    censored.len()
                );
                visible.extend(unlocked);
                Ok(visible)
            }
            Err(e) => Err(ResolutionFailure {
                resolved: visible,
                error: ProfileError::Resolution(e),
            }),
        }
    }

    async fn unlock(
        &self,
        account_id: i64,
        censored: &[i64],
        ctx: &CallContext,
    ) -> Result<Vec<Link>, ScanError> {
        let body = gate_request_body(account_id, censored);
        let base_url = self.config.base_url.as_str();
        let headers = [
            ("origin", base_url),
            ("referer", base_url),
            ("user-agent", self.config.fetch.user_agent.as_str()),
        ];

        debug!("Requesting {} sensitive links for account {}", censored.len(), account_id);
        let response = self
            .fetcher
            .post_json(&self.config.gates_url(), &headers, &body, ctx)
            .await?;
        parse_gate_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partition_visible_and_censored() {
        let raw = json!([
            {"id": 1, "url": "https://a.example", "type": "CLASSIC"},
            {"id": 2, "locked": true, "type": "CLASSIC"},
            {"id": 3, "url": "https://b.example", "type": "CLASSIC", "locked": false},
            {"id": "4", "locked": true, "type": "CLASSIC"},
        ]);
        let partition = partition(&raw).unwrap();
        assert_eq!(
            partition.visible,
            vec![Link::new("https://a.example"), Link::new("https://b.example")]
        );
        assert_eq!(partition.censored, vec![2, 4]);
    }

    #[test]
    fn test_commerce_pay_is_always_dropped() {
        let raw = json!([
            {"id": 1, "url": "https://pay.example", "type": "COMMERCE_PAY"},
            {"id": 2, "locked": true, "type": "COMMERCE_PAY"},
            {"id": 3, "url": "https://pay2.example", "type": "COMMERCE_PAY", "locked": true},
            {"id": "not a number", "type": "COMMERCE_PAY", "locked": true},
        ]);
        assert_eq!(partition(&raw).unwrap(), Partition::default());
    }

    #[test]
    fn test_unlocked_entry_without_url_is_dropped() {
        let raw = json!([{"id": 9, "type": "HEADER"}, {"id": 10, "locked": false}]);
        assert_eq!(partition(&raw).unwrap(), Partition::default());
    }

    #[test]
    fn test_entries_without_type_are_links() {
        let raw = json!([{"id": 1, "url": "https://untyped.example"}]);
        assert_eq!(
            partition(&raw).unwrap().visible,
            vec![Link::new("https://untyped.example")]
        );
    }

    #[test]
    fn test_duplicate_censored_ids_collapse() {
        let raw = json!([{"id": 5, "locked": true}, {"id": "5", "locked": true}]);
        assert_eq!(partition(&raw).unwrap().censored, vec![5]);
    }

    #[test]
    fn test_links_not_an_array() {
        let err = partition(&json!({"id": 1})).unwrap_err();
        assert!(matches!(err, ProfileError::Schema(_)));
    }

    #[test]
    fn test_link_entry_not_an_object() {
        let err = partition(&json!([{"id": 1, "url": "https://a.example"}, "oops"])).unwrap_err();
        assert!(matches!(&err, ProfileError::Schema(msg) if msg.contains("links[1]")));
    }

    #[test]
    fn test_censored_entry_with_bad_id() {
        let err = partition(&json!([{"id": true, "locked": true}])).unwrap_err();
        assert!(matches!(
            &err,
            ProfileError::Coercion { field, found } if field == "links[0].id" && found == "true"
        ));

        let err = partition(&json!([{"locked": true}])).unwrap_err();
        assert!(matches!(&err, ProfileError::Coercion { found, .. } if found == "missing"));
    }

    #[test]
    fn test_gate_request_body_shape() {
        let body = gate_request_body(77, &[10, 11]);
        assert_eq!(
            body,
            json!({
                "accountId": 77,
                "validationInput": {"acceptedSensitiveContent": [10, 11]},
                "requestSource": {"referrer": null}
            })
        );
    }

    #[test]
    fn test_parse_gate_response_skips_entries_without_url() {
        let body = br#"{"links":[{"url":"https://c.example","id":1},{"id":2},{"url":5},{"url":"https://d.example"}]}"#;
        assert_eq!(
            parse_gate_response(body).unwrap(),
            vec![Link::new("https://c.example"), Link::new("https://d.example")]
        );
    }

    #[test]
    fn test_parse_gate_response_without_links() {
        assert!(parse_gate_response(br#"{"message":"nope"}"#).unwrap().is_empty());
        assert!(matches!(
            parse_gate_response(b"<html>"),
            Err(ScanError::ParseError(_))
        ));
    }
}
