// Report generation for a scraped profile

use crate::model::Profile;
use chrono::{DateTime, Utc};
use linkpeek_scanner::UntypedNode;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Millisecond timestamps start around 2001 in this range; anything smaller is seconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

pub fn generate_text_report(profile: &Profile) -> String {
    let mut report = String::new();

    report.push_str(&format!("username:     {}\n", profile.username));
    report.push_str(&format!("url:          {}\n", profile.source_url));
    report.push_str(&format!("avatar image: {}\n", profile.avatar_image));
    report.push_str(&format!("id:           {}\n", profile.account_id));
    report.push_str(&format!("tier:         {}\n", profile.tier));
    report.push_str(&format!("isActive:     {}\n", profile.is_active));
    report.push_str(&format!("description:  {}\n", profile.description));
    report.push_str(&format!("createdAt:    {}\n", format_timestamp(profile.created_at)));
    report.push_str(&format!("updatedAt:    {}\n", format_timestamp(profile.updated_at)));

    report.push_str(&format!("\nLinks ({}):\n", profile.links.len()));
    for link in &profile.links {
        report.push_str(&link.url);
        report.push('\n');
    }

    report
}

pub fn generate_json_report(profile: &Profile) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(profile)
}

/// Pretty-printed `pageProps`, for inspecting what the page actually carried.
pub fn generate_raw_report(raw: &UntypedNode) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(raw)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Raw value, followed by the UTC date when the value is a plausible epoch.
pub fn format_timestamp(timestamp: i64) -> String {
    if timestamp <= 0 {
        return timestamp.to_string();
    }

    let datetime = if timestamp >= MILLIS_THRESHOLD {
        DateTime::<Utc>::from_timestamp_millis(timestamp)
    } else {
        DateTime::<Utc>::from_timestamp(timestamp, 0)
    };

    match datetime {
        Some(datetime) => format!("{} ({})", timestamp, datetime.to_rfc3339()),
        None => timestamp.to_string(),
    }
}
