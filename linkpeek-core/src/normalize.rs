//! Turn the untyped `pageProps` tree into a [`Profile`].
//!
//! Only two things are required: an `account` object and its `username`.
//! Every other field is coerced through [`coerce_or_default`] and silently
//! falls back to its default when it is missing or of an unexpected type.

use crate::config::ScraperConfig;
use crate::error::{ProfileError, Result};
use crate::model::{Profile, UNKNOWN_TIER};
use linkpeek_scanner::node::{
    as_bool, as_integer, as_non_empty_string, as_string, coerce_or_default,
};
use linkpeek_scanner::{Coerced, UntypedNode};
use tracing::debug;

/// Build a profile from `pageProps`. Links are left empty; see [`crate::links`].
pub fn normalize(
    page_props: &UntypedNode,
    source_url: Option<&str>,
    config: &ScraperConfig,
) -> Result<Profile> {
    let account = account(page_props)?;

    let username = account
        .get("username")
        .and_then(as_non_empty_string)
        .ok_or_else(|| ProfileError::Schema("invalid username".to_string()))?;

    let source_url = match source_url.filter(|url| !url.is_empty()) {
        Some(url) => url.to_string(),
        None => config.profile_url(&username),
    };

    let mut profile = Profile::new(username, source_url);
    profile.account_id = account_id(account).into_inner();
    profile.avatar_image = coerce_or_default(
        "account.profilePictureUrl",
        account.get("profilePictureUrl"),
        as_string,
        String::new(),
    )
    .into_inner();
    profile.tier = coerce_or_default(
        "account.tier",
        account.get("tier"),
        as_non_empty_string,
        UNKNOWN_TIER.to_string(),
    )
    .into_inner();
    profile.is_active =
        coerce_or_default("account.isActive", account.get("isActive"), as_bool, false).into_inner();
    profile.description = coerce_or_default(
        "account.description",
        account.get("description"),
        as_string,
        String::new(),
    )
    .into_inner();
    profile.created_at = timestamp(account, "createdAt").into_inner();
    profile.updated_at = timestamp(account, "updatedAt").into_inner();

    debug!(
        "Normalized account {} (id {}, tier {})",
        profile.username, profile.account_id, profile.tier
    );
    Ok(profile)
}

/// The `account` object of `pageProps`; without it there is no profile.
pub fn account(page_props: &UntypedNode) -> Result<&UntypedNode> {
    page_props
        .get("account")
        .filter(|account| account.is_object())
        .ok_or_else(|| ProfileError::Schema("invalid account structure".to_string()))
}

/// `account.id` as a number or numeric string. Any other shape takes the
/// default path and yields `Coerced::Defaulted(0)`.
pub fn account_id(account: &UntypedNode) -> Coerced<i64> {
    coerce_or_default("account.id", account.get("id"), as_integer, 0)
}

fn timestamp(account: &UntypedNode, field: &str) -> Coerced<i64> {
    coerce_or_default(
        &format!("account.{}", field),
        account.get(field),
        as_integer,
        0,
    )
}
