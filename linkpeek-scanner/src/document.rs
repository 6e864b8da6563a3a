use crate::error::ExtractError;
use crate::node::UntypedNode;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

/// Next.js serializes its initial state into this script element.
pub const NEXT_DATA_SELECTOR: &str = "script#__NEXT_DATA__";

static NEXT_DATA: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(NEXT_DATA_SELECTOR).expect("NEXT_DATA_SELECTOR is a valid selector")
});

/// Locate the embedded application state and return its `props.pageProps` subtree.
///
/// If the page carries more than one matching script, the last one holding a
/// usable `pageProps` object wins.
pub fn extract_page_props(html: &str) -> Result<UntypedNode, ExtractError> {
    let document = Html::parse_document(html);

    let mut found = None;
    let mut error = ExtractError::MissingScript;
    for script in document.select(&NEXT_DATA) {
        let text: String = script.text().collect();
        match page_props_from_json(&text) {
            Ok(page_props) => {
                debug!("Found pageProps payload ({} bytes of JSON)", text.len());
                found = Some(page_props);
            }
            Err(e) => {
                debug!("Skipping __NEXT_DATA__ script: {}", e);
                error = e;
            }
        }
    }

    found.ok_or(error)
}

fn page_props_from_json(text: &str) -> Result<UntypedNode, ExtractError> {
    let mut data: UntypedNode = serde_json::from_str(text)?;
    match data.pointer_mut("/props/pageProps").map(UntypedNode::take) {
        Some(page_props) if page_props.is_object() => Ok(page_props),
        _ => Err(ExtractError::MissingPageProps),
    }
}
