use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use linkpeek_core::report::{
    ReportFormat, format_timestamp, generate_json_report, generate_raw_report,
    generate_text_report, save_report,
};
use linkpeek_core::{Profile, ProfileScraper, ScraperConfig};
use linkpeek_scanner::{CallContext, CancellationToken, FetchSettings};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_HOST: &str = "linktr.ee";

/// What the user asked to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Url(String),
    Username(String),
}

impl Target {
    pub fn url(&self) -> Option<&str> {
        match self {
            Target::Url(url) => Some(url),
            Target::Username(_) => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Target::Username(username) => Some(username),
            Target::Url(_) => None,
        }
    }
}

/// Anything mentioning `host` or carrying an `http(s)://` scheme is a URL, the rest
/// is a username. A URL typed without a scheme gets `https://`.
pub fn classify_target(input: &str, host: &str) -> Target {
    let input = input.trim();
    let has_scheme = input.starts_with("http://") || input.starts_with("https://");
    if !(input.contains(host) || has_scheme) {
        return Target::Username(input.to_string());
    }

    if url::Url::parse(input).is_ok() {
        Target::Url(input.to_string())
    } else {
        Target::Url(format!("https://{}", input))
    }
}

#[derive(Debug, Clone)]
pub struct LookupOptions {
    pub target: String,
    pub format: ReportFormat,
    pub output: Option<String>,
    pub raw: bool,
    pub quiet: bool,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
    pub base_url: Option<String>,
}

impl LookupOptions {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            format: ReportFormat::Text,
            output: None,
            raw: false,
            quiet: false,
            timeout: None,
            proxy: None,
            base_url: None,
        }
    }

    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let target = args
            .get_one::<String>("TARGET")
            .context("please pass a linktree username or url")?;
        let format = args
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text");

        Ok(Self {
            target: target.clone(),
            format: ReportFormat::from_str(format)
                .with_context(|| format!("Unsupported report format '{}'", format))?,
            output: args.get_one::<String>("output").cloned(),
            raw: args.get_flag("raw"),
            quiet: args.get_flag("quiet"),
            timeout: args
                .get_one::<u64>("timeout")
                .map(|secs| Duration::from_secs(*secs)),
            proxy: args.get_one::<String>("proxy").cloned(),
            base_url: args
                .get_one::<url::Url>("base-url")
                .map(|url| url.as_str().to_string()),
        })
    }

    pub fn scraper_config(&self) -> ScraperConfig {
        let mut fetch = FetchSettings::default();
        if let Some(timeout) = self.timeout {
            fetch.request_timeout = timeout;
        }
        fetch.proxy = self.proxy.clone();

        let config = ScraperConfig::default().with_fetch_settings(fetch);
        match &self.base_url {
            Some(base_url) => config.with_base_url(base_url.as_str()),
            None => config,
        }
    }
}

/// Look up one profile and print or save the report.
pub async fn handle_lookup(options: &LookupOptions) -> Result<()> {
    let config = options.scraper_config();
    let host = config.host().unwrap_or_else(|| DEFAULT_HOST.to_string());
    let target = classify_target(&options.target, &host);
    debug!("Looking up {:?}", target);

    let scraper = ProfileScraper::new(config).context("Failed to set up the HTTP client")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut ctx = CallContext::new().with_cancel(cancel);
    if let Some(timeout) = options.timeout {
        ctx = ctx.with_timeout(timeout);
    }

    let spinner = (!options.quiet).then(|| lookup_spinner(&options.target));
    let result = scraper
        .get_profile_with(target.url(), target.username(), &ctx)
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(failure) => {
            if let Some(raw) = &failure.raw {
                eprintln!("{}", "pageProps:".yellow().bold());
                eprintln!("{}", generate_raw_report(raw)?);
            }
            return Err(failure.error.into());
        }
    };

    for warning in &outcome.warnings {
        eprintln!("{} {}", "⚠".yellow().bold(), warning);
    }

    let content = if options.raw {
        generate_raw_report(&outcome.raw)?
    } else {
        match (options.format, options.output.is_some()) {
            (ReportFormat::Json, _) => generate_json_report(&outcome.profile)?,
            (ReportFormat::Text, true) => generate_text_report(&outcome.profile),
            (ReportFormat::Text, false) => render_profile(&outcome.profile),
        }
    };

    match &options.output {
        Some(path) => {
            let saved = write_output(&content, path)?;
            if !options.quiet {
                println!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    saved.display().to_string().bright_white()
                );
            }
        }
        None => println!("{}", content.trim_end()),
    }

    Ok(())
}

/// Write `content` to `path`, expanding a leading `~`.
pub fn write_output(content: &str, path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::tilde(path);
    let path = PathBuf::from(expanded.as_ref());
    save_report(content, &path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(path)
}

/// Terminal view of a profile.
pub fn render_profile(profile: &Profile) -> String {
    let fields = [
        ("username", profile.username.clone()),
        ("url", profile.source_url.clone()),
        ("avatar image", profile.avatar_image.clone()),
        ("id", profile.account_id.to_string()),
        ("tier", profile.tier.clone()),
        ("isActive", profile.is_active.to_string()),
        ("description", profile.description.clone()),
        ("createdAt", format_timestamp(profile.created_at)),
        ("updatedAt", format_timestamp(profile.updated_at)),
    ];

    let mut out = String::new();
    for (label, value) in fields {
        let label = format!("{:<14}", format!("{}:", label));
        out.push_str(&format!("{}{}\n", label.bright_cyan().bold(), value));
    }

    out.push('\n');
    out.push_str(&format!(
        "{}\n",
        format!("Links ({})", profile.links.len()).bright_white().bold()
    ));
    for link in &profile.links {
        out.push_str(&format!("  {} {}\n", "→".blue(), link.url));
    }
    out
}

fn lookup_spinner(target: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Fetching {}", target));
    spinner
}
