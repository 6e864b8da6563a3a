use crate::CLAP_STYLING;
use clap::arg;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkpeek")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkpeek")
        .about("Pull account details and every outbound link from a linktr.ee profile")
        .styles(CLAP_STYLING)
        .arg(
            arg!(<TARGET>)
                .help("A linktr.ee username or profile URL")
                .required(true),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: display to screen)"),
        )
        .arg(
            arg!(--"raw")
                .required(false)
                .help("Print the raw pageProps payload instead of the profile")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-t --"timeout" <SECONDS>)
                .required(false)
                .help("Overall time allowed per request, in seconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            arg!(--"proxy" <URL>)
                .required(false)
                .help("Route every request through this proxy"),
        )
        .arg(
            arg!(--"base-url" <URL>)
                .required(false)
                .hide(true)
                .help("Site root to scrape instead of https://linktr.ee")
                .value_parser(clap::value_parser!(url::Url)),
        )
        .arg(
            arg!(-q --"quiet" "Suppress the spinner and non-essential output")
                .required(false),
        )
        .arg(arg!(-v --"verbose" "Log every stage of the lookup").required(false))
}
