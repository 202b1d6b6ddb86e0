use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("prospect")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("prospect")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the prospect data directory on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location for the visit ledger, record store and failure log")
                        .default_value("profile_data"),
                )
                .arg(
                    arg!(-f - -"force")
                        .help(
                            "Forces re-initialization even if the data directory already \
                        exists.",
                        )
                        .required(false),
                ),
        )
        .subcommand(
            command!("run")
                .about(
                    "Signs in and traverses the feed, visiting newly discovered profiles \
                until the view ceiling is reached.",
                )
                .arg(
                    arg!(-d --"data-dir" <PATH>)
                        .required(false)
                        .help("Override the data directory from the environment"),
                )
                .arg(
                    arg!(-m --"max-views" <NUM>)
                        .required(false)
                        .help("Override the maximum number of profile views for this session")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
}
