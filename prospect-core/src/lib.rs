pub mod config;
pub mod ledger;
pub mod report;
pub mod session;
pub mod sink;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
                                             __
   ___   ____ ___   ___  ___   ___  _____ / /_
  / _ \ / __// _ \ (_-< / _ \ / -_)/ __/ / __/
 / .__//_/   \___//___// .__/ \__/ \__/  \__/
/_/                   /_/
"#;
    println!("{}", banner.bright_cyan());
    println!(
        "  {} v{}\n",
        "profile harvester".bright_white(),
        env!("CARGO_PKG_VERSION")
    );
}
