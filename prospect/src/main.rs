use commands::command_argument_builder;
use prospect::handlers::{handle_init, handle_run};
use prospect_core::print_banner;

// commands.rs resolves the styling through the crate root.
pub use prospect::CLAP_STYLING;

#[path = "commands.rs"]
mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("run", primary_command)) => handle_run(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
