use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use prospect_core::config::Config;
use prospect_core::report::generate_session_report;
use prospect_core::session::{Session, SessionOptions};
use prospect_scraper::ChromeDriver;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// Helper functions for the run and init handlers

/// Expand a user-supplied data directory, resolving `~` against $HOME.
pub fn resolve_data_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Fold CLI overrides into the environment-derived configuration.
pub fn apply_overrides(
    config: &mut Config,
    data_dir: Option<&String>,
    max_views: Option<&usize>,
) {
    if let Some(dir) = data_dir {
        config.data_dir = resolve_data_dir(dir);
    }
    if let Some(views) = max_views {
        config.max_profile_views = *views;
    }
}

/// Create the data directory and seed the persisted files a session
/// expects to find there. Existing files are left untouched.
pub fn seed_data_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let visited = dir.join("visited.txt");
    if !visited.exists() {
        fs::write(&visited, "")?;
    }
    let failures = dir.join("error_log.csv");
    if !failures.exists() {
        fs::write(&failures, "timestamp,error\n")?;
    }
    Ok(())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush().unwrap();
    let mut response = String::new();
    io::stdin().read_line(&mut response).unwrap();
    response.trim().to_lowercase()
}

pub fn handle_init(args: &ArgMatches) {
    print_divider();
    println!("{}", "  PROSPECT INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let raw_path = args.get_one::<String>("PATH").unwrap();
    let force = args.get_flag("force");
    let data_dir = resolve_data_dir(raw_path);

    println!("{} Parsed arguments", "✓".green().bold());
    println!(
        "{} Target: {}",
        "→".blue(),
        data_dir.display().to_string().bright_white()
    );
    println!();

    // Check for an existing installation
    if data_dir.exists() && !force {
        println!("{}", "⚠ WARNING".yellow().bold());
        println!("Data directory already exists:");
        println!(
            "  {} {}",
            "•".yellow(),
            data_dir.display().to_string().bright_white()
        );
        println!("History in the visit ledger will be preserved.");
        let response = print_prompt("Continue? [y/N]:");
        if response != "y" && response != "yes" {
            println!("\nInitialization cancelled.");
            return;
        }
        println!();
    }

    match seed_data_dir(&data_dir) {
        Ok(()) => {
            println!("{} Data directory ready", "✓".green().bold());
            println!(
                "{} Visit ledger: {}",
                "→".blue(),
                data_dir.join("visited.txt").display()
            );
            println!();
            println!("Set EMAIL and PASSWORD in the environment (or a .env file),");
            println!("then start a session with: {}", "prospect run".bright_cyan());
        }
        Err(e) => {
            eprintln!("{} Initialization failed: {}", "✗".red().bold(), e);
        }
    }
}

pub async fn handle_run(args: &ArgMatches) {
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Configuration error: {:#}", "✗".red().bold(), e);
            return;
        }
    };
    apply_overrides(
        &mut config,
        args.get_one::<String>("data-dir"),
        args.get_one::<usize>("max-views"),
    );

    let filter = if config.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = seed_data_dir(&config.data_dir) {
        eprintln!("{} Could not prepare data directory: {}", "✗".red().bold(), e);
        return;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Launching browser...");

    let driver = match ChromeDriver::launch().await {
        Ok(driver) => driver,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} Browser launch failed: {}", "✗".red().bold(), e);
            return;
        }
    };

    let options = SessionOptions::from_config(&config);
    let ceiling = options.max_profile_views;
    let mut session = match Session::open(driver, options, &config.data_dir) {
        Ok(session) => session,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} Could not open session state: {}", "✗".red().bold(), e);
            return;
        }
    };

    spinner.set_message("Signing in...");
    if let Err(e) = session.login(&config.email, &config.password).await {
        spinner.finish_and_clear();
        eprintln!("{} Login failed: {}", "✗".red().bold(), e);
        return;
    }

    let progress = spinner.clone();
    let mut session = session.with_progress_callback(Arc::new(move |count, id| {
        progress.set_message(format!("[{}/{}] {}", count, ceiling, id));
    }));

    match session.run().await {
        Ok(summary) => {
            spinner.finish_and_clear();
            println!("\n{} Session complete!\n", "✓".green().bold());
            print!("{}", generate_session_report(&summary));
        }
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} Session ended early: {}", "✗".red().bold(), e);
            // Partial progress is durable, so report what was kept.
            print!("{}", generate_session_report(&session.summary()));
        }
    }
}
