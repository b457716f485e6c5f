//! Configuration commands

use anyhow::{Context, Result};
use cli_lib::config::example_config;
use owo_colors::OwoColorize;
use std::path::Path;

/// Print the annotated example configuration
pub fn run_example() -> Result<()> {
    print!("{}", example_config());
    Ok(())
}

/// Validate the configuration and show what each target resolves to
pub fn run_validate(config_path: &Path) -> Result<()> {
    let config = cli_lib::load(config_path)?;
    let targets = config
        .validate()
        .with_context(|| format!("Invalid config file {}", config_path.display()))?;

    println!("{}", "Configuration OK".green().bold());
    println!("{}: {}", "Location".dimmed(), config_path.display().dimmed());
    println!(
        "  {} = {}",
        "lock_file".cyan(),
        config.lock_file.display()
    );
    println!(
        "  {} = {} {}",
        "command_timeout_secs".cyan(),
        config.command_timeout_secs,
        format!("({}s)", config.command_timeout_secs).dimmed()
    );
    println!("  {} = {:?}", "clock".cyan(), config.clock);
    println!("  {} = {}", "recursive".cyan(), config.recursive);
    match &config.alert {
        Some(alert) => println!("  {} = {}", "alert".cyan(), alert.command.join(" ")),
        None => println!("  {} = {}", "alert".cyan(), "(log only)".dimmed()),
    }

    println!("\n{} ({})", "Targets".bold(), targets.len());
    for target in &targets {
        let policy = target.policy();
        println!("  {}", target.path().yellow());
        println!(
            "    every {} min, keep {} regular, {} daily, {} weekly, {} monthly",
            policy.interval_minutes,
            policy.max_regular,
            policy.max_daily,
            policy.max_weekly,
            policy.max_monthly
        );
    }

    Ok(())
}
