use std::sync::Arc;

use clap::Parser;
use log::{info, warn};

mod app;
mod audio;
mod catalog;
mod cli;
mod config;
mod context;
mod error;
mod logging;
mod navigator;
mod progress;
mod runtime;
mod store;
mod ui;
mod upload;

#[cfg(test)]
mod test_support;

use cli::{Cli, Command};
use context::Context;
use logging::LogTarget;
use navigator::TrackNavigator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = Cli::parse().into_command();
    let (settings, config_warning) = runtime::load_settings();

    // The player owns the terminal, so only it logs to a file.
    let target = match command {
        Command::Play { .. } => LogTarget::File(settings.log_file()),
        _ => LogTarget::Stderr,
    };
    if let Err(e) = logging::init(&settings.log, &target) {
        eprintln!("prepcast: logging disabled: {e}");
    }
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }

    let ctx = Context::open(settings);

    match command {
        Command::Play { refresh } => runtime::run_player(Arc::new(ctx), refresh),
        Command::Catalog { refresh } => print_catalog(&ctx, refresh),
        Command::Upload {
            dir,
            batch_size,
            report,
        } => {
            let storage = ctx.storage()?;
            let result = upload::run_upload(storage.as_ref(), &dir, batch_size, &report)?;
            println!(
                "{} uploaded, {} failed of {} (report: {})",
                result.summary.successful,
                result.summary.failed,
                result.summary.total,
                report.display()
            );
            Ok(())
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&ctx.settings.redacted())?);
            Ok(())
        }
    }
}

fn print_catalog(ctx: &Context, refresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    let entries = ctx.load_catalog(refresh)?;
    let navigator = TrackNavigator::new(entries, &ctx.group_order());
    let progress = ctx.progress_store();
    info!("catalog has {} lessons", navigator.len());

    for group in navigator.grouped() {
        println!("{}", group.label);
        for (i, entry) in group.tracks {
            let pct = progress.get(&entry.storage_path);
            println!("  {:>3}. {:<50} {:>3}%", i + 1, entry.display_title, pct);
        }
    }

    let summary = navigator.aggregate(&progress);
    println!(
        "\n{} lessons, {} completed, {}% overall",
        summary.total, summary.completed, summary.overall_percent
    );
    Ok(())
}
