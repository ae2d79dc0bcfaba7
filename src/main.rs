mod calendar;
mod cli;
mod config;
mod db;
mod models;
mod network;
mod prayer_times;
mod services;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::SqliteRepository;
use prayer_times::Providers;
use services::forms::ContactForm;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // `config` subcommands must work even when the data dir is unusable
    if let Some(Commands::Config { action }) = &cli.command {
        return handlers::handle_config(&config, action);
    }

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let repo = SqliteRepository::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    let providers = Providers::from_config(&config);

    match cli.command {
        Some(Commands::Times) => handlers::handle_times(&repo, &config, &providers)?,
        Some(Commands::Next) => handlers::handle_next(&repo, &config, &providers)?,
        Some(Commands::Hijri) => handlers::handle_hijri(&config, &providers)?,
        Some(Commands::Ramadan) => handlers::handle_ramadan(&providers)?,
        Some(Commands::Admin { password, action }) => {
            handlers::handle_admin(&repo, &config, &providers, password, &action)?;
        }
        Some(Commands::Notifications { action }) => {
            handlers::handle_notifications(&repo, action.as_ref())?;
        }
        Some(Commands::Media { action }) => handlers::handle_media(&repo, &action)?,
        Some(Commands::Subscribe {
            name,
            email,
            phone,
            categories,
        }) => {
            handlers::handle_subscribe(&repo, &name, &email, phone.as_deref(), &categories)?;
        }
        Some(Commands::Ask {
            subject,
            question,
            category,
            teacher,
            name,
            email,
            phone,
        }) => {
            let form = handlers::question_form(
                &subject,
                &question,
                category.as_deref(),
                teacher.as_deref(),
                name.as_deref(),
                &email,
                phone.as_deref(),
            )?;
            handlers::handle_ask(&repo, &config, form)?;
        }
        Some(Commands::Enroll {
            programs,
            name,
            email,
            phone,
            level,
            year,
            message,
        }) => {
            handlers::handle_enroll(
                &repo,
                &config,
                &programs,
                &name,
                &email,
                &phone,
                &level,
                year.as_deref(),
                message.as_deref(),
            )?;
        }
        Some(Commands::Contact {
            name,
            email,
            phone,
            subject,
            message,
        }) => {
            let form = ContactForm {
                name,
                email,
                phone,
                subject,
                message,
            };
            handlers::handle_contact(&config, form)?;
        }
        Some(Commands::Config { .. }) => unreachable!("handled before opening the database"),

        // No subcommand → launch the board
        None => tui::app::run(&repo, &providers, config)?,
    }

    Ok(())
}
