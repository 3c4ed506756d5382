//! Atelier CLI - Layered Creative Editor
//!
//! Command-line interface for the Atelier scene core.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use atelier::cli::commands::{self, Session, TextOptions};
use atelier::cli::{BrandKitCommand, Cli, Commands, TemplateCommand};
use atelier::export::ExportRequest;
use atelier::{EditorConfig, Result};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Atelier v{}", env!("CARGO_PKG_VERSION"));

    let Some(cmd) = cli.command else {
        println!("Atelier v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for available commands");
        return Ok(());
    };

    let config = EditorConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let session = Session::new(cli.doc, config);

    if let Err(err) = handle_command(&session, cmd) {
        if let Some(hint) = err.recovery_suggestion() {
            eprintln!("hint: {}", hint);
        }
        let code = err.error_code();
        return Err(anyhow::Error::new(err).context(code));
    }
    Ok(())
}

fn handle_command(session: &Session, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::New { format } => commands::new_document(session, &format),
        Commands::AddText {
            text,
            size,
            font,
            weight,
            fill,
        } => commands::add_text(
            session,
            &text,
            TextOptions {
                size,
                font,
                weight,
                fill,
            },
        ),
        Commands::AddImage {
            path,
            width,
            height,
            primary,
        } => commands::add_image(session, &path, (width, height), primary),
        Commands::AddShape {
            kind,
            width,
            height,
            fill,
        } => commands::add_shape(session, kind.into(), width, height, &fill),
        Commands::Layers => commands::list_layers(session),
        Commands::Update { id, patch } => commands::update_layer(session, &id, &patch),
        Commands::Delete { id } => commands::delete_layer(session, &id),
        Commands::Move { id, direction } => commands::move_layer(session, &id, direction.into()),
        Commands::Layout { pattern } => commands::apply_layout(session, &pattern),
        Commands::Undo => commands::undo(session),
        Commands::Redo => commands::redo(session),
        Commands::History => commands::show_history(session),
        Commands::Export {
            format,
            quality,
            budget,
            frame,
            out,
        } => {
            let request = ExportRequest {
                format,
                quality,
                byte_budget: budget,
            };
            commands::export(session, &request, frame.as_deref(), &out)
        }
        Commands::Template { action } => match action {
            TemplateCommand::List => commands::list_templates(),
            TemplateCommand::Load { template } => commands::load_template(session, &template),
        },
        Commands::BrandKit { store, action } => match action {
            BrandKitCommand::Show => commands::show_brand_kit(&store),
            BrandKitCommand::Update { patch } => commands::update_brand_kit(&store, &patch),
        },
        Commands::Canvas {
            format,
            background,
            palette,
        } => commands::canvas(session, format.as_deref(), background.as_deref(), &palette),
    }
}
