//! CLI Module
//!
//! Command-line front end. Every command loads the document, runs one editor
//! operation and writes the document back.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::document::DEFAULT_DOCUMENT_FILE;
use crate::layers::{MoveDirection, ShapeKind};

/// Atelier - layered creative editor
#[derive(Parser, Debug)]
#[command(name = "atelier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Document file
    #[arg(short, long, global = true, default_value = DEFAULT_DOCUMENT_FILE)]
    pub doc: PathBuf,

    /// Editor configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty document
    #[command(name = "new")]
    New {
        /// Canvas format (WIDTHxHEIGHT)
        #[arg(short, long, default_value = "1080x1080")]
        format: String,
    },

    /// Add a text layer
    #[command(name = "add-text")]
    AddText {
        /// Text content
        text: String,

        /// Font size in pixels
        #[arg(short, long)]
        size: Option<f64>,

        /// Font family
        #[arg(long)]
        font: Option<String>,

        /// Font weight (100-900)
        #[arg(long)]
        weight: Option<u16>,

        /// Fill colour
        #[arg(long)]
        fill: Option<String>,
    },

    /// Add an image layer
    #[command(name = "add-image")]
    AddImage {
        /// Image file
        path: PathBuf,

        /// Native width (read from the file when omitted)
        #[arg(long)]
        width: Option<f64>,

        /// Native height (read from the file when omitted)
        #[arg(long)]
        height: Option<f64>,

        /// Fit as the main image instead of a brand asset
        #[arg(long)]
        primary: bool,
    },

    /// Add a shape layer
    #[command(name = "add-shape")]
    AddShape {
        /// Shape kind
        #[arg(value_enum, default_value_t = ShapeArg::Rect)]
        kind: ShapeArg,

        #[arg(long, default_value_t = 200.0)]
        width: f64,

        #[arg(long, default_value_t = 200.0)]
        height: f64,

        /// Fill colour
        #[arg(long, default_value = "#6366f1")]
        fill: String,
    },

    /// List layers, top first
    #[command(name = "layers")]
    Layers,

    /// Apply a JSON patch to a layer
    #[command(name = "update")]
    Update {
        /// Layer id
        id: String,

        /// Patch, e.g. '{"visible": false, "font_size": 48}'
        #[arg(short, long)]
        patch: String,
    },

    /// Delete a layer
    #[command(name = "delete")]
    Delete {
        /// Layer id
        id: String,
    },

    /// Move a layer one step in the stack
    #[command(name = "move")]
    Move {
        /// Layer id
        id: String,

        #[arg(value_enum)]
        direction: DirectionArg,
    },

    /// Apply an auto-layout pattern
    #[command(name = "layout")]
    Layout {
        /// Pattern id (z-pattern, rule-of-thirds)
        pattern: String,
    },

    /// Undo the last action
    #[command(name = "undo")]
    Undo,

    /// Redo the last undone action
    #[command(name = "redo")]
    Redo,

    /// Show action history
    #[command(name = "history")]
    History,

    /// Export the design as an image within a byte budget
    #[command(name = "export")]
    Export {
        /// Output format (png, jpeg)
        #[arg(short, long, default_value = "png")]
        format: String,

        /// Quality of the first attempt (0-1)
        #[arg(short, long, default_value_t = 1.0)]
        quality: f64,

        /// Byte budget (overrides the configuration)
        #[arg(short, long)]
        budget: Option<usize>,

        /// Rendered frame to encode (flat background when omitted)
        #[arg(long)]
        frame: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Built-in and file templates
    #[command(name = "template")]
    Template {
        #[command(subcommand)]
        action: TemplateCommand,
    },

    /// Show or update the brand kit
    #[command(name = "brand-kit")]
    BrandKit {
        /// Brand kit storage directory
        #[arg(long, default_value = ".atelier")]
        store: PathBuf,

        #[command(subcommand)]
        action: BrandKitCommand,
    },

    /// Show or change canvas settings
    #[command(name = "canvas")]
    Canvas {
        /// New format (WIDTHxHEIGHT)
        #[arg(short, long)]
        format: Option<String>,

        /// Solid background colour
        #[arg(short, long)]
        background: Option<String>,

        /// Gradient background from comma-separated colours
        #[arg(long, value_delimiter = ',')]
        palette: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// List built-in templates
    List,
    /// Load a built-in template by id, or a template JSON file
    Load { template: String },
}

#[derive(Subcommand, Debug)]
pub enum BrandKitCommand {
    /// Print the stored brand kit
    Show,
    /// Merge a JSON update into the brand kit
    Update {
        #[arg(short, long)]
        patch: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeArg {
    Rect,
    Circle,
}

impl From<ShapeArg> for ShapeKind {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::Rect => ShapeKind::Rect,
            ShapeArg::Circle => ShapeKind::Circle,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for MoveDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Up => MoveDirection::Up,
            DirectionArg::Down => MoveDirection::Down,
        }
    }
}
