//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::brand::{BrandKitRepository, BrandKitUpdate, FileStore};
use crate::canvas::{parse_hex_color, Background, CanvasPatch};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::editor::{Editor, ImagePlacement};
use crate::error::{AtelierError, Result};
use crate::export::{DirectoryDownload, ExportRequest, FrameSurface};
use crate::layers::{LayerId, LayerPatch, MoveDirection, ShapeKind, TextStyle};
use crate::layout::LayoutOutcome;
use crate::template::{builtin_templates, Template};

/// Document path and configuration shared by all commands.
#[derive(Debug, Clone)]
pub struct Session {
    pub doc: PathBuf,
    pub config: EditorConfig,
}

impl Session {
    pub fn new(doc: PathBuf, config: EditorConfig) -> Self {
        Self { doc, config }
    }

    /// Load the document into an editor.
    pub fn open(&self) -> Result<Editor> {
        let document = Document::load(&self.doc)?;
        Editor::from_document(self.config.clone(), document)
    }

    /// Write the editor back to the document file.
    pub fn save(&self, editor: &Editor) -> Result<()> {
        editor.to_document().save(&self.doc)
    }
}

/// Text layer options.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub size: Option<f64>,
    pub font: Option<String>,
    pub weight: Option<u16>,
    pub fill: Option<String>,
}

/// Create a new document.
pub fn new_document(session: &Session, format: &str) -> Result<()> {
    info!("Creating document: {}", session.doc.display());

    let mut config = session.config.clone();
    config.canvas.apply_format(format)?;
    let editor = Editor::new(config);
    session.save(&editor)?;

    println!("Document created: {} ({})", session.doc.display(), format);
    Ok(())
}

/// Add a text layer.
pub fn add_text(session: &Session, text: &str, options: TextOptions) -> Result<()> {
    let mut editor = session.open()?;

    let mut style = TextStyle {
        text: text.to_string(),
        ..Default::default()
    };
    if let Some(size) = options.size {
        style.font_size = size;
    }
    if let Some(font) = options.font {
        style.font_family = font;
    }
    if let Some(weight) = options.weight {
        style.font_weight = weight;
    }
    if let Some(fill) = options.fill {
        style.fill = fill;
    }

    let id = editor.insert_text(style);
    session.save(&editor)?;
    println!("Added {}", id);
    Ok(())
}

/// Add an image layer, reading its size from the file when not given.
pub fn add_image(
    session: &Session,
    path: &Path,
    size: (Option<f64>, Option<f64>),
    primary: bool,
) -> Result<()> {
    let (width, height) = match size {
        (Some(width), Some(height)) => (width, height),
        _ => {
            if !path.exists() {
                return Err(AtelierError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let (width, height) = image::image_dimensions(path)?;
            (f64::from(width), f64::from(height))
        }
    };
    let placement = if primary {
        ImagePlacement::Primary
    } else {
        ImagePlacement::Asset
    };

    let mut editor = session.open()?;
    let id = editor.insert_image(&path.display().to_string(), width, height, placement)?;
    session.save(&editor)?;
    println!("Added {} ({}x{})", id, width, height);
    Ok(())
}

/// Add a shape layer.
pub fn add_shape(session: &Session, shape: ShapeKind, width: f64, height: f64, fill: &str) -> Result<()> {
    let mut editor = session.open()?;
    let id = editor.insert_shape(shape, width, height, fill);
    session.save(&editor)?;
    println!("Added {}", id);
    Ok(())
}

/// List layers, top of the stack first.
pub fn list_layers(session: &Session) -> Result<()> {
    let editor = session.open()?;
    let layers = editor.layers();

    if layers.is_empty() {
        println!("No layers.");
        return Ok(());
    }

    println!("Layers ({}):", layers.len());
    println!("{:-<60}", "");
    for layer in layers.iter().rev() {
        let mut flags = Vec::new();
        if !layer.visible {
            flags.push("hidden");
        }
        if layer.locked {
            flags.push("locked");
        }
        println!(
            "{:<12} {:<6} {:<28} {}",
            layer.id.as_str(),
            layer.kind().to_string(),
            layer.label(),
            flags.join(",")
        );
    }
    println!("{:-<60}", "");
    Ok(())
}

/// Apply a JSON patch to a layer.
pub fn update_layer(session: &Session, id: &str, patch: &str) -> Result<()> {
    let patch: LayerPatch =
        serde_json::from_str(patch).map_err(|e| AtelierError::InvalidPatch {
            reason: e.to_string(),
        })?;

    let mut editor = session.open()?;
    let id = LayerId::from(id);
    if editor.update_layer(&id, &patch) {
        session.save(&editor)?;
        println!("Updated {}", id);
    } else {
        println!("No change to {}", id);
    }
    Ok(())
}

pub fn delete_layer(session: &Session, id: &str) -> Result<()> {
    let mut editor = session.open()?;
    let id = LayerId::from(id);
    if editor.delete_layer(&id) {
        session.save(&editor)?;
        println!("Deleted {}", id);
    } else {
        println!("No layer {}", id);
    }
    Ok(())
}

pub fn move_layer(session: &Session, id: &str, direction: MoveDirection) -> Result<()> {
    let mut editor = session.open()?;
    let id = LayerId::from(id);
    if editor.move_layer(&id, direction) {
        session.save(&editor)?;
        println!("Moved {} {:?}", id, direction);
    } else {
        println!("{} cannot move {:?}", id, direction);
    }
    Ok(())
}

/// Apply an auto-layout pattern.
pub fn apply_layout(session: &Session, pattern: &str) -> Result<()> {
    let mut editor = session.open()?;
    match editor.apply_layout(pattern) {
        LayoutOutcome::Unsupported { pattern } => {
            warn!("Unknown layout pattern: {}", pattern);
            println!("Unknown layout pattern '{}'; nothing changed.", pattern);
        }
        LayoutOutcome::Applied { pattern, placed } => {
            session.save(&editor)?;
            println!("Applied {}:", pattern);
            for (role, id) in placed {
                println!("  {:<16} {}", role.to_string(), id);
            }
        }
    }
    Ok(())
}

/// Undo the last action.
pub fn undo(session: &Session) -> Result<()> {
    let mut editor = session.open()?;
    if editor.undo()? {
        session.save(&editor)?;
        println!("Undone ({} steps left)", editor.history().past_len());
    } else {
        println!("Nothing to undo.");
    }
    Ok(())
}

/// Redo the last undone action.
pub fn redo(session: &Session) -> Result<()> {
    let mut editor = session.open()?;
    if editor.redo()? {
        session.save(&editor)?;
        println!("Redone ({} steps left)", editor.history().future_len());
    } else {
        println!("Nothing to redo.");
    }
    Ok(())
}

/// Show action history.
pub fn show_history(session: &Session) -> Result<()> {
    let editor = session.open()?;
    let history = editor.history();

    if history.past_len() == 0 && history.future_len() == 0 {
        println!("No actions in history.");
        return Ok(());
    }

    println!("Action History:");
    println!("{:-<60}", "");

    let current = history.past_len().saturating_sub(1);
    for (i, entry) in history.past_entries().enumerate() {
        let marker = if i == current { ">>> " } else { "    " };
        println!(
            "{}{} ({})",
            marker,
            entry.label,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }
    for entry in history.future_entries() {
        println!(
            "  ~ {} ({})",
            entry.label,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }

    println!("{:-<60}", "");
    println!(
        "Undo stack: {} | Redo stack: {} | Discarded: {}",
        history.past_len(),
        history.future_len(),
        history.discarded()
    );
    Ok(())
}

/// Export the design. Without a rendered frame the canvas background is
/// exported as a flat image.
pub fn export(
    session: &Session,
    request: &ExportRequest,
    frame: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let editor = session.open()?;
    let surface = match frame {
        Some(path) => FrameSurface::open(path)?,
        None => {
            let canvas = editor.canvas();
            let [r, g, b] = canvas.background.base_color();
            FrameSurface::solid(canvas.width, canvas.height, [r, g, b, 255])
        }
    };

    let mut sink = DirectoryDownload::new(out);
    let Some(report) = editor.export(&surface, request, &mut sink)? else {
        println!("Unsupported export format '{}'.", request.format);
        return Ok(());
    };

    println!("Exported: {}", report.location);
    println!(
        "  {} bytes (budget {}) | quality {:.1} | x{:.2} | {} attempts",
        report.estimated_bytes, report.byte_budget, report.quality, report.multiplier, report.attempts
    );
    println!("  sha256 {}", report.sha256);
    if report.exceeded_budget {
        warn!("Export is larger than the byte budget");
        println!("  WARNING: could not fit within the byte budget");
    }
    Ok(())
}

pub fn list_templates() -> Result<()> {
    println!("Templates:");
    for template in builtin_templates() {
        println!(
            "  {:<16} {:<24} {} ({} objects)",
            template.id,
            template.name,
            template.format,
            template.objects.len()
        );
    }
    Ok(())
}

/// Load a built-in template by id, or a template file.
pub fn load_template(session: &Session, template: &str) -> Result<()> {
    let template = match Template::builtin(template) {
        Some(builtin) => builtin,
        None => Template::from_file(Path::new(template))?,
    };

    let mut editor = session.open()?;
    editor.load_template(&template)?;
    session.save(&editor)?;
    println!("Loaded template {} ({} layers)", template.name, editor.layers().len());
    Ok(())
}

pub fn show_brand_kit(store: &Path) -> Result<()> {
    let repository = BrandKitRepository::new(FileStore::new(store));
    let kit = repository.load()?;
    println!("{}", serde_json::to_string_pretty(&kit)?);
    Ok(())
}

pub fn update_brand_kit(store: &Path, patch: &str) -> Result<()> {
    let update: BrandKitUpdate =
        serde_json::from_str(patch).map_err(|e| AtelierError::InvalidPatch {
            reason: e.to_string(),
        })?;
    let mut repository = BrandKitRepository::new(FileStore::new(store));
    let kit = repository.update(update)?;
    println!("{}", serde_json::to_string_pretty(&kit)?);
    Ok(())
}

/// Show canvas settings, or change them when any option is given.
pub fn canvas(
    session: &Session,
    format: Option<&str>,
    background: Option<&str>,
    palette: &[String],
) -> Result<()> {
    let mut editor = session.open()?;

    if format.is_none() && background.is_none() && palette.is_empty() {
        let canvas = editor.canvas();
        println!("Format: {}", canvas.format());
        println!("Background: {}", serde_json::to_string(&canvas.background)?);
        return Ok(());
    }

    if let Some(format) = format {
        editor.set_format(format)?;
    }
    if let Some(color) = background {
        editor.update_canvas(CanvasPatch {
            background: Some(Background::Solid(color.to_string())),
            ..Default::default()
        });
    }
    if !palette.is_empty() {
        let colors = palette
            .iter()
            .map(|c| {
                parse_hex_color(c).ok_or_else(|| AtelierError::InvalidPatch {
                    reason: format!("not a hex colour: {}", c),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        editor.apply_palette_background(&colors);
    }

    session.save(&editor)?;
    println!("Canvas: {}", editor.canvas().format());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(temp: &TempDir) -> Session {
        Session::new(temp.path().join("creative.json"), EditorConfig::default())
    }

    #[test]
    fn test_commands_round_trip_through_document() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);

        new_document(&session, "1200x628").unwrap();
        add_text(&session, "Hello", TextOptions::default()).unwrap();
        add_shape(&session, ShapeKind::Rect, 50.0, 50.0, "#000000").unwrap();
        update_layer(&session, "text-1", r#"{"locked": true}"#).unwrap();

        let editor = session.open().unwrap();
        assert_eq!(editor.canvas().format(), "1200x628");
        assert_eq!(editor.layers().len(), 2);
        assert!(editor.layer(&LayerId::from("text-1")).unwrap().locked);

        undo(&session).unwrap();
        let editor = session.open().unwrap();
        assert!(!editor.layer(&LayerId::from("text-1")).unwrap().locked);
    }

    #[test]
    fn test_bad_patch_is_reported() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        new_document(&session, "1080x1080").unwrap();

        let err = update_layer(&session, "text-1", r#"{"colour": "red"}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATCH");
    }

    #[test]
    fn test_export_writes_file() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        new_document(&session, "64x64").unwrap();

        let out = temp.path().join("out");
        export(&session, &ExportRequest::default(), None, &out).unwrap();
        assert!(out.join("creative.png").exists());
    }

    #[test]
    fn test_missing_document() {
        let temp = TempDir::new().unwrap();
        let err = list_layers(&session(&temp)).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
