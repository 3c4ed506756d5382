//! Canvas Settings
//!
//! The single global description of the drawing area: dimensions and
//! background. Format strings follow the `WIDTHxHEIGHT` convention used by the
//! creative presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AtelierError, Result};

/// Default canvas edge length in pixels.
pub const DEFAULT_CANVAS_SIZE: u32 = 1080;

/// Default solid background.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Named creative format presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasFormat {
    /// 1080x1080 feed post.
    Square,
    /// 1080x1920 vertical story.
    Story,
    /// 1200x628 link preview.
    Landscape,
}

impl CanvasFormat {
    /// Pixel dimensions of the preset.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CanvasFormat::Square => (1080, 1080),
            CanvasFormat::Story => (1080, 1920),
            CanvasFormat::Landscape => (1200, 628),
        }
    }

    /// All presets, in display order.
    pub fn all() -> [CanvasFormat; 3] {
        [CanvasFormat::Square, CanvasFormat::Story, CanvasFormat::Landscape]
    }
}

impl fmt::Display for CanvasFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{}x{}", w, h)
    }
}

/// Parse a `WIDTHxHEIGHT` format string (presets are plain instances of it).
pub fn parse_format(format: &str) -> Result<(u32, u32)> {
    let invalid = || AtelierError::InvalidFormat {
        format: format.to_string(),
    };

    let (w, h) = format.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

/// A colour stop inside a gradient, `offset` in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

/// Gradient geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradientKind {
    /// Linear gradient along `angle_deg` (0 = left to right).
    Linear { angle_deg: f64 },
    /// Radial gradient centred at a fraction of the canvas.
    Radial { cx: f64, cy: f64 },
}

/// Gradient descriptor handed to the rendering surface as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    /// Build a backdrop gradient from an extracted palette.
    ///
    /// Up to three palette colours become accent stops over the first half,
    /// fading into a dark base. An empty palette yields the neutral slate
    /// backdrop.
    pub fn from_palette(palette: &[[u8; 3]]) -> Self {
        if palette.is_empty() {
            return Self {
                kind: GradientKind::Radial { cx: 0.1, cy: 0.2 },
                stops: vec![
                    ColorStop {
                        offset: 0.0,
                        color: "rgba(30, 41, 59, 0.9)".to_string(),
                    },
                    ColorStop {
                        offset: 0.9,
                        color: "rgba(15, 23, 42, 0.95)".to_string(),
                    },
                ],
            };
        }

        let accents: Vec<&[u8; 3]> = palette.iter().take(3).collect();
        let span = 0.5 / accents.len() as f64;
        let mut stops: Vec<ColorStop> = accents
            .iter()
            .enumerate()
            .map(|(i, rgb)| ColorStop {
                offset: i as f64 * span,
                color: format!("rgb({}, {}, {})", rgb[0], rgb[1], rgb[2]),
            })
            .collect();
        stops.push(ColorStop {
            offset: 0.75,
            color: "#111827".to_string(),
        });
        stops.push(ColorStop {
            offset: 1.0,
            color: "#000000".to_string(),
        });

        Self {
            kind: GradientKind::Linear { angle_deg: 135.0 },
            stops,
        }
    }
}

/// Canvas background: a solid colour or a gradient descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    Solid(String),
    Gradient(Gradient),
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(DEFAULT_BACKGROUND.to_string())
    }
}

impl Background {
    /// Flat colour standing in for the background: the solid colour, or the
    /// first `#rrggbb` stop of a gradient. White when nothing parses.
    pub fn base_color(&self) -> [u8; 3] {
        let parsed = match self {
            Background::Solid(color) => parse_hex_color(color),
            Background::Gradient(gradient) => {
                gradient.stops.iter().find_map(|stop| parse_hex_color(&stop.color))
            }
        };
        parsed.unwrap_or([255, 255, 255])
    }
}

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?]),
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(rgb)
        }
        _ => None,
    }
}

/// Global canvas settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub background: Background,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_SIZE,
            height: DEFAULT_CANVAS_SIZE,
            background: Background::default(),
        }
    }
}

impl CanvasSettings {
    /// Create settings with a solid white background.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Background::default(),
        }
    }

    /// Switch to a `WIDTHxHEIGHT` format, keeping the background.
    pub fn apply_format(&mut self, format: &str) -> Result<()> {
        let (width, height) = parse_format(format)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Current format string.
    pub fn format(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Merge a partial update.
    pub fn apply(&mut self, patch: CanvasPatch) {
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(background) = patch.background {
            self.background = background;
        }
    }
}

impl FromStr for CanvasSettings {
    type Err = AtelierError;

    fn from_str(s: &str) -> Result<Self> {
        let (width, height) = parse_format(s)?;
        Ok(Self::new(width, height))
    }
}

/// Partial update of [`CanvasSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasPatch {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub background: Option<Background>,
}
