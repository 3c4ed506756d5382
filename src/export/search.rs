//! Size-bounded export search
//!
//! The first attempt uses the requested format and quality at the initial
//! multiplier. When that overshoots the budget the search switches to the
//! lossy format and degrades step by step:
//!
//! 1. quality down by 0.1 while it stays above the switch floor,
//! 2. then the multiplier times the decay while it stays above its minimum,
//! 3. then quality down again until the quality floor.
//!
//! The first attempt that fits wins. Otherwise the last attempt is delivered
//! and flagged as over budget. Quality is tracked in integer tenths.

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::download::DownloadSink;
use super::surface::{decode_data_url, estimate_bytes, RasterSurface};
use super::{ExportFormat, ExportReport, ExportRequest};
use crate::config::ExportConfig;
use crate::error::Result;

/// Format the search falls back to.
const LOSSY_FORMAT: ExportFormat = ExportFormat::Jpeg;

fn to_tenths(quality: f64) -> i32 {
    (quality * 10.0).round() as i32
}

struct Attempt {
    format: ExportFormat,
    quality: f64,
    multiplier: f64,
    data_url: String,
    estimated_bytes: usize,
}

fn encode(
    surface: &dyn RasterSurface,
    format: ExportFormat,
    quality: f64,
    multiplier: f64,
    attempt: u32,
) -> Result<Attempt> {
    let data_url = surface.to_data_url(format, quality, multiplier)?;
    let estimated_bytes = estimate_bytes(&data_url);
    debug!(
        attempt,
        %format,
        quality,
        multiplier,
        estimated_bytes,
        "export attempt"
    );
    Ok(Attempt {
        format,
        quality,
        multiplier,
        data_url,
        estimated_bytes,
    })
}

/// Encode `surface` within the request's byte budget and hand the result to
/// `sink`.
///
/// Returns `Ok(None)` without encoding anything when the format is not
/// supported.
pub fn export_scene(
    surface: &dyn RasterSurface,
    request: &ExportRequest,
    config: &ExportConfig,
    sink: &mut dyn DownloadSink,
) -> Result<Option<ExportReport>> {
    let Some(format) = ExportFormat::from_id(&request.format) else {
        warn!(format = %request.format, "unsupported export format");
        return Ok(None);
    };
    let budget = request.byte_budget.unwrap_or(config.byte_budget);

    let mut attempts = 1;
    let mut last = encode(surface, format, request.quality, config.initial_multiplier, attempts)?;

    if last.estimated_bytes > budget {
        let switch_floor = to_tenths(config.quality_switch_floor);
        let quality_floor = to_tenths(config.quality_floor).max(1);
        let mut quality = to_tenths(config.search_quality);
        let mut multiplier = config.search_multiplier;

        while attempts < config.max_attempts {
            attempts += 1;
            last = encode(
                surface,
                LOSSY_FORMAT,
                f64::from(quality) / 10.0,
                multiplier,
                attempts,
            )?;
            if last.estimated_bytes <= budget {
                break;
            }

            if quality > switch_floor {
                quality -= 1;
            } else if multiplier * config.multiplier_decay >= config.min_multiplier {
                multiplier *= config.multiplier_decay;
            } else if quality > quality_floor {
                quality -= 1;
            } else {
                break;
            }
        }
    }

    let exceeded_budget = last.estimated_bytes > budget;
    let (_, bytes) = decode_data_url(&last.data_url)?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));
    let filename = format!("creative.{}", last.format.extension());
    let location = sink.deliver(&filename, &bytes)?;

    if exceeded_budget {
        warn!(
            attempts,
            estimated_bytes = last.estimated_bytes,
            budget,
            "export exceeds byte budget, delivering best effort"
        );
    } else {
        info!(
            attempts,
            format = %last.format,
            estimated_bytes = last.estimated_bytes,
            "export within budget"
        );
    }

    Ok(Some(ExportReport {
        data_url: last.data_url,
        format: last.format,
        quality: last.quality,
        multiplier: last.multiplier,
        estimated_bytes: last.estimated_bytes,
        byte_budget: budget,
        attempts,
        exceeded_budget,
        filename,
        location,
        sha256,
    }))
}
