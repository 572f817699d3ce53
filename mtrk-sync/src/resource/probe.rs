//! Media duration probing using symphonia
//!
//! Supplies the load-complete notification for file-backed lanes: the
//! host probes every file off the engine's thread and feeds the outcome
//! back through `handle_resource_loaded` / `handle_resource_failed`.

use std::path::{Path, PathBuf};

use mtrk_common::TrackId;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Result of loading one track's metadata
#[derive(Debug)]
pub struct LoadOutcome {
    pub id: TrackId,
    pub result: Result<f64>,
}

/// Read the duration of a media file in seconds
///
/// Uses the container's frame count when it declares one; otherwise sums
/// packet durations without decoding.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Probe(format!("Failed to open file {}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| Error::Probe(format!("Failed to probe format: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Probe("No audio track found".to_string()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    if let (Some(frames), Some(rate)) = (params.n_frames, params.sample_rate) {
        if rate > 0 {
            let seconds = frames as f64 / rate as f64;
            debug!("Probed {}: {:.3}s from frame count", path.display(), seconds);
            return Ok(seconds);
        }
    }

    let time_base = params
        .time_base
        .ok_or_else(|| Error::Probe("Stream declares neither length nor time base".to_string()))?;

    let mut total_ts: u64 = 0;
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => total_ts += packet.dur,
            Ok(_) => {}
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => return Err(Error::Probe(format!("Failed to read packet: {}", e))),
        }
    }

    let time = time_base.calc_time(total_ts);
    let seconds = time.seconds as f64 + time.frac;
    debug!("Probed {}: {:.3}s from packet scan", path.display(), seconds);
    Ok(seconds)
}

/// Probe every file on tokio's blocking pool
///
/// Outcomes are returned in input order; a failed probe yields an `Err`
/// outcome, never a panic.
pub async fn load_durations(files: Vec<(TrackId, PathBuf)>) -> Vec<LoadOutcome> {
    let handles: Vec<_> = files
        .into_iter()
        .map(|(id, path)| {
            let task = tokio::task::spawn_blocking(move || probe_duration(&path));
            (id, task)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (id, task) in handles {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(Error::Probe(format!("Probe task failed: {}", e))),
        };
        if let Err(e) = &result {
            warn!("Loading track {} failed: {}", id, e);
        }
        outcomes.push(LoadOutcome { id, result });
    }
    outcomes
}
