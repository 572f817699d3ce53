//! Duration probing tests
//!
//! Generates real WAV files with hound and feeds the probed durations
//! into an engine the way the host binary does.

use std::path::Path;

use hound::{WavSpec, WavWriter};
use mtrk_common::events::EventBus;
use mtrk_common::TrackId;
use mtrk_sync::resource::{load_durations, probe_duration};
use mtrk_sync::{Collaborators, EngineOptions, Error, LoadState, MultitrackEngine, TrackSpec};

const TEST_SAMPLE_RATE: u32 = 44100;

/// Write a silent stereo 16-bit WAV file of the given length
fn write_silent_wav(path: &Path, seconds: f64) {
    let spec = WavSpec {
        channels: 2,
        sample_rate: TEST_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).unwrap();
    let frames = (seconds * TEST_SAMPLE_RATE as f64) as usize;
    for _ in 0..frames {
        writer.write_sample(0i16).unwrap();
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_probe_wav_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_silent_wav(&path, 1.5);

    let duration = probe_duration(&path).unwrap();
    assert!((duration - 1.5).abs() < 1e-3, "duration {}", duration);
}

#[test]
fn test_probe_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = probe_duration(&dir.path().join("absent.wav"));
    assert!(matches!(result, Err(Error::Probe(_))));
}

#[test]
fn test_probe_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.wav");
    std::fs::write(&path, b"this is not audio at all").unwrap();

    assert!(matches!(probe_duration(&path), Err(Error::Probe(_))));
}

#[tokio::test]
async fn test_load_durations_keeps_order_and_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let short = dir.path().join("short.wav");
    let long = dir.path().join("long.wav");
    write_silent_wav(&short, 0.5);
    write_silent_wav(&long, 2.0);

    let outcomes = load_durations(vec![
        (TrackId::from("long"), long),
        (TrackId::from("missing"), dir.path().join("missing.wav")),
        (TrackId::from("short"), short),
    ])
    .await;

    let ids: Vec<&str> = outcomes.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["long", "missing", "short"]);
    assert!((outcomes[0].result.as_ref().unwrap() - 2.0).abs() < 1e-3);
    assert!(outcomes[1].result.is_err());
    assert!((outcomes[2].result.as_ref().unwrap() - 0.5).abs() < 1e-3);
}

#[tokio::test]
async fn test_probed_durations_drive_the_timeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lane.wav");
    write_silent_wav(&path, 1.5);
    let url = path.to_string_lossy().into_owned();

    let options = EngineOptions::default();
    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    let mut engine = MultitrackEngine::new(
        vec![
            TrackSpec::file("lane", url.clone()).at(1.0),
            TrackSpec::file("broken", dir.path().join("nope.wav").to_string_lossy()),
        ],
        options.clone(),
        Collaborators::headless(&options),
        bus,
    )
    .unwrap();
    assert_eq!(engine.max_duration(), 0.0);
    assert!(rx.try_recv().is_err());

    let files = engine
        .tracks()
        .iter()
        .filter_map(|t| t.url().map(|u| (t.id().clone(), u.into())))
        .collect();
    for outcome in load_durations(files).await {
        match outcome.result {
            Ok(duration) => engine.handle_resource_loaded(&outcome.id, duration),
            Err(_) => engine.handle_resource_failed(&outcome.id),
        }
    }

    assert!((engine.max_duration() - 2.5).abs() < 1e-3);
    let lane = engine.track(0).unwrap();
    assert_eq!(lane.load_state(), LoadState::Ready);
    assert!((lane.resource().duration().unwrap() - 1.5).abs() < 1e-3);
    assert_eq!(engine.track(1).unwrap().load_state(), LoadState::Failed);
    assert_eq!(rx.try_recv().unwrap().name(), "canplay");
}
