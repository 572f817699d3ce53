//! Test helpers for mtrk-sync integration tests
//!
//! Provides scripted collaborators whose state stays observable after
//! the engine takes ownership of them:
//! - MockResource: playback resource that only moves when told to
//! - MockFactory: hands out MockResources and keeps their handles
//! - SharedEnvelope: PointEnvelope the test can drive gestures on
//! - RecordingBridge: records every layout and cursor update

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mtrk_common::events::{EventBus, MultitrackEvent};
use mtrk_common::{EnvelopePoint, FadeCurve, TrackId};
use mtrk_sync::bridge::{RenderingBridge, TrackOffset};
use mtrk_sync::envelope::{EnvelopeControl, EnvelopeEvent, EnvelopeFactory, PointEnvelope};
use mtrk_sync::resource::{PlaybackResource, ResourceFactory};
use mtrk_sync::{Collaborators, EngineOptions, MultitrackEngine, TrackSpec};
use tokio::sync::broadcast::Receiver;

// ========================================
// Playback resource
// ========================================

/// Observable state of one MockResource
#[derive(Debug, Clone)]
pub struct MockState {
    pub time: f64,
    pub paused: bool,
    pub muted: bool,
    pub volume: f64,
    pub rate: f64,
    pub duration: Option<f64>,
    pub sink_id: Option<String>,
    pub released: bool,
    pub plays: usize,
    pub pauses: usize,
    pub seeks: usize,
    pub mute_writes: usize,
    pub volume_writes: usize,
}

impl MockState {
    fn new(duration: Option<f64>) -> Self {
        Self {
            time: 0.0,
            paused: true,
            muted: false,
            volume: 1.0,
            rate: 1.0,
            duration,
            sink_id: None,
            released: false,
            plays: 0,
            pauses: 0,
            seeks: 0,
            mute_writes: 0,
            volume_writes: 0,
        }
    }
}

/// Shared view of a MockResource's state
#[derive(Debug, Clone)]
pub struct MockHandle(Rc<RefCell<MockState>>);

impl MockHandle {
    pub fn state(&self) -> MockState {
        self.0.borrow().clone()
    }

    /// Simulate the resource's own clock moving to `time`
    pub fn set_time(&self, time: f64) {
        self.0.borrow_mut().time = time;
    }

    pub fn time(&self) -> f64 {
        self.0.borrow().time
    }

    pub fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }

    pub fn is_muted(&self) -> bool {
        self.0.borrow().muted
    }
}

/// Resource whose clock only moves through [`MockHandle::set_time`]
pub struct MockResource(Rc<RefCell<MockState>>);

impl PlaybackResource for MockResource {
    fn play(&mut self) {
        let mut s = self.0.borrow_mut();
        s.paused = false;
        s.plays += 1;
    }

    fn pause(&mut self) {
        let mut s = self.0.borrow_mut();
        s.paused = true;
        s.pauses += 1;
    }

    fn is_paused(&self) -> bool {
        self.0.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut s = self.0.borrow_mut();
        // Like a media element: a seek cannot go past the end
        s.time = match s.duration {
            Some(duration) => seconds.min(duration),
            None => seconds,
        };
        s.seeks += 1;
    }

    fn volume(&self) -> f64 {
        self.0.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        let mut s = self.0.borrow_mut();
        s.volume = volume;
        s.volume_writes += 1;
    }

    fn is_muted(&self) -> bool {
        self.0.borrow().muted
    }

    fn set_muted(&mut self, muted: bool) {
        let mut s = self.0.borrow_mut();
        s.muted = muted;
        s.mute_writes += 1;
    }

    fn playback_rate(&self) -> f64 {
        self.0.borrow().rate
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.0.borrow_mut().rate = rate;
    }

    fn duration(&self) -> Option<f64> {
        self.0.borrow().duration
    }

    fn set_duration(&mut self, seconds: f64) {
        self.0.borrow_mut().duration = Some(seconds);
    }

    fn set_sink_id(&mut self, sink_id: &str) {
        self.0.borrow_mut().sink_id = Some(sink_id.to_string());
    }

    fn release(&mut self) {
        let mut s = self.0.borrow_mut();
        s.paused = true;
        s.released = true;
    }
}

/// Handles of every MockResource created, latest per track id
#[derive(Debug, Clone, Default)]
pub struct MockResources(Rc<RefCell<HashMap<TrackId, Vec<MockHandle>>>>);

impl MockResources {
    /// Current resource of a track
    pub fn get(&self, id: &str) -> MockHandle {
        self.all(id)
            .last()
            .cloned()
            .unwrap_or_else(|| panic!("no resource created for {}", id))
    }

    /// Every resource ever created for a track, oldest first
    pub fn all(&self, id: &str) -> Vec<MockHandle> {
        self.0
            .borrow()
            .get(&TrackId::from(id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn created(&self) -> usize {
        self.0.borrow().values().map(Vec::len).sum()
    }
}

/// Url lanes start unloaded; url-less lanes know their duration
pub struct MockFactory {
    created: MockResources,
}

impl ResourceFactory for MockFactory {
    fn create(&mut self, spec: &TrackSpec) -> Box<dyn PlaybackResource> {
        let duration = match spec.url {
            Some(_) => None,
            None => Some(spec.duration.unwrap_or(0.0)),
        };
        let state = Rc::new(RefCell::new(MockState::new(duration)));
        self.created
            .0
            .borrow_mut()
            .entry(spec.id.clone())
            .or_default()
            .push(MockHandle(state.clone()));
        Box::new(MockResource(state))
    }
}

// ========================================
// Envelope
// ========================================

/// PointEnvelope shared between the engine and the test
#[derive(Clone)]
pub struct SharedEnvelope(pub Rc<RefCell<PointEnvelope>>);

impl EnvelopeControl for SharedEnvelope {
    fn points(&self) -> Vec<EnvelopePoint> {
        self.0.borrow().points()
    }

    fn set_points(&mut self, points: Vec<EnvelopePoint>) {
        self.0.borrow_mut().set_points(points);
    }

    fn volume(&self) -> f64 {
        self.0.borrow().volume()
    }

    fn set_volume(&mut self, volume: f64) {
        self.0.borrow_mut().set_volume(volume);
    }

    fn volume_at(&self, local_time: f64) -> Option<f64> {
        self.0.borrow().volume_at(local_time)
    }

    fn drag_point(&mut self, index: usize, time: f64, volume: f64) {
        self.0.borrow_mut().drag_point(index, time, volume);
    }

    fn drag_volume(&mut self, volume: f64) {
        self.0.borrow_mut().drag_volume(volume);
    }

    fn drain_events(&mut self) -> Vec<EnvelopeEvent> {
        self.0.borrow_mut().drain_events()
    }
}

#[derive(Clone, Default)]
pub struct SharedEnvelopes(Rc<RefCell<HashMap<TrackId, SharedEnvelope>>>);

impl SharedEnvelopes {
    pub fn get(&self, id: &str) -> SharedEnvelope {
        self.0
            .borrow()
            .get(&TrackId::from(id))
            .cloned()
            .unwrap_or_else(|| panic!("no envelope created for {}", id))
    }
}

pub struct SharedEnvelopeFactory {
    created: SharedEnvelopes,
}

impl EnvelopeFactory for SharedEnvelopeFactory {
    fn create(&mut self, spec: &TrackSpec) -> Option<Box<dyn EnvelopeControl>> {
        let mut envelope = PointEnvelope::new(FadeCurve::Linear);
        envelope.set_volume(spec.volume);
        let shared = SharedEnvelope(Rc::new(RefCell::new(envelope)));
        self.created
            .0
            .borrow_mut()
            .insert(spec.id.clone(), shared.clone());
        Some(Box::new(shared))
    }
}

// ========================================
// Rendering bridge
// ========================================

#[derive(Debug, Clone, Default)]
pub struct BridgeLog {
    pub width: Option<f64>,
    pub offsets: Vec<TrackOffset>,
    /// Every cursor update as (fraction, auto_center)
    pub cursor: Vec<(f64, bool)>,
}

impl BridgeLog {
    pub fn offset_of(&self, id: &str) -> Option<f64> {
        self.offsets
            .iter()
            .find(|o| o.id.as_str() == id)
            .map(|o| o.pixels)
    }

    pub fn last_cursor(&self) -> Option<(f64, bool)> {
        self.cursor.last().copied()
    }
}

pub struct RecordingBridge {
    container_width: f64,
    log: Rc<RefCell<BridgeLog>>,
}

impl RenderingBridge for RecordingBridge {
    fn container_width(&self) -> f64 {
        self.container_width
    }

    fn set_width(&mut self, total_pixels: f64) {
        self.log.borrow_mut().width = Some(total_pixels);
    }

    fn set_offsets(&mut self, offsets: &[TrackOffset]) {
        self.log.borrow_mut().offsets = offsets.to_vec();
    }

    fn update_cursor(&mut self, fraction: f64, auto_center: bool) {
        self.log.borrow_mut().cursor.push((fraction, auto_center));
    }
}

// ========================================
// Engine fixture
// ========================================

/// Engine wired to mock collaborators, plus views into them
pub struct Fixture {
    pub engine: MultitrackEngine,
    pub resources: MockResources,
    pub envelopes: SharedEnvelopes,
    pub bridge: Rc<RefCell<BridgeLog>>,
    pub events: Receiver<MultitrackEvent>,
}

impl Fixture {
    pub fn new(specs: Vec<TrackSpec>) -> Self {
        Self::with_options(specs, EngineOptions::default())
    }

    pub fn with_options(specs: Vec<TrackSpec>, options: EngineOptions) -> Self {
        let resources = MockResources::default();
        let envelopes = SharedEnvelopes::default();
        let bridge = Rc::new(RefCell::new(BridgeLog::default()));

        let collaborators = Collaborators {
            bridge: Box::new(RecordingBridge {
                container_width: 1000.0,
                log: bridge.clone(),
            }),
            resources: Box::new(MockFactory {
                created: resources.clone(),
            }),
            envelopes: Box::new(SharedEnvelopeFactory {
                created: envelopes.clone(),
            }),
        };

        let bus = EventBus::new(256);
        let events = bus.subscribe();
        let engine = MultitrackEngine::new(specs, options, collaborators, bus)
            .expect("engine construction");

        Self {
            engine,
            resources,
            envelopes,
            bridge,
            events,
        }
    }

    /// Events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<MultitrackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Names of events emitted since the last call
    pub fn event_names(&mut self) -> Vec<&'static str> {
        self.drain_events().iter().map(|e| e.name()).collect()
    }

    pub fn bridge(&self) -> BridgeLog {
        self.bridge.borrow().clone()
    }
}

/// The two-lane timeline used throughout: A at 0 (10 s), B at 5 (10 s)
pub fn two_lanes() -> Vec<TrackSpec> {
    vec![
        TrackSpec::silent("a", 10.0).draggable(),
        TrackSpec::silent("b", 10.0).at(5.0).draggable(),
    ]
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
