//! Cue, fade and envelope operations for MultitrackEngine
//!
//! **Responsibilities:**
//! - Cue window and fade setters (muting follows immediately)
//! - Keeping the derived fade points in step with cues and fades
//! - Envelope points get/set and read-back of envelope gestures
//! - Intro marker and drop lanes

use mtrk_common::events::MultitrackEvent;
use mtrk_common::EnvelopePoint;
use tracing::{debug, warn};

use super::MultitrackEngine;
use crate::envelope::EnvelopeEvent;
use crate::timeline::cue::{derive_fade_points, read_fade_points};
use crate::track::Intro;

/// Which cue window value a setter changes
#[derive(Debug, Clone, Copy)]
enum CueField {
    StartCue,
    EndCue,
    FadeInEnd,
    FadeOutStart,
}

impl MultitrackEngine {
    pub fn set_start_cue(&mut self, index: usize, start_cue: Option<f64>) {
        self.set_cue_field(index, CueField::StartCue, start_cue);
    }

    pub fn set_end_cue(&mut self, index: usize, end_cue: Option<f64>) {
        self.set_cue_field(index, CueField::EndCue, end_cue);
    }

    pub fn set_fade_in_end(&mut self, index: usize, fade_in_end: Option<f64>) {
        self.set_cue_field(index, CueField::FadeInEnd, fade_in_end);
    }

    pub fn set_fade_out_start(&mut self, index: usize, fade_out_start: Option<f64>) {
        self.set_cue_field(index, CueField::FadeOutStart, fade_out_start);
    }

    /// Update one cue window value, emit its event, re-derive fade
    /// points and re-apply the current position
    fn set_cue_field(&mut self, index: usize, field: CueField, value: Option<f64>) {
        if self.destroyed {
            return;
        }
        if value.is_some_and(|v| !v.is_finite()) {
            warn!("Ignoring non-finite {:?} for track {}", field, index);
            return;
        }
        let Some(track) = self.registry.get_mut(index) else {
            debug!("{:?}: no track at index {}", field, index);
            return;
        };

        let id = track.id.clone();
        let timestamp = chrono::Utc::now();
        let event = match field {
            CueField::StartCue => {
                track.cues.start_cue = value;
                MultitrackEvent::StartCueChange {
                    id,
                    start_cue: value,
                    timestamp,
                }
            }
            CueField::EndCue => {
                track.cues.end_cue = value;
                MultitrackEvent::EndCueChange {
                    id,
                    end_cue: value,
                    timestamp,
                }
            }
            CueField::FadeInEnd => {
                track.cues.fade_in_end = value;
                MultitrackEvent::FadeInChange {
                    id,
                    fade_in_end: value,
                    timestamp,
                }
            }
            CueField::FadeOutStart => {
                track.cues.fade_out_start = value;
                MultitrackEvent::FadeOutChange {
                    id,
                    fade_out_start: value,
                    timestamp,
                }
            }
        };

        self.emit(event);
        self.rederive_fades(index);
        self.apply_position(self.position, false);
    }

    /// Rebuild a track's fade points; emits `envelope-points-change` and
    /// updates the envelope only when the points actually changed
    pub(super) fn rederive_fades(&mut self, index: usize) {
        let Some(track) = self.registry.get_mut(index) else {
            return;
        };

        let points = derive_fade_points(&track.envelope_points, &track.cues, track.volume);
        if points == track.envelope_points {
            return;
        }

        track.envelope_points = points.clone();
        if let Some(envelope) = track.envelope.as_mut() {
            envelope.set_points(points.clone());
        }
        let id = track.id.clone();

        self.emit(MultitrackEvent::EnvelopePointsChange {
            id,
            points,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Envelope points of a track, as the envelope collaborator holds them
    pub fn get_envelope_points(&self, index: usize) -> Option<Vec<EnvelopePoint>> {
        let track = self.registry.get(index)?;
        Some(match &track.envelope {
            Some(envelope) => envelope.points(),
            None => track.envelope_points.clone(),
        })
    }

    /// Replace a track's envelope points
    ///
    /// Points carrying the fade ids update the track's fade values.
    pub fn set_envelope_points(&mut self, index: usize, mut points: Vec<EnvelopePoint>) {
        if self.destroyed {
            return;
        }
        if points.iter().any(|p| !(p.time.is_finite() && p.volume.is_finite())) {
            warn!("Ignoring envelope with non-finite points for track {}", index);
            return;
        }
        points.sort_by(|a, b| a.time.total_cmp(&b.time));

        let Some(track) = self.registry.get_mut(index) else {
            debug!("set_envelope_points: no track at index {}", index);
            return;
        };
        if let Some(envelope) = track.envelope.as_mut() {
            envelope.set_points(points.clone());
        }
        self.absorb_points(index, points);
    }

    /// Read back gestures queued by every envelope collaborator
    ///
    /// Runs on every sync frame; hosts call it directly while paused.
    pub fn sync_envelopes(&mut self) {
        if self.destroyed {
            return;
        }
        for index in 0..self.registry.len() {
            let events = match self
                .registry
                .get_mut(index)
                .and_then(|t| t.envelope.as_mut())
            {
                Some(envelope) => envelope.drain_events(),
                None => continue,
            };

            for event in events {
                match event {
                    EnvelopeEvent::PointsChanged(points) => self.absorb_points(index, points),
                    EnvelopeEvent::VolumeChanged(volume) => self.absorb_volume(index, volume),
                }
            }
        }
    }

    /// Take over a new set of points: fade values first, then the points
    fn absorb_points(&mut self, index: usize, points: Vec<EnvelopePoint>) {
        let Some(track) = self.registry.get_mut(index) else {
            return;
        };
        let id = track.id.clone();
        let (fade_in_end, fade_out_start) = read_fade_points(&points);
        track.envelope_points = points.clone();

        let mut changes = Vec::new();
        if fade_in_end.is_some() && fade_in_end != track.cues.fade_in_end {
            track.cues.fade_in_end = fade_in_end;
            changes.push(MultitrackEvent::FadeInChange {
                id: id.clone(),
                fade_in_end,
                timestamp: chrono::Utc::now(),
            });
        }
        if fade_out_start.is_some() && fade_out_start != track.cues.fade_out_start {
            track.cues.fade_out_start = fade_out_start;
            changes.push(MultitrackEvent::FadeOutChange {
                id: id.clone(),
                fade_out_start,
                timestamp: chrono::Utc::now(),
            });
        }

        for event in changes {
            self.emit(event);
        }
        self.emit(MultitrackEvent::EnvelopePointsChange {
            id,
            points,
            timestamp: chrono::Utc::now(),
        });
        self.apply_position(self.position, false);
    }

    fn absorb_volume(&mut self, index: usize, volume: f64) {
        let apply_gain = self.options.apply_envelope_gain;
        let Some(track) = self.registry.get_mut(index) else {
            return;
        };
        let volume = volume.clamp(0.0, 1.0);
        track.volume = volume;
        if !apply_gain {
            track.resource.set_volume(volume);
        }
        let id = track.id.clone();

        self.emit(MultitrackEvent::VolumeChange {
            id,
            volume,
            timestamp: chrono::Utc::now(),
        });
        self.rederive_fades(index);
        self.apply_position(self.position, false);
    }

    /// Move (or create) a track's intro marker
    pub fn set_intro_end(&mut self, index: usize, end_time: f64) {
        if self.destroyed {
            return;
        }
        if !end_time.is_finite() {
            warn!("Ignoring non-finite intro end {} for track {}", end_time, index);
            return;
        }
        let Some(track) = self.registry.get_mut(index) else {
            debug!("set_intro_end: no track at index {}", index);
            return;
        };

        match track.intro.as_mut() {
            Some(intro) => intro.end_time = end_time,
            None => {
                track.intro = Some(Intro {
                    end_time,
                    label: None,
                    color: None,
                })
            }
        }
        let id = track.id.clone();

        self.emit(MultitrackEvent::IntroEndChange {
            id,
            end_time,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Drop gesture on a lane; only placeholder lanes (no source) accept it
    pub fn handle_drop(&mut self, index: usize) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(track) = self.registry.get(index) else {
            debug!("handle_drop: no track at index {}", index);
            return false;
        };
        if track.url().is_some() {
            debug!("Track {} has a source, ignoring drop", track.id());
            return false;
        }

        let id = track.id().clone();
        self.emit(MultitrackEvent::Drop {
            id,
            timestamp: chrono::Utc::now(),
        });
        true
    }
}
