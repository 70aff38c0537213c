//! Playback facts shared between the poller and the renderer.
//!
//! The poller is the only writer. It publishes whole [`PlayerView`] values,
//! so the renderer never observes a label from one track next to the
//! duration of another.

use serde::{Deserialize, Serialize};

use crate::config::{IdleConfig, PlaceholderConfig};

// ── Query results ─────────────────────────────────────────────────────────────

/// One "currently playing" answer from a now-playing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub track_id: String,
    pub track_label: String,
    #[serde(default)]
    pub artists: Vec<String>,
    pub duration_ms: u64,
    pub progress_ms: u64,
    pub is_playing: bool,
}

impl TrackInfo {
    pub fn artist_label(&self) -> String {
        join_artists(&self.artists)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NowPlaying {
    Playing(TrackInfo),
    NotPlaying,
}

pub fn join_artists(artists: &[String]) -> String {
    artists.join(", ")
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Most recently fetched playback facts plus the time they were fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub track_id: Option<String>,
    pub track_label: String,
    pub artist_label: String,
    pub duration_ms: u64,
    pub last_known_progress_ms: u64,
    /// Clock reading (ms) at which `last_known_progress_ms` was observed.
    pub last_poll_ms: u64,
    pub is_playing: bool,
}

impl PlaybackSnapshot {
    pub fn placeholder(placeholder: &PlaceholderConfig) -> Self {
        Self {
            track_id: None,
            track_label: placeholder.track_label.clone(),
            artist_label: placeholder.artist_label.clone(),
            duration_ms: 0,
            last_known_progress_ms: 0,
            last_poll_ms: 0,
            is_playing: false,
        }
    }

    pub fn idle(idle: &IdleConfig, now_ms: u64) -> Self {
        Self {
            track_id: None,
            track_label: idle.track_label.clone(),
            artist_label: idle.artist_label.clone(),
            duration_ms: idle.synthetic_duration_ms,
            last_known_progress_ms: 0,
            last_poll_ms: now_ms,
            is_playing: false,
        }
    }

    /// Fold a poll result into the snapshot.
    ///
    /// Labels and duration are only replaced when the track id changes;
    /// progress, timestamp and play state are refreshed on every poll.
    /// Returns `true` when the track changed.
    pub fn apply(&mut self, info: &TrackInfo, now_ms: u64) -> bool {
        let changed = self.track_id.as_deref() != Some(info.track_id.as_str());
        if changed {
            self.track_id = Some(info.track_id.clone());
            self.track_label = info.track_label.clone();
            self.artist_label = info.artist_label();
            self.duration_ms = info.duration_ms;
        }
        self.last_known_progress_ms = info.progress_ms;
        self.last_poll_ms = now_ms;
        self.is_playing = info.is_playing;
        changed
    }

    /// Interpolated playback position at `now_ms`, clamped to the duration.
    pub fn elapsed_at(&self, now_ms: u64) -> u64 {
        let since_poll = now_ms.saturating_sub(self.last_poll_ms);
        self.last_known_progress_ms
            .saturating_add(since_poll)
            .min(self.duration_ms)
    }
}

// ── View ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No poll has succeeded yet.
    Waiting,
    Playing,
    Paused,
    Idle,
}

/// Unit of publication from poller to renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub snapshot: PlaybackSnapshot,
    pub idle: bool,
    /// Bumped on every publish; 0 until the first successful poll.
    pub rev: u64,
}

impl PlayerView {
    pub fn initial(placeholder: &PlaceholderConfig) -> Self {
        Self {
            snapshot: PlaybackSnapshot::placeholder(placeholder),
            idle: false,
            rev: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.idle {
            Phase::Idle
        } else if self.rev == 0 {
            Phase::Waiting
        } else if self.snapshot.is_playing {
            Phase::Playing
        } else {
            Phase::Paused
        }
    }
}
