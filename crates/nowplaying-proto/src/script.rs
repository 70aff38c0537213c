//! Now-playing scripts: canned sequences of poll answers.
//!
//! A script drives the scripted source used by the host preview and by
//! tests. TOML is the primary format; files ending in `.json` are parsed
//! with the same schema.
//!
//! ```toml
//! loop = true
//!
//! [[step]]
//! kind = "playing"
//! track_id = "t1"
//! track = "Song"
//! artists = ["Band"]
//! duration_ms = 200000
//! progress_ms = 50000
//! polls = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::snapshot::TrackInfo;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML script: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON script: {0}")]
    Json(#[from] serde_json::Error),
    #[error("script has no steps")]
    Empty,
    #[error("step {index}: {reason}")]
    InvalidStep { index: usize, reason: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Playing,
    Paused,
    Idle,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub kind: StepKind,
    #[serde(default)]
    pub track_id: String,
    #[serde(default)]
    pub track: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub progress_ms: u64,
    /// Number of consecutive polls answered by this step.
    #[serde(default = "default_polls")]
    pub polls: u32,
}

fn default_polls() -> u32 {
    1
}

impl ScriptStep {
    /// Poll answer for playing/paused steps; `None` for idle and error steps.
    pub fn track_info(&self) -> Option<TrackInfo> {
        let is_playing = match self.kind {
            StepKind::Playing => true,
            StepKind::Paused => false,
            StepKind::Idle | StepKind::Error => return None,
        };
        Some(TrackInfo {
            track_id: self.track_id.clone(),
            track_label: self.track.clone(),
            artists: self.artists.clone(),
            duration_ms: self.duration_ms,
            progress_ms: self.progress_ms.min(self.duration_ms),
            is_playing,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Restart from the first step after the last one; otherwise hold the last step.
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default, rename = "step")]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ScriptError> {
        let script: Self = toml::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ScriptError> {
        let script: Self = serde_json::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<(), ScriptError> {
        if self.steps.is_empty() {
            return Err(ScriptError::Empty);
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.polls == 0 {
                return Err(ScriptError::InvalidStep {
                    index,
                    reason: "polls must be at least 1",
                });
            }
            if matches!(step.kind, StepKind::Playing | StepKind::Paused) {
                if step.track_id.is_empty() {
                    return Err(ScriptError::InvalidStep {
                        index,
                        reason: "track_id is required",
                    });
                }
                if step.duration_ms == 0 {
                    return Err(ScriptError::InvalidStep {
                        index,
                        reason: "duration_ms is required",
                    });
                }
            }
        }
        Ok(())
    }

    /// A one-step script answering "nothing playing" forever.
    pub fn idle() -> Self {
        Self {
            looping: false,
            steps: vec![ScriptStep {
                kind: StepKind::Idle,
                track_id: String::new(),
                track: String::new(),
                artists: Vec::new(),
                duration_ms: 0,
                progress_ms: 0,
                polls: 1,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        loop = true

        [[step]]
        kind = "playing"
        track_id = "t1"
        track = "Song"
        artists = ["Band", "Guest"]
        duration_ms = 200000
        progress_ms = 50000
        polls = 3

        [[step]]
        kind = "error"

        [[step]]
        kind = "idle"
        polls = 2
    "#;

    #[test]
    fn test_parse_toml_script() {
        let script = Script::from_toml_str(SAMPLE).unwrap();
        assert!(script.looping);
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.steps[0].polls, 3);
        assert_eq!(script.steps[1].kind, StepKind::Error);
        assert_eq!(script.steps[1].polls, 1);

        let info = script.steps[0].track_info().unwrap();
        assert_eq!(info.artist_label(), "Band, Guest");
        assert!(info.is_playing);
        assert!(script.steps[2].track_info().is_none());
    }

    #[test]
    fn test_parse_json_script() {
        let script = Script::from_json_str(
            r#"{"step": [{"kind": "paused", "track_id": "x", "track": "T",
                "duration_ms": 1000, "progress_ms": 5000}]}"#,
        )
        .unwrap();
        assert!(!script.looping);
        let info = script.steps[0].track_info().unwrap();
        assert!(!info.is_playing);
        assert_eq!(info.progress_ms, 1000);
    }

    #[test]
    fn test_rejects_empty_and_incomplete_scripts() {
        assert!(matches!(Script::from_toml_str(""), Err(ScriptError::Empty)));
        assert!(matches!(
            Script::from_toml_str("[[step]]\nkind = \"playing\"\nduration_ms = 10\n"),
            Err(ScriptError::InvalidStep { index: 0, .. })
        ));
        assert!(matches!(
            Script::from_toml_str("[[step]]\nkind = \"idle\"\npolls = 0\n"),
            Err(ScriptError::InvalidStep { index: 0, .. })
        ));
        assert!(matches!(
            Script::from_toml_str("[[step]]\nkind = \"skipping\"\n"),
            Err(ScriptError::Toml(_))
        ));
    }
}
