//! Now-playing sources.
//!
//! The poller only needs "what is playing right now"; the streaming
//! service client lives outside this crate and plugs in through
//! [`NowPlayingSource`].

use std::future::Future;
use std::sync::Arc;

use nowplaying_proto::script::{Script, StepKind};
use nowplaying_proto::snapshot::NowPlaying;
use thiserror::Error;
use tracing::debug;

use crate::clock::Clock;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    /// Retried on the next poll.
    #[error("transient query failure: {0}")]
    Transient(String),
}

pub trait NowPlayingSource: Send + 'static {
    fn fetch(&mut self) -> impl Future<Output = Result<NowPlaying, SourceError>> + Send;
}

/// Replays a [`Script`]. Progress of a playing step advances with the clock
/// from the moment the step is first served.
pub struct ScriptedSource {
    script: Script,
    clock: Arc<dyn Clock>,
    index: usize,
    served: u32,
    step_started_ms: u64,
}

impl ScriptedSource {
    pub fn new(script: Script, clock: Arc<dyn Clock>) -> Self {
        Self {
            script,
            clock,
            index: 0,
            served: 0,
            step_started_ms: 0,
        }
    }

    fn answer(&mut self) -> Result<NowPlaying, SourceError> {
        let now = self.clock.now_ms();
        if self.served == 0 {
            self.step_started_ms = now;
        }
        let Some(step) = self.script.steps.get(self.index) else {
            return Err(SourceError::Transient("script has no steps".into()));
        };

        let answer = match step.track_info() {
            Some(mut info) => {
                if info.is_playing {
                    let since = now.saturating_sub(self.step_started_ms);
                    info.progress_ms = info.progress_ms.saturating_add(since).min(info.duration_ms);
                }
                Ok(NowPlaying::Playing(info))
            }
            None if step.kind == StepKind::Error => {
                Err(SourceError::Transient(format!("scripted failure at step {}", self.index)))
            }
            None => Ok(NowPlaying::NotPlaying),
        };

        self.served = self.served.saturating_add(1);
        if self.served >= step.polls {
            if self.index + 1 < self.script.steps.len() {
                self.index += 1;
                self.served = 0;
            } else if self.script.looping {
                self.index = 0;
                self.served = 0;
            }
            // Otherwise hold the last step.
        }
        answer
    }
}

impl NowPlayingSource for ScriptedSource {
    async fn fetch(&mut self) -> Result<NowPlaying, SourceError> {
        let answer = self.answer();
        debug!(step = self.index, "scripted source answered");
        answer
    }
}
