//! Poller task: queries the now-playing source and publishes views.
//!
//! The poller is the single writer of playback state. Each successful poll
//! produces a whole new [`PlayerView`] on the watch channel; nothing else
//! mutates it.

use std::sync::Arc;

use nowplaying_proto::config::{Config, IdleConfig};
use nowplaying_proto::snapshot::{NowPlaying, PlaybackSnapshot, PlayerView};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::idle::{IdleState, IdleTransition};
use crate::source::{NowPlayingSource, SourceError};

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Updated { track_changed: bool, left_idle: bool },
    EnteredIdle,
    StillIdle,
    Failed(SourceError),
}

pub struct Poller<S> {
    source: S,
    clock: Arc<dyn Clock>,
    idle: IdleState,
    idle_config: IdleConfig,
    view: PlayerView,
    tx: watch::Sender<PlayerView>,
}

impl<S: NowPlayingSource> Poller<S> {
    pub fn new(
        config: &Config,
        source: S,
        clock: Arc<dyn Clock>,
        tx: watch::Sender<PlayerView>,
    ) -> Self {
        let view = tx.borrow().clone();
        Self {
            source,
            clock,
            idle: IdleState::from_config(config),
            idle_config: config.idle.clone(),
            view,
            tx,
        }
    }

    pub fn idle(&self) -> &IdleState {
        &self.idle
    }

    /// Query the source once and fold the answer into the published view.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let answer = self.source.fetch().await;
        let now = self.clock.now_ms();

        match answer {
            Ok(NowPlaying::Playing(info)) => {
                let left_idle = self.idle.leave() == Some(IdleTransition::Left);
                if left_idle {
                    info!(
                        "Playback detected, leaving idle mode (poll every {:?})",
                        self.idle.poll_interval()
                    );
                }

                let track_changed = self.view.snapshot.apply(&info, now);
                if track_changed {
                    info!(
                        track = %self.view.snapshot.track_label,
                        artist = %self.view.snapshot.artist_label,
                        duration_ms = self.view.snapshot.duration_ms,
                        "Now playing"
                    );
                }
                self.view.idle = false;
                self.publish();
                PollOutcome::Updated {
                    track_changed,
                    left_idle,
                }
            }
            Ok(NowPlaying::NotPlaying) => {
                if self.idle.enter().is_none() {
                    return PollOutcome::StillIdle;
                }
                info!(
                    "Nothing is playing, entering idle mode (poll every {:?})",
                    self.idle.poll_interval()
                );
                self.view.snapshot = PlaybackSnapshot::idle(&self.idle_config, now);
                self.view.idle = true;
                self.publish();
                PollOutcome::EnteredIdle
            }
            Err(e) => {
                warn!("Now-playing query failed: {}", e);
                PollOutcome::Failed(e)
            }
        }
    }

    fn publish(&mut self) {
        self.view.rev += 1;
        self.tx.send_replace(self.view.clone());
    }

    /// Poll until cancelled, sleeping whatever is left of the interval
    /// after each query.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("Poller: starting (every {:?})", self.idle.poll_interval());
        loop {
            let started = tokio::time::Instant::now();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.poll_once() => debug!(?outcome, rev = self.view.rev, "poll"),
            }

            let wait = self.idle.poll_interval().saturating_sub(started.elapsed());
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }
        info!("Poller: stopped");
    }
}
