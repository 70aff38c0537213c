//! Idle mode bookkeeping: poll and render pacing while nothing is playing.

use std::time::Duration;

use nowplaying_proto::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTransition {
    Entered,
    Left,
}

/// Idle flag plus the poll interval it implies. Owned by the poller.
#[derive(Debug, Clone)]
pub struct IdleState {
    idle: bool,
    base_interval: Duration,
    idle_delta: Duration,
}

impl IdleState {
    pub fn new(base_interval: Duration, idle_delta: Duration) -> Self {
        Self {
            idle: false,
            base_interval,
            idle_delta,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.poll_interval(), config.idle_poll_delta())
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// No-op (returns `None`) when already idle.
    pub fn enter(&mut self) -> Option<IdleTransition> {
        if self.idle {
            return None;
        }
        self.idle = true;
        Some(IdleTransition::Entered)
    }

    /// No-op (returns `None`) when not idle.
    pub fn leave(&mut self) -> Option<IdleTransition> {
        if !self.idle {
            return None;
        }
        self.idle = false;
        Some(IdleTransition::Left)
    }

    pub fn poll_interval(&self) -> Duration {
        if self.idle {
            self.base_interval + self.idle_delta
        } else {
            self.base_interval
        }
    }
}

/// Renderer pacing for the text and progress areas.
#[derive(Debug, Clone, Copy)]
pub struct RenderTiming {
    pub text: Duration,
    pub progress: Duration,
    pub idle_progress: Duration,
}

impl RenderTiming {
    pub fn from_config(config: &Config) -> Self {
        Self {
            text: config.display.text_refresh(),
            progress: config.display.progress_refresh(),
            idle_progress: config.idle.progress_refresh(),
        }
    }

    pub fn progress_interval(&self, idle: bool) -> Duration {
        if idle {
            self.idle_progress
        } else {
            self.progress
        }
    }
}
