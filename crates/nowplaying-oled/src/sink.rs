//! Where finished frames go.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::framebuffer::FrameBuffer;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display did not initialise: {0}")]
    Init(String),
    #[error("failed to present frame: {0}")]
    Present(String),
    #[error("terminal I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// A physical or simulated panel.
pub trait FrameSink: Send + 'static {
    /// Bring the panel up. Failure is fatal to the device.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push a finished frame to the panel.
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    last: Option<FrameBuffer>,
    presented: u64,
    initialised: bool,
}

/// In-memory panel. Clones share state, so a caller can keep a handle
/// while the renderer owns the sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
    fail_init: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `init` always fails.
    pub fn broken() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> Option<FrameBuffer> {
        self.state.lock().ok().and_then(|s| s.last.clone())
    }

    pub fn presented(&self) -> u64 {
        self.state.lock().map(|s| s.presented).unwrap_or(0)
    }

    pub fn is_initialised(&self) -> bool {
        self.state.lock().map(|s| s.initialised).unwrap_or(false)
    }
}

impl FrameSink for MemorySink {
    fn init(&mut self) -> Result<(), DisplayError> {
        if self.fail_init {
            return Err(DisplayError::Init("no panel on the bus".into()));
        }
        let mut state = self
            .state
            .lock()
            .map_err(|_| DisplayError::Init("state poisoned".into()))?;
        state.initialised = true;
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DisplayError::Present("state poisoned".into()))?;
        state.last = Some(frame.clone());
        state.presented += 1;
        Ok(())
    }
}
