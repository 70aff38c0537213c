//! Device: brings up the panel and runs the poller and renderer tasks.
//!
//! The poller is the only writer of playback state and hands each new
//! [`PlayerView`] to the renderer over a `tokio::sync::watch` channel. The
//! renderer is the only task that touches the panel. Both stop when the
//! shared [`CancellationToken`] fires.

use std::sync::Arc;

use nowplaying_proto::config::Config;
use nowplaying_proto::snapshot::PlayerView;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::clock::Clock;
use crate::poller::Poller;
use crate::renderer::Renderer;
use crate::sink::{DisplayError, FrameSink};
use crate::source::NowPlayingSource;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("display initialisation failed")]
    DisplayInit(#[source] DisplayError),
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}

pub struct Device<S, K> {
    config: Config,
    source: S,
    sink: K,
    clock: Arc<dyn Clock>,
}

impl<S: NowPlayingSource, K: FrameSink> Device<S, K> {
    pub fn new(config: Config, source: S, sink: K, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            source,
            sink,
            clock,
        }
    }

    /// Run until `cancel` fires.
    ///
    /// A panel that fails to initialise is fatal: no task is started.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), DeviceError> {
        let Device {
            config,
            source,
            mut sink,
            clock,
        } = self;

        if let Err(e) = sink.init() {
            error!("Display initialisation failed: {}", e);
            return Err(DeviceError::DisplayInit(e));
        }
        info!(
            "Display initialised ({}x{})",
            config.display.width, config.display.height
        );

        let (tx, rx) = watch::channel(PlayerView::initial(&config.placeholder));
        let poller = Poller::new(&config, source, clock.clone(), tx);
        let renderer = Renderer::new(&config, sink, clock, rx);

        let poll_task = tokio::spawn(poller.run(cancel.clone()));
        let render_task = tokio::spawn(renderer.run(cancel.clone()));

        let (polled, rendered) = tokio::join!(poll_task, render_task);
        polled.map_err(|_| DeviceError::TaskPanicked("poller"))?;
        rendered.map_err(|_| DeviceError::TaskPanicked("renderer"))?;
        info!("Device stopped");
        Ok(())
    }
}
