//! Renderer task: owns the panel and draws the latest published view.
//!
//! Two cadences share one loop: the labels (marquee ticks) and the progress
//! area (bar, time text, icon). A new view from the poller pulls the next
//! progress redraw forward to "now".

use std::convert::Infallible;
use std::sync::Arc;

use nowplaying_proto::config::Config;
use nowplaying_proto::snapshot::PlayerView;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::framebuffer::FrameBuffer;
use crate::idle::RenderTiming;
use crate::layout::{self, Layout};
use crate::progress::{ProgressFrame, ProgressTracker};
use crate::scroll::Marquee;
use crate::sink::{DisplayError, FrameSink};

fn drawn(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

pub struct Renderer<K> {
    sink: K,
    clock: Arc<dyn Clock>,
    rx: watch::Receiver<PlayerView>,
    layout: Layout,
    timing: RenderTiming,
    frame: FrameBuffer,
    /// Page bytes of the last frame the sink accepted.
    presented: Option<Vec<u8>>,
    track: Marquee,
    artist: Marquee,
    /// Track id the marquees were last started for.
    labels_for: Option<String>,
    progress: ProgressTracker,
}

impl<K: FrameSink> Renderer<K> {
    pub fn new(
        config: &Config,
        sink: K,
        clock: Arc<dyn Clock>,
        rx: watch::Receiver<PlayerView>,
    ) -> Self {
        let layout = Layout::new(config.display.width, config.display.height);
        let display = &config.display;
        Self {
            progress: ProgressTracker::new(config, layout.cap_radius),
            frame: FrameBuffer::new(display.width, display.height),
            presented: None,
            track: Marquee::new(display.max_chars, &display.label_spacer),
            artist: Marquee::new(display.max_chars, &display.label_spacer),
            labels_for: None,
            timing: RenderTiming::from_config(config),
            layout,
            sink,
            clock,
            rx,
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    fn current_view(&self) -> PlayerView {
        self.rx.borrow().clone()
    }

    /// A new track id restarts both labels, even when their text repeats.
    fn sync_labels(&mut self, view: &PlayerView) {
        let snapshot = &view.snapshot;
        if snapshot.track_id != self.labels_for {
            self.labels_for = snapshot.track_id.clone();
            self.track.restart(&snapshot.track_label);
            self.artist.restart(&snapshot.artist_label);
            debug!(label = %snapshot.track_label, "labels restarted for new track");
            return;
        }
        self.track.assign(&snapshot.track_label);
        self.artist.assign(&snapshot.artist_label);
    }

    /// Redraw bar, time text and icon from the latest view.
    pub fn render_progress(&mut self) -> Result<ProgressFrame, DisplayError> {
        let view = self.current_view();
        self.sync_labels(&view);
        let progress = self.progress.update(&view, self.clock.now_ms());
        drawn(layout::draw_progress(&mut self.frame, &self.layout, &progress));
        self.present()?;
        Ok(progress)
    }

    /// Advance both marquees one tick. Returns whether anything was drawn.
    pub fn render_labels(&mut self) -> Result<bool, DisplayError> {
        let view = self.current_view();
        self.sync_labels(&view);

        let mut drew = false;
        if let Some(text) = self.track.tick() {
            drawn(layout::draw_label(&mut self.frame, &self.layout.track_region(), &text));
            drew = true;
        }
        if let Some(text) = self.artist.tick() {
            drawn(layout::draw_label(&mut self.frame, &self.layout.artist_region(), &text));
            drew = true;
        }
        if drew {
            self.present()?;
        }
        Ok(drew)
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        if !self.frame.is_dirty() {
            return Ok(());
        }
        if self.presented.as_deref() != Some(self.frame.pages()) {
            self.sink.present(&self.frame)?;
            self.presented = Some(self.frame.pages().to_vec());
        }
        self.frame.mark_clean();
        Ok(())
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Renderer: starting (text every {:?}, progress every {:?})",
            self.timing.text, self.timing.progress
        );
        let mut progress_due = Instant::now();
        let mut text_due = progress_due;
        let mut poller_alive = true;

        loop {
            let now = Instant::now();
            if now >= text_due {
                if let Err(e) = self.render_labels() {
                    warn!("Label redraw failed: {}", e);
                }
                text_due = now + self.timing.text;
            }
            if now >= progress_due {
                if let Err(e) = self.render_progress() {
                    warn!("Progress redraw failed: {}", e);
                }
                let idle = self.rx.borrow().idle;
                progress_due = now + self.timing.progress_interval(idle);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = self.rx.changed(), if poller_alive => match changed {
                    Ok(()) => progress_due = Instant::now(),
                    Err(_) => {
                        debug!("Renderer: poller gone, keeping last view");
                        poller_alive = false;
                    }
                },
                _ = tokio::time::sleep_until(progress_due.min(text_due)) => {}
            }
        }
        info!("Renderer: stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::progress::PlayIcon;
    use crate::sink::MemorySink;
    use nowplaying_proto::snapshot::{PlaybackSnapshot, TrackInfo};

    fn playing_view(label: &str, rev: u64) -> PlayerView {
        let mut snapshot = PlaybackSnapshot::placeholder(&Config::default().placeholder);
        snapshot.apply(
            &TrackInfo {
                track_id: label.into(),
                track_label: label.into(),
                artists: vec!["Band".into()],
                duration_ms: 200_000,
                progress_ms: 50_000,
                is_playing: true,
            },
            0,
        );
        PlayerView {
            snapshot,
            idle: false,
            rev,
        }
    }

    fn renderer(
        clock: &ManualClock,
    ) -> (Renderer<MemorySink>, MemorySink, watch::Sender<PlayerView>) {
        let config = Config::default();
        let (tx, rx) = watch::channel(PlayerView::initial(&config.placeholder));
        let sink = MemorySink::new();
        let renderer = Renderer::new(&config, sink.clone(), Arc::new(clock.clone()), rx);
        (renderer, sink, tx)
    }

    #[test]
    fn test_waiting_view_draws_placeholders() {
        let clock = ManualClock::new(0);
        let (mut r, sink, _tx) = renderer(&clock);
        assert!(r.render_labels().unwrap());
        let progress = r.render_progress().unwrap();
        assert_eq!(progress.text, "00:00 / 00:00");
        assert_eq!(progress.icon, PlayIcon::Play);

        let frame = sink.last_frame().unwrap();
        assert!(frame.lit_in(40, 6, 88, 10) > 0);
        assert_eq!(frame.lit_in(40, 18, 88, 10), 0);
        assert!(frame.lit_in(4, 42, 80, 10) > 0);
    }

    #[test]
    fn test_fitting_label_drawn_once() {
        let clock = ManualClock::new(0);
        let (mut r, sink, tx) = renderer(&clock);
        tx.send_replace(playing_view("Short", 1));
        assert!(r.render_labels().unwrap());
        let presented = sink.presented();
        assert!(!r.render_labels().unwrap());
        assert_eq!(sink.presented(), presented);
    }

    #[test]
    fn test_label_change_restarts_marquee() {
        let clock = ManualClock::new(0);
        let (mut r, _sink, tx) = renderer(&clock);
        tx.send_replace(playing_view("A Very Long Song Title", 1));
        for _ in 0..5 {
            assert!(r.render_labels().unwrap());
        }
        assert_eq!(r.track.text(), "y Long Song Title   A Ver");

        tx.send_replace(playing_view("Another Rather Long Title", 2));
        r.render_labels().unwrap();
        assert_eq!(r.track.text(), "nother Rather Long Title   A");
    }

    fn album_view(track_id: &str, rev: u64) -> PlayerView {
        let mut view = playing_view("A Very Long Song Title", rev);
        view.snapshot.apply(
            &TrackInfo {
                track_id: track_id.into(),
                track_label: "A Very Long Song Title".into(),
                artists: vec!["The Long Band Name".into(), "A Guest".into()],
                duration_ms: 200_000,
                progress_ms: 0,
                is_playing: true,
            },
            0,
        );
        view
    }

    #[test]
    fn test_next_track_with_same_labels_starts_unrotated() {
        let clock = ManualClock::new(0);
        let (mut r, _sink, tx) = renderer(&clock);
        tx.send_replace(album_view("t1", 1));
        for _ in 0..5 {
            r.render_labels().unwrap();
        }
        assert_eq!(r.artist.text(), "ong Band Name, A Guest   The L");

        tx.send_replace(album_view("t2", 2));
        r.render_labels().unwrap();
        assert_eq!(r.track.text(), " Very Long Song Title   A");
        assert_eq!(r.artist.text(), "he Long Band Name, A Guest   T");

        // Same track polled again: rotation carries on.
        tx.send_replace(album_view("t2", 3));
        r.render_labels().unwrap();
        assert_eq!(r.track.text(), "Very Long Song Title   A ");
    }

    #[test]
    fn test_progress_interpolates_with_clock() {
        let clock = ManualClock::new(0);
        let (mut r, _sink, tx) = renderer(&clock);
        tx.send_replace(playing_view("Song", 1));
        clock.advance(1_000);
        let progress = r.render_progress().unwrap();
        assert_eq!(progress.text, "00:51 / 03:20");
        assert_eq!(progress.cap_x, 32);
        assert!(r.frame().pixel(10, 56));
    }

    #[test]
    fn test_unchanged_frame_not_presented_again() {
        let clock = ManualClock::new(0);
        let (mut r, sink, tx) = renderer(&clock);
        let mut view = playing_view("Song", 1);
        view.snapshot.is_playing = false;
        tx.send_replace(view);
        r.render_progress().unwrap();
        let presented = sink.presented();
        clock.advance(5_000);
        r.render_progress().unwrap();
        assert_eq!(sink.presented(), presented);
    }
}
