//! Progress interpolation, progress-bar geometry and the idle animation.

use nowplaying_proto::config::{Config, IdleConfig};
use nowplaying_proto::snapshot::{Phase, PlayerView};

/// Longest time the `MM:SS` fields can show (99:59).
pub const MAX_DISPLAY_MS: u64 = 5_999_000;

/// Format `elapsed / total` as `MM:SS / MM:SS`.
///
/// Returns an empty string when either value exceeds 99:59; the field is
/// dropped rather than showing a wrong time.
pub fn format_progress(elapsed_ms: u64, duration_ms: u64) -> String {
    if elapsed_ms > MAX_DISPLAY_MS || duration_ms > MAX_DISPLAY_MS {
        return String::new();
    }
    format!("{} / {}", fmt_mm_ss(elapsed_ms), fmt_mm_ss(duration_ms))
}

fn fmt_mm_ss(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Bar fill in pixels: `elapsed / duration` scaled to `bar_width`.
pub fn fill_px(elapsed_ms: u64, duration_ms: u64, bar_width: u32) -> f32 {
    if duration_ms == 0 {
        return 0.0;
    }
    (elapsed_ms as f32 / duration_ms as f32) * bar_width as f32
}

/// X coordinate of the bar's end cap, kept far enough from both edges that
/// a cap of `cap_radius` is never clipped.
pub fn cap_x(fill_px: f32, bar_width: u32, cap_radius: u32) -> i32 {
    let r = cap_radius as i32;
    let w = bar_width as i32;
    if fill_px <= (r + 1) as f32 {
        r
    } else if fill_px >= (w - r - 2) as f32 {
        w - 1 - r
    } else {
        fill_px as i32
    }
}

// ── Idle oscillator ───────────────────────────────────────────────────────────

/// Triangle wave between two pixel bounds, one step per update.
#[derive(Debug, Clone, PartialEq)]
pub struct Oscillator {
    low: f32,
    high: f32,
    step: f32,
    position: f32,
    rising: bool,
}

impl Oscillator {
    pub fn new(low_px: u32, high_px: u32, step_px: f32) -> Self {
        Self {
            low: low_px as f32,
            high: high_px as f32,
            step: step_px,
            position: low_px as f32,
            rising: true,
        }
    }

    /// Step size follows the synthetic track: `width * step_ms / duration_ms`.
    pub fn from_config(idle: &IdleConfig, bar_width: u32) -> Self {
        let step = bar_width as f32 * idle.step_ms as f32 / idle.synthetic_duration_ms as f32;
        Self::new(idle.low_px, idle.high_px, step)
    }

    pub fn reset(&mut self) {
        self.position = self.low;
        self.rising = true;
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    /// Advance one step and return the new position.
    pub fn advance(&mut self) -> f32 {
        if self.rising {
            self.position += self.step;
            if self.position >= self.high {
                self.position = self.high;
                self.rising = false;
            }
        } else {
            self.position -= self.step;
            if self.position <= self.low {
                self.position = self.low;
                self.rising = true;
            }
        }
        self.position
    }
}

// ── Tracker ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayIcon {
    Play,
    Pause,
    Blank,
}

/// Everything the progress area needs for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressFrame {
    pub fill_px: f32,
    pub cap_x: i32,
    pub text: String,
    pub icon: PlayIcon,
    /// Set only on the update where the icon differs from the one drawn last.
    pub icon_changed: bool,
}

/// Turns published views into progress frames.
pub struct ProgressTracker {
    bar_width: u32,
    cap_radius: u32,
    placeholder_text: String,
    fill_px: f32,
    text: String,
    drawn_icon: Option<PlayIcon>,
    oscillator: Oscillator,
    was_idle: bool,
}

impl ProgressTracker {
    pub fn new(config: &Config, cap_radius: u32) -> Self {
        let bar_width = config.display.width;
        Self {
            bar_width,
            cap_radius,
            placeholder_text: config.placeholder.progress_text.clone(),
            fill_px: 0.0,
            text: config.placeholder.progress_text.clone(),
            drawn_icon: None,
            oscillator: Oscillator::from_config(&config.idle, bar_width),
            was_idle: false,
        }
    }

    pub fn update(&mut self, view: &PlayerView, now_ms: u64) -> ProgressFrame {
        let phase = view.phase();
        let idle = phase == Phase::Idle;
        if idle && !self.was_idle {
            self.oscillator.reset();
        }
        self.was_idle = idle;

        let snapshot = &view.snapshot;
        let icon = match phase {
            Phase::Waiting => {
                self.fill_px = 0.0;
                self.text = self.placeholder_text.clone();
                PlayIcon::Play
            }
            Phase::Playing => {
                let elapsed = snapshot.elapsed_at(now_ms);
                self.fill_px = fill_px(elapsed, snapshot.duration_ms, self.bar_width);
                self.text = format_progress(elapsed, snapshot.duration_ms);
                PlayIcon::Play
            }
            Phase::Paused => {
                // Frozen: no interpolation while paused.
                let elapsed = snapshot.last_known_progress_ms.min(snapshot.duration_ms);
                self.fill_px = fill_px(elapsed, snapshot.duration_ms, self.bar_width);
                self.text = format_progress(elapsed, snapshot.duration_ms);
                PlayIcon::Pause
            }
            Phase::Idle => {
                self.fill_px = self.oscillator.advance();
                self.text.clear();
                PlayIcon::Blank
            }
        };

        let icon_changed = self.drawn_icon != Some(icon);
        self.drawn_icon = Some(icon);

        ProgressFrame {
            fill_px: self.fill_px,
            cap_x: cap_x(self.fill_px, self.bar_width, self.cap_radius),
            text: self.text.clone(),
            icon,
            icon_changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nowplaying_proto::snapshot::TrackInfo;

    fn is_mm_ss_pair(s: &str) -> bool {
        let b = s.as_bytes();
        b.len() == 13
            && &s[5..8] == " / "
            && [0, 1, 3, 4, 8, 9, 11, 12].iter().all(|&i| b[i].is_ascii_digit())
            && b[2] == b':'
            && b[10] == b':'
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(0, 0), "00:00 / 00:00");
        assert_eq!(format_progress(51_000, 200_000), "00:51 / 03:20");
        assert_eq!(format_progress(61_999, 600_000), "01:01 / 10:00");
        assert_eq!(format_progress(MAX_DISPLAY_MS, MAX_DISPLAY_MS), "99:59 / 99:59");
    }

    #[test]
    fn test_format_progress_pattern_over_range() {
        let durations = [0, 999, 59_999, 60_000, 3_599_999, 4_321_000, MAX_DISPLAY_MS];
        for &duration in &durations {
            for elapsed in [0, duration / 3, duration / 2, duration] {
                let text = format_progress(elapsed, duration);
                assert!(is_mm_ss_pair(&text), "{elapsed}/{duration} -> {text:?}");
            }
        }
    }

    #[test]
    fn test_format_progress_suppressed_beyond_99_59() {
        assert_eq!(format_progress(MAX_DISPLAY_MS + 1, 200_000), "");
        assert_eq!(format_progress(1_000, MAX_DISPLAY_MS + 1), "");
        assert_eq!(format_progress(u64::MAX, u64::MAX), "");
    }

    #[test]
    fn test_fill_px() {
        let px = fill_px(51_000, 200_000, 128);
        assert!((px - 32.64).abs() < 0.01);
        assert_eq!(fill_px(10, 0, 128), 0.0);
        assert_eq!(fill_px(200_000, 200_000, 128), 128.0);
    }

    #[test]
    fn test_cap_x_clamps_to_safe_range() {
        assert_eq!(cap_x(0.0, 128, 3), 3);
        assert_eq!(cap_x(4.0, 128, 3), 3);
        assert_eq!(cap_x(4.5, 128, 3), 4);
        assert_eq!(cap_x(32.64, 128, 3), 32);
        assert_eq!(cap_x(122.9, 128, 3), 122);
        assert_eq!(cap_x(123.0, 128, 3), 124);
        assert_eq!(cap_x(128.0, 128, 3), 124);
    }

    #[test]
    fn test_oscillator_stays_in_bounds_and_reverses_at_them() {
        let mut osc = Oscillator::from_config(&IdleConfig::default(), 128);
        let mut reversals = Vec::new();
        let mut rising = osc.is_rising();
        for _ in 0..200 {
            let pos = osc.advance();
            assert!((13.0..=119.0).contains(&pos), "escaped bounds: {pos}");
            if osc.is_rising() != rising {
                reversals.push(pos);
                rising = osc.is_rising();
            }
        }
        assert!(reversals.len() > 4);
        for pos in reversals {
            assert!(pos == 13.0 || pos == 119.0, "reversed mid-bar at {pos}");
        }
    }

    #[test]
    fn test_oscillator_reset() {
        let mut osc = Oscillator::new(10, 20, 4.0);
        assert_eq!(osc.advance(), 14.0);
        assert_eq!(osc.advance(), 18.0);
        assert_eq!(osc.advance(), 20.0);
        assert!(!osc.is_rising());
        assert_eq!(osc.advance(), 16.0);
        osc.reset();
        assert!(osc.is_rising());
        assert_eq!(osc.advance(), 14.0);
    }

    fn playing_view(is_playing: bool) -> PlayerView {
        let config = Config::default();
        let mut view = PlayerView::initial(&config.placeholder);
        view.snapshot.apply(
            &TrackInfo {
                track_id: "t1".into(),
                track_label: "Song".into(),
                artists: vec!["Band".into()],
                duration_ms: 200_000,
                progress_ms: 50_000,
                is_playing,
            },
            0,
        );
        view.rev = 1;
        view
    }

    #[test]
    fn test_tracker_interpolates_while_playing() {
        let mut tracker = ProgressTracker::new(&Config::default(), 3);
        let frame = tracker.update(&playing_view(true), 1_000);
        assert_eq!(frame.text, "00:51 / 03:20");
        assert!((frame.fill_px - 32.64).abs() < 0.01);
        assert_eq!(frame.cap_x, 32);
        assert_eq!(frame.icon, PlayIcon::Play);
        assert!(frame.icon_changed);

        let frame = tracker.update(&playing_view(true), 2_000);
        assert_eq!(frame.text, "00:52 / 03:20");
        assert!(!frame.icon_changed);
    }

    #[test]
    fn test_tracker_freezes_while_paused() {
        let mut tracker = ProgressTracker::new(&Config::default(), 3);
        tracker.update(&playing_view(true), 0);

        let paused = playing_view(false);
        let first = tracker.update(&paused, 5_000);
        assert_eq!(first.icon, PlayIcon::Pause);
        assert!(first.icon_changed);
        assert_eq!(first.text, "00:50 / 03:20");

        let later = tracker.update(&paused, 60_000);
        assert_eq!(later.text, first.text);
        assert_eq!(later.fill_px, first.fill_px);
        assert!(!later.icon_changed);
    }

    #[test]
    fn test_tracker_waiting_shows_placeholder() {
        let config = Config::default();
        let mut tracker = ProgressTracker::new(&config, 3);
        let frame = tracker.update(&PlayerView::initial(&config.placeholder), 10_000);
        assert_eq!(frame.text, "00:00 / 00:00");
        assert_eq!(frame.fill_px, 0.0);
        assert_eq!(frame.icon, PlayIcon::Play);
    }

    #[test]
    fn test_tracker_idle_animates_without_text() {
        let mut tracker = ProgressTracker::new(&Config::default(), 3);
        tracker.update(&playing_view(true), 0);

        let mut idle = playing_view(false);
        idle.idle = true;
        let first = tracker.update(&idle, 100);
        assert_eq!(first.text, "");
        assert_eq!(first.icon, PlayIcon::Blank);
        assert!(first.icon_changed);
        assert_eq!(first.fill_px, 21.0);

        let second = tracker.update(&idle, 300);
        assert_eq!(second.fill_px, 29.0);
        assert!(!second.icon_changed);
    }
}
