//! Screen layout and drawing with `embedded-graphics`.
//!
//! ```text
//! ┌──────────┬───────────────────────────────┐
//! │          │ Track label (marquee)         │  ← track_y
//! │  (logo)  │ Artist label (marquee)        │  ← artist_y
//! │          │                               │
//! ├──────────┴──────────────────────┬────────┤
//! │ 00:51 / 03:20                   │   ▶    │  ← progress_text_y / icon
//! │ ━━━━━━━━━━━●─────────────────────────────│  ← bar_y
//! └──────────────────────────────────────────┘
//! ```
//!
//! All geometry lives in [`Layout`]; [`Layout::new`] derives it from the
//! panel size so the right-anchored parts follow the width.

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle},
    text::{Baseline, Text},
};

use crate::progress::{PlayIcon, ProgressFrame};

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    /// Left edge of the label column (right of the logo).
    pub label_x: i32,
    pub label_height: u32,
    pub track_y: i32,
    pub artist_y: i32,
    pub progress_text: Rectangle,
    pub icon: Rectangle,
    /// Cleared before every bar redraw.
    pub bar_region: Rectangle,
    pub bar_y: i32,
    pub bar_thickness: u32,
    pub cap_radius: u32,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        let w = width as i32;
        let h = height as i32;
        Self {
            width,
            height,
            label_x: 40,
            label_height: 10,
            track_y: 6,
            artist_y: 18,
            progress_text: Rectangle::new(Point::new(4, h - 22), Size::new(80, 10)),
            icon: Rectangle::new(Point::new(w - 8, h - 23), Size::new(5, 9)),
            bar_region: Rectangle::new(Point::new(0, h - 11), Size::new(width, 10)),
            bar_y: h - 7,
            bar_thickness: 3,
            cap_radius: 3,
        }
    }

    pub fn track_region(&self) -> Rectangle {
        self.label_region(self.track_y)
    }

    pub fn artist_region(&self) -> Rectangle {
        self.label_region(self.artist_y)
    }

    fn label_region(&self, y: i32) -> Rectangle {
        Rectangle::new(
            Point::new(self.label_x, y),
            Size::new(self.width.saturating_sub(self.label_x as u32), self.label_height),
        )
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(128, 64)
    }
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_6X10, BinaryColor::On)
}

pub fn clear_region<D>(display: &mut D, region: &Rectangle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    region
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
        .draw(display)
}

/// Clear `region` and draw `text` from its top-left corner, clipped to it.
pub fn draw_label<D>(display: &mut D, region: &Rectangle, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    clear_region(display, region)?;
    let mut clipped = display.clipped(region);
    Text::with_baseline(text, region.top_left, text_style(), Baseline::Top).draw(&mut clipped)?;
    Ok(())
}

pub fn draw_icon<D>(display: &mut D, layout: &Layout, icon: PlayIcon) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    clear_region(display, &layout.icon)?;
    let fill = PrimitiveStyle::with_fill(BinaryColor::On);
    let origin = layout.icon.top_left;
    let size = layout.icon.size;
    match icon {
        PlayIcon::Play => {
            let bottom = origin + Point::new(0, size.height as i32 - 1);
            let tip = origin + Point::new(size.width as i32 - 1, size.height as i32 / 2);
            Triangle::new(origin, bottom, tip).into_styled(fill).draw(display)?;
        }
        PlayIcon::Pause => {
            let bar = Size::new(2, size.height);
            Rectangle::new(origin, bar).into_styled(fill).draw(display)?;
            Rectangle::new(origin + Point::new(3, 0), bar)
                .into_styled(fill)
                .draw(display)?;
        }
        PlayIcon::Blank => {}
    }
    Ok(())
}

/// Redraw the progress text, the bar and (when it changed) the icon.
pub fn draw_progress<D>(
    display: &mut D,
    layout: &Layout,
    frame: &ProgressFrame,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if frame.icon_changed {
        draw_icon(display, layout, frame.icon)?;
    }

    draw_label(display, &layout.progress_text, &frame.text)?;

    clear_region(display, &layout.bar_region)?;
    let on = PrimitiveStyle::with_fill(BinaryColor::On);
    let half = layout.bar_thickness as i32 / 2;
    Rectangle::new(
        Point::new(0, layout.bar_y - half),
        Size::new(frame.cap_x.max(0) as u32, layout.bar_thickness),
    )
    .into_styled(on)
    .draw(display)?;
    Line::new(
        Point::new(0, layout.bar_y),
        Point::new(layout.width as i32 - 1, layout.bar_y),
    )
    .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
    .draw(display)?;
    Circle::with_center(
        Point::new(frame.cap_x, layout.bar_y),
        layout.cap_radius * 2 + 1,
    )
    .into_styled(on)
    .draw(display)?;
    Ok(())
}
