//! Now-playing display for a 128x64 monochrome panel.
//!
//! A [`poller::Poller`] task asks a [`source::NowPlayingSource`] what is
//! playing and publishes immutable snapshots; a [`renderer::Renderer`] task
//! draws them onto a [`framebuffer::FrameBuffer`] and hands finished frames
//! to a [`sink::FrameSink`]. [`core::Device`] wires the two together.

pub mod clock;
pub mod core;
pub mod framebuffer;
pub mod idle;
pub mod layout;
pub mod poller;
pub mod preview;
pub mod progress;
pub mod renderer;
pub mod scroll;
pub mod sink;
pub mod source;
