//! Handing finished frames to whatever shows them.
//!
//! The frame loop copies the active layer into an owned `Frame` while it
//! holds the scene lock, releases the lock, and only then calls the sink.
//! A sink can therefore take as long as it likes without stalling a
//! resize, though a slow sink still slows the loop down.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use image::{DynamicImage, RgbaImage};

use crate::error::{DoodleError, Result};
use crate::raster::Layer;

/// An owned copy of one rendered frame.
///
/// Pixels are RGBA8, row-major, `stride` bytes per row. The canvas is
/// opaque so premultiplied and straight alpha are the same thing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn from_layer(layer: &Layer) -> Self {
        Self {
            width: layer.width(),
            height: layer.height(),
            stride: layer.stride(),
            pixels: layer.data().to_vec(),
        }
    }

    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| DoodleError::Image("frame buffer size mismatch".to_string()))
    }

    /// Consume the frame into a `DynamicImage` without copying the pixels.
    pub fn into_dynamic_image(self) -> Result<DynamicImage> {
        let (width, height) = (self.width, self.height);
        RgbaImage::from_raw(width, height, self.pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| DoodleError::Image("frame buffer size mismatch".to_string()))
    }

    /// Count pixels that aren't pure white.
    pub fn inked_pixels(&self) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|px| px[0] < 255 || px[1] < 255 || px[2] < 255)
            .count()
    }
}

/// Receives one frame per loop iteration, on the loop thread.
pub trait PresentationSink: Send {
    fn present(&mut self, frame: &Frame);
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn present(&mut self, _frame: &Frame) {}
}

/// Forwards frames to another thread over a one-slot channel.
///
/// While the receiver still holds an unread frame, new frames are
/// dropped, so a slow consumer never queues more than one copy of the
/// canvas. Once the receiver is dropped, frames are silently discarded.
#[derive(Debug)]
pub struct ChannelSink {
    sender: SyncSender<Frame>,
    connected: bool,
    dropped: u64,
}

impl ChannelSink {
    /// A sink plus the receiving end for the presenting thread.
    pub fn new() -> (Self, Receiver<Frame>) {
        let (sender, receiver) = mpsc::sync_channel(1);
        (
            Self {
                sender,
                connected: true,
                dropped: 0,
            },
            receiver,
        )
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Frames skipped because the receiver hadn't caught up.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }
}

impl PresentationSink for ChannelSink {
    fn present(&mut self, frame: &Frame) {
        if !self.connected {
            return;
        }
        match self.sender.try_send(frame.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.dropped += 1,
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("frame receiver dropped, discarding further frames");
                self.connected = false;
            }
        }
    }
}

/// Any closure taking a frame works as a sink.
impl<F> PresentationSink for F
where
    F: FnMut(&Frame) + Send,
{
    fn present(&mut self, frame: &Frame) {
        self(frame)
    }
}
