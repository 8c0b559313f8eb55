//! The drawing seam between the registry and whatever displays it.
//!
//! The registry only ever emits two primitives: an outlined ring per
//! signal and a filled rectangle per node. Anything that can draw those
//! implements Surface.

use crate::{
    geometry::{Point, Rect},
    types::Rgb,
};
use serde::{Deserialize, Serialize};

pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Outline-only circle; `width` is the stroke in pixels.
    fn ring(&mut self, center: Point, radius: u32, width: u32, color: Rgb);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DrawCommand {
    Rect { rect: Rect, color: Rgb },
    Ring { center: Point, radius: u32, width: u32, color: Rgb },
}

/// Records every primitive it is asked to draw. Used by the headless
/// runner and by tests.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub commands: Vec<DrawCommand>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn rect_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Rect { .. })).count()
    }

    pub fn ring_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Ring { .. })).count()
    }
}

impl Surface for FrameRecorder {
    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn ring(&mut self, center: Point, radius: u32, width: u32, color: Rgb) {
        self.commands.push(DrawCommand::Ring { center, radius, width, color });
    }
}

/// Discards everything.
pub struct NullSurface;

impl Surface for NullSurface {
    fn fill_rect(&mut self, _rect: Rect, _color: Rgb) {}
    fn ring(&mut self, _center: Point, _radius: u32, _width: u32, _color: Rgb) {}
}
