// Window + software drawing utilities.
// Visual effects provided here:
// 1) A resizable window that shows the particle framebuffer.
// 2) Mouse (and optional touch emulation) turned into input events.
// 3) Sub-pixel filled squares, blended by how much of each pixel they cover.

use crate::error::Error;
use crate::input::{InputEvent, InputTracker};
use crate::types::{Color, FrameBuffer};
use minifb::{Key, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};

pub struct Drawer {
    window: Window,                    // the on-screen window you see
    input: InputTracker,               // turns raw mouse/size samples into events
}

impl Drawer {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize, target_fps: usize, touch_emulation: bool) -> Result<Self, Error> {
        let options = WindowOptions {
            resize: true,
            scale_mode: ScaleMode::UpperLeft,
            ..WindowOptions::default()
        };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(target_fps);
        let input = InputTracker::new(touch_emulation, window.get_size());
        Ok(Self { window, input })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we'll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Client area size in pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Everything that changed since the last call, in the order a page would
    /// see it.
    pub fn poll_input(&mut self) -> Vec<InputEvent> {
        let size = self.window.get_size();
        let mouse = self.window.get_mouse_pos(MouseMode::Discard);
        let left_down = self.window.get_mouse_down(MouseButton::Left);
        self.input.update(size, mouse, left_down)
    }
}

/* ---------- Software drawing ---------- */

/// Fill the rectangle [x, x+w) x [y, y+h) with `color`. Edge pixels get
/// the fraction of their area the rectangle covers.
/// Visual: a particle of size 0.7 shows as a dim dot rather than vanishing.
pub fn fill_rect_coverage(fb: &mut FrameBuffer, x: f32, y: f32, w: f32, h: f32, color: Color) {
    if w <= 0.0 || h <= 0.0 || fb.is_empty() {
        return;
    }
    let x_end = x + w;
    let y_end = y + h;
    let px0 = x.floor().max(0.0) as i64;
    let py0 = y.floor().max(0.0) as i64;
    let px1 = (x_end.ceil() as i64).min(fb.width as i64);
    let py1 = (y_end.ceil() as i64).min(fb.height as i64);

    for py in py0..py1 {
        let cover_y = overlap(py as f32, y, y_end);
        let row = py as usize * fb.width;
        for px in px0..px1 {
            let coverage = overlap(px as f32, x, x_end) * cover_y;
            if coverage <= 0.0 { continue; }
            let idx = row + px as usize;
            fb.pixels[idx] = color.over(fb.pixels[idx], coverage);
        }
    }
}

/// Length of [cell, cell+1) ∩ [start, end).
#[inline]
fn overlap(cell: f32, start: f32, end: f32) -> f32 {
    ((cell + 1.0).min(end) - cell.max(start)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_pixel_square_is_solid() {
        let mut fb = FrameBuffer::new(4, 4);
        fill_rect_coverage(&mut fb, 1.0, 2.0, 1.0, 1.0, Color::WHITE);
        assert_eq!(fb.pixels[2 * 4 + 1], 0xFFFFFF);
        assert_eq!(fb.pixels.iter().filter(|&&p| p != 0).count(), 1);
    }

    #[test]
    fn fractional_square_spreads_over_neighbours() {
        let mut fb = FrameBuffer::new(4, 4);
        fill_rect_coverage(&mut fb, 0.5, 0.5, 1.0, 1.0, Color::WHITE);
        // four pixels each covered a quarter
        for idx in [0, 1, 4, 5] {
            assert_eq!(fb.pixels[idx], 0x00_40_40_40);
        }
        assert_eq!(fb.pixels[2], 0);
    }

    #[test]
    fn out_of_bounds_is_clipped() {
        let mut fb = FrameBuffer::new(2, 2);
        fill_rect_coverage(&mut fb, -0.5, -0.5, 1.0, 1.0, Color::WHITE);
        fill_rect_coverage(&mut fb, 10.0, 10.0, 1.0, 1.0, Color::WHITE);
        assert_eq!(fb.pixels[0], 0x00_40_40_40);
        assert_eq!(fb.pixels[1..], [0, 0, 0]);
    }
}
