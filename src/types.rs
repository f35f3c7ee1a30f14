// Core buffers shared by the mask builder, the particle field and the window.

use std::fmt;

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Reallocate for a new window size. Contents become black.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color.0);
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Alpha of the logo as drawn on the canvas, one byte per canvas pixel.
/// Never shown; particles are only seeded where alpha > threshold.
#[derive(Clone, Default)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<u8>,   // length = width * height
}

impl Mask {
    pub fn empty(width: usize, height: usize) -> Self {
        Self { width, height, alpha: vec![0; width * height] }
    }

    #[inline]
    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        self.alpha[y * self.width + x]
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels a sampler could accept at `threshold`.
    pub fn opaque_count(&self, threshold: u8) -> usize {
        self.alpha.iter().filter(|&&a| a > threshold).count()
    }
}

/// A 0x00RRGGBB colour. Written as `"#RRGGBB"` in config files.
#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x00_00_00_00);
    pub const WHITE: Color = Color(0x00_FF_FF_FF);

    #[inline] pub fn r(self) -> u8 { ((self.0 >> 16) & 0xFF) as u8 }
    #[inline] pub fn g(self) -> u8 { ((self.0 >> 8) & 0xFF) as u8 }
    #[inline] pub fn b(self) -> u8 { (self.0 & 0xFF) as u8 }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Mix `self` over `dst` with `coverage` in [0,1] (plain sRGB mix, like a canvas).
    pub fn over(self, dst: u32, coverage: f32) -> u32 {
        if coverage >= 1.0 { return self.0; }
        if coverage <= 0.0 { return dst; }
        let mix = |s: u8, d: u32| -> u32 {
            let d = (d & 0xFF) as f32;
            (d + (s as f32 - d) * coverage).round().clamp(0.0, 255.0) as u32
        };
        (mix(self.r(), dst >> 16) << 16) | (mix(self.g(), dst >> 8) << 8) | mix(self.b(), dst)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0 & 0x00FF_FFFF)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        match hex.to_ascii_lowercase().as_str() {
            "white" => return Ok(Color::WHITE),
            "black" => return Ok(Color::BLACK),
            _ => {}
        }
        let expanded = match hex.len() {
            6 => hex.to_string(),
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(format!("invalid colour `{s}`: expected #RRGGBB")),
        };
        u32::from_str_radix(&expanded, 16)
            .map(Color)
            .map_err(|_| format!("invalid colour `{s}`: expected #RRGGBB"))
    }
}
