use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Color {
    pub r: f32, // Red component (0.0 - 1.0)
    pub g: f32, // Green component (0.0 - 1.0)
    pub b: f32, // Blue component (0.0 - 1.0)
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Placeholder shading for loaded meshes: each channel is the magnitude
    /// of the matching position component.
    pub fn from_position(pos: Vec3) -> Self {
        let abs = pos.abs();
        Self::new(abs.x, abs.y, abs.z)
    }

    const fn hex_char_to_u8(c: u8) -> u8 {
        match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => 0,
        }
    }

    /// Only for the constants below, bad digits silently become 0.
    const fn hex(hex: &str) -> Self {
        let bytes = hex.as_bytes();
        let r = (Self::hex_char_to_u8(bytes[0]) << 4 | Self::hex_char_to_u8(bytes[1])) as f32;
        let g = (Self::hex_char_to_u8(bytes[2]) << 4 | Self::hex_char_to_u8(bytes[3])) as f32;
        let b = (Self::hex_char_to_u8(bytes[4]) << 4 | Self::hex_char_to_u8(bytes[5])) as f32;
        Self::new(r / 255.0, g / 255.0, b / 255.0)
    }

    /// Pack into minifb's 0RGB layout. Channels outside 0..1 are clamped,
    /// then rounded to the nearest 8-bit step.
    pub fn to_u32(&self) -> u32 {
        let r = (self.r.clamp(0.0, 1.0) * 255.0).round() as u32;
        let g = (self.g.clamp(0.0, 1.0) * 255.0).round() as u32;
        let b = (self.b.clamp(0.0, 1.0) * 255.0).round() as u32;
        (r << 16) | (g << 8) | b
    }

    pub fn rgb_bytes(packed: u32) -> [u8; 3] {
        [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
    }

    /// Weighted sum of three colors, used for barycentric interpolation.
    pub fn blend3(colors: &[Color; 3], w: (f32, f32, f32)) -> Color {
        Color {
            r: colors[0].r * w.0 + colors[1].r * w.1 + colors[2].r * w.2,
            g: colors[0].g * w.0 + colors[1].g * w.1 + colors[2].g * w.2,
            b: colors[0].b * w.0 + colors[1].b * w.1 + colors[2].b * w.2,
        }
    }
}

// Predefined colors
impl Color {
    pub const BLACK: Color = Color::hex("000000");
    pub const WHITE: Color = Color::hex("FFFFFF");
    pub const RED: Color = Color::hex("FF0000");
    pub const GREEN: Color = Color::hex("00FF00");
    pub const BLUE: Color = Color::hex("0000FF");
    pub const YELLOW: Color = Color::hex("FFFF00");
    pub const MAGENTA: Color = Color::hex("FF00FF");
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}
