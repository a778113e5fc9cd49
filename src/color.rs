//! Stable colors for service names.
//!
//! Virtual spans (collapsed RPC bars, uninstrumented hops) need a color
//! before the rendering layer has ever seen the service. Hash the name to a
//! hue and keep saturation/value fixed so the same service always gets the
//! same color.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// RGB triple; the renderer decides how to paint it.
pub type Rgb = [u8; 3];

/// Generate a stable color from a key string using its hash.
pub fn color_for_key(key: &str) -> Rgb {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    // Use hash to generate hue (0-360)
    let hue = (hash % 360) as f32;

    // Fixed saturation and value for consistent look
    let saturation = 0.65;
    let value = 0.55;

    hsv_to_rgb(hue, saturation, value)
}

/// Convert HSV to RGB (for color generation)
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let c = v * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h_prime < 1.0 {
        (c, x, 0.0)
    } else if h_prime < 2.0 {
        (x, c, 0.0)
    } else if h_prime < 3.0 {
        (0.0, c, x)
    } else if h_prime < 4.0 {
        (0.0, x, c)
    } else if h_prime < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    [
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ]
}
