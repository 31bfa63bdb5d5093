//! HSV Color Conversion
//!
//! Float HSV <-> BGR conversion used to pack depth into hue.
//!
//! Conventions:
//! - Hue in degrees, `[0, 360)`. A hue of exactly 360 wraps to 0 (red).
//! - Saturation and value in `[0, 1]`.
//! - BGR channels in `[0, 1]`, blue first to match the packed frame layout.
//!
//! This is the usual six-sector formulation, so a depth stream encoded here
//! decodes with any standard RGB->HSV routine on the receiving end.

/// Convert one HSV pixel to BGR
///
/// # Examples
///
/// ```rust
/// use depthcast_frame::hsv::hsv_to_bgr;
///
/// // Pure green
/// assert_eq!(hsv_to_bgr(120.0, 1.0, 1.0), [0.0, 1.0, 0.0]);
/// ```
#[inline]
#[must_use]
pub fn hsv_to_bgr(hue: f32, saturation: f32, value: f32) -> [f32; 3] {
    if saturation == 0.0 {
        return [value, value, value];
    }

    let mut h = hue / 60.0;
    if h < 0.0 {
        h += 6.0;
    } else if h >= 6.0 {
        h -= 6.0;
    }

    let mut sector = h.floor() as i32;
    let mut fraction = h - sector as f32;
    if !(0..6).contains(&sector) {
        sector = 0;
        fraction = 0.0;
    }

    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * fraction);
    let t = value * (1.0 - saturation * (1.0 - fraction));

    let (r, g, b) = match sector {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };

    [b, g, r]
}

/// Convert one BGR pixel to HSV
///
/// Returns `(hue_degrees, saturation, value)`. Greys (including black) have
/// hue 0.
#[inline]
#[must_use]
pub fn bgr_to_hsv(bgr: [f32; 3]) -> (f32, f32, f32) {
    let [b, g, r] = bgr;

    let value = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = value - min;

    let saturation = if value > 0.0 { diff / value } else { 0.0 };
    if diff == 0.0 {
        return (0.0, saturation, value);
    }

    #[allow(clippy::float_cmp)]
    let mut hue = if value == r {
        60.0 * (g - b) / diff
    } else if value == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    (hue, saturation, value)
}

/// Scale a `[0, 1]` channel to 8 bits, truncating toward zero
#[inline]
#[must_use]
pub fn channel_to_u8(channel: f32) -> u8 {
    (channel * 255.0).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_u8(bgr: [f32; 3]) -> [u8; 3] {
        bgr.map(channel_to_u8)
    }

    #[test]
    fn test_primary_hues() {
        assert_eq!(to_u8(hsv_to_bgr(0.0, 1.0, 1.0)), [0, 0, 255]);
        assert_eq!(to_u8(hsv_to_bgr(120.0, 1.0, 1.0)), [0, 255, 0]);
        assert_eq!(to_u8(hsv_to_bgr(240.0, 1.0, 1.0)), [255, 0, 0]);
    }

    #[test]
    fn test_intermediate_hue_truncates() {
        // 90 degrees: sector 1, halfway, red channel is 0.5 * 255 = 127.5
        assert_eq!(to_u8(hsv_to_bgr(90.0, 1.0, 1.0)), [0, 255, 127]);
    }

    #[test]
    fn test_full_circle_wraps_to_red() {
        assert_eq!(to_u8(hsv_to_bgr(360.0, 1.0, 1.0)), [0, 0, 255]);
    }

    #[test]
    fn test_zero_saturation_and_value_is_black() {
        assert_eq!(to_u8(hsv_to_bgr(200.0, 0.0, 0.0)), [0, 0, 0]);
    }

    #[test]
    fn test_bgr_to_hsv() {
        let (h, s, v) = bgr_to_hsv([0.0, 1.0, 0.5]);
        assert!((h - 90.0).abs() < 1e-4);
        assert!((s - 1.0).abs() < f32::EPSILON);
        assert!((v - 1.0).abs() < f32::EPSILON);

        let (h, s, v) = bgr_to_hsv([0.0, 0.0, 0.0]);
        assert_eq!((h, s, v), (0.0, 0.0, 0.0));

        let (h, _, _) = bgr_to_hsv([0.5, 0.0, 1.0]);
        assert!((h - 330.0).abs() < 1e-3);
    }
}
