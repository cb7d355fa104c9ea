//! Small numeric helpers shared by sketches.

use crate::analysis::dataset::{CHROMA_BINS, PITCH_NAMES};

/// Affine remap of `value` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// The output is not clamped; inputs outside the source range extrapolate.
/// A zero-width source range maps everything to `out_min`.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    out_min + (value - in_min) * (out_max - out_min) / span
}

pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to 0-1, then raise to `exponent`. Exponents below 1 lift quiet
/// values, above 1 push them toward silence.
pub fn power(value: f32, exponent: f32) -> f32 {
    clamp(value, 0.0, 1.0).powf(exponent)
}

/// Index of the strongest pitch class. Ties go to the lowest index.
pub fn dominant_pitch(chroma: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &energy) in chroma.iter().enumerate() {
        match best {
            Some((_, top)) if energy <= top => {}
            _ if energy.is_nan() => {}
            _ => best = Some((i, energy)),
        }
    }
    best.map(|(i, _)| i)
}

pub fn pitch_name(pitch: usize) -> &'static str {
    PITCH_NAMES[pitch % CHROMA_BINS]
}

/// Hue in degrees for a pitch class, walking the colour wheel in semitones.
pub fn pitch_hue(pitch: usize) -> f32 {
    (pitch % CHROMA_BINS) as f32 * (360.0 / CHROMA_BINS as f32)
}

/// Convert hue (degrees), saturation and lightness (0-1) to 8-bit RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let h = hue.rem_euclid(360.0);
    let s = clamp(saturation, 0.0, 1.0);
    let l = clamp(lightness, 0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = l - chroma / 2.0;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let to_byte = |c: f32| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}
