use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Rating gradient (scatter colour channel)
// ---------------------------------------------------------------------------

/// Continuous purple → teal → yellow scale over `[min, max]`, close to viridis.
#[derive(Debug, Clone, Copy)]
pub struct RatingScale {
    min: f64,
    max: f64,
}

impl RatingScale {
    /// Colour for rows without a rating.
    pub const MISSING: Color32 = Color32::GRAY;

    /// Scale spanning the given values; `None` if there are none.
    pub fn spanning(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc: Option<RatingScale>, v| {
            Some(match acc {
                None => RatingScale { min: v, max: v },
                Some(s) => RatingScale {
                    min: s.min.min(v),
                    max: s.max.max(v),
                },
            })
        })
    }

    /// Position of `value` on the scale, in `[0, 1]`.
    pub fn fraction(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / range).clamp(0.0, 1.0)
    }

    pub fn color_for(&self, value: Option<f64>) -> Color32 {
        match value {
            Some(v) => {
                let t = self.fraction(v) as f32;
                // Hue 280° (purple) down to 55° (yellow), brightening as it goes.
                hsl_to_color32(280.0 - 225.0 * t, 0.7, 0.3 + 0.3 * t)
            }
            None => Self::MISSING,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn scale_spans_values() {
        let scale = RatingScale::spanning([4.0, 3.0, 5.0].into_iter()).unwrap();
        assert_eq!(scale.min(), 3.0);
        assert_eq!(scale.max(), 5.0);
        assert_eq!(scale.fraction(4.0), 0.5);
        assert_eq!(scale.fraction(9.0), 1.0);
        assert!(RatingScale::spanning(std::iter::empty()).is_none());
    }

    #[test]
    fn ends_of_the_scale_differ() {
        let scale = RatingScale::spanning([1.0, 5.0].into_iter()).unwrap();
        assert_ne!(scale.color_for(Some(1.0)), scale.color_for(Some(5.0)));
        assert_eq!(scale.color_for(None), RatingScale::MISSING);
    }
}
