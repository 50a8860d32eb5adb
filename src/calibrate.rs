use anyhow::{bail, Result};

use crate::geometry::{pixel_distance, Point};

/// Two-click scale calibration. The first click records one end of a known
/// measurement, the second records the other and opens the distance prompt.
/// Confirming a positive metre value produces `pixels_per_metre`.
#[derive(Clone, Debug, Default)]
pub struct Calibration {
    pub points: Vec<Point>,
    /// Distance prompt buffer; `Some` while the prompt is open.
    pub entry: Option<String>,
    pub pixels_per_metre: Option<f64>,
}

impl Calibration {
    pub fn is_calibrated(&self) -> bool {
        self.pixels_per_metre.is_some()
    }

    /// Ignored once both points are placed or while the prompt is open;
    /// the operator must confirm, cancel, or reset first.
    pub fn add_point(&mut self, p: Point) {
        if self.entry.is_some() || self.points.len() >= 2 {
            return;
        }
        self.points.push(p);
        if self.points.len() == 2 {
            self.entry = Some(String::new());
        }
    }

    pub fn pixel_span(&self) -> Option<f64> {
        match self.points.as_slice() {
            [a, b] => Some(pixel_distance(*a, *b)),
            _ => None,
        }
    }

    /// Validates the prompt buffer and derives the scale. Rejection leaves
    /// both measurement points and the prompt in place so the operator can
    /// re-enter the value without re-clicking.
    pub fn confirm_entry(&mut self) -> Result<f64> {
        let span = match self.pixel_span() {
            Some(span) => span,
            None => bail!("calibration needs two measurement points"),
        };
        let raw = self.entry.as_deref().unwrap_or_default().trim().to_owned();
        let metres: f64 = match raw.parse() {
            Ok(value) => value,
            Err(_) => bail!("'{raw}' is not a number"),
        };
        if !metres.is_finite() || metres <= 0.0 {
            bail!("distance must be a positive number of metres");
        }
        if span <= 0.0 {
            bail!("measurement points coincide; click two distinct points");
        }

        let scale = span / metres;
        self.pixels_per_metre = Some(scale);
        self.entry = None;
        Ok(scale)
    }

    /// Abandons the current two-click attempt without touching an already
    /// established scale.
    pub fn cancel_entry(&mut self) {
        self.entry = None;
        self.points.clear();
    }

    /// Full reset: region mapping is gated off until re-calibration.
    pub fn reset(&mut self) {
        self.points.clear();
        self.entry = None;
        self.pixels_per_metre = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_click_opens_the_distance_prompt() {
        let mut cal = Calibration::default();
        cal.add_point(Point::new(0.0, 0.0));
        assert!(cal.entry.is_none());
        cal.add_point(Point::new(30.0, 40.0));
        assert_eq!(cal.entry.as_deref(), Some(""));
        assert_eq!(cal.pixel_span(), Some(50.0));

        // Further clicks are ignored while the prompt is open.
        cal.add_point(Point::new(999.0, 999.0));
        assert_eq!(cal.points.len(), 2);
    }

    #[test]
    fn confirm_derives_pixels_per_metre() {
        let mut cal = Calibration::default();
        cal.add_point(Point::new(0.0, 0.0));
        cal.add_point(Point::new(100.0, 0.0));
        cal.entry = Some("2.5".into());

        let scale = cal.confirm_entry().expect("valid distance");
        assert_eq!(scale, 40.0);
        assert_eq!(cal.pixels_per_metre, Some(40.0));
        assert!(cal.entry.is_none());
    }

    #[test]
    fn invalid_input_is_rejected_and_points_are_retained() {
        let mut cal = Calibration::default();
        cal.add_point(Point::new(0.0, 0.0));
        cal.add_point(Point::new(100.0, 0.0));

        for bad in ["", "abc", "-3", "0", "NaN"] {
            cal.entry = Some(bad.into());
            assert!(cal.confirm_entry().is_err(), "{bad:?} should be rejected");
            assert_eq!(cal.points.len(), 2);
            assert!(cal.pixels_per_metre.is_none());
        }

        cal.entry = Some("4".into());
        assert!(cal.confirm_entry().is_ok());
    }

    #[test]
    fn reset_clears_points_and_scale() {
        let mut cal = Calibration::default();
        cal.add_point(Point::new(0.0, 0.0));
        cal.add_point(Point::new(10.0, 0.0));
        cal.entry = Some("1".into());
        cal.confirm_entry().expect("valid");

        cal.reset();
        assert!(cal.points.is_empty());
        assert!(!cal.is_calibrated());
    }

    #[test]
    fn cancel_abandons_the_attempt_but_keeps_existing_scale() {
        let mut cal = Calibration {
            pixels_per_metre: Some(12.0),
            ..Calibration::default()
        };
        cal.add_point(Point::new(0.0, 0.0));
        cal.add_point(Point::new(10.0, 0.0));
        cal.cancel_entry();

        assert!(cal.points.is_empty());
        assert!(cal.entry.is_none());
        assert_eq!(cal.pixels_per_metre, Some(12.0));
    }
}
