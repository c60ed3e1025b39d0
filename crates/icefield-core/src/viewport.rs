/// Window size in CSS pixels plus the device pixel scale.
///
/// Read once at setup. Every drawing surface derives its backing-store size
/// from the same metrics, so all layers line up pixel for pixel. Nothing
/// re-reads the window afterwards: if the viewport is resized the metrics
/// go stale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMetrics {
    pub width: f64,
    pub height: f64,
    pub pixel_scale: f64,
}

impl ViewportMetrics {
    /// Non-finite or non-positive inputs fall back to 0 (sizes) and 1 (scale).
    pub fn new(width: f64, height: f64, pixel_scale: f64) -> Self {
        let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let pixel_scale = if pixel_scale.is_finite() && pixel_scale > 0.0 {
            pixel_scale
        } else {
            1.0
        };
        Self {
            width: sanitize(width),
            height: sanitize(height),
            pixel_scale,
        }
    }

    /// Backing-store size in device pixels (CSS size × pixel scale, truncated, at least 1).
    pub fn backing_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_scale) as u32;
        let h = (self.height * self.pixel_scale) as u32;
        (w.max(1), h.max(1))
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height.max(1.0)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_size_scales_css_size() {
        let vp = ViewportMetrics::new(1920.0, 1080.0, 2.0);
        assert_eq!(vp.backing_size(), (3840, 2160));
        assert!((vp.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn fractional_scale_truncates_like_canvas_width() {
        let vp = ViewportMetrics::new(1001.0, 500.0, 1.5);
        assert_eq!(vp.backing_size(), (1501, 750));
    }

    #[test]
    fn invalid_inputs_are_sanitized() {
        let vp = ViewportMetrics::new(f64::NAN, -4.0, 0.0);
        assert_eq!(vp.pixel_scale, 1.0);
        assert_eq!(vp.backing_size(), (1, 1));
        assert!(vp.aspect().is_finite());
    }
}
