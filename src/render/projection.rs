//! Natural Earth projection fitted to a viewport.

use crate::atlas::Position;

/// Natural Earth I raw projection (radians in, unit plane out, y up).
fn natural_earth(lambda: f64, phi: f64) -> (f64, f64) {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;
    let x = lambda
        * (0.8707 - 0.131979 * phi2 + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
    let y = phi
        * (1.007226 + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));
    (x, y)
}

/// Maps lon/lat degrees to viewport pixels so the fitted bounds fill the
/// viewport on their limiting axis, centered on the other.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FittedProjection {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl FittedProjection {
    /// Fits every position of `points` into `width` x `height`.
    ///
    /// Returns `None` when there is nothing to fit or the bounds are degenerate.
    pub(crate) fn fit<'a, I>(points: I, width: f64, height: f64) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &(lon, lat) in points {
            let (x, y) = project_unit(lon, lat);
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        let span_x = max_x - min_x;
        let span_y = max_y - min_y;
        if !(span_x.is_finite() && span_y.is_finite()) || span_x <= 0.0 || span_y <= 0.0 {
            return None;
        }

        let scale = (width / span_x).min(height / span_y);
        Some(Self {
            scale,
            offset_x: (width - span_x * scale) / 2.0 - min_x * scale,
            offset_y: (height - span_y * scale) / 2.0 - min_y * scale,
        })
    }

    pub(crate) fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = project_unit(lon, lat);
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }
}

/// Projected unit-plane coordinates with y pointing down, as in SVG.
fn project_unit(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-90.0, 90.0);
    let (x, y) = natural_earth(lon.to_radians(), lat.to_radians());
    (x, -y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_origin() {
        assert_eq!(natural_earth(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_fit_world_fills_viewport() {
        let corners = [(-180.0, -90.0), (180.0, 90.0), (-180.0, 90.0), (180.0, -90.0)];
        let projection = FittedProjection::fit(corners.iter(), 800.0, 200.0).unwrap();

        let (left, top) = projection.project(-180.0, 90.0);
        let (right, bottom) = projection.project(180.0, -90.0);
        assert!(left >= -1e-9 && right <= 800.0 + 1e-9);
        assert!((top - 0.0).abs() < 1e-9);
        assert!((bottom - 200.0).abs() < 1e-9);

        // North is up
        let (_, north) = projection.project(0.0, 60.0);
        let (_, south) = projection.project(0.0, -60.0);
        assert!(north < south);
    }

    #[test]
    fn test_fit_centers_on_free_axis() {
        let corners = [(-10.0, -10.0), (10.0, 10.0)];
        let projection = FittedProjection::fit(corners.iter(), 400.0, 100.0).unwrap();
        let (cx, cy) = projection.project(0.0, 0.0);
        assert!((cx - 200.0).abs() < 1e-6);
        assert!((cy - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_degenerate() {
        let empty: [Position; 0] = [];
        assert!(FittedProjection::fit(empty.iter(), 100.0, 100.0).is_none());
        let point = [(5.0, 5.0)];
        assert!(FittedProjection::fit(point.iter(), 100.0, 100.0).is_none());
    }
}
