use serde::Serialize;

use crate::data::filter::FilteredView;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Map markers for the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoPoints {
    pub points: Vec<GeoPoint>,
    /// Records left off the map for lack of coordinates.
    pub dropped: usize,
}

impl GeoPoints {
    /// Mean position, for centring the map. `None` without points.
    pub fn center(&self) -> Option<GeoPoint> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (lat, lon) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));
        Some(GeoPoint {
            latitude: lat / n,
            longitude: lon / n,
        })
    }
}

/// Coordinates of every record that has both, in view order.
pub fn geo_points(view: &FilteredView<'_>) -> GeoPoints {
    let points: Vec<GeoPoint> = view
        .iter()
        .filter_map(|r| r.coordinates())
        .filter(|(lat, lon)| lat.is_finite() && lon.is_finite())
        .map(|(latitude, longitude)| GeoPoint {
            latitude,
            longitude,
        })
        .collect();
    GeoPoints {
        dropped: view.len() - points.len(),
        points,
    }
}
