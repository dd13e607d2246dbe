use crate::domain::model::{Center, GeoPoint};
use crate::utils::error::{InputViolation, ParkingError, Result};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle angle between two points, in radians (haversine).
pub fn angular_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt())
}

/// Storage-level predicate: every point on the sphere within a fixed
/// great-circle distance of a center. The boundary is inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCap {
    center: GeoPoint,
    radius_km: f64,
    earth_radius_km: f64,
}

impl SphericalCap {
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Cap radius as an angle, `radius_km / earth_radius_km`.
    pub fn angular_radius(&self) -> f64 {
        self.radius_km / self.earth_radius_km
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        // compared in kilometres so a point built at exactly `radius_km` stays inside
        self.earth_radius_km * angular_distance(&self.center, point) <= self.radius_km
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GeoRadiusTranslator {
    earth_radius_km: f64,
}

impl Default for GeoRadiusTranslator {
    fn default() -> Self {
        Self::new(EARTH_RADIUS_KM)
    }
}

impl GeoRadiusTranslator {
    pub fn new(earth_radius_km: f64) -> Self {
        Self { earth_radius_km }
    }

    pub fn earth_radius_km(&self) -> f64 {
        self.earth_radius_km
    }

    pub fn distance_km(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        self.earth_radius_km * angular_distance(a, b)
    }

    pub fn translate(&self, center: &Center) -> Result<SphericalCap> {
        let GeoPoint {
            latitude,
            longitude,
        } = center.position;
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
            && center.radius_km.is_finite()
            && center.radius_km >= 0.0;
        if !valid {
            tracing::warn!(?center, "Rejected radius search center");
            return Err(ParkingError::InvalidInput(InputViolation::InvalidCenter));
        }

        Ok(SphericalCap {
            center: center.position,
            radius_km: center.radius_km,
            earth_radius_km: self.earth_radius_km,
        })
    }
}
