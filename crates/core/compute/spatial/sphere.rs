//! Unit-sphere vector math used by the containment predicate and envelopes.

/// A point of R³, used for unit vectors on the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const NORTH: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit vector of a geographic position given in degrees.
    #[inline]
    pub fn from_lng_lat(lng: f64, lat: f64) -> Self {
        let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
        let (sin_lng, cos_lng) = lng.to_radians().sin_cos();
        Self::new(cos_lat * cos_lng, cos_lat * sin_lng, sin_lat)
    }

    /// Latitude in degrees of a (not necessarily unit) vector.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.z.atan2(self.x.hypot(self.y)).to_degrees()
    }

    #[inline]
    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn add(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn scale(&self, k: f64) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }

    #[inline]
    pub fn sub(&self, other: &Vec3) -> Vec3 {
        self.add(&other.scale(-1.0))
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Normalized copy, or `None` for a (near) zero vector.
    #[inline]
    pub fn normalized(&self) -> Option<Vec3> {
        let n = self.norm();
        (n > f64::EPSILON).then(|| self.scale(1.0 / n))
    }
}
