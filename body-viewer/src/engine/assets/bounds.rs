use bevy::prelude::*;

/// Axis-aligned bounds in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ModelBounds {
    /// Smallest bounds containing every point, `None` when there are no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// World bounds of a local box placed by `transform`.
    ///
    /// All eight corners are transformed so rotated meshes stay enclosed.
    pub fn from_local_box(local_min: Vec3, local_max: Vec3, transform: &GlobalTransform) -> Self {
        let corners = [
            Vec3::new(local_min.x, local_min.y, local_min.z),
            Vec3::new(local_max.x, local_min.y, local_min.z),
            Vec3::new(local_min.x, local_max.y, local_min.z),
            Vec3::new(local_max.x, local_max.y, local_min.z),
            Vec3::new(local_min.x, local_min.y, local_max.z),
            Vec3::new(local_max.x, local_min.y, local_max.z),
            Vec3::new(local_min.x, local_max.y, local_max.z),
            Vec3::new(local_max.x, local_max.y, local_max.z),
        ];
        let world = corners.map(|corner| transform.transform_point(corner));
        // Eight corners, never empty.
        Self::from_points(world).unwrap_or(Self {
            min: world[0],
            max: world[0],
        })
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Calculate center point for recentering and camera focus.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Merge per-mesh world bounds into the bounds of the whole model.
pub fn combined_bounds(parts: impl IntoIterator<Item = ModelBounds>) -> Option<ModelBounds> {
    parts.into_iter().reduce(ModelBounds::union)
}

/// Translation that moves the bounds' center onto the origin.
pub fn recentering_offset(bounds: &ModelBounds) -> Vec3 {
    -bounds.center()
}
