//! Host-side terrain surface: scaled heights, normals and steepness.
//!
//! The splat generator only sees [`SteepnessProvider`]. [`TerrainSurface`]
//! implements it over a generated [`HeightGrid`], the way a terrain host
//! derives slope after ingesting the heights.

use glam::DVec3;

use crate::error::{ConfigurationError, SampleError};
use crate::heightfield::HeightGrid;

/// Slope angle lookup at normalized splat-grid coordinates.
pub trait SteepnessProvider {
    /// Steepness in degrees, in `[0, 90]`, at `(norm_row, norm_col)`.
    ///
    /// `norm_row` is the splat grid's row fraction and `norm_col` its column
    /// fraction. Hosts that store splat data transposed (see
    /// [`crate::SplatWeightGrid`]) read `norm_row` as their x axis.
    fn steepness(&self, norm_row: f64, norm_col: f64) -> Result<f64, SampleError>;
}

/// A height grid placed in world space.
///
/// The grid spans `size x size` world units horizontally; heights are
/// multiplied by `height_scale`. World x runs along grid columns and world
/// z along grid rows.
#[derive(Clone, Debug)]
pub struct TerrainSurface {
    grid: HeightGrid,
    size: f64,
    height_scale: f64,
}

impl TerrainSurface {
    /// Wrap a height grid. The grid needs at least 2 cells per edge.
    pub fn new(grid: HeightGrid, size: f64, height_scale: f64) -> Result<Self, ConfigurationError> {
        if grid.edge_size() < 2 {
            return Err(ConfigurationError::HeightGridTooSmall(grid.edge_size()));
        }
        for (name, value) in [("size", size), ("height scale", height_scale)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::NonPositiveTerrainSize { name, value });
            }
        }
        Ok(Self {
            grid,
            size,
            height_scale,
        })
    }

    /// The unscaled height grid.
    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    /// Consume the surface, returning the height grid.
    pub fn into_grid(self) -> HeightGrid {
        self.grid
    }

    /// Horizontal extent in world units.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Vertical scale in world units.
    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    fn spacing(&self) -> f64 {
        self.size / (self.grid.edge_size() - 1) as f64
    }

    fn scaled(&self, row: usize, col: usize) -> f64 {
        f64::from(self.grid.get(row, col)) * self.height_scale
    }

    /// Surface normal at a grid vertex from central differences
    /// (one-sided on the border).
    fn vertex_normal(&self, row: usize, col: usize) -> DVec3 {
        let last = self.grid.edge_size() - 1;
        let spacing = self.spacing();

        let (c0, c1) = (col.saturating_sub(1), (col + 1).min(last));
        let (r0, r1) = (row.saturating_sub(1), (row + 1).min(last));

        let dx = (self.scaled(row, c1) - self.scaled(row, c0)) / ((c1 - c0) as f64 * spacing);
        let dz = (self.scaled(r1, col) - self.scaled(r0, col)) / ((r1 - r0) as f64 * spacing);

        DVec3::new(-dx, 1.0, -dz).normalize()
    }

    /// Grid-space cell and fractional offsets for normalized `(x, z)`.
    fn locate(&self, x: f64, z: f64) -> (usize, usize, usize, usize, f64, f64) {
        let last = self.grid.edge_size() - 1;
        let fx = x.clamp(0.0, 1.0) * last as f64;
        let fz = z.clamp(0.0, 1.0) * last as f64;
        let c0 = (fx.floor() as usize).min(last);
        let r0 = (fz.floor() as usize).min(last);
        let c1 = (c0 + 1).min(last);
        let r1 = (r0 + 1).min(last);
        (r0, r1, c0, c1, fx - c0 as f64, fz - r0 as f64)
    }

    /// Bilinearly interpolated, scaled height at normalized `(x, z)`.
    pub fn interpolated_height(&self, x: f64, z: f64) -> f64 {
        let (r0, r1, c0, c1, tx, tz) = self.locate(x, z);
        let top = self.scaled(r0, c0) * (1.0 - tx) + self.scaled(r0, c1) * tx;
        let bottom = self.scaled(r1, c0) * (1.0 - tx) + self.scaled(r1, c1) * tx;
        top * (1.0 - tz) + bottom * tz
    }

    /// Unit normal at normalized `(x, z)`, blended from the four surrounding
    /// vertex normals.
    pub fn interpolated_normal(&self, x: f64, z: f64) -> DVec3 {
        let (r0, r1, c0, c1, tx, tz) = self.locate(x, z);
        let top = self.vertex_normal(r0, c0).lerp(self.vertex_normal(r0, c1), tx);
        let bottom = self.vertex_normal(r1, c0).lerp(self.vertex_normal(r1, c1), tx);
        top.lerp(bottom, tz).normalize()
    }

    /// Angle between the surface normal and +Y in degrees, in `[0, 90]`.
    pub fn steepness_at(&self, x: f64, z: f64) -> f64 {
        let normal = self.interpolated_normal(x, z);
        normal.y.clamp(-1.0, 1.0).acos().to_degrees().clamp(0.0, 90.0)
    }
}

impl SteepnessProvider for TerrainSurface {
    fn steepness(&self, norm_row: f64, norm_col: f64) -> Result<f64, SampleError> {
        if !(0.0..=1.0).contains(&norm_row) || !(0.0..=1.0).contains(&norm_col) {
            return Err(SampleError::OutOfRange {
                u: norm_row,
                v: norm_col,
            });
        }
        // Splat rows map onto world x.
        Ok(self.steepness_at(norm_row, norm_col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn ramp_along_columns(edge: usize) -> HeightGrid {
        HeightGrid::from_fn(edge, |_, col| col as f32 / (edge - 1) as f32)
    }

    #[test]
    fn test_flat_surface_has_zero_steepness() {
        let surface = TerrainSurface::new(HeightGrid::filled(8, 0.4), 8.0, 50.0).unwrap();
        for (x, z) in [(0.0, 0.0), (0.5, 0.5), (1.0, 0.25)] {
            assert!(surface.steepness_at(x, z).abs() < EPSILON);
        }
        let n = surface.interpolated_normal(0.3, 0.7);
        assert!((n - DVec3::Y).length() < EPSILON);
    }

    #[test]
    fn test_unit_ramp_is_45_degrees() {
        // Rise equals run when height scale equals horizontal size.
        let surface = TerrainSurface::new(ramp_along_columns(9), 10.0, 10.0).unwrap();
        for (x, z) in [(0.0, 0.0), (0.42, 0.9), (1.0, 1.0)] {
            let angle = surface.steepness_at(x, z);
            assert!((angle - 45.0).abs() < 1e-6, "angle {angle} at ({x}, {z})");
        }
    }

    #[test]
    fn test_interpolated_height_is_scaled() {
        let surface = TerrainSurface::new(ramp_along_columns(5), 4.0, 20.0).unwrap();
        assert!((surface.interpolated_height(0.5, 0.1) - 10.0).abs() < 1e-5);
        assert!((surface.interpolated_height(1.0, 0.0) - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_provider_reads_row_fraction_as_world_x() {
        // Cliff only across the high-column half of the grid.
        let edge = 16;
        let grid = HeightGrid::from_fn(edge, |_, col| if col >= 8 { col as f32 } else { 0.0 });
        let surface = TerrainSurface::new(grid, 16.0, 10.0).unwrap();

        let steep = surface.steepness(0.8, 0.1).unwrap();
        let flat = surface.steepness(0.1, 0.8).unwrap();
        assert!(steep > 67.5, "expected cliff, got {steep}");
        assert!(flat < EPSILON, "expected flat ground, got {flat}");
    }

    #[test]
    fn test_provider_rejects_out_of_range() {
        let surface = TerrainSurface::new(HeightGrid::filled(4, 0.0), 4.0, 1.0).unwrap();
        assert!(matches!(
            surface.steepness(1.2, 0.0),
            Err(SampleError::OutOfRange { .. })
        ));
        assert!(surface.steepness(1.0, 1.0).is_ok());
    }

    #[test]
    fn test_rejects_degenerate_surfaces() {
        assert!(matches!(
            TerrainSurface::new(HeightGrid::filled(1, 0.0), 1.0, 1.0),
            Err(ConfigurationError::HeightGridTooSmall(1))
        ));
        assert!(matches!(
            TerrainSurface::new(HeightGrid::filled(4, 0.0), 0.0, 1.0),
            Err(ConfigurationError::NonPositiveTerrainSize { name: "size", .. })
        ));
        assert!(matches!(
            TerrainSurface::new(HeightGrid::filled(4, 0.0), 4.0, f64::NAN),
            Err(ConfigurationError::NonPositiveTerrainSize { .. })
        ));
    }
}
