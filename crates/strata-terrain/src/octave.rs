//! Multi-octave coherent noise over the height grid.
//!
//! Each octave samples Perlin noise remapped to roughly `[0, 1]`. Frequency
//! doubles and amplitude is multiplied by the persistence after every octave.
//! The sum is divided by a running `max_value` that starts at `1.0` and gains
//! each octave's amplitude, so the result stays below the true maximum.

use noise::{NoiseFn, Perlin};

use crate::error::ConfigurationError;

/// Octave noise configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseParams {
    /// Number of octaves to sum. Must be at least 1.
    pub octaves: u32,
    /// Amplitude multiplier applied after each octave, in `(0, 1]`.
    pub persistence: f64,
    /// Noise-space distance covered by the grid along its columns.
    pub span_x: f64,
    /// Noise-space distance covered by the grid along its rows.
    pub span_y: f64,
    /// Noise-space origin along the columns.
    pub origin_x: f64,
    /// Noise-space origin along the rows.
    pub origin_y: f64,
    /// Permutation seed of the Perlin lattice.
    pub seed: u32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            octaves: 3,
            persistence: 0.5,
            span_x: 5.0,
            span_y: 5.0,
            origin_x: 0.0,
            origin_y: 0.0,
            seed: 0,
        }
    }
}

impl NoiseParams {
    /// Check octave count, persistence range and finiteness of spans/origins.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.octaves == 0 {
            return Err(ConfigurationError::NoOctaves);
        }
        if !(self.persistence > 0.0 && self.persistence <= 1.0) {
            return Err(ConfigurationError::PersistenceOutOfRange(self.persistence));
        }
        for (name, value) in [
            ("span_x", self.span_x),
            ("span_y", self.span_y),
            ("origin_x", self.origin_x),
            ("origin_y", self.origin_y),
        ] {
            if !value.is_finite() {
                return Err(ConfigurationError::NonFiniteNoiseParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Samples the octave sum for cells of an `edge_size x edge_size` grid.
pub struct OctaveNoise {
    perlin: Perlin,
    params: NoiseParams,
    edge_size: usize,
}

impl OctaveNoise {
    /// Create a sampler for a grid with `edge_size` cells per edge.
    pub fn new(params: NoiseParams, edge_size: usize) -> Result<Self, ConfigurationError> {
        params.validate()?;
        if edge_size == 0 {
            return Err(ConfigurationError::EdgeSizeZero);
        }
        Ok(Self {
            perlin: Perlin::new(params.seed),
            params,
            edge_size,
        })
    }

    /// Perlin noise remapped from `[-1, 1]` to roughly `[0, 1]`.
    pub fn coherent(&self, x: f64, y: f64) -> f64 {
        self.perlin.get([x, y]) * 0.5 + 0.5
    }

    /// Normalized octave sum for grid cell `(row, col)`.
    ///
    /// The octave coordinate is `origin + (col / edge) * span * frequency`,
    /// and that coordinate is scaled by `frequency` once more before the
    /// lookup, so octave `i` effectively samples at `4^i` times the base
    /// frequency. Existing terrains depend on this exact distribution.
    pub fn sample(&self, row: usize, col: usize) -> f64 {
        let edge = self.edge_size as f64;
        let col_frac = col as f64 / edge;
        let row_frac = row as f64 / edge;

        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 1.0;

        for _ in 0..self.params.octaves {
            let x = self.params.origin_x + col_frac * self.params.span_x * frequency;
            let y = self.params.origin_y + row_frac * self.params.span_y * frequency;
            total += self.coherent(x * frequency, y * frequency) * amplitude;

            max_value += amplitude;
            amplitude *= self.params.persistence;
            frequency *= 2.0;
        }

        total / max_value
    }

    /// The divisor [`Self::sample`] applies: `1 + sum of octave amplitudes`.
    pub fn max_value(&self) -> f64 {
        let mut max_value = 1.0;
        let mut amplitude = 1.0;
        for _ in 0..self.params.octaves {
            max_value += amplitude;
            amplitude *= self.params.persistence;
        }
        max_value
    }

    /// Return a reference to the noise parameters.
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Grid edge size the sampler normalizes cell indices by.
    pub fn edge_size(&self) -> usize {
        self.edge_size
    }
}
