//! Guidance image sampling.
//!
//! The height field generator only needs bilinear grayscale lookups at
//! normalized coordinates, expressed by [`ImageSampler`]. [`GuidanceImage`]
//! is the owned raster implementation used by the binary and the tests.

use std::path::Path;

use crate::error::SampleError;

/// Bilinear grayscale lookup at normalized coordinates.
pub trait ImageSampler {
    /// Sample the image at `(u, v)` in `[0, 1] x [0, 1]`, with `u` running
    /// along the image width and `v` along its height.
    ///
    /// The origin is the bottom-left corner: `v = 0` is the bottom row of the
    /// picture as it is displayed, `v = 1` the top row.
    ///
    /// Must succeed for every coordinate in the closed unit square,
    /// including the exact borders.
    fn sample_bilinear(&self, u: f64, v: f64) -> Result<f32, SampleError>;
}

/// How texel lookups behave past the image border.
///
/// `Clamp` is the default: the border rows and columns of the height grid
/// take the edge texel values of the guide. `Repeat` reproduces tiling
/// texture lookups, where `u = 0` and `v = 0` blend in the opposite edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// Edge texels extend outward.
    #[default]
    Clamp,
    /// The image tiles, so `u = 0` blends the last and first columns.
    Repeat,
}

/// An owned grayscale raster stored row-major, values nominally in `[0, 1]`.
///
/// Texel row 0 is the bottom row of the picture. Decoded files, whose first
/// row is the top one, are flipped on load.
#[derive(Clone, Debug, PartialEq)]
pub struct GuidanceImage {
    width: u32,
    height: u32,
    wrap: WrapMode,
    texels: Vec<f32>,
}

/// Rec. 601 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

impl GuidanceImage {
    /// Build an image by evaluating `f(x, y)` for every texel, `y = 0` being
    /// the bottom row.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        assert!(width > 0 && height > 0, "guidance image must not be empty");
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            wrap: WrapMode::Clamp,
            texels,
        }
    }

    /// A single-value image. Sampling returns `value` everywhere.
    pub fn uniform(value: f32) -> Self {
        Self::from_fn(1, 1, |_, _| value)
    }

    /// Convert a decoded image to grayscale, flipping it so the last pixel
    /// row of the file becomes texel row 0.
    ///
    /// Returns `None` for a zero-sized image.
    pub fn from_dynamic(image: &image::DynamicImage) -> Option<Self> {
        let rgb = image.to_rgb32f();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self::from_fn(width, height, |x, y| {
            let [r, g, b] = rgb.get_pixel(x, height - 1 - y).0;
            r * LUMA_R + g * LUMA_G + b * LUMA_B
        }))
    }

    /// Decode an image file in any format the `image` crate was built with.
    pub fn open(path: &Path) -> Result<Self, image::ImageError> {
        let decoded = image::open(path)?;
        Self::from_dynamic(&decoded).ok_or_else(empty_image_error)
    }

    /// Return a copy with the given border addressing.
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Border addressing mode.
    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }

    /// Texel value at integer coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn texel(&self, x: u32, y: u32) -> f32 {
        self.texels[(y * self.width + x) as usize]
    }

    fn resolve(&self, i: i64, len: u32) -> u32 {
        let len = i64::from(len);
        let resolved = match self.wrap {
            WrapMode::Clamp => i.clamp(0, len - 1),
            WrapMode::Repeat => i.rem_euclid(len),
        };
        resolved as u32
    }
}

fn empty_image_error() -> image::ImageError {
    image::ImageError::Parameter(image::error::ParameterError::from_kind(
        image::error::ParameterErrorKind::Generic("empty guidance image".to_string()),
    ))
}

impl ImageSampler for GuidanceImage {
    fn sample_bilinear(&self, u: f64, v: f64) -> Result<f32, SampleError> {
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return Err(SampleError::OutOfRange { u, v });
        }

        // Texel centers sit at (i + 0.5) / size.
        let fx = u * f64::from(self.width) - 0.5;
        let fy = v * f64::from(self.height) - 0.5;
        let x0f = fx.floor();
        let y0f = fy.floor();
        let tx = (fx - x0f) as f32;
        let ty = (fy - y0f) as f32;

        let x0 = self.resolve(x0f as i64, self.width);
        let x1 = self.resolve(x0f as i64 + 1, self.width);
        let y0 = self.resolve(y0f as i64, self.height);
        let y1 = self.resolve(y0f as i64 + 1, self.height);

        let lower = self.texel(x0, y0) * (1.0 - tx) + self.texel(x1, y0) * tx;
        let upper = self.texel(x0, y1) * (1.0 - tx) + self.texel(x1, y1) * tx;
        Ok(lower * (1.0 - ty) + upper * ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn ramp(width: u32) -> GuidanceImage {
        GuidanceImage::from_fn(width, 1, |x, _| x as f32 / (width - 1) as f32)
    }

    #[test]
    fn test_uniform_image_samples_constant() {
        let image = GuidanceImage::uniform(0.5);
        for (u, v) in [(0.0, 0.0), (1.0, 1.0), (0.3, 0.9), (0.5, 0.0)] {
            let value = image.sample_bilinear(u, v).unwrap();
            assert!((value - 0.5).abs() < EPSILON, "({u}, {v}) -> {value}");
        }
    }

    #[test]
    fn test_texel_centers_return_exact_values() {
        let image = ramp(5);
        for x in 0..5 {
            let u = (f64::from(x) + 0.5) / 5.0;
            let value = image.sample_bilinear(u, 0.5).unwrap();
            assert!(
                (value - image.texel(x, 0)).abs() < EPSILON,
                "texel {x}: {value} vs {}",
                image.texel(x, 0)
            );
        }
    }

    #[test]
    fn test_midpoint_between_texels_is_average() {
        let image = ramp(5);
        // Halfway between the centers of texels 1 and 2.
        let value = image.sample_bilinear(2.0 / 5.0, 0.5).unwrap();
        let expected = (image.texel(1, 0) + image.texel(2, 0)) * 0.5;
        assert!((value - expected).abs() < EPSILON);
    }

    #[test]
    fn test_clamp_mode_extends_edges() {
        let image = ramp(4);
        assert!((image.sample_bilinear(0.0, 0.0).unwrap() - 0.0).abs() < EPSILON);
        assert!((image.sample_bilinear(1.0, 1.0).unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_repeat_mode_blends_across_the_seam() {
        let image = ramp(4).with_wrap(WrapMode::Repeat);
        // u = 0 sits halfway between the last and the first texel centers.
        let value = image.sample_bilinear(0.0, 0.5).unwrap();
        assert!((value - 0.5).abs() < EPSILON, "seam value {value}");
        let at_one = image.sample_bilinear(1.0, 0.5).unwrap();
        assert!((value - at_one).abs() < EPSILON);
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let image = GuidanceImage::uniform(1.0);
        assert_eq!(
            image.sample_bilinear(1.5, 0.0),
            Err(SampleError::OutOfRange { u: 1.5, v: 0.0 })
        );
        assert!(image.sample_bilinear(0.0, -0.1).is_err());
        assert!(image.sample_bilinear(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_from_dynamic_uses_rec601_luma() {
        let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([255, 0, 0]));
        let guide = GuidanceImage::from_dynamic(&image::DynamicImage::ImageRgb8(rgb)).unwrap();
        assert_eq!(guide.dimensions(), (2, 2));
        assert!((guide.texel(1, 1) - LUMA_R).abs() < 1e-4);
    }

    #[test]
    fn test_decoded_rows_are_flipped_bottom_up() {
        // File row 0 (the top of the picture) is white, the rest black.
        let gray =
            image::GrayImage::from_fn(4, 4, |_, y| image::Luma([if y == 0 { 255 } else { 0 }]));
        let guide = GuidanceImage::from_dynamic(&image::DynamicImage::ImageLuma8(gray)).unwrap();
        assert!(guide.texel(2, 0).abs() < 1e-4);
        assert!((guide.texel(2, 3) - 1.0).abs() < 1e-4);
        assert!(guide.sample_bilinear(0.5, 0.0).unwrap().abs() < EPSILON);
        assert!((guide.sample_bilinear(0.5, 1.0).unwrap() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_default_wrap_keeps_border_texels() {
        let image = GuidanceImage::from_fn(4, 4, |_, y| if y == 0 { 0.0 } else { 1.0 });
        assert_eq!(image.wrap(), WrapMode::Clamp);
        assert!(image.sample_bilinear(0.5, 0.0).unwrap().abs() < EPSILON);

        let tiled = image.with_wrap(WrapMode::Repeat);
        assert!((tiled.sample_bilinear(0.5, 0.0).unwrap() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_empty_image_error_names_the_problem() {
        let err = empty_image_error();
        assert!(matches!(err, image::ImageError::Parameter(_)));
        assert!(err.to_string().contains("empty guidance image"), "{err}");
    }

    #[test]
    fn test_open_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.png");
        image::GrayImage::from_pixel(3, 2, image::Luma([255]))
            .save(&path)
            .unwrap();

        let guide = GuidanceImage::open(&path).unwrap();
        assert_eq!(guide.dimensions(), (3, 2));
        assert!((guide.sample_bilinear(0.25, 0.75).unwrap() - 1.0).abs() < 1e-4);
    }
}
