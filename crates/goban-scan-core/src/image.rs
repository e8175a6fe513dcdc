use crate::error::ScanError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

const HUE_BIAS: f64 = 100.0;
const HUE_SCALE: f64 = 256.0 + HUE_BIAS;

/// Borrowed row-major RGB or RGBA raster. Alpha is ignored.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: &'a [u8], // len = w*h*channels
}

impl<'a> RgbImageView<'a> {
    /// Checked constructor for raw buffers.
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, ScanError> {
        if channels != 3 && channels != 4 {
            return Err(ScanError::UnsupportedChannels(channels));
        }
        let Some(expected) = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
        else {
            return Err(ScanError::InvalidImageDimensions { width, height });
        };
        if width == 0 || height == 0 {
            return Err(ScanError::InvalidImageDimensions { width, height });
        }
        if data.len() != expected {
            return Err(ScanError::InvalidImageBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// RGB of the pixel containing `p`, `None` outside the image.
    #[inline]
    pub fn pixel(&self, p: Point) -> Option<[u8; 3]> {
        if !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        let x = p.x.floor();
        let y = p.y.floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        let offset = (y as usize * self.width + x as usize) * self.channels;
        let px = self.data.get(offset..offset + 3)?;
        Some([px[0], px[1], px[2]])
    }

    /// Reduced color probe at `p`, `None` outside the image.
    #[inline]
    pub fn probe(&self, p: Point) -> Option<Probe> {
        self.pixel(p).map(reduce_color)
    }
}

/// Owned RGB raster, mainly for synthetic inputs.
#[derive(Clone, Debug)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            channels: 3,
            data: &self.data,
        }
    }

    pub fn put_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x < self.width && y < self.height {
            let offset = (y * self.width + x) * 3;
            self.data[offset..offset + 3].copy_from_slice(&rgb);
        }
    }

    /// Paint a filled disc, clipped to the image.
    pub fn fill_disc(&mut self, center: Point, radius: f64, rgb: [u8; 3]) {
        let x0 = (center.x - radius).floor().max(0.0) as usize;
        let y0 = (center.y - radius).floor().max(0.0) as usize;
        let x1 = (center.x + radius).ceil().max(0.0) as usize;
        let y1 = (center.y + radius).ceil().max(0.0) as usize;
        let r2 = radius * radius;
        for y in y0..=y1.min(self.height.saturating_sub(1)) {
            for x in x0..=x1.min(self.width.saturating_sub(1)) {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= r2 {
                    self.put_pixel(x, y, rgb);
                }
            }
        }
    }
}

/// Cheap color reduction of one pixel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    /// Saturation-like spread `(max - min) / (max + 100) * 356`.
    pub hue: f64,
    /// Mean channel value `(r + g + b) / 3`.
    pub lightness: f64,
}

impl Probe {
    /// Mean of the given probes, `None` when empty.
    pub fn mean<I: IntoIterator<Item = Probe>>(probes: I) -> Option<Probe> {
        let mut hue = 0.0;
        let mut lightness = 0.0;
        let mut count = 0usize;
        for p in probes {
            hue += p.hue;
            lightness += p.lightness;
            count += 1;
        }
        (count > 0).then(|| Probe {
            hue: hue / count as f64,
            lightness: lightness / count as f64,
        })
    }
}

/// Reduce an RGB triple to `(hue, lightness)`. Not true HSL.
pub fn reduce_color([r, g, b]: [u8; 3]) -> Probe {
    let max = r.max(g).max(b) as f64;
    let min = r.min(g).min(b) as f64;
    Probe {
        hue: (max - min) / (max + HUE_BIAS) * HUE_SCALE,
        lightness: (r as f64 + g as f64 + b as f64) / 3.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gray_pixels_have_zero_hue() {
        let p = reduce_color([128, 128, 128]);
        assert_relative_eq!(p.hue, 0.0);
        assert_relative_eq!(p.lightness, 128.0);
    }

    #[test]
    fn saturated_pixels_have_high_hue() {
        let p = reduce_color([200, 150, 100]);
        assert_relative_eq!(p.hue, 100.0 / 300.0 * 356.0);
        assert_relative_eq!(p.lightness, 150.0);
    }

    #[test]
    fn view_rejects_bad_buffers() {
        let data = vec![0u8; 10];
        assert!(matches!(
            RgbImageView::new(2, 2, 3, &data),
            Err(ScanError::InvalidImageBuffer {
                expected: 12,
                got: 10
            })
        ));
        assert!(matches!(
            RgbImageView::new(2, 2, 2, &data),
            Err(ScanError::UnsupportedChannels(2))
        ));
        assert!(matches!(
            RgbImageView::new(0, 2, 3, &[]),
            Err(ScanError::InvalidImageDimensions { .. })
        ));
    }

    #[test]
    fn pixel_reads_are_bounds_checked() {
        let mut img = RgbImage::filled(4, 3, [1, 2, 3]);
        img.put_pixel(3, 2, [9, 8, 7]);
        let view = img.view();
        assert_eq!(view.pixel(Point::new(3.9, 2.1)), Some([9, 8, 7]));
        assert_eq!(view.pixel(Point::new(0.0, 0.0)), Some([1, 2, 3]));
        assert_eq!(view.pixel(Point::new(4.0, 0.0)), None);
        assert_eq!(view.pixel(Point::new(-0.1, 1.0)), None);
        assert_eq!(view.pixel(Point::new(f64::NAN, 1.0)), None);
    }

    #[test]
    fn rgba_alpha_is_ignored() {
        let data = [10, 20, 30, 0, 40, 50, 60, 255];
        let view = RgbImageView::new(2, 1, 4, &data).expect("view");
        assert_eq!(view.pixel(Point::new(1.5, 0.5)), Some([40, 50, 60]));
    }

    #[test]
    fn probe_mean_skips_nothing_and_handles_empty() {
        assert!(Probe::mean(std::iter::empty()).is_none());
        let m = Probe::mean([
            Probe {
                hue: 1.0,
                lightness: 10.0,
            },
            Probe {
                hue: 3.0,
                lightness: 20.0,
            },
        ])
        .expect("mean");
        assert_relative_eq!(m.hue, 2.0);
        assert_relative_eq!(m.lightness, 15.0);
    }
}
