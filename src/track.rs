use crate::config;
use crate::error::TrackError;
use crate::types::{Point, Rgb};

/// Black-on-white track artwork the robot drives over.
///
/// The surface is owned by the application shell; the painter mutates it between
/// ticks and the simulation only ever reads single pixels from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    revision: u64, // Bumped on every mutation so the renderer can re-upload lazily
}

/// Paint colour and brush size for a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ink {
    Draw,
    Erase,
}

impl Ink {
    pub fn color(self) -> Rgb {
        match self {
            Ink::Draw => Rgb::BLACK,
            Ink::Erase => Rgb::WHITE,
        }
    }

    pub fn radius(self) -> f64 {
        match self {
            Ink::Draw => config::DRAW_RADIUS,
            Ink::Erase => config::ERASE_RADIUS,
        }
    }
}

impl TrackSurface {
    /// Blank (all white) surface. Zero dimensions are bumped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        TrackSurface {
            width,
            height,
            pixels: vec![Rgb::WHITE; (width * height) as usize],
            revision: 0,
        }
    }

    /// White surface with the closed two-curve sample loop drawn on it.
    pub fn with_sample_track(width: u32, height: u32) -> Self {
        let mut surface = TrackSurface::new(width, height);
        surface.draw_sample_track();
        surface
    }

    /// Builds a surface from a tightly packed RGBA buffer; alpha is ignored.
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8]) -> Result<Self, TrackError> {
        if width == 0 || height == 0 {
            return Err(TrackError::EmptySurface { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(TrackError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|px| Rgb::new(px[0], px[1], px[2]))
            .collect();
        Ok(TrackSurface {
            width,
            height,
            pixels,
            revision: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Reads one pixel. Coordinates past the edge saturate to the edge pixel.
    pub fn sample_pixel(&self, x: u32, y: u32) -> Rgb {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[self.index(x, y)]
    }

    /// Swaps in new artwork of the same size.
    pub fn replace_all(&mut self, other: TrackSurface) -> Result<(), TrackError> {
        if other.width != self.width || other.height != self.height {
            return Err(TrackError::SizeMismatch {
                width: self.width,
                height: self.height,
                actual_width: other.width,
                actual_height: other.height,
            });
        }
        self.pixels = other.pixels;
        self.touch();
        log::info!("Track replaced ({}x{})", self.width, self.height);
        Ok(())
    }

    /// Wipes the surface back to white.
    pub fn clear(&mut self) {
        self.pixels.fill(Rgb::WHITE);
        self.touch();
        crate::debug_track!("Track cleared");
    }

    /// Nearest-neighbour rescale, used to fit imported artwork to the arena.
    pub fn resampled(&self, width: u32, height: u32) -> TrackSurface {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            let src_y = (y as u64 * self.height as u64 / height as u64) as u32;
            for x in 0..width {
                let src_x = (x as u64 * self.width as u64 / width as u64) as u32;
                pixels.push(self.sample_pixel(src_x, src_y));
            }
        }
        TrackSurface {
            width,
            height,
            pixels,
            revision: 0,
        }
    }

    /// Stamps a filled disc. Pixels whose centre lies within `radius` are painted.
    pub fn paint_disc(&mut self, center: Point, radius: f64, color: Rgb) {
        let min_x = (center.x - radius).floor().max(0.0) as i64;
        let min_y = (center.y - radius).floor().max(0.0) as i64;
        let max_x = ((center.x + radius).ceil() as i64).min(self.width as i64 - 1);
        let max_y = ((center.y + radius).ceil() as i64).min(self.height as i64 - 1);
        if max_x < min_x || max_y < min_y {
            return;
        }

        let radius_sq = radius * radius;
        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let dx = px as f64 + 0.5 - center.x;
                let dy = py as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius_sq {
                    let idx = self.index(px as u32, py as u32);
                    self.pixels[idx] = color;
                }
            }
        }
        self.touch();
    }

    /// Paints a continuous brush stroke between two pointer positions.
    pub fn paint_stroke(&mut self, from: Point, to: Point, ink: Ink) {
        let radius = ink.radius();
        let spacing = (radius * 0.5).max(0.5);
        let steps = (from.distance(to) / spacing).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let p = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            self.paint_disc(p, radius, ink.color());
        }
    }

    /// Copies the surface into an opaque RGBA buffer for texture upload.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            bytes.extend_from_slice(&[px.r, px.g, px.b, 255]);
        }
        bytes
    }

    fn draw_sample_track(&mut self) {
        let sx = self.width as f64 / config::SURFACE_WIDTH as f64;
        let sy = self.height as f64 / config::SURFACE_HEIGHT as f64;
        let p = |x: f64, y: f64| Point::new(x * sx, y * sy);

        let start = p(100.0, 300.0);
        let far = p(700.0, 300.0);
        let upper = [start, p(400.0, 100.0), far];
        let lower = [far, p(400.0, 500.0), start];

        for [p0, c, p1] in [upper, lower] {
            let steps = 1000;
            for i in 0..=steps {
                let t = i as f64 / steps as f64;
                let u = 1.0 - t;
                let point = Point::new(
                    u * u * p0.x + 2.0 * u * t * c.x + t * t * p1.x,
                    u * u * p0.y + 2.0 * u * t * c.y + t * t * p1.y,
                );
                self.paint_disc(point, config::SAMPLE_TRACK_RADIUS, Rgb::BLACK);
            }
        }
        crate::debug_track!("Sample track drawn on {}x{} surface", self.width, self.height);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_white() {
        let surface = TrackSurface::new(10, 8);
        assert_eq!(surface.width(), 10);
        assert_eq!(surface.height(), 8);
        assert_eq!(surface.sample_pixel(0, 0), Rgb::WHITE);
        assert_eq!(surface.sample_pixel(9, 7), Rgb::WHITE);
    }

    #[test]
    fn test_sample_pixel_saturates_to_edge() {
        let mut surface = TrackSurface::new(4, 4);
        surface.paint_disc(Point::new(3.5, 3.5), 0.5, Rgb::BLACK);
        assert_eq!(surface.sample_pixel(3, 3), Rgb::BLACK);
        assert_eq!(surface.sample_pixel(100, 100), Rgb::BLACK);
    }

    #[test]
    fn test_paint_disc_covers_centre_only() {
        let mut surface = TrackSurface::new(20, 20);
        surface.paint_disc(Point::new(10.0, 10.0), 2.0, Rgb::BLACK);
        assert_eq!(surface.sample_pixel(10, 10), Rgb::BLACK);
        assert_eq!(surface.sample_pixel(9, 9), Rgb::BLACK);
        assert_eq!(surface.sample_pixel(15, 10), Rgb::WHITE);
        assert_eq!(surface.sample_pixel(10, 15), Rgb::WHITE);
    }

    #[test]
    fn test_paint_disc_off_surface_is_ignored() {
        let mut surface = TrackSurface::new(10, 10);
        let before = surface.revision();
        surface.paint_disc(Point::new(-50.0, -50.0), 2.0, Rgb::BLACK);
        assert_eq!(surface.revision(), before);
        assert!(surface.to_rgba().chunks(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_stroke_is_continuous_and_erasable() {
        let mut surface = TrackSurface::new(100, 20);
        surface.paint_stroke(Point::new(10.0, 10.0), Point::new(90.0, 10.0), Ink::Draw);
        for x in 10..90 {
            assert_eq!(surface.sample_pixel(x, 10), Rgb::BLACK, "gap at x={}", x);
        }

        surface.paint_stroke(Point::new(50.0, 10.0), Point::new(50.0, 10.0), Ink::Erase);
        assert_eq!(surface.sample_pixel(50, 10), Rgb::WHITE);
        assert_eq!(surface.sample_pixel(20, 10), Rgb::BLACK);
    }

    #[test]
    fn test_clear_bumps_revision() {
        let mut surface = TrackSurface::with_sample_track(800, 600);
        let before = surface.revision();
        surface.clear();
        assert!(surface.revision() > before);
        assert_eq!(surface.sample_pixel(100, 300), Rgb::WHITE);
    }

    #[test]
    fn test_sample_track_passes_through_endpoints() {
        let surface = TrackSurface::with_sample_track(800, 600);
        assert_eq!(surface.sample_pixel(100, 300), Rgb::BLACK);
        assert_eq!(surface.sample_pixel(700, 300), Rgb::BLACK);
        // Apex of the upper curve
        assert_eq!(surface.sample_pixel(400, 200), Rgb::BLACK);
        // Centre of the loop stays clear
        assert_eq!(surface.sample_pixel(400, 300), Rgb::WHITE);
    }

    #[test]
    fn test_replace_all_requires_matching_size() {
        let mut surface = TrackSurface::new(8, 8);
        let err = surface.replace_all(TrackSurface::new(4, 8)).unwrap_err();
        assert_eq!(
            err,
            TrackError::SizeMismatch {
                width: 8,
                height: 8,
                actual_width: 4,
                actual_height: 8
            }
        );

        let mut dark = TrackSurface::new(8, 8);
        dark.paint_disc(Point::new(4.0, 4.0), 20.0, Rgb::BLACK);
        surface.replace_all(dark).unwrap();
        assert_eq!(surface.sample_pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_from_rgba_validates_buffer() {
        assert_eq!(
            TrackSurface::from_rgba(2, 2, &[0; 15]),
            Err(TrackError::BufferSize {
                expected: 16,
                actual: 15
            })
        );
        assert_eq!(
            TrackSurface::from_rgba(0, 2, &[]),
            Err(TrackError::EmptySurface { width: 0, height: 2 })
        );

        let bytes = [10, 20, 30, 0, 255, 255, 255, 255];
        let surface = TrackSurface::from_rgba(2, 1, &bytes).unwrap();
        assert_eq!(surface.sample_pixel(0, 0), Rgb::new(10, 20, 30));
        assert_eq!(surface.sample_pixel(1, 0), Rgb::WHITE);
    }

    #[test]
    fn test_resampled_nearest_neighbour() {
        let bytes = [0, 0, 0, 255, 255, 255, 255, 255];
        let surface = TrackSurface::from_rgba(2, 1, &bytes).unwrap();
        let scaled = surface.resampled(4, 2);
        assert_eq!(scaled.width(), 4);
        assert_eq!(scaled.height(), 2);
        assert_eq!(scaled.sample_pixel(0, 1), Rgb::BLACK);
        assert_eq!(scaled.sample_pixel(1, 0), Rgb::BLACK);
        assert_eq!(scaled.sample_pixel(2, 0), Rgb::WHITE);
        assert_eq!(scaled.sample_pixel(3, 1), Rgb::WHITE);
    }
}
