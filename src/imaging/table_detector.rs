//! Line-based table region detection.
//!
//! A table is anything drawn with long straight rules. The detector
//! thresholds the page, keeps only long horizontal and vertical strokes,
//! and reports the bounding box of every outermost shape those strokes
//! form, provided it encloses enough area.

use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::otsu_level;
use imageproc::point::Point;

use super::morphology::{binarize_inverted, open_lines, union, Orientation};
use super::region::{Rect, TableRegion};

/// Detector tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDetectorConfig {
    /// Structuring element length for line extraction
    pub line_length: u32,

    /// Erosion/dilation repetitions
    pub iterations: u32,

    /// Contours must enclose strictly more than this area
    pub min_area: f64,

    /// Sort regions top-to-bottom, then left-to-right
    pub sort_regions: bool,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            line_length: 40,
            iterations: 2,
            min_area: 1000.0,
            sort_regions: true,
        }
    }
}

impl TableDetectorConfig {
    /// Set the line element length.
    pub fn with_line_length(mut self, length: u32) -> Self {
        self.line_length = length.max(1);
        self
    }

    /// Set the number of opening iterations.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Set the minimum enclosed area.
    pub fn with_min_area(mut self, area: f64) -> Self {
        self.min_area = area;
        self
    }

    /// Keep contour traversal order instead of sorting.
    pub fn unsorted(mut self) -> Self {
        self.sort_regions = false;
        self
    }
}

/// Finds ruled table regions on a preprocessed page.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a detector with the given configuration.
    pub fn new(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &TableDetectorConfig {
        &self.config
    }

    /// Combined horizontal and vertical line mask of a page.
    ///
    /// Returns `None` for empty or uniform images, which have no structure.
    pub fn line_mask(&self, image: &GrayImage) -> Option<GrayImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let (min, max) = image
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        if min == max {
            return None;
        }

        let binary = binarize_inverted(image, otsu_level(image));
        let cfg = &self.config;
        let horizontal = open_lines(&binary, Orientation::Horizontal, cfg.line_length, cfg.iterations);
        let vertical = open_lines(&binary, Orientation::Vertical, cfg.line_length, cfg.iterations);
        Some(union(&horizontal, &vertical))
    }

    /// Detect table regions, cropping each from `image`.
    pub fn detect(&self, image: &GrayImage) -> Vec<TableRegion> {
        let Some(mask) = self.line_mask(image) else {
            log::debug!("no structure on {}x{} page", image.width(), image.height());
            return Vec::new();
        };

        let contours: Vec<Contour<u32>> = find_contours(&mask);
        let (width, height) = image.dimensions();

        let mut regions: Vec<TableRegion> = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .filter_map(|c| {
                let area = contour_area(&c.points);
                if area <= self.config.min_area {
                    return None;
                }
                let bounds = bounding_rect(&c.points)?.clamp_to(width, height);
                if bounds.area() == 0 {
                    return None;
                }
                let crop = imageops::crop_imm(image, bounds.x, bounds.y, bounds.width, bounds.height)
                    .to_image();
                Some(TableRegion {
                    bounds,
                    area,
                    image: crop,
                })
            })
            .collect();

        if self.config.sort_regions {
            regions.sort_by_key(|r| (r.bounds.y, r.bounds.x));
        }

        log::debug!(
            "{} contours, {} table regions on {}x{} page",
            contours.len(),
            regions.len(),
            width,
            height
        );
        regions
    }
}

/// Area enclosed by a closed polygon (shoelace formula).
pub fn contour_area(points: &[Point<u32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    twice.abs() as f64 / 2.0
}

/// Smallest upright rectangle covering every point (inclusive).
fn bounding_rect(points: &[Point<u32>]) -> Option<Rect> {
    let first = points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in points {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some(Rect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn page(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255]))
    }

    fn fill(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(xx, yy, Luma([0]));
            }
        }
    }

    fn outline(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, t: u32) {
        fill(img, x, y, w, t);
        fill(img, x, y + h - t, w, t);
        fill(img, x, y, t, h);
        fill(img, x + w - t, y, t, h);
    }

    #[test]
    fn test_contour_area_square() {
        let pts = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(contour_area(&pts), 100.0);
        assert_eq!(contour_area(&pts[..2]), 0.0);
    }

    #[test]
    fn test_area_threshold_is_strict() {
        let detector = TableDetector::default();

        // (112 - 1) * (10 - 1) = 999
        let mut small = page(200, 100);
        fill(&mut small, 20, 30, 112, 10);
        assert!(detector.detect(&small).is_empty());

        // (92 - 1) * (12 - 1) = 1001
        let mut large = page(200, 100);
        fill(&mut large, 20, 30, 92, 12);
        let regions = detector.detect(&large);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounds, Rect::new(20, 30, 92, 12));
        assert_eq!(regions[0].area, 1001.0);
    }

    #[test]
    fn test_grid_yields_single_region() {
        let mut img = page(400, 300);
        outline(&mut img, 50, 40, 300, 200, 3);
        // interior rules
        fill(&mut img, 50, 140, 300, 3);
        fill(&mut img, 200, 40, 3, 200);
        // cell text stays out of the mask
        fill(&mut img, 70, 60, 12, 8);

        let regions = TableDetector::default().detect(&img);
        assert_eq!(regions.len(), 1);
        let r = &regions[0];
        assert_eq!(r.bounds, Rect::new(50, 40, 300, 200));
        assert_eq!(r.image.dimensions(), (300, 200));
        assert_eq!(r.image.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_regions_fit_and_sort() {
        let mut img = page(500, 500);
        outline(&mut img, 300, 20, 150, 120, 2);
        outline(&mut img, 20, 300, 150, 120, 2);
        outline(&mut img, 20, 20, 150, 120, 2);

        let regions = TableDetector::default().detect(&img);
        assert_eq!(regions.len(), 3);
        let origins: Vec<_> = regions.iter().map(|r| (r.bounds.x, r.bounds.y)).collect();
        assert_eq!(origins, vec![(20, 20), (300, 20), (20, 300)]);
        for r in &regions {
            assert!(r.bounds.fits_within(500, 500));
            assert_eq!(r.image.dimensions(), (r.bounds.width, r.bounds.height));
        }
    }

    #[test]
    fn test_nested_table_reports_outer_only() {
        let mut img = page(400, 400);
        outline(&mut img, 20, 20, 360, 360, 3);
        outline(&mut img, 100, 100, 150, 150, 3);
        let regions = TableDetector::default().detect(&img);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounds, Rect::new(20, 20, 360, 360));
    }

    #[test]
    fn test_uniform_and_empty_images() {
        let detector = TableDetector::default();
        assert!(detector.detect(&page(300, 300)).is_empty());
        assert!(detector.detect(&GrayImage::from_pixel(50, 50, Luma([0]))).is_empty());
        assert!(detector.detect(&GrayImage::new(0, 0)).is_empty());
    }

    #[test]
    fn test_text_only_page_has_no_tables() {
        let mut img = page(300, 200);
        for row in 0..8 {
            for word in 0..10 {
                fill(&mut img, 10 + word * 28, 10 + row * 22, 20, 10);
            }
        }
        assert!(TableDetector::default().detect(&img).is_empty());
    }
}
