//! Table detection on synthetic scanned pages.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use unscan::{preprocess, Rect, TableDetector, TableDetectorConfig};

fn fill(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, ink: [u8; 3]) {
    for yy in y..y + h {
        for xx in x..x + w {
            img.put_pixel(xx, yy, Rgb(ink));
        }
    }
}

/// A tinted scan with a 3x4 ruled grid and some text-like blobs.
fn scanned_page() -> DynamicImage {
    let mut img = RgbImage::from_pixel(1000, 700, Rgb([236, 232, 220]));
    let ink = [40, 40, 50];
    // prose above the table
    for word in 0..12 {
        fill(&mut img, 60 + word * 70, 40, 50, 14, ink);
    }
    // grid: 4 columns x 3 rows inside (100,150)-(900,450)
    for row in 0..=3 {
        fill(&mut img, 100, 150 + row * 100, 801, 2, ink);
    }
    for col in 0..=4 {
        fill(&mut img, 100 + col * 200, 150, 2, 301, ink);
    }
    // cell text
    for row in 0..3 {
        for col in 0..4 {
            fill(&mut img, 120 + col * 200, 185 + row * 100, 60, 12, ink);
        }
    }
    DynamicImage::ImageRgb8(img)
}

#[test]
fn test_grid_on_tinted_scan() {
    let page = preprocess(&scanned_page());
    let regions = TableDetector::default().detect(&page);

    assert_eq!(regions.len(), 1);
    let r = &regions[0];
    assert_eq!(r.bounds, Rect::new(100, 150, 802, 302));
    assert!(r.bounds.fits_within(page.width(), page.height()));
    assert_eq!(r.image.dimensions(), (802, 302));
}

#[test]
fn test_every_crop_is_inside_the_page() {
    // boxes touching the right and bottom edges
    let mut img = GrayImage::from_pixel(300, 200, Luma([255]));
    for x in 150..300 {
        img.put_pixel(x, 100, Luma([0]));
        img.put_pixel(x, 199, Luma([0]));
    }
    for y in 100..200 {
        img.put_pixel(150, y, Luma([0]));
        img.put_pixel(299, y, Luma([0]));
    }

    let regions = TableDetector::default().detect(&img);
    assert_eq!(regions.len(), 1);
    for r in &regions {
        assert!(r.bounds.right() <= 300);
        assert!(r.bounds.bottom() <= 200);
        assert_eq!(r.image.dimensions(), (r.bounds.width, r.bounds.height));
    }
}

#[test]
fn test_min_area_is_configurable() {
    let mut img = GrayImage::from_pixel(300, 300, Luma([255]));
    for x in 20..120 {
        for y in 20..30 {
            img.put_pixel(x, y, Luma([0]));
        }
    }
    // (100 - 1) * (10 - 1) = 891
    assert!(TableDetector::default().detect(&img).is_empty());

    let lenient = TableDetector::new(TableDetectorConfig::default().with_min_area(500.0));
    assert_eq!(lenient.detect(&img).len(), 1);
}

#[test]
fn test_short_rules_need_shorter_element() {
    // 60px box edges are below the default 79px effective run
    let mut img = GrayImage::from_pixel(200, 200, Luma([255]));
    for i in 0..60 {
        img.put_pixel(50 + i, 50, Luma([0]));
        img.put_pixel(50 + i, 109, Luma([0]));
        img.put_pixel(50, 50 + i, Luma([0]));
        img.put_pixel(109, 50 + i, Luma([0]));
    }
    assert!(TableDetector::default().detect(&img).is_empty());

    let fine = TableDetector::new(TableDetectorConfig::default().with_line_length(20));
    let regions = fine.detect(&img);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].bounds, Rect::new(50, 50, 60, 60));
}
