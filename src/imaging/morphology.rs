//! Binary masks and line-shaped morphological opening.
//!
//! Masks are `GrayImage`s holding 0 (background) or 255 (foreground).

use image::{GrayImage, Luma};

const FOREGROUND: u8 = 255;

/// Line direction for [`open_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Structuring element is `length x 1`
    Horizontal,
    /// Structuring element is `1 x length`
    Vertical,
}

/// Threshold so that dark pixels become foreground.
///
/// Pixels above `level` become 0, everything else 255.
pub fn binarize_inverted(image: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y)[0] > level {
            Luma([0])
        } else {
            Luma([FOREGROUND])
        }
    })
}

/// Run length that survives `iterations` erosions with a line element of
/// `length` pixels.
pub fn effective_run_length(length: u32, iterations: u32) -> u32 {
    iterations.max(1) * length.saturating_sub(1) + 1
}

/// Shortest run kept by [`open_lines`] given which image edges it touches.
///
/// Erosion treats pixels outside the image as foreground, so a run that
/// touches one edge only needs to cover the element's reach on the inner
/// side, and a run spanning the whole line always survives.
pub fn surviving_run_length(min_run: u32, at_start: bool, at_end: bool) -> u32 {
    match (at_start, at_end) {
        (true, true) => 1,
        (true, false) | (false, true) => (min_run - 1) / 2 + 1,
        (false, false) => min_run,
    }
}

/// Morphological opening with a line-shaped structuring element.
///
/// Opening with a straight line keeps exactly the foreground runs along
/// that direction that are at least as long as the (iterated) element, so
/// it is computed directly on runs. Runs touching the image border are
/// judged by [`surviving_run_length`].
pub fn open_lines(mask: &GrayImage, orientation: Orientation, length: u32, iterations: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    let min_run = effective_run_length(length, iterations);
    let mut out = GrayImage::new(width, height);

    let (outer, inner) = match orientation {
        Orientation::Horizontal => (height, width),
        Orientation::Vertical => (width, height),
    };
    let at = |o: u32, i: u32| match orientation {
        Orientation::Horizontal => (i, o),
        Orientation::Vertical => (o, i),
    };

    for o in 0..outer {
        let mut start = None;
        for i in 0..=inner {
            let on = i < inner && {
                let (x, y) = at(o, i);
                mask.get_pixel(x, y)[0] != 0
            };
            match (on, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    if i - s >= surviving_run_length(min_run, s == 0, i == inner) {
                        for k in s..i {
                            let (x, y) = at(o, k);
                            out.put_pixel(x, y, Luma([FOREGROUND]));
                        }
                    }
                    start = None;
                }
                _ => {}
            }
        }
    }

    out
}

/// Pixel-wise OR of two masks of equal size.
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let on = a.get_pixel(x, y)[0] != 0 || b.get_pixel(x, y)[0] != 0;
        Luma([if on { FOREGROUND } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(width: u32, height: u32, on: impl Fn(u32, u32) -> bool) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([if on(x, y) { 255 } else { 0 }]))
    }

    fn count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p[0] != 0).count()
    }

    #[test]
    fn test_binarize_inverted() {
        let mut img = GrayImage::from_pixel(2, 1, Luma([200]));
        img.put_pixel(1, 0, Luma([20]));
        let bin = binarize_inverted(&img, 100);
        assert_eq!(bin.get_pixel(0, 0)[0], 0);
        assert_eq!(bin.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_effective_run_length() {
        assert_eq!(effective_run_length(40, 2), 79);
        assert_eq!(effective_run_length(40, 1), 40);
        assert_eq!(effective_run_length(1, 5), 1);
    }

    #[test]
    fn test_open_keeps_long_horizontal_runs() {
        // 79-pixel run on row 0, 78-pixel run on row 2, both clear of the border
        let mask = mask_with(100, 3, |x, y| {
            (y == 0 && (5..84).contains(&x)) || (y == 2 && (5..83).contains(&x))
        });
        let opened = open_lines(&mask, Orientation::Horizontal, 40, 2);
        assert_eq!(count(&opened), 79);
        assert_eq!(opened.get_pixel(83, 0)[0], 255);
        assert_eq!(opened.get_pixel(5, 2)[0], 0);
    }

    #[test]
    fn test_surviving_run_length() {
        assert_eq!(surviving_run_length(79, false, false), 79);
        assert_eq!(surviving_run_length(79, true, false), 40);
        assert_eq!(surviving_run_length(79, false, true), 40);
        assert_eq!(surviving_run_length(79, true, true), 1);
        assert_eq!(surviving_run_length(1, true, false), 1);
    }

    #[test]
    fn test_runs_touching_the_border_need_half_the_element() {
        // rows: 40 px from the left edge, 39 px from the left edge,
        // 40 px into the right edge, 60 px in the interior
        let mask = mask_with(200, 4, |x, y| match y {
            0 => x < 40,
            1 => x < 39,
            2 => x >= 160,
            _ => (70..130).contains(&x),
        });
        let opened = open_lines(&mask, Orientation::Horizontal, 40, 2);
        assert!((0..40).all(|x| opened.get_pixel(x, 0)[0] == 255));
        assert!((0..39).all(|x| opened.get_pixel(x, 1)[0] == 0));
        assert!((160..200).all(|x| opened.get_pixel(x, 2)[0] == 255));
        assert_eq!(count(&opened), 80);
    }

    #[test]
    fn test_full_line_always_survives() {
        let mask = mask_with(30, 2, |_, y| y == 0);
        let opened = open_lines(&mask, Orientation::Horizontal, 40, 2);
        assert_eq!(count(&opened), 30);
    }

    #[test]
    fn test_open_vertical_ignores_horizontal_lines() {
        let mask = mask_with(100, 100, |x, y| y == 50 || x == 10);
        let opened = open_lines(&mask, Orientation::Vertical, 40, 2);
        assert_eq!(count(&opened), 100);
        assert!((0..100).all(|y| opened.get_pixel(10, y)[0] == 255));
    }

    #[test]
    fn test_open_drops_text_like_blobs() {
        let mask = mask_with(200, 200, |x, y| (x / 10 + y / 10) % 2 == 0);
        let h = open_lines(&mask, Orientation::Horizontal, 40, 2);
        let v = open_lines(&mask, Orientation::Vertical, 40, 2);
        assert_eq!(count(&union(&h, &v)), 0);
    }

    #[test]
    fn test_union() {
        let a = mask_with(4, 1, |x, _| x == 0);
        let b = mask_with(4, 1, |x, _| x == 3);
        let u = union(&a, &b);
        assert_eq!(count(&u), 2);
    }
}
