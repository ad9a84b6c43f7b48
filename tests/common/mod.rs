//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, GrayImage, Luma};
use unscan::error::{Error, Result};
use unscan::{EngineConfig, PageRenderer, TextRecognizer};

pub const PAGE_WIDTH: u32 = 800;
pub const BOX_HEIGHT: u32 = 120;

/// How one page renders.
#[derive(Debug, Clone)]
pub enum PageSpec {
    /// White page with ruled boxes of the given widths, stacked vertically
    Boxes(Vec<u32>),
    /// Rendering fails
    Broken,
}

/// Renders pages from a per-file script keyed on the input file name.
#[derive(Default)]
pub struct ScriptedRenderer {
    docs: HashMap<String, Option<Vec<PageSpec>>>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc(mut self, name: &str, pages: Vec<PageSpec>) -> Self {
        self.docs.insert(name.to_string(), Some(pages));
        self
    }

    /// A file whose page count cannot be read.
    pub fn unreadable(mut self, name: &str) -> Self {
        self.docs.insert(name.to_string(), None);
        self
    }

    fn pages(&self, pdf: &Path) -> Result<&Vec<PageSpec>> {
        let name = pdf.file_name().unwrap().to_string_lossy().to_string();
        match self.docs.get(&name) {
            Some(Some(pages)) => Ok(pages),
            _ => Err(Error::PdfParse(format!("cannot read {}", name))),
        }
    }
}

impl PageRenderer for ScriptedRenderer {
    fn page_count(&self, pdf: &Path) -> Result<u32> {
        Ok(self.pages(pdf)?.len() as u32)
    }

    fn render_page(&self, pdf: &Path, page: u32) -> Result<DynamicImage> {
        match &self.pages(pdf)?[page as usize - 1] {
            PageSpec::Boxes(widths) => Ok(DynamicImage::ImageLuma8(page_with_boxes(widths))),
            PageSpec::Broken => Err(Error::Render(format!("page {} is broken", page))),
        }
    }
}

/// A white page with 3px outlined boxes, one per width, stacked top to bottom.
pub fn page_with_boxes(widths: &[u32]) -> GrayImage {
    let height = 60 + widths.len() as u32 * (BOX_HEIGHT + 60);
    let mut img = GrayImage::from_pixel(PAGE_WIDTH, height, Luma([255]));
    for (i, w) in widths.iter().enumerate() {
        let y = 40 + i as u32 * (BOX_HEIGHT + 60);
        outline(&mut img, 50, y, *w, BOX_HEIGHT);
    }
    img
}

fn outline(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            let edge = yy < y + 3 || yy >= y + h - 3 || xx < x + 3 || xx >= x + w - 3;
            if edge {
                img.put_pixel(xx, yy, Luma([0]));
            }
        }
    }
}

/// Returns `prose` for full pages and `cell <width>` for regions; fails on
/// the configured region widths.
pub struct ScriptedRecognizer {
    pub prose: String,
    pub fail_widths: HashSet<u32>,
    pub calls: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn new(prose: &str) -> Self {
        Self {
            prose: prose.to_string(),
            fail_widths: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, width: u32) -> Self {
        self.fail_widths.insert(width);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, image: &GrayImage, _config: &EngineConfig) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let width = image.width();
        if width == PAGE_WIDTH {
            return Ok(self.prose.clone());
        }
        if self.fail_widths.contains(&width) {
            return Err(Error::Recognition(format!("cannot read {}px region", width)));
        }
        Ok(format!("cell {}", width))
    }
}
