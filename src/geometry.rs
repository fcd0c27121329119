//! Geometric primitives for page layout: bounding boxes and page-relative
//! coordinates.
//!
//! Boxes use the top-left origin convention of ALTO (`HPOS`/`VPOS` grow right
//! and down). All types are small copyable values; transformations return new
//! values rather than mutating.

/// An axis-aligned rectangle on a page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The zero-sized box, used as the identity for [`BoundingBox::include`].
pub const EMPTY_BOUNDING_BOX: BoundingBox = BoundingBox {
    x: 0.0,
    y: 0.0,
    width: 0.0,
    height: 0.0,
};

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box with zero width or height contains nothing and is ignored when
    /// merging.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// The smallest box containing both `self` and `other`.
    ///
    /// Empty boxes act as the identity: merging with an empty box returns the
    /// other box unchanged.
    pub fn include(self, other: BoundingBox) -> BoundingBox {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let width = (self.x + self.width).max(other.x + other.width) - x;
        let height = (self.y + self.height).max(other.y + other.height) - y;
        BoundingBox::new(x, y, width, height)
    }
}

/// Merge a sequence of bounding boxes into their union.
///
/// Returns [`EMPTY_BOUNDING_BOX`] for an empty sequence.
pub fn merge_bounding_boxes(boxes: impl IntoIterator<Item = BoundingBox>) -> BoundingBox {
    boxes
        .into_iter()
        .fold(EMPTY_BOUNDING_BOX, BoundingBox::include)
}

/// A token's bounding box together with the 1-based page it appears on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCoordinates {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub page_number: u32,
}

impl PageCoordinates {
    pub fn new(x: f64, y: f64, width: f64, height: f64, page_number: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            page_number,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    pub fn with_bounding_box(&self, bounding_box: BoundingBox) -> PageCoordinates {
        PageCoordinates::new(
            bounding_box.x,
            bounding_box.y,
            bounding_box.width,
            bounding_box.height,
            self.page_number,
        )
    }

    /// Coordinates of a sub-span of the text originally covered by this box.
    ///
    /// The horizontal extent is partitioned proportionally to character
    /// offsets: a sub-text starting at `char_offset` of `total_len` characters
    /// starts at `x + width * char_offset / total_len` and covers
    /// `width * len / total_len`. The vertical extent and page are unchanged.
    pub fn relative(&self, char_offset: usize, len: usize, total_len: usize) -> PageCoordinates {
        PageCoordinates::new(
            self.x + self.width * char_offset as f64 / total_len as f64,
            self.y,
            self.width * len as f64 / total_len as f64,
            self.height,
            self.page_number,
        )
    }
}
