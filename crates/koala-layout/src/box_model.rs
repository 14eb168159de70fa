//! CSS Box Model types.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//!
//! All lengths are [`Au`] (1/60 of a CSS pixel), so the box-model equalities
//! checked after layout hold exactly.

use std::ops::{Add, Sub};

use app_units::Au;

/// A point in some box's coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LayoutPoint {
    /// Horizontal coordinate.
    pub x: Au,
    /// Vertical coordinate.
    pub y: Au,
}

impl LayoutPoint {
    /// The origin.
    pub const ZERO: Self = Self { x: Au(0), y: Au(0) };

    /// Create a point.
    #[must_use]
    pub const fn new(x: Au, y: Au) -> Self {
        Self { x, y }
    }

    /// Create a point from CSS pixels.
    #[must_use]
    pub fn from_px(x: f32, y: f32) -> Self {
        Self::new(Au::from_f32_px(x), Au::from_f32_px(y))
    }

    /// Translate this point by `offset`.
    pub fn move_by(&mut self, offset: Self) {
        self.x += offset.x;
        self.y += offset.y;
    }
}

impl Add for LayoutPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for LayoutPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width and a height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LayoutSize {
    /// Horizontal extent.
    pub width: Au,
    /// Vertical extent.
    pub height: Au,
}

impl LayoutSize {
    /// Create a size.
    #[must_use]
    pub const fn new(width: Au, height: Au) -> Self {
        Self { width, height }
    }

    /// Create a size from CSS pixels.
    #[must_use]
    pub fn from_px(width: f32, height: f32) -> Self {
        Self::new(Au::from_f32_px(width), Au::from_f32_px(height))
    }
}

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LayoutRect {
    /// Horizontal position of the top-left corner.
    pub x: Au,
    /// Vertical position of the top-left corner.
    pub y: Au,
    /// Width of the rectangle.
    pub width: Au,
    /// Height of the rectangle.
    pub height: Au,
}

impl LayoutRect {
    /// The right edge.
    #[must_use]
    pub fn right(&self) -> Au {
        self.x + self.width
    }

    /// The bottom edge.
    #[must_use]
    pub fn bottom(&self) -> Au {
        self.y + self.height
    }
}

/// Edge sizes for padding, border, or margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Edges {
    /// Top edge size.
    pub top: Au,
    /// Right edge size.
    pub right: Au,
    /// Bottom edge size.
    pub bottom: Au,
    /// Left edge size.
    pub left: Au,
}

impl Edges {
    /// All four edges zero.
    pub const ZERO: Self = Self {
        top: Au(0),
        right: Au(0),
        bottom: Au(0),
        left: Au(0),
    };

    /// The left and right edges.
    #[must_use]
    pub const fn horizontal(&self) -> HorizontalEdges {
        HorizontalEdges {
            left: self.left,
            right: self.right,
        }
    }

    /// The top and bottom edges.
    #[must_use]
    pub const fn vertical(&self) -> VerticalEdges {
        VerticalEdges {
            top: self.top,
            bottom: self.bottom,
        }
    }
}

/// The left and right values of an edge record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HorizontalEdges {
    /// Left edge.
    pub left: Au,
    /// Right edge.
    pub right: Au,
}

impl HorizontalEdges {
    /// Create a horizontal edge pair.
    #[must_use]
    pub const fn new(left: Au, right: Au) -> Self {
        Self { left, right }
    }

    /// `left + right`.
    #[must_use]
    pub fn sum(&self) -> Au {
        self.left + self.right
    }
}

/// The top and bottom values of an edge record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VerticalEdges {
    /// Top edge.
    pub top: Au,
    /// Bottom edge.
    pub bottom: Au,
}

impl VerticalEdges {
    /// Create a vertical edge pair.
    #[must_use]
    pub const fn new(top: Au, bottom: Au) -> Self {
        Self { top, bottom }
    }

    /// `top + bottom`.
    #[must_use]
    pub fn sum(&self) -> Au {
        self.top + self.bottom
    }
}

/// The resolved geometry of one box for one layout pass.
///
/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
///
/// The top-left is the border box corner, expressed relative to the border
/// box corner of the containing block. Border and padding are written first
/// because the width and height formulas read them. Padding stays `None`
/// while a percentage cannot be resolved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedBox {
    top_left: LayoutPoint,
    content_width: Au,
    content_height: Au,
    margin: Edges,
    horizontal_non_computed_margin: HorizontalEdges,
    vertical_non_collapsed_margin: VerticalEdges,
    border: Edges,
    padding: Option<Edges>,
    box_offsets: Edges,
}

impl ComputedBox {
    /// A box that has not been laid out: zero sized at the origin.
    pub const EMPTY: Self = Self {
        top_left: LayoutPoint::ZERO,
        content_width: Au(0),
        content_height: Au(0),
        margin: Edges::ZERO,
        horizontal_non_computed_margin: HorizontalEdges {
            left: Au(0),
            right: Au(0),
        },
        vertical_non_collapsed_margin: VerticalEdges {
            top: Au(0),
            bottom: Au(0),
        },
        border: Edges::ZERO,
        padding: None,
        box_offsets: Edges::ZERO,
    };

    /// Border box corner relative to the containing block's border box corner.
    #[must_use]
    pub const fn top_left(&self) -> LayoutPoint {
        self.top_left
    }

    /// Horizontal position of the border box.
    #[must_use]
    pub const fn left(&self) -> Au {
        self.top_left.x
    }

    /// Vertical position of the border box.
    #[must_use]
    pub const fn top(&self) -> Au {
        self.top_left.y
    }

    /// Move the border box corner.
    pub const fn set_top_left(&mut self, top_left: LayoutPoint) {
        self.top_left = top_left;
    }

    /// Set the horizontal position of the border box.
    pub const fn set_left(&mut self, left: Au) {
        self.top_left.x = left;
    }

    /// Set the vertical position of the border box.
    pub const fn set_top(&mut self, top: Au) {
        self.top_left.y = top;
    }

    /// Shift the box without changing its size.
    pub fn move_by(&mut self, offset: LayoutPoint) {
        self.top_left.move_by(offset);
    }

    /// Width of the content box.
    #[must_use]
    pub const fn content_box_width(&self) -> Au {
        self.content_width
    }

    /// Height of the content box.
    #[must_use]
    pub const fn content_box_height(&self) -> Au {
        self.content_height
    }

    /// Set the width of the content box.
    pub const fn set_content_box_width(&mut self, width: Au) {
        self.content_width = width;
    }

    /// Set the height of the content box.
    pub const fn set_content_box_height(&mut self, height: Au) {
        self.content_height = height;
    }

    /// All four used margins.
    #[must_use]
    pub const fn margin(&self) -> Edges {
        self.margin
    }

    /// Used top margin.
    #[must_use]
    pub const fn margin_top(&self) -> Au {
        self.margin.top
    }

    /// Used right margin.
    #[must_use]
    pub const fn margin_right(&self) -> Au {
        self.margin.right
    }

    /// Used bottom margin.
    #[must_use]
    pub const fn margin_bottom(&self) -> Au {
        self.margin.bottom
    }

    /// Used left margin.
    #[must_use]
    pub const fn margin_left(&self) -> Au {
        self.margin.left
    }

    /// Set the used left and right margins.
    pub const fn set_horizontal_margin(&mut self, margin: HorizontalEdges) {
        self.margin.left = margin.left;
        self.margin.right = margin.right;
    }

    /// Set the used top and bottom margins.
    pub const fn set_vertical_margin(&mut self, margin: VerticalEdges) {
        self.margin.top = margin.top;
        self.margin.bottom = margin.bottom;
    }

    /// The horizontal margins as computed, before the width equation
    /// adjusted them. Relative positioning and static-position lookups read
    /// these instead of the used margins.
    #[must_use]
    pub const fn horizontal_non_computed_margin(&self) -> HorizontalEdges {
        self.horizontal_non_computed_margin
    }

    /// Record the horizontal margins as computed.
    pub const fn set_horizontal_non_computed_margin(&mut self, margin: HorizontalEdges) {
        self.horizontal_non_computed_margin = margin;
    }

    /// The vertical margins before any collapsing.
    #[must_use]
    pub const fn vertical_non_collapsed_margin(&self) -> VerticalEdges {
        self.vertical_non_collapsed_margin
    }

    /// Record the vertical margins before any collapsing.
    pub const fn set_vertical_non_collapsed_margin(&mut self, margin: VerticalEdges) {
        self.vertical_non_collapsed_margin = margin;
    }

    /// Used border widths.
    #[must_use]
    pub const fn border(&self) -> Edges {
        self.border
    }

    /// Used top border width.
    #[must_use]
    pub const fn border_top(&self) -> Au {
        self.border.top
    }

    /// Used right border width.
    #[must_use]
    pub const fn border_right(&self) -> Au {
        self.border.right
    }

    /// Used bottom border width.
    #[must_use]
    pub const fn border_bottom(&self) -> Au {
        self.border.bottom
    }

    /// Used left border width.
    #[must_use]
    pub const fn border_left(&self) -> Au {
        self.border.left
    }

    /// Set the used border widths.
    pub const fn set_border(&mut self, border: Edges) {
        self.border = border;
    }

    /// Used padding, if it could be resolved.
    #[must_use]
    pub const fn padding(&self) -> Option<Edges> {
        self.padding
    }

    /// Used top padding, if resolved.
    #[must_use]
    pub fn padding_top(&self) -> Option<Au> {
        self.padding.map(|padding| padding.top)
    }

    /// Used right padding, if resolved.
    #[must_use]
    pub fn padding_right(&self) -> Option<Au> {
        self.padding.map(|padding| padding.right)
    }

    /// Used bottom padding, if resolved.
    #[must_use]
    pub fn padding_bottom(&self) -> Option<Au> {
        self.padding.map(|padding| padding.bottom)
    }

    /// Used left padding, if resolved.
    #[must_use]
    pub fn padding_left(&self) -> Option<Au> {
        self.padding.map(|padding| padding.left)
    }

    /// Set the used padding (`None` while indeterminate).
    pub const fn set_padding(&mut self, padding: Option<Edges>) {
        self.padding = padding;
    }

    /// Used 'left', 'right', 'top' and 'bottom' of an out-of-flow box.
    /// Zero for boxes in normal flow.
    #[must_use]
    pub const fn box_offsets(&self) -> Edges {
        self.box_offsets
    }

    /// Record the used 'left' and 'right'.
    pub const fn set_horizontal_box_offsets(&mut self, offsets: HorizontalEdges) {
        self.box_offsets.left = offsets.left;
        self.box_offsets.right = offsets.right;
    }

    /// Record the used 'top' and 'bottom'.
    pub const fn set_vertical_box_offsets(&mut self, offsets: VerticalEdges) {
        self.box_offsets.top = offsets.top;
        self.box_offsets.bottom = offsets.bottom;
    }

    fn padding_or_zero(&self) -> Edges {
        self.padding.unwrap_or(Edges::ZERO)
    }

    /// Offset of the content box corner from the border box corner, along x.
    #[must_use]
    pub fn content_box_left(&self) -> Au {
        self.border.left + self.padding_or_zero().left
    }

    /// Offset of the content box corner from the border box corner, along y.
    #[must_use]
    pub fn content_box_top(&self) -> Au {
        self.border.top + self.padding_or_zero().top
    }

    /// Width of the border box.
    #[must_use]
    pub fn width(&self) -> Au {
        let padding = self.padding_or_zero();
        self.border.left + padding.left + self.content_width + padding.right + self.border.right
    }

    /// Height of the border box.
    #[must_use]
    pub fn height(&self) -> Au {
        let padding = self.padding_or_zero();
        self.border.top + padding.top + self.content_height + padding.bottom + self.border.bottom
    }

    // ┌─────────────────────────────────────────┐
    // │              margin-top                 │
    // │   ┌─────────────────────────────────┐   │
    // │   │          border-top             │   │
    // │   │   ┌─────────────────────────┐   │   │
    // │   │   │      padding-top        │   │   │
    // │   │   │   ┌─────────────────┐   │   │   │
    // │ m │ b │ p │     CONTENT     │ p │ b │ m │
    // │   │   │   └─────────────────┘   │   │   │
    // │   │   │      padding-bottom     │   │   │
    // │   │   └─────────────────────────┘   │   │
    // │   │          border-bottom          │   │
    // │   └─────────────────────────────────┘   │
    // │              margin-bottom              │
    // └─────────────────────────────────────────┘
    //
    // Every rect below is in the containing block's coordinate space.

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    ///
    /// "The border box contains content, padding, and border areas."
    #[must_use]
    pub fn border_box(&self) -> LayoutRect {
        LayoutRect {
            x: self.left(),
            y: self.top(),
            width: self.width(),
            height: self.height(),
        }
    }

    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    ///
    /// "The padding box contains both the content and padding areas."
    #[must_use]
    pub fn padding_box(&self) -> LayoutRect {
        let border_box = self.border_box();
        LayoutRect {
            x: border_box.x + self.border.left,
            y: border_box.y + self.border.top,
            width: border_box.width - self.border.left - self.border.right,
            height: border_box.height - self.border.top - self.border.bottom,
        }
    }

    /// "The content box contains the actual content of the element."
    #[must_use]
    pub fn content_box(&self) -> LayoutRect {
        LayoutRect {
            x: self.left() + self.content_box_left(),
            y: self.top() + self.content_box_top(),
            width: self.content_width,
            height: self.content_height,
        }
    }

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn margin_box(&self) -> LayoutRect {
        let border_box = self.border_box();
        LayoutRect {
            x: border_box.x - self.margin.left,
            y: border_box.y - self.margin.top,
            width: self.margin.left + border_box.width + self.margin.right,
            height: self.margin.top + border_box.height + self.margin.bottom,
        }
    }
}
