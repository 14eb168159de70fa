//! Out-of-flow layout and shared box geometry for the Koala layout engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Absolutely positioned boxes** ([§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width),
//!   [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height))
//!   - Used width and height, re-solved against 'max-*' and then 'min-*'
//!   - Depth-first traversal of each containing block's out-of-flow boxes
//! - **Relative positioning** ([§ 9.4.3](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning))
//! - **Block formatting contexts** ([§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting))
//!   - Vertical stacking of in-flow block-level boxes, no margin collapsing
//! - **Coordinate mapping** along the containing block chain
//! - **Geometry validation**: the box model equalities of
//!   [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth) and
//!   [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
//!
//! # Not Yet Implemented
//!
//! - Inline, flex, grid and table layout
//! - Floats and margin collapsing
//! - Right-to-left direction and vertical writing modes
//! - Sticky positioning
//!
//! # Example
//!
//! ```
//! use app_units::Au;
//! use koala_layout::{
//!     AutoOr, BoxFlags, BoxId, ComputedStyle, LayoutBox, LayoutContext, LayoutSize,
//!     LayoutTree, PositionType,
//! };
//!
//! let mut tree = LayoutTree::new();
//! let mut style = ComputedStyle::positioned(PositionType::Absolute);
//! style.offsets.left = AutoOr::px(0.0);
//! style.offsets.right = AutoOr::px(0.0);
//! let abs = tree
//!     .append_child(BoxId::ROOT, LayoutBox::leaf(style, BoxFlags::block()))
//!     .unwrap();
//!
//! let mut ctx = LayoutContext::new(&tree, LayoutSize::from_px(800.0, 600.0));
//! ctx.layout();
//! assert_eq!(ctx.computed_box(abs).content_box_width(), Au::from_px(800));
//! ```

/// Block formatting context per [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting).
pub mod block;
/// Box geometry records per [CSS Box Model Level 3](https://www.w3.org/TR/css-box-3/).
pub mod box_model;
/// Serializable tree descriptions.
pub mod description;
/// Formatting contexts, out-of-flow traversal, coordinate mapping and validation.
pub mod formatting_context;
/// Used value formulas per [CSS 2.1 § 10](https://www.w3.org/TR/CSS2/visudet.html).
pub mod geometry;
/// Pass-scoped layout state.
pub mod layout_context;
/// Computed style consumed by layout.
pub mod style;
/// The layout box tree per [§ 9.2](https://www.w3.org/TR/CSS2/visuren.html#box-gen).
pub mod tree;
/// Length, percentage and 'auto' values.
pub mod values;

// Re-exports for convenience
pub use block::BlockFormattingContext;
pub use box_model::{
    ComputedBox, Edges, HorizontalEdges, LayoutPoint, LayoutRect, LayoutSize, VerticalEdges,
};
pub use description::{BoxDescription, SizeDescription, TreeDescription};
pub use formatting_context::{Axis, FormattingContext, FormattingState, GeometryViolation};
pub use geometry::{
    CssGeometry, Geometry, HeightAndMargin, HorizontalGeometry, VerticalGeometry, WidthAndMargin,
};
pub use layout_context::{LayoutContext, LayoutOptions};
pub use style::{AutoEdges, BorderWidths, BoxOffsets, ComputedStyle, LengthEdges, PositionType};
pub use tree::{BoxFlags, BoxId, LayoutBox, LayoutTree, TreeError};
pub use values::{AutoOr, LengthPercentage, ValueError};
