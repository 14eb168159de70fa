//! Used width, height, margin and offset formulas.
//!
//! [§ 10 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html)
//!
//! Every function here is stateless: it reads the box tree, the box's style
//! and geometry already stored in the [`LayoutContext`], and returns a
//! candidate solution. Writing the solution back, and choosing between the
//! unconstrained, max-constrained and min-constrained candidates, belongs to
//! the [`FormattingContext`](crate::formatting_context::FormattingContext).
//!
//! Out-of-flow boxes resolve against the content box of their containing
//! block. Only the `ltr` direction is handled.

use app_units::Au;

use crate::box_model::{Edges, HorizontalEdges, LayoutPoint, VerticalEdges};
use crate::formatting_context::{FormattingContext, FormattingState};
use crate::layout_context::LayoutContext;
use crate::tree::BoxId;
use crate::values::{AutoOr, LengthPercentage};

const ZERO: Au = Au(0);

/// [§ 10.3.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
/// "...then the used value of 'width' becomes 300px."
const DEFAULT_REPLACED_WIDTH_PX: i32 = 300;

/// [§ 10.6.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-height)
/// "...the used value of 'height' must be set to ... 150px."
const DEFAULT_REPLACED_HEIGHT_PX: i32 = 150;

/// A used width with the margins that satisfy the width equation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidthAndMargin {
    /// Content box width.
    pub width: Au,
    /// Used margins.
    pub margin: HorizontalEdges,
    /// Margins as computed from style, 'auto' read as zero.
    pub non_computed_margin: HorizontalEdges,
}

/// Horizontal solution for an out-of-flow box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HorizontalGeometry {
    /// Used 'left': distance from the containing block's left content edge
    /// to the box's left margin edge.
    pub left: Au,
    /// Used 'right'.
    pub right: Au,
    /// Width and margins.
    pub width_and_margin: WidthAndMargin,
}

/// A used height with its vertical margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeightAndMargin {
    /// Content box height.
    pub height: Au,
    /// Used margins.
    pub margin: VerticalEdges,
    /// Set when margins collapsed through the box. Never set for
    /// out-of-flow boxes.
    pub collapsed_margin: Option<VerticalEdges>,
}

/// Vertical solution for an out-of-flow box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalGeometry {
    /// Used 'top'.
    pub top: Au,
    /// Used 'bottom'.
    pub bottom: Au,
    /// Height and margins.
    pub height_and_margin: HeightAndMargin,
}

/// The geometry solver consumed by formatting contexts.
///
/// `used_width`/`used_height` overrides the computed size; formatting
/// contexts pass it when re-solving against 'max-*' and 'min-*'.
pub trait Geometry {
    /// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    /// and [§ 10.3.8](https://www.w3.org/TR/CSS2/visudet.html#abs-replaced-width).
    fn out_of_flow_horizontal_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> HorizontalGeometry;

    /// [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
    /// and [§ 10.6.5](https://www.w3.org/TR/CSS2/visudet.html#abs-replaced-height).
    fn out_of_flow_vertical_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
    ) -> VerticalGeometry;

    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    /// and [§ 10.3.4](https://www.w3.org/TR/CSS2/visudet.html#block-replaced-width).
    fn in_flow_width_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> WidthAndMargin;

    /// [§ 10.6.3](https://www.w3.org/TR/CSS2/visudet.html#normal-block).
    ///
    /// `content_height` is the height of the laid out in-flow content, used
    /// when 'height' is 'auto'.
    fn in_flow_height_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
        content_height: Au,
    ) -> HeightAndMargin;

    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    fn in_flow_positioned_offset(&self, ctx: &LayoutContext<'_>, id: BoxId) -> LayoutPoint;

    /// Used border widths.
    fn border(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Edges;

    /// Used padding, or `None` while a percentage has nothing to resolve
    /// against.
    fn padding(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Option<Edges>;

    /// 'max-width', or `None` for 'none'.
    fn computed_max_width(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        containing_block_width: Au,
    ) -> Option<Au> {
        ctx.tree()
            .layout_box(id)
            .style()
            .max_width
            .resolve(containing_block_width)
    }

    /// 'min-width', or `None` when it does not constrain.
    fn computed_min_width(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        containing_block_width: Au,
    ) -> Option<Au> {
        ctx.tree()
            .layout_box(id)
            .style()
            .min_width
            .resolve(containing_block_width)
    }

    /// 'max-height', or `None` for 'none' and for percentages of an
    /// indefinite containing block height.
    fn computed_max_height(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Option<Au> {
        let max_height = ctx.tree().layout_box(id).style().max_height;
        resolve_height(max_height, definite_containing_block_height(ctx, id))
    }

    /// 'min-height', or `None` when it does not constrain.
    fn computed_min_height(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Option<Au> {
        let min_height = ctx.tree().layout_box(id).style().min_height;
        resolve_height(min_height, definite_containing_block_height(ctx, id))
    }
}

/// [§ 10.5](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
///
/// "If the height of the containing block is not specified explicitly ...
/// the value computes to 'auto'."
fn resolve_height(value: AutoOr, containing_block_height: Option<Au>) -> Option<Au> {
    match value {
        AutoOr::Auto => None,
        AutoOr::Length(length) => length.resolve_definite(containing_block_height),
    }
}

fn containing_block(ctx: &LayoutContext<'_>, id: BoxId) -> BoxId {
    ctx.tree().containing_block(id).unwrap_or(BoxId::ROOT)
}

/// Content width of the box's containing block.
#[must_use]
pub fn containing_block_width(ctx: &LayoutContext<'_>, id: BoxId) -> Au {
    ctx.computed_box(containing_block(ctx, id)).content_box_width()
}

/// Content height of the box's containing block.
#[must_use]
pub fn containing_block_height(ctx: &LayoutContext<'_>, id: BoxId) -> Au {
    ctx.computed_box(containing_block(ctx, id)).content_box_height()
}

/// The containing block height percentages can resolve against.
///
/// Containing blocks of out-of-flow boxes are laid out before them, so
/// their height is always known. In flow, the height is only known up front
/// when it is specified.
#[must_use]
pub fn definite_containing_block_height(ctx: &LayoutContext<'_>, id: BoxId) -> Option<Au> {
    if ctx.tree().layout_box(id).is_out_of_flow_positioned() {
        return Some(containing_block_height(ctx, id));
    }
    definite_height(ctx, containing_block(ctx, id))
}

fn definite_height(ctx: &LayoutContext<'_>, id: BoxId) -> Option<Au> {
    let layout_box = ctx.tree().layout_box(id);
    if layout_box.is_initial_containing_block() {
        return Some(ctx.computed_box(id).content_box_height());
    }
    resolve_height(
        layout_box.style().height,
        definite_containing_block_height(ctx, id),
    )
}

/// Split the space left over for two margins.
///
/// Returns `None` when both margins are specified, meaning the equation is
/// over-constrained and the caller drops one of its offsets instead.
fn resolve_auto_margins(
    available: Au,
    start: Option<Au>,
    end: Option<Au>,
    negative_to_end: bool,
) -> Option<(Au, Au)> {
    match (start, end) {
        (None, None) if negative_to_end && available < ZERO => Some((ZERO, available)),
        (None, None) => {
            let start = available / 2;
            Some((start, available - start))
        }
        (None, Some(end)) => Some((available - end, end)),
        (Some(start), None) => Some((start, available - start)),
        (Some(_), Some(_)) => None,
    }
}

/// Geometry following CSS 2.1.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssGeometry;

impl CssGeometry {
    fn horizontal_border_and_padding(ctx: &LayoutContext<'_>, id: BoxId) -> Au {
        let computed_box = ctx.computed_box(id);
        computed_box.border_left()
            + computed_box.padding_left().unwrap_or_default()
            + computed_box.padding_right().unwrap_or_default()
            + computed_box.border_right()
    }

    fn vertical_border_and_padding(ctx: &LayoutContext<'_>, id: BoxId) -> Au {
        let computed_box = ctx.computed_box(id);
        computed_box.border_top()
            + computed_box.padding_top().unwrap_or_default()
            + computed_box.padding_bottom().unwrap_or_default()
            + computed_box.border_bottom()
    }

    /// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// "The static position for 'left' is the distance from the left edge of
    /// the containing block to the left margin edge of a hypothetical box
    /// that would have been the first box of the element if its 'position'
    /// property had been 'static'."
    ///
    /// The hypothetical box sits at the parent's content edge, below the
    /// preceding in-flow sibling. The result is relative to the containing
    /// block's content box.
    fn static_position(ctx: &LayoutContext<'_>, id: BoxId) -> LayoutPoint {
        let tree = ctx.tree();
        let Some(parent) = tree.parent(id) else {
            return LayoutPoint::ZERO;
        };
        let parent_box = ctx.computed_box(parent);
        let previous_sibling = tree
            .children(parent)
            .iter()
            .copied()
            .take_while(|&sibling| sibling != id)
            .filter(|&sibling| tree.layout_box(sibling).is_in_flow())
            .last();
        let y = previous_sibling.map_or_else(
            || parent_box.content_box_top(),
            |sibling| {
                // Relative offsets do not move the boxes that follow.
                let sibling_box = ctx.computed_box(sibling);
                ctx.flow_top_left(sibling).y + sibling_box.height() + sibling_box.margin_bottom()
            },
        );
        let position = LayoutPoint::new(parent_box.content_box_left(), y);

        let containing_block = containing_block(ctx, id);
        let in_containing_block = if parent == containing_block {
            Some(position)
        } else {
            FormattingContext::try_map_coordinate_to_ancestor(
                ctx,
                position,
                parent,
                containing_block,
            )
        };
        let containing_block_box = ctx.computed_box(containing_block);
        in_containing_block.map_or(LayoutPoint::ZERO, |point| {
            LayoutPoint::new(
                point.x - containing_block_box.content_box_left(),
                point.y - containing_block_box.content_box_top(),
            )
        })
    }

    /// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// "...the shrink-to-fit width is: min(max(preferred minimum width,
    /// available width), preferred width)."
    ///
    /// Without inline content there are no line breaking opportunities, so
    /// the preferred minimum width equals the preferred width and the
    /// formula reduces to the preferred width.
    fn shrink_to_fit_width(ctx: &LayoutContext<'_>, id: BoxId) -> Au {
        Self::preferred_content_width(ctx, id)
    }

    fn preferred_content_width(ctx: &LayoutContext<'_>, id: BoxId) -> Au {
        let tree = ctx.tree();
        let layout_box = tree.layout_box(id);
        if layout_box.is_replaced() {
            return Self::replaced_width(ctx, id, None, ZERO);
        }
        tree.in_flow_children(id)
            .map(|child| Self::preferred_outer_width(ctx, child))
            .max()
            .unwrap_or(ZERO)
    }

    /// Preferred width of a box's margin box. Percentages and 'auto' have
    /// nothing to resolve against yet and count as zero or as content.
    fn preferred_outer_width(ctx: &LayoutContext<'_>, id: BoxId) -> Au {
        let style = ctx.tree().layout_box(id).style();
        let fixed = |value: AutoOr| match value {
            AutoOr::Length(length) if !length.is_percentage() => length.resolve(ZERO),
            _ => ZERO,
        };
        let content = match style.width {
            AutoOr::Length(length) if !length.is_percentage() => length.resolve(ZERO),
            _ => Self::preferred_content_width(ctx, id),
        };
        let padding = |value: LengthPercentage| {
            if value.is_percentage() {
                ZERO
            } else {
                value.resolve(ZERO)
            }
        };
        fixed(style.margin.left)
            + Au::from_f32_px(style.border_width.left)
            + padding(style.padding.left)
            + content
            + padding(style.padding.right)
            + Au::from_f32_px(style.border_width.right)
            + fixed(style.margin.right)
    }

    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    fn replaced_width(
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
        containing_block_width: Au,
    ) -> Au {
        let layout_box = ctx.tree().layout_box(id);
        if let Some(width) = used_width.or_else(|| layout_box.style().width.resolve(containing_block_width)) {
            return width;
        }
        let intrinsic = layout_box.intrinsic_size();
        let height = resolve_height(
            layout_box.style().height,
            definite_containing_block_height(ctx, id),
        );
        match (intrinsic, height) {
            // "...if 'width' has a computed value of 'auto', 'height' has some
            // other computed value, and the element does have an intrinsic
            // ratio then the used value of 'width' is: (used height) * (intrinsic ratio)"
            (Some(size), Some(height)) if size.height > ZERO => {
                height.scale_by(size.width.to_f32_px() / size.height.to_f32_px())
            }
            (Some(size), _) => size.width,
            (None, _) => Au::from_px(DEFAULT_REPLACED_WIDTH_PX),
        }
    }

    /// [§ 10.6.2 Inline replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-height)
    ///
    /// Runs after the horizontal pass, so the used width is already stored.
    fn replaced_height(ctx: &LayoutContext<'_>, id: BoxId, used_height: Option<Au>) -> Au {
        let layout_box = ctx.tree().layout_box(id);
        let specified = resolve_height(
            layout_box.style().height,
            definite_containing_block_height(ctx, id),
        );
        if let Some(height) = used_height.or(specified) {
            return height;
        }
        match layout_box.intrinsic_size() {
            Some(size) if !layout_box.style().width.is_auto() && size.width > ZERO => {
                let width = ctx.computed_box(id).content_box_width();
                width.scale_by(size.height.to_f32_px() / size.width.to_f32_px())
            }
            Some(size) => size.height,
            None => Au::from_px(DEFAULT_REPLACED_HEIGHT_PX),
        }
    }

    fn content_height(ctx: &LayoutContext<'_>, id: BoxId) -> Au {
        ctx.formatting_state(id)
            .map_or(ZERO, FormattingState::content_height)
    }

    /// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
    ///
    /// 'left' + 'margin-left' + 'border-left-width' + 'padding-left' + 'width'
    /// + 'padding-right' + 'border-right-width' + 'margin-right' + 'right'
    /// = width of containing block
    fn out_of_flow_non_replaced_horizontal_geometry(
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> HorizontalGeometry {
        let style = ctx.tree().layout_box(id).style();
        let containing_block_width = containing_block_width(ctx, id);
        let border_and_padding = Self::horizontal_border_and_padding(ctx, id);

        let left = style.offsets.left.resolve(containing_block_width);
        let right = style.offsets.right.resolve(containing_block_width);
        let width = used_width.or_else(|| style.width.resolve(containing_block_width));
        let margin_left = style.margin.left.resolve(containing_block_width);
        let margin_right = style.margin.right.resolve(containing_block_width);
        let non_computed_margin = HorizontalEdges::new(
            margin_left.unwrap_or_default(),
            margin_right.unwrap_or_default(),
        );

        // Solve for the one remaining unknown.
        let solve = |known: Au| containing_block_width - known;

        let (left, width, right, margin) = if let (Some(left), Some(width), Some(right)) =
            (left, width, right)
        {
            // "If none of the three is 'auto': If both 'margin-left' and
            // 'margin-right' are 'auto', solve the equation under the extra
            // constraint that the two margins get equal values, unless this
            // would make them negative..."
            let available = solve(left + border_and_padding + width + right);
            match resolve_auto_margins(available, margin_left, margin_right, true) {
                Some((start, end)) => (left, width, right, HorizontalEdges::new(start, end)),
                // "If the values are over-constrained, ignore the value for
                // 'right' and solve for that value."
                None => {
                    let margin = non_computed_margin;
                    let right = solve(left + margin.left + border_and_padding + width + margin.right);
                    (left, width, right, margin)
                }
            }
        } else {
            // "Otherwise, set 'auto' values for 'margin-left' and
            // 'margin-right' to 0, and pick the one of the following six
            // rules that applies."
            let margin = non_computed_margin;
            let fixed = margin.left + border_and_padding + margin.right;
            match (left, width, right) {
                // "If all three of 'left', 'width', and 'right' are 'auto'...
                // set 'left' to the static position and apply rule number
                // three below."
                (None, None, None) => {
                    let left = Self::static_position(ctx, id).x;
                    let width = Self::shrink_to_fit_width(ctx, id);
                    (left, width, solve(left + fixed + width), margin)
                }
                // 1. "'left' and 'width' are 'auto' and 'right' is not
                //    'auto', then the width is shrink-to-fit. Then solve for 'left'"
                (None, None, Some(right)) => {
                    let width = Self::shrink_to_fit_width(ctx, id);
                    (solve(fixed + width + right), width, right, margin)
                }
                // 2. "'left' and 'right' are 'auto' and 'width' is not 'auto',
                //    then ... set 'left' to the static position. Then solve for 'right'"
                (None, Some(width), None) => {
                    let left = Self::static_position(ctx, id).x;
                    (left, width, solve(left + fixed + width), margin)
                }
                // 3. "'width' and 'right' are 'auto' and 'left' is not 'auto',
                //    then the width is shrink-to-fit. Then solve for 'right'"
                (Some(left), None, None) => {
                    let width = Self::shrink_to_fit_width(ctx, id);
                    (left, width, solve(left + fixed + width), margin)
                }
                // 4. "'left' is 'auto', 'width' and 'right' are not 'auto',
                //    then solve for 'left'"
                (None, Some(width), Some(right)) => {
                    (solve(fixed + width + right), width, right, margin)
                }
                // 5. "'width' is 'auto', 'left' and 'right' are not 'auto',
                //    then solve for 'width'"
                (Some(left), None, Some(right)) => {
                    (left, solve(left + fixed + right), right, margin)
                }
                // 6. "'right' is 'auto', 'left' and 'width' are not 'auto',
                //    then solve for 'right'"
                (Some(left), Some(width), _) => {
                    (left, width, solve(left + fixed + width), margin)
                }
            }
        };

        HorizontalGeometry {
            left,
            right,
            width_and_margin: WidthAndMargin {
                width,
                margin,
                non_computed_margin,
            },
        }
    }

    /// [§ 10.3.8 Absolutely positioned, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-replaced-width)
    fn out_of_flow_replaced_horizontal_geometry(
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> HorizontalGeometry {
        let style = ctx.tree().layout_box(id).style();
        let containing_block_width = containing_block_width(ctx, id);
        let border_and_padding = Self::horizontal_border_and_padding(ctx, id);

        // 1. "The used value of 'width' is determined as for inline replaced elements."
        let width = Self::replaced_width(ctx, id, used_width, containing_block_width);
        let left = style.offsets.left.resolve(containing_block_width);
        let right = style.offsets.right.resolve(containing_block_width);
        let margin_left = style.margin.left.resolve(containing_block_width);
        let margin_right = style.margin.right.resolve(containing_block_width);
        let non_computed_margin = HorizontalEdges::new(
            margin_left.unwrap_or_default(),
            margin_right.unwrap_or_default(),
        );
        let solve = |known: Au| containing_block_width - known;

        let (left, right, margin) = match (left, right) {
            // 2. "If both 'left' and 'right' have the value 'auto', then ...
            //    set 'left' to the static position."
            // 3. "If 'left' or 'right' are 'auto', replace any 'auto' on
            //    'margin-left' or 'margin-right' with '0'."
            (None, None) => {
                let left = Self::static_position(ctx, id).x;
                let margin = non_computed_margin;
                let right = solve(left + margin.left + border_and_padding + width + margin.right);
                (left, right, margin)
            }
            // 5. "If at this point there is an 'auto' left, solve the
            //    equation for that value."
            (None, Some(right)) => {
                let margin = non_computed_margin;
                let left = solve(margin.left + border_and_padding + width + margin.right + right);
                (left, right, margin)
            }
            (Some(left), None) => {
                let margin = non_computed_margin;
                let right = solve(left + margin.left + border_and_padding + width + margin.right);
                (left, right, margin)
            }
            // 4. "If at this point both 'margin-left' and 'margin-right' are
            //    still 'auto', solve the equation under the extra constraint
            //    that the two margins must get equal values..."
            (Some(left), Some(right)) => {
                let available = solve(left + border_and_padding + width + right);
                match resolve_auto_margins(available, margin_left, margin_right, true) {
                    Some((start, end)) => (left, right, HorizontalEdges::new(start, end)),
                    // 6. "If at this point the values are over-constrained,
                    //    ignore the value for ... 'right'"
                    None => {
                        let margin = non_computed_margin;
                        let right =
                            solve(left + margin.left + border_and_padding + width + margin.right);
                        (left, right, margin)
                    }
                }
            }
        };

        HorizontalGeometry {
            left,
            right,
            width_and_margin: WidthAndMargin {
                width,
                margin,
                non_computed_margin,
            },
        }
    }

    /// [§ 10.6.4 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
    ///
    /// 'top' + 'margin-top' + 'border-top-width' + 'padding-top' + 'height'
    /// + 'padding-bottom' + 'border-bottom-width' + 'margin-bottom' + 'bottom'
    /// = height of containing block
    fn out_of_flow_non_replaced_vertical_geometry(
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
    ) -> VerticalGeometry {
        let style = ctx.tree().layout_box(id).style();
        let containing_block_width = containing_block_width(ctx, id);
        let containing_block_height = containing_block_height(ctx, id);
        let border_and_padding = Self::vertical_border_and_padding(ctx, id);

        let top = style.offsets.top.resolve(containing_block_height);
        let bottom = style.offsets.bottom.resolve(containing_block_height);
        let height = used_height.or_else(|| style.height.resolve(containing_block_height));
        // Percentages on vertical margins refer to the containing block width.
        let margin_top = style.margin.top.resolve(containing_block_width);
        let margin_bottom = style.margin.bottom.resolve(containing_block_width);
        let computed_margin = VerticalEdges::new(
            margin_top.unwrap_or_default(),
            margin_bottom.unwrap_or_default(),
        );
        let solve = |known: Au| containing_block_height - known;

        let (top, height, bottom, margin) = if let (Some(top), Some(height), Some(bottom)) =
            (top, height, bottom)
        {
            let available = solve(top + border_and_padding + height + bottom);
            match resolve_auto_margins(available, margin_top, margin_bottom, false) {
                Some((start, end)) => (top, height, bottom, VerticalEdges::new(start, end)),
                // "If the values are over-constrained, ignore the value for
                // 'bottom' and solve for that value."
                None => {
                    let margin = computed_margin;
                    let bottom = solve(top + margin.top + border_and_padding + height + margin.bottom);
                    (top, height, bottom, margin)
                }
            }
        } else {
            let margin = computed_margin;
            let fixed = margin.top + border_and_padding + margin.bottom;
            match (top, height, bottom) {
                // "If all three of 'top', 'height', and 'bottom' are auto, set
                // 'top' to the static position and apply rule number three below."
                (None, None, None) => {
                    let top = Self::static_position(ctx, id).y;
                    let height = Self::content_height(ctx, id);
                    (top, height, solve(top + fixed + height), margin)
                }
                // 1. "'top' and 'height' are 'auto' and 'bottom' is not 'auto',
                //    then the height is based on the content per 10.6.7 ...
                //    then solve for 'top'"
                (None, None, Some(bottom)) => {
                    let height = Self::content_height(ctx, id);
                    (solve(fixed + height + bottom), height, bottom, margin)
                }
                // 2. "'top' and 'bottom' are 'auto' and 'height' is not 'auto',
                //    then set 'top' to the static position, then solve for 'bottom'"
                (None, Some(height), None) => {
                    let top = Self::static_position(ctx, id).y;
                    (top, height, solve(top + fixed + height), margin)
                }
                // 3. "'height' and 'bottom' are 'auto' and 'top' is not 'auto',
                //    then the height is based on the content per 10.6.7 ...
                //    then solve for 'bottom'"
                (Some(top), None, None) => {
                    let height = Self::content_height(ctx, id);
                    (top, height, solve(top + fixed + height), margin)
                }
                // 4. "'top' is 'auto', 'height' and 'bottom' are not 'auto',
                //    then solve for 'top'"
                (None, Some(height), Some(bottom)) => {
                    (solve(fixed + height + bottom), height, bottom, margin)
                }
                // 5. "'height' is 'auto', 'top' and 'bottom' are not 'auto',
                //    then 'auto' values for 'margin-top' and 'margin-bottom'
                //    are set to 0 and solve for 'height'"
                (Some(top), None, Some(bottom)) => {
                    (top, solve(top + fixed + bottom), bottom, margin)
                }
                // 6. "'bottom' is 'auto', 'top' and 'height' are not 'auto',
                //    then ... solve for 'bottom'"
                (Some(top), Some(height), _) => {
                    (top, height, solve(top + fixed + height), margin)
                }
            }
        };

        VerticalGeometry {
            top,
            bottom,
            height_and_margin: HeightAndMargin {
                height,
                margin,
                collapsed_margin: None,
            },
        }
    }

    /// [§ 10.6.5 Absolutely positioned, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-replaced-height)
    fn out_of_flow_replaced_vertical_geometry(
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
    ) -> VerticalGeometry {
        let style = ctx.tree().layout_box(id).style();
        let containing_block_width = containing_block_width(ctx, id);
        let containing_block_height = containing_block_height(ctx, id);
        let border_and_padding = Self::vertical_border_and_padding(ctx, id);

        // 1. "The used value of 'height' is determined as for inline replaced elements."
        let height = Self::replaced_height(ctx, id, used_height);
        let top = style.offsets.top.resolve(containing_block_height);
        let bottom = style.offsets.bottom.resolve(containing_block_height);
        let margin_top = style.margin.top.resolve(containing_block_width);
        let margin_bottom = style.margin.bottom.resolve(containing_block_width);
        let computed_margin = VerticalEdges::new(
            margin_top.unwrap_or_default(),
            margin_bottom.unwrap_or_default(),
        );
        let solve = |known: Au| containing_block_height - known;

        let (top, bottom, margin) = match (top, bottom) {
            // 2. "If both 'top' and 'bottom' have the value 'auto', replace
            //    'top' with the element's static position."
            // 3. "If 'bottom' is 'auto', replace any 'auto' on 'margin-top'
            //    or 'margin-bottom' with '0'."
            (None, None) => {
                let top = Self::static_position(ctx, id).y;
                let margin = computed_margin;
                let bottom = solve(top + margin.top + border_and_padding + height + margin.bottom);
                (top, bottom, margin)
            }
            (None, Some(bottom)) => {
                let margin = computed_margin;
                let top = solve(margin.top + border_and_padding + height + margin.bottom + bottom);
                (top, bottom, margin)
            }
            (Some(top), None) => {
                let margin = computed_margin;
                let bottom = solve(top + margin.top + border_and_padding + height + margin.bottom);
                (top, bottom, margin)
            }
            // 4. "If at this point both 'margin-top' and 'margin-bottom' are
            //    still 'auto', solve the equation under the extra constraint
            //    that the two margins must get equal values."
            (Some(top), Some(bottom)) => {
                let available = solve(top + border_and_padding + height + bottom);
                match resolve_auto_margins(available, margin_top, margin_bottom, false) {
                    Some((start, end)) => (top, bottom, VerticalEdges::new(start, end)),
                    // 6. "If at this point the values are over-constrained,
                    //    ignore the value for 'bottom' and solve for that value."
                    None => {
                        let margin = computed_margin;
                        let bottom =
                            solve(top + margin.top + border_and_padding + height + margin.bottom);
                        (top, bottom, margin)
                    }
                }
            }
        };

        VerticalGeometry {
            top,
            bottom,
            height_and_margin: HeightAndMargin {
                height,
                margin,
                collapsed_margin: None,
            },
        }
    }
}

impl Geometry for CssGeometry {
    fn out_of_flow_horizontal_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> HorizontalGeometry {
        if ctx.tree().layout_box(id).is_replaced() {
            Self::out_of_flow_replaced_horizontal_geometry(ctx, id, used_width)
        } else {
            Self::out_of_flow_non_replaced_horizontal_geometry(ctx, id, used_width)
        }
    }

    fn out_of_flow_vertical_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
    ) -> VerticalGeometry {
        if ctx.tree().layout_box(id).is_replaced() {
            Self::out_of_flow_replaced_vertical_geometry(ctx, id, used_height)
        } else {
            Self::out_of_flow_non_replaced_vertical_geometry(ctx, id, used_height)
        }
    }

    /// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
    /// 'padding-right' + 'border-right-width' + 'margin-right' = width of
    /// containing block"
    fn in_flow_width_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> WidthAndMargin {
        let layout_box = ctx.tree().layout_box(id);
        let style = layout_box.style();
        let containing_block_width = containing_block_width(ctx, id);
        let border_and_padding = Self::horizontal_border_and_padding(ctx, id);

        let width = if layout_box.is_replaced() {
            Some(Self::replaced_width(ctx, id, used_width, containing_block_width))
        } else {
            used_width.or_else(|| style.width.resolve(containing_block_width))
        };
        let margin_left = style.margin.left.resolve(containing_block_width);
        let margin_right = style.margin.right.resolve(containing_block_width);
        let non_computed_margin = HorizontalEdges::new(
            margin_left.unwrap_or_default(),
            margin_right.unwrap_or_default(),
        );
        let solve = |known: Au| containing_block_width - known;

        let Some(width) = width else {
            // "If 'width' is set to 'auto', any other 'auto' values become '0'
            // and 'width' follows from the resulting equality."
            let margin = non_computed_margin;
            return WidthAndMargin {
                width: solve(margin.left + border_and_padding + margin.right),
                margin,
                non_computed_margin,
            };
        };

        // "If 'width' is not 'auto' and 'border-left-width' + 'padding-left' +
        // 'width' + 'padding-right' + 'border-right-width' (plus any of
        // 'margin-left' or 'margin-right' that are not 'auto') is larger than
        // the width of the containing block, then any 'auto' values for
        // 'margin-left' or 'margin-right' are, for the following rules,
        // treated as zero."
        let (margin_left, margin_right) =
            if non_computed_margin.sum() + border_and_padding + width > containing_block_width {
                (Some(non_computed_margin.left), Some(non_computed_margin.right))
            } else {
                (margin_left, margin_right)
            };

        let available = solve(border_and_padding + width);
        let margin = match resolve_auto_margins(available, margin_left, margin_right, false) {
            Some((start, end)) => HorizontalEdges::new(start, end),
            // "If all of the above have a computed value other than 'auto', the
            // values are said to be "over-constrained" and one of the used
            // values will have to be different from its computed value. If the
            // 'direction' property of the containing block has the value 'ltr',
            // the specified value of 'margin-right' is ignored."
            None => HorizontalEdges::new(
                non_computed_margin.left,
                available - non_computed_margin.left,
            ),
        };

        WidthAndMargin {
            width,
            margin,
            non_computed_margin,
        }
    }

    /// "If 'margin-top', or 'margin-bottom' are 'auto', their used value is 0.
    /// If 'height' is 'auto', the height depends on ... whether the element
    /// has any block-level children."
    fn in_flow_height_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
        content_height: Au,
    ) -> HeightAndMargin {
        let layout_box = ctx.tree().layout_box(id);
        let style = layout_box.style();
        let containing_block_width = containing_block_width(ctx, id);

        let height = if layout_box.is_replaced() {
            Self::replaced_height(ctx, id, used_height)
        } else {
            used_height
                .or_else(|| resolve_height(style.height, definite_containing_block_height(ctx, id)))
                .unwrap_or(content_height)
        };

        HeightAndMargin {
            height,
            margin: VerticalEdges::new(
                style.margin.top.resolve_or(containing_block_width, ZERO),
                style.margin.bottom.resolve_or(containing_block_width, ZERO),
            ),
            collapsed_margin: None,
        }
    }

    /// "If both 'left' and 'right' are 'auto' (their initial values), the
    /// used values are '0'... If 'left' is 'auto', its used value is minus the
    /// value of 'right'... If neither 'left' nor 'right' is 'auto', the
    /// position is over-constrained, and one of them has to be ignored. If
    /// the 'direction' property of the containing block is 'ltr', the value
    /// of 'left' wins."
    ///
    /// The same rules apply to 'top' and 'bottom', with 'top' winning.
    fn in_flow_positioned_offset(&self, ctx: &LayoutContext<'_>, id: BoxId) -> LayoutPoint {
        let offsets = ctx.tree().layout_box(id).style().offsets;
        let containing_block_width = containing_block_width(ctx, id);
        let containing_block_height = definite_containing_block_height(ctx, id);

        let resolve_pair = |start: Option<Au>, end: Option<Au>| match (start, end) {
            (Some(start), _) => start,
            (None, Some(end)) => -end,
            (None, None) => ZERO,
        };
        LayoutPoint::new(
            resolve_pair(
                offsets.left.resolve(containing_block_width),
                offsets.right.resolve(containing_block_width),
            ),
            resolve_pair(
                resolve_height(offsets.top, containing_block_height),
                resolve_height(offsets.bottom, containing_block_height),
            ),
        )
    }

    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    fn border(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Edges {
        let border = ctx.tree().layout_box(id).style().border_width;
        Edges {
            top: Au::from_f32_px(border.top),
            right: Au::from_f32_px(border.right),
            bottom: Au::from_f32_px(border.bottom),
            left: Au::from_f32_px(border.left),
        }
    }

    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    ///
    /// "The percentage is calculated with respect to the width of the
    /// generated box's containing block, even for 'padding-top' and
    /// 'padding-bottom'."
    fn padding(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Option<Edges> {
        let padding = ctx.tree().layout_box(id).style().padding;
        let containing_block = containing_block(ctx, id);
        let containing_block_width = ctx
            .has_computed_box(containing_block)
            .then(|| ctx.computed_box(containing_block).content_box_width());
        Some(Edges {
            top: padding.top.resolve_definite(containing_block_width)?,
            right: padding.right.resolve_definite(containing_block_width)?,
            bottom: padding.bottom.resolve_definite(containing_block_width)?,
            left: padding.left.resolve_definite(containing_block_width)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: i32) -> Au {
        Au::from_px(value)
    }

    #[test]
    fn test_equal_auto_margins_keep_the_remainder_on_the_end() {
        assert_eq!(
            resolve_auto_margins(Au(101), None, None, false),
            Some((Au(50), Au(51)))
        );
    }

    #[test]
    fn test_negative_equal_margins_go_to_the_end() {
        assert_eq!(
            resolve_auto_margins(px(-20), None, None, true),
            Some((ZERO, px(-20)))
        );
        assert_eq!(
            resolve_auto_margins(px(-20), None, None, false),
            Some((px(-10), px(-10)))
        );
    }

    #[test]
    fn test_single_auto_margin_takes_the_rest() {
        assert_eq!(
            resolve_auto_margins(px(100), None, Some(px(30)), false),
            Some((px(70), px(30)))
        );
        assert_eq!(
            resolve_auto_margins(px(100), Some(px(30)), None, false),
            Some((px(30), px(70)))
        );
        assert_eq!(resolve_auto_margins(px(100), Some(px(1)), Some(px(2)), false), None);
    }

    #[test]
    fn test_percentage_height_needs_a_definite_reference() {
        assert_eq!(resolve_height(AutoOr::percent(50.0), None), None);
        assert_eq!(resolve_height(AutoOr::percent(50.0), Some(px(200))), Some(px(100)));
        assert_eq!(resolve_height(AutoOr::px(20.0), None), Some(px(20)));
        assert_eq!(resolve_height(AutoOr::Auto, Some(px(200))), None);
    }
}
