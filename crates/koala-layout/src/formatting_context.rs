//! Formatting contexts and the geometry they share.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! "Boxes in the normal flow belong to a formatting context ... Block-level
//! boxes participate in a block formatting context."
//!
//! A [`FormattingContext`] is a handle on the box that roots it. Whatever a
//! pass learns lives in the [`LayoutContext`], so the handle is `Copy` and
//! never outlives the tree it points into.
//!
//! Beyond running its own layout, every formatting context knows how to:
//! - resolve the used geometry of out-of-flow boxes, applying 'max-*' and
//!   then 'min-*' ([§ 10.4](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths),
//!   [§ 10.7](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights));
//! - lay out the out-of-flow descendants of a containing block, depth first;
//! - apply relative offsets after normal flow placement;
//! - map positions up the containing block chain;
//! - check the box model equalities once layout is done.

use app_units::Au;
use koala_common::warning::warn_once;
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, debug_span};

use crate::block::BlockFormattingContext;
use crate::box_model::{ComputedBox, HorizontalEdges, LayoutPoint, VerticalEdges};
use crate::geometry::containing_block_width;
use crate::layout_context::LayoutContext;
use crate::tree::{BoxId, LayoutTree};

const COMPONENT: &str = "Layout";

/// Transient per-root state of one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattingState {
    content_height: Au,
}

impl FormattingState {
    /// [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    ///
    /// Distance from the root's top content edge to the bottom margin edge
    /// of its last in-flow child, before relative offsets.
    #[must_use]
    pub const fn content_height(&self) -> Au {
        self.content_height
    }

    /// Record the content height.
    pub const fn set_content_height(&mut self, content_height: Au) {
        self.content_height = content_height;
    }
}

/// Which box model equality failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    /// The width equation.
    Horizontal,
    /// The height equation.
    Vertical,
}

/// A box whose resolved geometry does not add up to its containing block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{label}: {axis} sum is {actual_px}px but the containing block is {expected_px}px",
    actual_px = .actual.to_f32_px(),
    expected_px = .expected.to_f32_px()
)]
pub struct GeometryViolation {
    /// Root of the formatting context that owns the box.
    pub formatting_context_root: BoxId,
    /// The offending box.
    pub box_id: BoxId,
    /// Human readable label of the box.
    pub label: String,
    /// Which equation failed.
    pub axis: Axis,
    /// Containing block content width or height.
    pub expected: Au,
    /// Sum of the box's used values.
    pub actual: Au,
}

/// Solve without constraints, then against 'max-*', then against 'min-*'.
///
/// A later candidate replaces the working one only if it moves the extent
/// in its direction, so min wins when min > max.
fn apply_min_max<G>(
    compute: impl Fn(Option<Au>) -> G,
    extent: impl Fn(&G) -> Au,
    max: Option<Au>,
    min: Option<Au>,
) -> G {
    let mut geometry = compute(None);

    if let Some(max) = max {
        let max_geometry = compute(Some(max));
        if extent(&geometry) > extent(&max_geometry) {
            geometry = max_geometry;
        }
    }

    if let Some(min) = min {
        let min_geometry = compute(Some(min));
        if extent(&geometry) < extent(&min_geometry) {
            geometry = min_geometry;
        }
    }

    geometry
}

fn report_unreachable_ancestor(tree: &LayoutTree, from: BoxId, ancestor: BoxId) {
    warn_once(
        COMPONENT,
        &format!(
            "{} is not on the containing block chain of {}",
            tree.label(ancestor),
            tree.label(from)
        ),
    );
}

/// A formatting context, identified by its root box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormattingContext {
    root: BoxId,
}

impl FormattingContext {
    /// Bind a formatting context to `root`.
    ///
    /// Use [`LayoutContext::formatting_context`] to share one instance per
    /// root within a pass.
    #[must_use]
    pub const fn new(root: BoxId) -> Self {
        Self { root }
    }

    /// The box that establishes this formatting context.
    #[must_use]
    pub const fn root(&self) -> BoxId {
        self.root
    }

    /// Lay out the in-flow subtree of the root.
    ///
    /// The root's own geometry and its out-of-flow descendants are left to
    /// whoever owns the root: the parent formatting context or the
    /// out-of-flow traversal.
    pub fn layout(&self, ctx: &mut LayoutContext<'_>, state: &mut FormattingState) {
        let _span = debug_span!(target: "koala_layout", "formatting_context", root = %self.root).entered();
        BlockFormattingContext::new(*self).layout(ctx, state);
    }

    /// Store the used border and padding of a box. Runs before any width or
    /// height computation for the same box, since those formulas read them.
    pub fn compute_border_and_padding(&self, ctx: &mut LayoutContext<'_>, id: BoxId) {
        let geometry = ctx.geometry();
        let border = geometry.border(ctx, id);
        let padding = geometry.padding(ctx, id);

        let computed_box = ctx.computed_box_mut(id);
        computed_box.set_border(border);
        computed_box.set_padding(padding);
    }

    /// Resolve left, width and horizontal margins of an out-of-flow box.
    ///
    /// The containing block's content width must already be known.
    pub fn compute_out_of_flow_horizontal_geometry(&self, ctx: &mut LayoutContext<'_>, id: BoxId) {
        let horizontal = {
            let ctx: &LayoutContext<'_> = ctx;
            let geometry = ctx.geometry();
            let containing_block_width = containing_block_width(ctx, id);
            apply_min_max(
                |used_width| geometry.out_of_flow_horizontal_geometry(ctx, id, used_width),
                |candidate| candidate.width_and_margin.width,
                geometry.computed_max_width(ctx, id, containing_block_width),
                geometry.computed_min_width(ctx, id, containing_block_width),
            )
        };
        let content_left = Self::containing_block_box(ctx, id).content_box_left();
        let width_and_margin = horizontal.width_and_margin;

        let computed_box = ctx.computed_box_mut(id);
        computed_box.set_left(content_left + horizontal.left + width_and_margin.margin.left);
        computed_box.set_content_box_width(width_and_margin.width);
        computed_box.set_horizontal_margin(width_and_margin.margin);
        computed_box.set_horizontal_non_computed_margin(width_and_margin.non_computed_margin);
        computed_box
            .set_horizontal_box_offsets(HorizontalEdges::new(horizontal.left, horizontal.right));
    }

    /// Resolve top, height and vertical margins of an out-of-flow box.
    ///
    /// Runs after the box's own formatting context has laid out its
    /// content, since an 'auto' height depends on it.
    pub fn compute_out_of_flow_vertical_geometry(&self, ctx: &mut LayoutContext<'_>, id: BoxId) {
        let vertical = {
            let ctx: &LayoutContext<'_> = ctx;
            let geometry = ctx.geometry();
            apply_min_max(
                |used_height| geometry.out_of_flow_vertical_geometry(ctx, id, used_height),
                |candidate| candidate.height_and_margin.height,
                geometry.computed_max_height(ctx, id),
                geometry.computed_min_height(ctx, id),
            )
        };
        let content_top = Self::containing_block_box(ctx, id).content_box_top();
        let height_and_margin = vertical.height_and_margin;

        // Margins of absolutely positioned boxes do not collapse.
        debug_assert!(
            height_and_margin.collapsed_margin.is_none(),
            "out-of-flow box {} produced a collapsed margin",
            ctx.tree().label(id)
        );
        if height_and_margin.collapsed_margin.is_some() {
            warn_once(
                COMPONENT,
                &format!(
                    "out-of-flow box {} produced a collapsed margin",
                    ctx.tree().label(id)
                ),
            );
        }

        let computed_box = ctx.computed_box_mut(id);
        computed_box.set_top(content_top + vertical.top + height_and_margin.margin.top);
        computed_box.set_content_box_height(height_and_margin.height);
        computed_box.set_vertical_margin(height_and_margin.margin);
        computed_box.set_vertical_non_collapsed_margin(height_and_margin.margin);
        computed_box.set_vertical_box_offsets(VerticalEdges::new(vertical.top, vertical.bottom));
    }

    /// Resolve width and horizontal margins of an in-flow block-level box.
    /// The caller positions the box.
    pub fn compute_in_flow_width_and_margin(&self, ctx: &mut LayoutContext<'_>, id: BoxId) {
        let width_and_margin = {
            let ctx: &LayoutContext<'_> = ctx;
            let geometry = ctx.geometry();
            let containing_block_width = containing_block_width(ctx, id);
            apply_min_max(
                |used_width| geometry.in_flow_width_and_margin(ctx, id, used_width),
                |candidate| candidate.width,
                geometry.computed_max_width(ctx, id, containing_block_width),
                geometry.computed_min_width(ctx, id, containing_block_width),
            )
        };

        let computed_box = ctx.computed_box_mut(id);
        computed_box.set_content_box_width(width_and_margin.width);
        computed_box.set_horizontal_margin(width_and_margin.margin);
        computed_box.set_horizontal_non_computed_margin(width_and_margin.non_computed_margin);
    }

    /// Resolve height and vertical margins of an in-flow block-level box
    /// whose content is laid out. The caller positions the box.
    pub fn compute_in_flow_height_and_margin(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        content_height: Au,
    ) {
        let height_and_margin = {
            let ctx: &LayoutContext<'_> = ctx;
            let geometry = ctx.geometry();
            apply_min_max(
                |used_height| {
                    geometry.in_flow_height_and_margin(ctx, id, used_height, content_height)
                },
                |candidate| candidate.height,
                geometry.computed_max_height(ctx, id),
                geometry.computed_min_height(ctx, id),
            )
        };

        let computed_box = ctx.computed_box_mut(id);
        computed_box.set_content_box_height(height_and_margin.height);
        computed_box.set_vertical_margin(height_and_margin.margin);
        computed_box.set_vertical_non_collapsed_margin(
            height_and_margin
                .collapsed_margin
                .unwrap_or(height_and_margin.margin),
        );
    }

    /// Shift a relatively positioned box from its normal flow position.
    ///
    /// The flow position is kept: later boxes, including the static position
    /// of out-of-flow siblings, are placed as if the box had not moved.
    pub fn compute_in_flow_positioned_position(&self, ctx: &mut LayoutContext<'_>, id: BoxId) {
        let offset = ctx.geometry().in_flow_positioned_offset(ctx, id);
        let flow_top_left = ctx.computed_box(id).top_left();
        ctx.record_flow_top_left(id, flow_top_left);
        ctx.computed_box_mut(id).move_by(offset);
    }

    /// Apply relative offsets to the in-flow positioned children of
    /// `container`.
    ///
    /// A container that roots a nested formatting context is skipped: that
    /// context places its own children, and doing it here again would
    /// offset them twice.
    pub fn place_in_flow_positioned_children(&self, ctx: &mut LayoutContext<'_>, container: BoxId) {
        let tree = ctx.tree();
        if tree.layout_box(container).establishes_formatting_context() && container != self.root {
            return;
        }

        debug!(target: "koala_layout", container = %container, root = %self.root, "Start: move in-flow positioned children");
        for &child in tree.children(container) {
            if tree.layout_box(child).is_in_flow_positioned() {
                self.compute_in_flow_positioned_position(ctx, child);
            }
        }
        debug!(target: "koala_layout", container = %container, root = %self.root, "End: move in-flow positioned children");
    }

    /// Lay out every out-of-flow box whose containing block is `id`, then
    /// the out-of-flow boxes those contain.
    ///
    /// Boxes are visited in insertion order and each one's own out-of-flow
    /// descendants are finished before the next sibling starts. Containing
    /// blocks are therefore always sized before the boxes inside them.
    pub fn layout_out_of_flow_descendants(&self, ctx: &mut LayoutContext<'_>, id: BoxId) {
        let tree = ctx.tree();
        let layout_box = tree.layout_box(id);
        // The initial containing block is a containing block by definition.
        if !layout_box.is_positioned() && !layout_box.is_initial_containing_block() {
            return;
        }
        if !layout_box.is_container() {
            return;
        }
        let descendants = tree.out_of_flow_descendants(id);
        if descendants.is_empty() {
            return;
        }

        let _span = debug_span!(target: "koala_layout", "out_of_flow", container = %id).entered();
        debug!(target: "koala_layout", container = %id, root = %self.root, "Start: layout out-of-flow descendants");

        for &descendant in descendants {
            debug_assert!(
                tree.layout_box(descendant).establishes_formatting_context(),
                "out-of-flow box {} must establish a formatting context",
                tree.label(descendant)
            );

            self.compute_border_and_padding(ctx, descendant);
            self.compute_out_of_flow_horizontal_geometry(ctx, descendant);

            let formatting_context = ctx.formatting_context(descendant);
            ctx.with_formatting_state(descendant, |ctx, state| {
                formatting_context.layout(ctx, state);
            });

            self.compute_out_of_flow_vertical_geometry(ctx, descendant);
            self.layout_out_of_flow_descendants(ctx, descendant);
        }

        debug!(target: "koala_layout", container = %id, root = %self.root, "End: layout out-of-flow descendants");
    }

    /// The geometry of `id` with its top-left expressed in `ancestor`'s
    /// coordinate space. The stored geometry is not touched.
    #[must_use]
    pub fn map_box_to_ancestor(ctx: &LayoutContext<'_>, id: BoxId, ancestor: BoxId) -> ComputedBox {
        let mut mapped = ctx.computed_box(id).clone();
        mapped.set_top_left(Self::map_top_left_to_ancestor(ctx, id, ancestor));
        mapped
    }

    /// The top-left of `id` in `ancestor`'s coordinate space.
    ///
    /// `ancestor` must be on the containing block chain of `id`. Debug builds
    /// assert this; release builds return the unmapped top-left.
    #[must_use]
    pub fn map_top_left_to_ancestor(ctx: &LayoutContext<'_>, id: BoxId, ancestor: BoxId) -> LayoutPoint {
        let tree = ctx.tree();
        debug_assert!(
            tree.is_descendant_of(id, ancestor),
            "{} is not a descendant of {}",
            tree.label(id),
            tree.label(ancestor)
        );

        let top_left = ctx.computed_box(id).top_left();
        let Some(containing_block) = tree.containing_block(id) else {
            report_unreachable_ancestor(tree, id, ancestor);
            return top_left;
        };
        Self::map_coordinate_to_ancestor(ctx, top_left, containing_block, ancestor)
    }

    /// Map `position`, expressed in the coordinate space of
    /// `containing_block`, into `ancestor`'s coordinate space by adding the
    /// top-left of every box along the chain below `ancestor`.
    ///
    /// Debug builds assert that the chain reaches `ancestor`; release builds
    /// return `position` unmapped.
    #[must_use]
    pub fn map_coordinate_to_ancestor(
        ctx: &LayoutContext<'_>,
        position: LayoutPoint,
        containing_block: BoxId,
        ancestor: BoxId,
    ) -> LayoutPoint {
        let mapped = Self::try_map_coordinate_to_ancestor(ctx, position, containing_block, ancestor);
        debug_assert!(
            mapped.is_some(),
            "{} is not on the containing block chain of {}",
            ctx.tree().label(ancestor),
            ctx.tree().label(containing_block)
        );
        mapped.unwrap_or_else(|| {
            report_unreachable_ancestor(ctx.tree(), containing_block, ancestor);
            position
        })
    }

    pub(crate) fn try_map_coordinate_to_ancestor(
        ctx: &LayoutContext<'_>,
        position: LayoutPoint,
        containing_block: BoxId,
        ancestor: BoxId,
    ) -> Option<LayoutPoint> {
        let tree = ctx.tree();
        let mut mapped = position;
        let mut current = Some(containing_block);
        while let Some(container) = current {
            if container == ancestor {
                return Some(mapped);
            }
            mapped.move_by(ctx.computed_box(container).top_left());
            current = tree.containing_block(container);
        }
        None
    }

    fn containing_block_box<'a>(ctx: &'a LayoutContext<'_>, id: BoxId) -> &'a ComputedBox {
        ctx.computed_box(ctx.tree().containing_block(id).unwrap_or(BoxId::ROOT))
    }

    /// Check the box model equalities for every box that participates in
    /// this formatting context, skipping nested formatting contexts.
    ///
    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth) and
    /// [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width):
    /// the horizontal margin box, plus 'left' and 'right' for out-of-flow
    /// boxes, equals the containing block width.
    ///
    /// [§ 10.6.4](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height):
    /// for out-of-flow boxes, 'top' plus the vertical margin box plus
    /// 'bottom' equals the containing block height.
    ///
    /// Replaced boxes are not checked.
    #[must_use]
    pub fn check_geometry_constraints(&self, ctx: &LayoutContext<'_>) -> Vec<GeometryViolation> {
        let tree = ctx.tree();
        let mut violations = Vec::new();
        if !tree.layout_box(self.root).is_container() {
            return violations;
        }

        for id in tree.descendants(self.root) {
            if tree.formatting_context_root(id) != Some(self.root) {
                continue;
            }
            let layout_box = tree.layout_box(id);
            if layout_box.is_replaced() {
                continue;
            }
            let Some(containing_block) = tree.containing_block(id) else {
                continue;
            };
            let containing_block_box = ctx.computed_box(containing_block);
            let computed_box = ctx.computed_box(id);
            let out_of_flow = layout_box.is_out_of_flow_positioned();
            let offsets = computed_box.box_offsets();
            let mut violation = |axis, expected, actual| {
                violations.push(GeometryViolation {
                    formatting_context_root: self.root,
                    box_id: id,
                    label: tree.label(id),
                    axis,
                    expected,
                    actual,
                });
            };

            if layout_box.is_block_level() || out_of_flow {
                let mut actual = computed_box.margin_left()
                    + computed_box.border_left()
                    + computed_box.padding_left().unwrap_or_default()
                    + computed_box.content_box_width()
                    + computed_box.padding_right().unwrap_or_default()
                    + computed_box.border_right()
                    + computed_box.margin_right();
                if out_of_flow {
                    actual += offsets.left + offsets.right;
                }
                let expected = containing_block_box.content_box_width();
                if actual != expected {
                    violation(Axis::Horizontal, expected, actual);
                }
            }

            if out_of_flow {
                let actual = offsets.top
                    + computed_box.margin_top()
                    + computed_box.border_top()
                    + computed_box.padding_top().unwrap_or_default()
                    + computed_box.content_box_height()
                    + computed_box.padding_bottom().unwrap_or_default()
                    + computed_box.border_bottom()
                    + computed_box.margin_bottom()
                    + offsets.bottom;
                let expected = containing_block_box.content_box_height();
                if actual != expected {
                    violation(Axis::Vertical, expected, actual);
                }
            }
        }

        violations
    }

    /// Panic if any box in this formatting context breaks a box model
    /// equality. Layout runs this when
    /// [`LayoutOptions::validate_geometry`](crate::LayoutOptions::validate_geometry)
    /// is set.
    ///
    /// # Panics
    /// On the first formatting context with a violation.
    pub fn validate_geometry_constraints_after_layout(&self, ctx: &LayoutContext<'_>) {
        let violations = self.check_geometry_constraints(ctx);
        assert!(
            violations.is_empty(),
            "geometry constraints violated in formatting context {}: {}",
            ctx.tree().label(self.root),
            violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: i32) -> Au {
        Au::from_px(value)
    }

    #[test]
    fn test_min_max_unconstrained_is_kept() {
        let chosen = apply_min_max(|used| used.unwrap_or(px(300)), |width| *width, None, None);
        assert_eq!(chosen, px(300));

        let within = apply_min_max(
            |used| used.unwrap_or(px(300)),
            |width| *width,
            Some(px(400)),
            Some(px(100)),
        );
        assert_eq!(within, px(300));
    }

    #[test]
    fn test_min_max_max_then_min() {
        let clamped = apply_min_max(|used| used.unwrap_or(px(800)), |width| *width, Some(px(400)), None);
        assert_eq!(clamped, px(400));

        let min_wins = apply_min_max(
            |used| used.unwrap_or(px(800)),
            |width| *width,
            Some(px(400)),
            Some(px(600)),
        );
        assert_eq!(min_wins, px(600));

        let grown = apply_min_max(|used| used.unwrap_or(px(50)), |width| *width, None, Some(px(100)));
        assert_eq!(grown, px(100));
    }

    #[test]
    fn test_violation_message() {
        let violation = GeometryViolation {
            formatting_context_root: BoxId::ROOT,
            box_id: BoxId(3),
            label: "#3 (abs)".to_string(),
            axis: Axis::Vertical,
            expected: px(600),
            actual: px(590),
        };
        assert_eq!(
            violation.to_string(),
            "#3 (abs): vertical sum is 590px but the containing block is 600px"
        );
    }
}
