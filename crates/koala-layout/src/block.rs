//! Block formatting context.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block."
//!
//! Margins do not collapse here; each box sits below the previous box's
//! bottom margin edge.

use app_units::Au;
use tracing::debug;

use crate::formatting_context::{FormattingContext, FormattingState};
use crate::layout_context::LayoutContext;
use crate::tree::BoxId;

/// Lays out the in-flow block-level boxes of one formatting context.
#[derive(Debug, Clone, Copy)]
pub struct BlockFormattingContext {
    formatting_context: FormattingContext,
}

impl BlockFormattingContext {
    /// Wrap a formatting context whose root is a block container.
    #[must_use]
    pub const fn new(formatting_context: FormattingContext) -> Self {
        Self { formatting_context }
    }

    /// Lay out the root's in-flow subtree and record its content height.
    ///
    /// The root's border and padding, and its width, must already be
    /// stored.
    pub fn layout(&self, ctx: &mut LayoutContext<'_>, state: &mut FormattingState) {
        let root = self.formatting_context.root();
        debug!(target: "koala_layout", root = %root, "Start: block layout");

        let content_height = self.layout_in_flow_children(ctx, state, root);
        state.set_content_height(content_height);
        self.formatting_context
            .place_in_flow_positioned_children(ctx, root);

        debug!(target: "koala_layout", root = %root, content_height = content_height.to_f32_px(), "End: block layout");
    }

    /// Stack the in-flow children of `container` and return the height from
    /// its top content edge to the last child's bottom margin edge.
    fn layout_in_flow_children(
        &self,
        ctx: &mut LayoutContext<'_>,
        state: &mut FormattingState,
        container: BoxId,
    ) -> Au {
        let tree = ctx.tree();
        let formatting_context = self.formatting_context;
        let container_box = ctx.computed_box(container);
        let content_left = container_box.content_box_left();
        let content_top = container_box.content_box_top();
        let mut cursor = content_top;

        for child in tree.in_flow_children(container) {
            formatting_context.compute_border_and_padding(ctx, child);
            formatting_context.compute_in_flow_width_and_margin(ctx, child);
            let margin_left = ctx.computed_box(child).margin_left();
            ctx.computed_box_mut(child).set_left(content_left + margin_left);

            let content_height = self.layout_content(ctx, state, child);
            formatting_context.compute_in_flow_height_and_margin(ctx, child, content_height);

            let child_box = ctx.computed_box_mut(child);
            let top = cursor + child_box.margin_top();
            child_box.set_top(top);
            cursor = top + child_box.height() + child_box.margin_bottom();

            // Relatively positioned children are containing blocks too; their
            // size is final now.
            formatting_context.layout_out_of_flow_descendants(ctx, child);
            formatting_context.place_in_flow_positioned_children(ctx, child);
        }

        cursor - content_top
    }

    /// Lay out what is inside `id` and return its content height.
    fn layout_content(
        &self,
        ctx: &mut LayoutContext<'_>,
        state: &mut FormattingState,
        id: BoxId,
    ) -> Au {
        let layout_box = ctx.tree().layout_box(id);
        if !layout_box.is_container() {
            return Au(0);
        }
        if layout_box.establishes_formatting_context() {
            let nested = ctx.formatting_context(id);
            return ctx.with_formatting_state(id, |ctx, nested_state| {
                nested.layout(ctx, nested_state);
                nested_state.content_height()
            });
        }
        self.layout_in_flow_children(ctx, state, id)
    }
}
