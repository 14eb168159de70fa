//! Integration tests that swap in a custom geometry solver to observe how
//! candidate solutions are chosen and validated.

use std::cell::RefCell;
use std::rc::Rc;

use app_units::Au;
use koala_layout::geometry::containing_block_width;
use koala_layout::{
    Axis, AutoOr, BoxFlags, BoxId, ComputedStyle, CssGeometry, Edges, Geometry, HeightAndMargin,
    HorizontalGeometry, LayoutBox, LayoutContext, LayoutOptions, LayoutPoint, LayoutSize,
    LayoutTree, PositionType, VerticalEdges, VerticalGeometry, WidthAndMargin,
};
#[cfg(not(debug_assertions))]
use koala_common::warning::has_warned;

fn px(value: i32) -> Au {
    Au::from_px(value)
}

/// Solves every out-of-flow box to a fixed natural width and records the
/// width override of each call. Everything else is CSS 2.1.
struct RecordingGeometry {
    natural_width: Au,
    calls: Rc<RefCell<Vec<Option<Au>>>>,
}

impl Geometry for RecordingGeometry {
    fn out_of_flow_horizontal_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> HorizontalGeometry {
        self.calls.borrow_mut().push(used_width);
        let width = used_width.unwrap_or(self.natural_width);
        HorizontalGeometry {
            left: Au(0),
            right: containing_block_width(ctx, id) - width,
            width_and_margin: WidthAndMargin {
                width,
                ..WidthAndMargin::default()
            },
        }
    }

    fn out_of_flow_vertical_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
    ) -> VerticalGeometry {
        CssGeometry.out_of_flow_vertical_geometry(ctx, id, used_height)
    }

    fn in_flow_width_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> WidthAndMargin {
        CssGeometry.in_flow_width_and_margin(ctx, id, used_width)
    }

    fn in_flow_height_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
        content_height: Au,
    ) -> HeightAndMargin {
        CssGeometry.in_flow_height_and_margin(ctx, id, used_height, content_height)
    }

    fn in_flow_positioned_offset(&self, ctx: &LayoutContext<'_>, id: BoxId) -> LayoutPoint {
        CssGeometry.in_flow_positioned_offset(ctx, id)
    }

    fn border(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Edges {
        CssGeometry.border(ctx, id)
    }

    fn padding(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Option<Edges> {
        CssGeometry.padding(ctx, id)
    }
}

/// CSS 2.1 geometry that widens every out-of-flow box by one pixel without
/// adjusting anything else.
struct OffByOneGeometry;

impl Geometry for OffByOneGeometry {
    fn out_of_flow_horizontal_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> HorizontalGeometry {
        let mut geometry = CssGeometry.out_of_flow_horizontal_geometry(ctx, id, used_width);
        geometry.width_and_margin.width += Au::from_px(1);
        geometry
    }

    fn out_of_flow_vertical_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
    ) -> VerticalGeometry {
        CssGeometry.out_of_flow_vertical_geometry(ctx, id, used_height)
    }

    fn in_flow_width_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> WidthAndMargin {
        CssGeometry.in_flow_width_and_margin(ctx, id, used_width)
    }

    fn in_flow_height_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
        content_height: Au,
    ) -> HeightAndMargin {
        CssGeometry.in_flow_height_and_margin(ctx, id, used_height, content_height)
    }

    fn in_flow_positioned_offset(&self, ctx: &LayoutContext<'_>, id: BoxId) -> LayoutPoint {
        CssGeometry.in_flow_positioned_offset(ctx, id)
    }

    fn border(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Edges {
        CssGeometry.border(ctx, id)
    }

    fn padding(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Option<Edges> {
        CssGeometry.padding(ctx, id)
    }
}

/// CSS 2.1 geometry that hands back a collapsed margin for out-of-flow boxes,
/// which never collapse.
struct CollapsingGeometry;

impl Geometry for CollapsingGeometry {
    fn out_of_flow_horizontal_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> HorizontalGeometry {
        CssGeometry.out_of_flow_horizontal_geometry(ctx, id, used_width)
    }

    fn out_of_flow_vertical_geometry(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
    ) -> VerticalGeometry {
        let mut geometry = CssGeometry.out_of_flow_vertical_geometry(ctx, id, used_height);
        geometry.height_and_margin.collapsed_margin = Some(VerticalEdges::new(px(7), px(7)));
        geometry
    }

    fn in_flow_width_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_width: Option<Au>,
    ) -> WidthAndMargin {
        CssGeometry.in_flow_width_and_margin(ctx, id, used_width)
    }

    fn in_flow_height_and_margin(
        &self,
        ctx: &LayoutContext<'_>,
        id: BoxId,
        used_height: Option<Au>,
        content_height: Au,
    ) -> HeightAndMargin {
        CssGeometry.in_flow_height_and_margin(ctx, id, used_height, content_height)
    }

    fn in_flow_positioned_offset(&self, ctx: &LayoutContext<'_>, id: BoxId) -> LayoutPoint {
        CssGeometry.in_flow_positioned_offset(ctx, id)
    }

    fn border(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Edges {
        CssGeometry.border(ctx, id)
    }

    fn padding(&self, ctx: &LayoutContext<'_>, id: BoxId) -> Option<Edges> {
        CssGeometry.padding(ctx, id)
    }
}

fn tree_with_absolute_box(max_width: AutoOr, min_width: AutoOr) -> (LayoutTree, BoxId) {
    let mut tree = LayoutTree::new();
    let mut style = ComputedStyle::positioned(PositionType::Absolute);
    style.offsets.left = AutoOr::px(0.0);
    style.offsets.right = AutoOr::px(0.0);
    style.max_width = max_width;
    style.min_width = min_width;
    let abs = tree
        .append_child(BoxId::ROOT, LayoutBox::leaf(style, BoxFlags::block()))
        .unwrap();
    (tree, abs)
}

fn recorded_layout(tree: &LayoutTree, natural_width: Au) -> (LayoutContext<'_>, Vec<Option<Au>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut ctx = LayoutContext::new(tree, LayoutSize::from_px(800.0, 600.0)).with_geometry(
        RecordingGeometry {
            natural_width,
            calls: Rc::clone(&calls),
        },
    );
    ctx.layout();
    let calls = calls.borrow().clone();
    (ctx, calls)
}

#[test]
fn test_solves_unconstrained_then_max_then_min() {
    let (tree, abs) = tree_with_absolute_box(AutoOr::px(400.0), AutoOr::px(600.0));
    let (ctx, calls) = recorded_layout(&tree, px(800));

    assert_eq!(calls, vec![None, Some(px(400)), Some(px(600))]);
    assert_eq!(ctx.computed_box(abs).content_box_width(), px(600));
}

#[test]
fn test_max_candidate_only_replaces_a_wider_solution() {
    let (tree, abs) = tree_with_absolute_box(AutoOr::px(400.0), AutoOr::Auto);
    let (ctx, calls) = recorded_layout(&tree, px(300));

    assert_eq!(calls, vec![None, Some(px(400))]);
    assert_eq!(ctx.computed_box(abs).content_box_width(), px(300));
}

#[test]
fn test_min_candidate_only_replaces_a_narrower_solution() {
    let (tree, abs) = tree_with_absolute_box(AutoOr::Auto, AutoOr::px(100.0));
    let (ctx, calls) = recorded_layout(&tree, px(300));

    assert_eq!(calls, vec![None, Some(px(100))]);
    assert_eq!(ctx.computed_box(abs).content_box_width(), px(300));
}

#[test]
fn test_no_constraints_solve_once() {
    let (tree, abs) = tree_with_absolute_box(AutoOr::Auto, AutoOr::Auto);
    let (ctx, calls) = recorded_layout(&tree, px(250));

    assert_eq!(calls, vec![None]);
    assert_eq!(ctx.computed_box(abs).content_box_width(), px(250));
}

#[test]
fn test_check_reports_broken_equality() {
    let (tree, abs) = tree_with_absolute_box(AutoOr::Auto, AutoOr::Auto);
    let mut ctx = LayoutContext::new(&tree, LayoutSize::from_px(800.0, 600.0))
        .with_geometry(OffByOneGeometry)
        .with_options(LayoutOptions {
            validate_geometry: false,
        });
    ctx.layout();

    let violations = ctx.check_geometry_constraints();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].box_id, abs);
    assert_eq!(violations[0].formatting_context_root, BoxId::ROOT);
    assert_eq!(violations[0].axis, Axis::Horizontal);
    assert_eq!(violations[0].expected, px(800));
    assert_eq!(violations[0].actual, px(801));
}

#[test]
#[should_panic(expected = "geometry constraints violated")]
fn test_validation_panics_on_broken_equality() {
    let (tree, _) = tree_with_absolute_box(AutoOr::Auto, AutoOr::Auto);
    let mut ctx = LayoutContext::new(&tree, LayoutSize::from_px(800.0, 600.0))
        .with_geometry(OffByOneGeometry)
        .with_options(LayoutOptions {
            validate_geometry: true,
        });
    ctx.layout();
}

fn collapsing_layout(tree: &LayoutTree) -> LayoutContext<'_> {
    let mut ctx = LayoutContext::new(tree, LayoutSize::from_px(800.0, 600.0))
        .with_geometry(CollapsingGeometry)
        .with_options(LayoutOptions {
            validate_geometry: false,
        });
    ctx.layout();
    ctx
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "produced a collapsed margin")]
fn test_collapsed_margin_on_out_of_flow_box_panics() {
    let (tree, _) = tree_with_absolute_box(AutoOr::Auto, AutoOr::Auto);
    let _ = collapsing_layout(&tree);
}

#[cfg(not(debug_assertions))]
#[test]
fn test_collapsed_margin_on_out_of_flow_box_is_ignored_and_reported() {
    let (tree, abs) = tree_with_absolute_box(AutoOr::Auto, AutoOr::Auto);
    let ctx = collapsing_layout(&tree);

    let computed = ctx.computed_box(abs);
    assert_eq!(computed.margin_top(), px(0));
    assert_eq!(computed.margin_bottom(), px(0));
    assert_eq!(computed.vertical_non_collapsed_margin().top, px(0));
    assert_eq!(computed.top(), px(0));
    assert!(has_warned(
        "Layout",
        &format!("out-of-flow box {abs} produced a collapsed margin")
    ));
}
