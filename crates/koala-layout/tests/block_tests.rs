//! Integration tests for block layout and relative positioning.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//! [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)

use app_units::Au;
use koala_layout::{
    AutoEdges, AutoOr, BoxFlags, BoxId, ComputedStyle, FormattingContext, FormattingState,
    LayoutBox, LayoutContext, LayoutPoint, LayoutSize, LayoutTree, PositionType,
};

fn px(value: i32) -> Au {
    Au::from_px(value)
}

fn point(x: i32, y: i32) -> LayoutPoint {
    LayoutPoint::new(px(x), px(y))
}

fn append(
    tree: &mut LayoutTree,
    parent: BoxId,
    style: ComputedStyle,
    flags: BoxFlags,
    is_container: bool,
) -> BoxId {
    let layout_box = if is_container {
        LayoutBox::container(style, flags)
    } else {
        LayoutBox::leaf(style, flags)
    };
    tree.append_child(parent, layout_box).unwrap()
}

fn layout(tree: &LayoutTree) -> LayoutContext<'_> {
    let mut ctx = LayoutContext::new(tree, LayoutSize::from_px(800.0, 600.0));
    ctx.layout();
    ctx
}

fn with_height(height: f32) -> ComputedStyle {
    let mut style = ComputedStyle::default();
    style.height = AutoOr::px(height);
    style
}

#[test]
fn test_children_stack_vertically() {
    let mut tree = LayoutTree::new();
    let mut outer = ComputedStyle::default();
    outer.margin = AutoEdges::uniform(AutoOr::px(10.0));
    let wrapper = append(&mut tree, BoxId::ROOT, outer, BoxFlags::block(), true);
    let first = append(&mut tree, wrapper, with_height(30.0), BoxFlags::block(), false);
    let mut second_style = with_height(20.0);
    second_style.margin.top = AutoOr::px(5.0);
    let second = append(&mut tree, wrapper, second_style, BoxFlags::block(), false);
    let ctx = layout(&tree);

    let wrapper_box = ctx.computed_box(wrapper);
    assert_eq!(wrapper_box.top_left(), point(10, 10));
    assert_eq!(wrapper_box.content_box_width(), px(780));
    assert_eq!(wrapper_box.content_box_height(), px(55));

    assert_eq!(ctx.computed_box(first).top_left(), point(0, 0));
    assert_eq!(ctx.computed_box(second).top_left(), point(0, 35));
    assert_eq!(ctx.computed_box(second).content_box_width(), px(780));

    assert_eq!(
        ctx.formatting_state(BoxId::ROOT)
            .map(FormattingState::content_height),
        Some(px(75))
    );
    assert!(ctx.check_geometry_constraints().is_empty());
}

#[test]
fn test_max_width_with_auto_margins_centers() {
    let mut tree = LayoutTree::new();
    let mut style = ComputedStyle::default();
    style.max_width = AutoOr::px(300.0);
    style.margin.left = AutoOr::Auto;
    style.margin.right = AutoOr::Auto;
    let centered = append(&mut tree, BoxId::ROOT, style, BoxFlags::block(), false);
    let ctx = layout(&tree);

    let computed = ctx.computed_box(centered);
    assert_eq!(computed.content_box_width(), px(300));
    assert_eq!(computed.margin_left(), px(250));
    assert_eq!(computed.margin_right(), px(250));
    assert_eq!(computed.left(), px(250));
}

#[test]
fn test_min_height_grows_content_height() {
    let mut tree = LayoutTree::new();
    let mut style = ComputedStyle::default();
    style.min_height = AutoOr::px(80.0);
    let wrapper = append(&mut tree, BoxId::ROOT, style, BoxFlags::block(), true);
    let _ = append(&mut tree, wrapper, with_height(30.0), BoxFlags::block(), false);
    let after = append(&mut tree, BoxId::ROOT, with_height(10.0), BoxFlags::block(), false);
    let ctx = layout(&tree);

    assert_eq!(ctx.computed_box(wrapper).content_box_height(), px(80));
    assert_eq!(ctx.computed_box(after).top(), px(80));
}

#[test]
fn test_relative_offsets_move_after_flow() {
    let mut tree = LayoutTree::new();
    let mut shifted = with_height(40.0);
    shifted.position = PositionType::Relative;
    shifted.offsets.left = AutoOr::px(15.0);
    shifted.offsets.right = AutoOr::px(99.0);
    shifted.offsets.bottom = AutoOr::px(5.0);
    let shifted = append(&mut tree, BoxId::ROOT, shifted, BoxFlags::block(), false);
    let after = append(&mut tree, BoxId::ROOT, with_height(10.0), BoxFlags::block(), false);
    let ctx = layout(&tree);

    // 'left' wins over 'right'; 'top' is auto so it is minus 'bottom'.
    assert_eq!(ctx.computed_box(shifted).top_left(), point(15, -5));
    // Following boxes keep their normal flow position.
    assert_eq!(ctx.computed_box(after).top_left(), point(0, 40));
}

#[test]
fn test_nested_formatting_context_offsets_apply_once() {
    let mut tree = LayoutTree::new();
    let mut outer = ComputedStyle::positioned(PositionType::Relative);
    outer.offsets.left = AutoOr::px(10.0);
    outer.offsets.top = AutoOr::px(10.0);
    let root = append(
        &mut tree,
        BoxId::ROOT,
        outer,
        BoxFlags::block_formatting_root(),
        true,
    );
    let mut inner = ComputedStyle::positioned(PositionType::Relative);
    inner.offsets.left = AutoOr::px(5.0);
    inner.offsets.top = AutoOr::px(3.0);
    let child = append(&mut tree, root, inner, BoxFlags::block(), false);
    let mut ctx = layout(&tree);

    assert_eq!(ctx.computed_box(root).top_left(), point(10, 10));
    assert_eq!(ctx.computed_box(child).top_left(), point(5, 3));

    // The outer context leaves the nested root's children alone.
    FormattingContext::new(BoxId::ROOT).place_in_flow_positioned_children(&mut ctx, root);
    assert_eq!(ctx.computed_box(child).top_left(), point(5, 3));

    // Its own formatting context is the one that places them.
    FormattingContext::new(root).place_in_flow_positioned_children(&mut ctx, root);
    assert_eq!(ctx.computed_box(child).top_left(), point(10, 6));
}

#[test]
fn test_relative_box_contains_absolute_descendant() {
    let mut tree = LayoutTree::new();
    let mut relative = with_height(200.0);
    relative.position = PositionType::Relative;
    relative.margin.top = AutoOr::px(50.0);
    relative.offsets.top = AutoOr::px(10.0);
    let wrapper = append(&mut tree, BoxId::ROOT, relative, BoxFlags::block(), true);
    let mut pinned = ComputedStyle::positioned(PositionType::Absolute);
    pinned.offsets.left = AutoOr::px(0.0);
    pinned.offsets.right = AutoOr::px(0.0);
    pinned.offsets.bottom = AutoOr::px(0.0);
    pinned.height = AutoOr::px(40.0);
    let abs = append(&mut tree, wrapper, pinned, BoxFlags::block(), false);
    let ctx = layout(&tree);

    assert_eq!(ctx.computed_box(abs).top_left(), point(0, 160));
    assert_eq!(ctx.computed_box(wrapper).top_left(), point(0, 60));
    assert_eq!(ctx.absolute_box(abs).top_left(), point(0, 220));
}

#[test]
fn test_percentage_height_needs_definite_containing_block() {
    let mut tree = LayoutTree::new();
    let sized = append(&mut tree, BoxId::ROOT, with_height(200.0), BoxFlags::block(), true);
    let mut half = ComputedStyle::default();
    half.height = AutoOr::percent(50.0);
    let resolved = append(&mut tree, sized, half.clone(), BoxFlags::block(), false);
    let auto_parent = append(&mut tree, BoxId::ROOT, ComputedStyle::default(), BoxFlags::block(), true);
    let unresolved = append(&mut tree, auto_parent, half, BoxFlags::block(), false);
    let ctx = layout(&tree);

    assert_eq!(ctx.computed_box(resolved).content_box_height(), px(100));
    assert_eq!(ctx.computed_box(unresolved).content_box_height(), px(0));
}
