//! End-to-end tests that lay out trees read from JSON descriptions.

use app_units::Au;
use koala_layout::{BoxId, LayoutContext, LayoutPoint, LayoutTree, TreeDescription};

fn px(value: i32) -> Au {
    Au::from_px(value)
}

fn parse(json: &str) -> (TreeDescription, LayoutTree) {
    let description: TreeDescription = serde_json::from_str(json).unwrap();
    let tree = LayoutTree::from_description(&description).unwrap();
    (description, tree)
}

#[test]
fn test_absolute_box_pinned_to_padded_wrapper_corner() {
    let (description, tree) = parse(
        r#"{
            "viewport": { "width": 800, "height": 600 },
            "children": [
                {
                    "name": "wrapper",
                    "style": {
                        "position": "relative",
                        "padding": { "top": "10px", "right": "10px", "bottom": "10px", "left": "10px" }
                    },
                    "children": [
                        {
                            "name": "badge",
                            "style": {
                                "position": "absolute",
                                "top": "0",
                                "right": "0",
                                "width": "100px",
                                "height": "50px"
                            }
                        }
                    ]
                }
            ]
        }"#,
    );
    let wrapper = BoxId(1);
    let badge = BoxId(2);

    let mut ctx = LayoutContext::new(&tree, description.viewport_size());
    ctx.layout();

    assert_eq!(ctx.computed_box(wrapper).content_box_width(), px(780));
    assert_eq!(ctx.computed_box(wrapper).content_box_height(), px(0));
    assert_eq!(ctx.computed_box(badge).top_left(), LayoutPoint::new(px(690), px(10)));
    assert_eq!(ctx.computed_box(badge).box_offsets().left, px(680));
    assert_eq!(ctx.computed_box(badge).box_offsets().bottom, px(-50));
    assert_eq!(
        ctx.absolute_box(badge).top_left(),
        LayoutPoint::new(px(690), px(10))
    );
    assert!(ctx.check_geometry_constraints().is_empty());
}

#[test]
fn test_document_with_every_kind_of_box() {
    let (description, tree) = parse(
        r#"{
            "viewport": { "width": 1000, "height": 500 },
            "children": [
                { "name": "header", "style": { "height": "60px" } },
                {
                    "name": "main",
                    "style": { "margin": { "left": "auto", "right": "auto" }, "width": "600px" },
                    "children": [
                        {
                            "name": "logo",
                            "replaced": true,
                            "intrinsic-size": { "width": 200, "height": 100 },
                            "style": { "width": "100px" }
                        },
                        {
                            "name": "sidebar",
                            "style": { "position": "fixed", "right": "0", "top": "0", "width": "20%", "height": "100%" }
                        },
                        {
                            "name": "widget",
                            "establishes-formatting-context": true,
                            "style": { "border-width": { "top": 2, "right": 2, "bottom": 2, "left": 2 } },
                            "children": [ { "name": "line", "style": { "height": "16px" } } ]
                        }
                    ]
                }
            ]
        }"#,
    );
    let header = BoxId(1);
    let main = BoxId(2);
    let logo = BoxId(3);
    let sidebar = BoxId(4);
    let widget = BoxId(5);

    let mut ctx = LayoutContext::new(&tree, description.viewport_size());
    ctx.layout();

    assert_eq!(ctx.computed_box(header).height(), px(60));

    let main_box = ctx.computed_box(main);
    assert_eq!(main_box.top_left(), LayoutPoint::new(px(200), px(60)));
    assert_eq!(main_box.margin_left(), px(200));
    assert_eq!(main_box.margin_right(), px(200));
    // logo (50) + widget (16 + 4 border)
    assert_eq!(main_box.content_box_height(), px(70));

    assert_eq!(ctx.computed_box(logo).content_box_width(), px(100));
    assert_eq!(ctx.computed_box(logo).content_box_height(), px(50));

    assert_eq!(ctx.computed_box(widget).top_left(), LayoutPoint::new(px(0), px(50)));
    assert_eq!(ctx.computed_box(widget).content_box_width(), px(596));
    assert!(ctx.formatting_state(widget).is_some());

    let sidebar_box = ctx.absolute_box(sidebar);
    assert_eq!(sidebar_box.content_box_width(), px(200));
    assert_eq!(sidebar_box.content_box_height(), px(500));
    assert_eq!(sidebar_box.top_left(), LayoutPoint::new(px(800), px(0)));

    assert!(ctx.check_geometry_constraints().is_empty());
}
