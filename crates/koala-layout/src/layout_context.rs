//! State for one layout pass.
//!
//! A [`LayoutContext`] borrows the box tree and owns everything a pass
//! produces: one [`ComputedBox`] per box, one [`FormattingContext`] per
//! formatting-context root and the transient [`FormattingState`] of each
//! root. All three stores are filled lazily and discarded with the context.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info_span};

use crate::box_model::{ComputedBox, Edges, LayoutPoint, LayoutSize};
use crate::formatting_context::{FormattingContext, FormattingState, GeometryViolation};
use crate::geometry::{CssGeometry, Geometry};
use crate::tree::{BoxId, LayoutTree};

static EMPTY_BOX: ComputedBox = ComputedBox::EMPTY;

/// Runtime switches for a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Check the box model equalities once the pass completes and panic on
    /// the first violation. On by default in debug builds.
    pub validate_geometry: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            validate_geometry: cfg!(debug_assertions),
        }
    }
}

/// The pass-scoped stores and collaborators.
pub struct LayoutContext<'tree> {
    tree: &'tree LayoutTree,
    geometry: Box<dyn Geometry>,
    options: LayoutOptions,
    viewport: LayoutSize,
    computed_boxes: HashMap<BoxId, ComputedBox>,
    formatting_contexts: HashMap<BoxId, FormattingContext>,
    /// Roots in the order their formatting context was first requested.
    formatting_context_order: Vec<BoxId>,
    formatting_states: HashMap<BoxId, FormattingState>,
    /// Normal flow top-left of relatively positioned boxes, before offsets.
    flow_top_lefts: HashMap<BoxId, LayoutPoint>,
}

impl fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutContext")
            .field("boxes", &self.tree.len())
            .field("options", &self.options)
            .field("viewport", &self.viewport)
            .field("computed_boxes", &self.computed_boxes.len())
            .field("formatting_contexts", &self.formatting_context_order)
            .finish_non_exhaustive()
    }
}

impl<'tree> LayoutContext<'tree> {
    /// Create a pass over `tree` with a viewport of the given size, CSS 2.1
    /// geometry and default options.
    #[must_use]
    pub fn new(tree: &'tree LayoutTree, viewport: LayoutSize) -> Self {
        Self {
            tree,
            geometry: Box::new(CssGeometry),
            options: LayoutOptions::default(),
            viewport,
            computed_boxes: HashMap::new(),
            formatting_contexts: HashMap::new(),
            formatting_context_order: Vec::new(),
            formatting_states: HashMap::new(),
            flow_top_lefts: HashMap::new(),
        }
    }

    /// Replace the geometry solver.
    #[must_use]
    pub fn with_geometry(mut self, geometry: impl Geometry + 'static) -> Self {
        self.geometry = Box::new(geometry);
        self
    }

    /// Replace the options.
    #[must_use]
    pub const fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// The box tree being laid out.
    #[must_use]
    pub const fn tree(&self) -> &'tree LayoutTree {
        self.tree
    }

    /// The geometry solver.
    #[must_use]
    pub fn geometry(&self) -> &dyn Geometry {
        self.geometry.as_ref()
    }

    /// The options of this pass.
    #[must_use]
    pub const fn options(&self) -> LayoutOptions {
        self.options
    }

    /// The viewport, which sizes the initial containing block.
    #[must_use]
    pub const fn viewport(&self) -> LayoutSize {
        self.viewport
    }

    /// The geometry of a box. Boxes not laid out yet read as
    /// [`ComputedBox::EMPTY`].
    #[must_use]
    pub fn computed_box(&self, id: BoxId) -> &ComputedBox {
        self.computed_boxes.get(&id).unwrap_or(&EMPTY_BOX)
    }

    /// Whether any geometry has been written for the box in this pass.
    #[must_use]
    pub fn has_computed_box(&self, id: BoxId) -> bool {
        self.computed_boxes.contains_key(&id)
    }

    /// The geometry of a box for writing, created on first access.
    pub fn computed_box_mut(&mut self, id: BoxId) -> &mut ComputedBox {
        self.computed_boxes.entry(id).or_insert(ComputedBox::EMPTY)
    }

    /// Where a box sits in normal flow. For a relatively positioned box this
    /// is the top-left before its offset was applied; every other box reads
    /// its stored top-left.
    #[must_use]
    pub fn flow_top_left(&self, id: BoxId) -> LayoutPoint {
        self.flow_top_lefts
            .get(&id)
            .copied()
            .unwrap_or_else(|| self.computed_box(id).top_left())
    }

    pub(crate) fn record_flow_top_left(&mut self, id: BoxId, top_left: LayoutPoint) {
        let _ = self.flow_top_lefts.entry(id).or_insert(top_left);
    }

    /// The formatting context rooted at `root`, created on first request.
    pub fn formatting_context(&mut self, root: BoxId) -> FormattingContext {
        if let Some(formatting_context) = self.formatting_contexts.get(&root) {
            return *formatting_context;
        }
        debug_assert!(
            self.tree.layout_box(root).establishes_formatting_context(),
            "{} does not establish a formatting context",
            self.tree.label(root)
        );
        let formatting_context = FormattingContext::new(root);
        let _ = self.formatting_contexts.insert(root, formatting_context);
        self.formatting_context_order.push(root);
        formatting_context
    }

    /// Every formatting context created so far, in creation order.
    pub fn formatting_contexts(&self) -> impl Iterator<Item = FormattingContext> + '_ {
        self.formatting_context_order
            .iter()
            .filter_map(|root| self.formatting_contexts.get(root).copied())
    }

    /// The formatting state of a root, if its formatting context has run.
    #[must_use]
    pub fn formatting_state(&self, root: BoxId) -> Option<&FormattingState> {
        self.formatting_states.get(&root)
    }

    /// Lend the formatting state of `root`, created if needed, to `f`
    /// together with the context.
    pub fn with_formatting_state<R>(
        &mut self,
        root: BoxId,
        f: impl FnOnce(&mut Self, &mut FormattingState) -> R,
    ) -> R {
        let mut state = self.formatting_states.remove(&root).unwrap_or_default();
        let result = f(self, &mut state);
        let _ = self.formatting_states.insert(root, state);
        result
    }

    /// Run a full layout pass.
    ///
    /// The initial containing block takes the viewport size, its formatting
    /// context lays out the in-flow tree, and then the out-of-flow boxes it
    /// contains are laid out. With [`LayoutOptions::validate_geometry`] every
    /// formatting context is validated afterwards.
    pub fn layout(&mut self) {
        let _span = info_span!(target: "koala_layout", "layout", boxes = self.tree.len()).entered();

        self.computed_boxes.clear();
        self.formatting_contexts.clear();
        self.formatting_context_order.clear();
        self.formatting_states.clear();
        self.flow_top_lefts.clear();

        self.initialize_initial_containing_block();

        let root = self.formatting_context(BoxId::ROOT);
        self.with_formatting_state(BoxId::ROOT, |ctx, state| root.layout(ctx, state));
        root.layout_out_of_flow_descendants(self, BoxId::ROOT);

        debug!(
            target: "koala_layout",
            formatting_contexts = self.formatting_context_order.len(),
            "layout complete"
        );

        if self.options.validate_geometry {
            let formatting_contexts: Vec<_> = self.formatting_contexts().collect();
            for formatting_context in formatting_contexts {
                formatting_context.validate_geometry_constraints_after_layout(self);
            }
        }
    }

    /// Box model violations across every formatting context of the pass.
    #[must_use]
    pub fn check_geometry_constraints(&self) -> Vec<GeometryViolation> {
        self.formatting_contexts()
            .flat_map(|formatting_context| formatting_context.check_geometry_constraints(self))
            .collect()
    }

    /// Where a box ends up in the initial containing block's coordinate
    /// space.
    #[must_use]
    pub fn absolute_box(&self, id: BoxId) -> ComputedBox {
        if id == BoxId::ROOT {
            return self.computed_box(id).clone();
        }
        FormattingContext::map_box_to_ancestor(self, id, BoxId::ROOT)
    }

    /// [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "The containing block in which the root element lives is a rectangle
    /// called the initial containing block. For continuous media, it has the
    /// dimensions of the viewport and is anchored at the canvas origin."
    fn initialize_initial_containing_block(&mut self) {
        let viewport = self.viewport;
        let initial_containing_block = self.computed_box_mut(BoxId::ROOT);
        initial_containing_block.set_top_left(LayoutPoint::ZERO);
        initial_containing_block.set_border(Edges::ZERO);
        initial_containing_block.set_padding(Some(Edges::ZERO));
        initial_containing_block.set_content_box_width(viewport.width);
        initial_containing_block.set_content_box_height(viewport.height);
    }
}
