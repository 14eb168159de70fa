//! The layout box tree.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! # Design
//!
//! Boxes live in an arena and refer to each other through [`BoxId`] indices,
//! the same way the DOM tree does. Containing-block links always point at an
//! ancestor, so walking them never cycles.
//!
//! Tree construction belongs to box generation; layout only reads the tree.
//! [`LayoutTree::append_child`] keeps each containing block's list of
//! out-of-flow descendants up to date as boxes are added.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::box_model::LayoutSize;
use crate::style::{ComputedStyle, PositionType};

/// A type-safe index into the [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub usize);

impl BoxId {
    /// The initial containing block is always at index 0.
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from building a [`LayoutTree`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The id does not name a box in this tree.
    #[error("box {0} does not exist")]
    UnknownBox(BoxId),
    /// The box is a leaf and cannot take children.
    #[error("box {0} is not a container and cannot have children")]
    NotAContainer(BoxId),
    /// An out-of-flow box found no box to act as its containing block.
    #[error("out-of-flow box {0} has no containing block")]
    MissingContainingBlock(BoxId),
}

/// Classification facts decided during box generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BoxFlags {
    /// [§ 9.2.1](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    /// "Block-level boxes are boxes that participate in a block formatting context."
    pub block_level: bool,
    /// [§ 3.1](https://www.w3.org/TR/CSS2/conform.html#replaced-element)
    /// "An element whose content is outside the scope of the CSS formatting model."
    pub replaced: bool,
    /// [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    /// Floats, 'overflow' other than 'visible', inline-blocks and the like.
    /// Out-of-flow boxes establish one regardless of this flag.
    pub establishes_formatting_context: bool,
}

impl BoxFlags {
    /// A block-level box.
    #[must_use]
    pub const fn block() -> Self {
        Self {
            block_level: true,
            replaced: false,
            establishes_formatting_context: false,
        }
    }

    /// A block-level box that roots its own formatting context.
    #[must_use]
    pub const fn block_formatting_root() -> Self {
        Self {
            block_level: true,
            replaced: false,
            establishes_formatting_context: true,
        }
    }

    /// A replaced block-level box.
    #[must_use]
    pub const fn replaced() -> Self {
        Self {
            block_level: true,
            replaced: true,
            establishes_formatting_context: false,
        }
    }
}

/// Child bookkeeping of a box that can contain other boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    children: Vec<BoxId>,
    out_of_flow_descendants: Vec<BoxId>,
}

/// A node in the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    style: ComputedStyle,
    flags: BoxFlags,
    intrinsic_size: Option<LayoutSize>,
    name: Option<String>,
    parent: Option<BoxId>,
    container: Option<Container>,
    initial_containing_block: bool,
}

impl LayoutBox {
    /// A leaf box (no children).
    #[must_use]
    pub const fn leaf(style: ComputedStyle, flags: BoxFlags) -> Self {
        Self {
            style,
            flags,
            intrinsic_size: None,
            name: None,
            parent: None,
            container: None,
            initial_containing_block: false,
        }
    }

    /// A box that can have children.
    #[must_use]
    pub fn container(style: ComputedStyle, flags: BoxFlags) -> Self {
        Self {
            container: Some(Container::default()),
            ..Self::leaf(style, flags)
        }
    }

    /// Attach a debugging name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the natural size of a replaced box.
    #[must_use]
    pub fn with_intrinsic_size(mut self, size: LayoutSize) -> Self {
        self.intrinsic_size = Some(size);
        self
    }

    /// The computed style.
    #[must_use]
    pub const fn style(&self) -> &ComputedStyle {
        &self.style
    }

    /// The classification flags.
    #[must_use]
    pub const fn flags(&self) -> BoxFlags {
        self.flags
    }

    /// Natural size of a replaced box, if known.
    #[must_use]
    pub const fn intrinsic_size(&self) -> Option<LayoutSize> {
        self.intrinsic_size
    }

    /// Debugging name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The parent in the box tree (not necessarily the containing block).
    #[must_use]
    pub const fn parent(&self) -> Option<BoxId> {
        self.parent
    }

    /// Whether this box can have children.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.container.is_some()
    }

    /// The children in document order.
    #[must_use]
    pub fn children(&self) -> &[BoxId] {
        self.container
            .as_ref()
            .map_or(&[], |container| container.children.as_slice())
    }

    /// Whether this box has at least one child.
    #[must_use]
    pub fn has_child(&self) -> bool {
        !self.children().is_empty()
    }

    /// Out-of-flow boxes whose containing block is this box, in insertion order.
    #[must_use]
    pub fn out_of_flow_descendants(&self) -> &[BoxId] {
        self.container
            .as_ref()
            .map_or(&[], |container| container.out_of_flow_descendants.as_slice())
    }

    /// The positioning scheme.
    #[must_use]
    pub const fn position(&self) -> PositionType {
        self.style.position
    }

    /// 'position' is not 'static'.
    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        self.style.position.is_positioned()
    }

    /// Relatively positioned: laid out in flow, then offset.
    #[must_use]
    pub const fn is_in_flow_positioned(&self) -> bool {
        matches!(self.style.position, PositionType::Relative)
    }

    /// Absolutely or fixed positioned.
    #[must_use]
    pub const fn is_out_of_flow_positioned(&self) -> bool {
        self.style.position.is_out_of_flow()
    }

    /// Participates in normal flow.
    #[must_use]
    pub const fn is_in_flow(&self) -> bool {
        !self.is_out_of_flow_positioned()
    }

    /// Block-level box.
    #[must_use]
    pub const fn is_block_level(&self) -> bool {
        self.flags.block_level
    }

    /// Replaced element.
    #[must_use]
    pub const fn is_replaced(&self) -> bool {
        self.flags.replaced
    }

    /// [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    /// "The containing block in which the root element lives is a rectangle
    /// called the initial containing block."
    #[must_use]
    pub const fn is_initial_containing_block(&self) -> bool {
        self.initial_containing_block
    }

    /// [§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Floats, absolutely positioned elements, block containers ... that are
    /// not block boxes, and block boxes with 'overflow' other than 'visible'
    /// ... establish new block formatting contexts for their contents."
    #[must_use]
    pub const fn establishes_formatting_context(&self) -> bool {
        self.flags.establishes_formatting_context
            || self.initial_containing_block
            || self.is_out_of_flow_positioned()
    }
}

/// Arena-based layout box tree.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    /// All boxes, indexed by `BoxId`. The initial containing block is at
    /// index 0 (`BoxId::ROOT`).
    boxes: Vec<LayoutBox>,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    /// Create a tree holding only the initial containing block.
    #[must_use]
    pub fn new() -> Self {
        let mut initial_containing_block =
            LayoutBox::container(ComputedStyle::default(), BoxFlags::block_formatting_root())
                .with_name("initial containing block");
        initial_containing_block.initial_containing_block = true;
        Self {
            boxes: vec![initial_containing_block],
        }
    }

    /// The initial containing block.
    #[must_use]
    pub const fn root(&self) -> BoxId {
        BoxId::ROOT
    }

    /// Get a box by its id.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    /// Get a box that is known to belong to this tree.
    ///
    /// # Panics
    /// Panics if `id` was not handed out by this tree.
    #[must_use]
    pub fn layout_box(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }

    /// Number of boxes, including the initial containing block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Always false: the initial containing block is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Every box id in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = BoxId> {
        (0..self.boxes.len()).map(BoxId)
    }

    /// Append `layout_box` as the last child of `parent`.
    ///
    /// Out-of-flow boxes are also registered with their containing block.
    ///
    /// # Errors
    /// Fails if `parent` does not exist or cannot have children.
    pub fn append_child(
        &mut self,
        parent: BoxId,
        mut layout_box: LayoutBox,
    ) -> Result<BoxId, TreeError> {
        let parent_box = self.get(parent).ok_or(TreeError::UnknownBox(parent))?;
        if !parent_box.is_container() {
            return Err(TreeError::NotAContainer(parent));
        }

        let id = BoxId(self.boxes.len());
        layout_box.parent = Some(parent);
        layout_box.initial_containing_block = false;
        self.boxes.push(layout_box);

        if let Some(container) = self.boxes[parent.0].container.as_mut() {
            container.children.push(id);
        }

        if self.boxes[id.0].is_out_of_flow_positioned() {
            let containing_block = self
                .containing_block(id)
                .ok_or(TreeError::MissingContainingBlock(id))?;
            if let Some(container) = self.boxes[containing_block.0].container.as_mut() {
                container.out_of_flow_descendants.push(id);
            }
        }

        Ok(id)
    }

    /// The parent of a box.
    #[must_use]
    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self.get(id).and_then(LayoutBox::parent)
    }

    /// The children of a box.
    #[must_use]
    pub fn children(&self, id: BoxId) -> &[BoxId] {
        self.get(id).map_or(&[], LayoutBox::children)
    }

    /// The children of a box that participate in normal flow.
    pub fn in_flow_children(&self, id: BoxId) -> impl Iterator<Item = BoxId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.layout_box(child).is_in_flow())
    }

    /// Out-of-flow boxes whose containing block is `id`, in insertion order.
    #[must_use]
    pub fn out_of_flow_descendants(&self, id: BoxId) -> &[BoxId] {
        self.get(id).map_or(&[], LayoutBox::out_of_flow_descendants)
    }

    /// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// 1. The initial containing block has none.
    /// 2. "If the element's position is 'relative' or 'static', the containing
    ///    block is formed by the content edge of the nearest ancestor box that
    ///    is a block container." Inline formatting is not modelled, so every
    ///    container acts as a block container and this is the parent.
    /// 3. "If the element has 'position: fixed', the containing block is
    ///    established by the viewport", the initial containing block here.
    /// 4. "If the element has 'position: absolute', the containing block is
    ///    established by the nearest ancestor with a 'position' of
    ///    'absolute', 'relative' or 'fixed' ... If there is no such ancestor,
    ///    the containing block is the initial containing block."
    #[must_use]
    pub fn containing_block(&self, id: BoxId) -> Option<BoxId> {
        let layout_box = self.get(id)?;
        if layout_box.is_initial_containing_block() {
            return None;
        }
        match layout_box.position() {
            PositionType::Static | PositionType::Relative => layout_box.parent(),
            PositionType::Fixed => Some(BoxId::ROOT),
            PositionType::Absolute => self
                .ancestors(id)
                .find(|&ancestor| {
                    let ancestor_box = self.layout_box(ancestor);
                    ancestor_box.is_positioned() || ancestor_box.is_initial_containing_block()
                })
                .or(Some(BoxId::ROOT)),
        }
    }

    /// The containing block of `id`, then its containing block, and so on up
    /// to the initial containing block.
    #[must_use]
    pub fn containing_blocks(&self, id: BoxId) -> ContainingBlockIterator<'_> {
        ContainingBlockIterator {
            tree: self,
            current: self.containing_block(id),
        }
    }

    /// Proper ancestors of `id`, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: BoxId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Whether `ancestor` is a proper ancestor of `id` in the box tree.
    #[must_use]
    pub fn is_descendant_of(&self, id: BoxId, ancestor: BoxId) -> bool {
        self.ancestors(id).any(|candidate| candidate == ancestor)
    }

    /// The root of the formatting context `id` participates in: the first
    /// box along the containing-block chain that establishes one.
    #[must_use]
    pub fn formatting_context_root(&self, id: BoxId) -> Option<BoxId> {
        self.containing_blocks(id)
            .find(|&ancestor| self.layout_box(ancestor).establishes_formatting_context())
    }

    /// All proper descendants of `id` in pre-order.
    #[must_use]
    pub fn descendants(&self, id: BoxId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Human readable label for logs and reports.
    #[must_use]
    pub fn label(&self, id: BoxId) -> String {
        match self.get(id).and_then(LayoutBox::name) {
            Some(name) => format!("{id} ({name})"),
            None => id.to_string(),
        }
    }
}

/// Iterator over proper ancestors of a box.
pub struct AncestorIterator<'a> {
    tree: &'a LayoutTree,
    current: Option<BoxId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator along a containing-block chain.
pub struct ContainingBlockIterator<'a> {
    tree: &'a LayoutTree,
    current: Option<BoxId>,
}

impl Iterator for ContainingBlockIterator<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.containing_block(id);
        Some(id)
    }
}

/// Pre-order iterator over descendants of a box.
pub struct DescendantIterator<'a> {
    tree: &'a LayoutTree,
    stack: Vec<BoxId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positioned(position: PositionType) -> ComputedStyle {
        ComputedStyle::positioned(position)
    }

    #[test]
    fn test_new_tree_has_initial_containing_block() {
        let tree = LayoutTree::new();
        let root = tree.layout_box(tree.root());
        assert!(root.is_initial_containing_block());
        assert!(root.establishes_formatting_context());
        assert_eq!(tree.containing_block(tree.root()), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_append_to_leaf_fails() {
        let mut tree = LayoutTree::new();
        let leaf = tree
            .append_child(BoxId::ROOT, LayoutBox::leaf(ComputedStyle::default(), BoxFlags::block()))
            .unwrap();
        let result = tree.append_child(
            leaf,
            LayoutBox::leaf(ComputedStyle::default(), BoxFlags::block()),
        );
        assert_eq!(result, Err(TreeError::NotAContainer(leaf)));
        assert_eq!(
            tree.append_child(BoxId(99), LayoutBox::leaf(ComputedStyle::default(), BoxFlags::block())),
            Err(TreeError::UnknownBox(BoxId(99)))
        );
    }

    #[test]
    fn test_absolute_box_registers_with_nearest_positioned_ancestor() {
        let mut tree = LayoutTree::new();
        let relative = tree
            .append_child(
                BoxId::ROOT,
                LayoutBox::container(positioned(PositionType::Relative), BoxFlags::block()),
            )
            .unwrap();
        let wrapper = tree
            .append_child(
                relative,
                LayoutBox::container(ComputedStyle::default(), BoxFlags::block()),
            )
            .unwrap();
        let absolute = tree
            .append_child(
                wrapper,
                LayoutBox::leaf(positioned(PositionType::Absolute), BoxFlags::block()),
            )
            .unwrap();
        let fixed = tree
            .append_child(
                wrapper,
                LayoutBox::leaf(positioned(PositionType::Fixed), BoxFlags::block()),
            )
            .unwrap();

        assert_eq!(tree.containing_block(absolute), Some(relative));
        assert_eq!(tree.containing_block(fixed), Some(BoxId::ROOT));
        assert_eq!(tree.containing_block(wrapper), Some(relative));
        assert_eq!(tree.out_of_flow_descendants(relative), &[absolute]);
        assert_eq!(tree.out_of_flow_descendants(BoxId::ROOT), &[fixed]);
        assert!(tree.out_of_flow_descendants(wrapper).is_empty());
        assert_eq!(tree.in_flow_children(wrapper).count(), 0);
    }

    #[test]
    fn test_containing_block_chain_and_formatting_root() {
        let mut tree = LayoutTree::new();
        let outer = tree
            .append_child(
                BoxId::ROOT,
                LayoutBox::container(positioned(PositionType::Absolute), BoxFlags::block()),
            )
            .unwrap();
        let inner = tree
            .append_child(
                outer,
                LayoutBox::container(ComputedStyle::default(), BoxFlags::block()),
            )
            .unwrap();
        let leaf = tree
            .append_child(inner, LayoutBox::leaf(ComputedStyle::default(), BoxFlags::block()))
            .unwrap();

        assert_eq!(
            tree.containing_blocks(leaf).collect::<Vec<_>>(),
            vec![inner, outer, BoxId::ROOT]
        );
        assert_eq!(tree.formatting_context_root(leaf), Some(outer));
        assert_eq!(tree.formatting_context_root(outer), Some(BoxId::ROOT));
        assert!(tree.is_descendant_of(leaf, BoxId::ROOT));
        assert!(!tree.is_descendant_of(outer, leaf));
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let mut tree = LayoutTree::new();
        let a = tree
            .append_child(BoxId::ROOT, LayoutBox::container(ComputedStyle::default(), BoxFlags::block()))
            .unwrap();
        let a1 = tree
            .append_child(a, LayoutBox::leaf(ComputedStyle::default(), BoxFlags::block()))
            .unwrap();
        let b = tree
            .append_child(BoxId::ROOT, LayoutBox::leaf(ComputedStyle::default(), BoxFlags::block()))
            .unwrap();

        assert_eq!(tree.descendants(BoxId::ROOT).collect::<Vec<_>>(), vec![a, a1, b]);
        assert_eq!(tree.label(BoxId::ROOT), "#0 (initial containing block)");
        assert_eq!(tree.label(b), "#3");
    }
}
