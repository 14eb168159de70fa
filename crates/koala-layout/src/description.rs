//! Serializable box-tree descriptions.
//!
//! The CLI and tests describe trees as JSON instead of running box
//! generation. A box with a `children` array is a container, even when the
//! array is empty; a box without one is a leaf.
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600 },
//!   "children": [
//!     { "name": "abs", "style": { "position": "absolute", "left": "0", "right": "0" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::box_model::LayoutSize;
use crate::style::ComputedStyle;
use crate::tree::{BoxFlags, BoxId, LayoutBox, LayoutTree, TreeError};

const fn default_true() -> bool {
    true
}

/// A width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeDescription {
    /// Width in px.
    pub width: f32,
    /// Height in px.
    pub height: f32,
}

impl From<SizeDescription> for LayoutSize {
    fn from(size: SizeDescription) -> Self {
        Self::from_px(size.width, size.height)
    }
}

/// One box and, for containers, its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BoxDescription {
    /// Debugging name shown in reports.
    #[serde(default)]
    pub name: Option<String>,
    /// Computed style; unspecified properties take their initial values.
    #[serde(default)]
    pub style: ComputedStyle,
    /// Defaults to true: most generated boxes are block-level here.
    #[serde(default = "default_true")]
    pub block_level: bool,
    /// Replaced element such as an image.
    #[serde(default)]
    pub replaced: bool,
    /// Roots its own formatting context even when in flow.
    #[serde(default)]
    pub establishes_formatting_context: bool,
    /// Natural size of a replaced element.
    #[serde(default)]
    pub intrinsic_size: Option<SizeDescription>,
    /// Present for containers.
    #[serde(default)]
    pub children: Option<Vec<BoxDescription>>,
}

impl BoxDescription {
    fn to_layout_box(&self) -> LayoutBox {
        let flags = BoxFlags {
            block_level: self.block_level,
            replaced: self.replaced,
            establishes_formatting_context: self.establishes_formatting_context,
        };
        let mut layout_box = if self.children.is_some() {
            LayoutBox::container(self.style.clone(), flags)
        } else {
            LayoutBox::leaf(self.style.clone(), flags)
        };
        if let Some(name) = &self.name {
            layout_box = layout_box.with_name(name.clone());
        }
        if let Some(size) = self.intrinsic_size {
            layout_box = layout_box.with_intrinsic_size(size.into());
        }
        layout_box
    }
}

/// A whole document: the viewport and the children of the initial
/// containing block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeDescription {
    /// Size of the initial containing block.
    pub viewport: SizeDescription,
    /// Top-level boxes.
    #[serde(default)]
    pub children: Vec<BoxDescription>,
}

impl TreeDescription {
    /// The viewport as a layout size.
    #[must_use]
    pub fn viewport_size(&self) -> LayoutSize {
        self.viewport.into()
    }
}

impl LayoutTree {
    /// Build a tree from a description, appending boxes in document order.
    ///
    /// # Errors
    /// Propagates [`TreeError`] from [`LayoutTree::append_child`].
    pub fn from_description(description: &TreeDescription) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for child in &description.children {
            let _ = tree.append_description(BoxId::ROOT, child)?;
        }
        Ok(tree)
    }

    fn append_description(
        &mut self,
        parent: BoxId,
        description: &BoxDescription,
    ) -> Result<BoxId, TreeError> {
        let id = self.append_child(parent, description.to_layout_box())?;
        for child in description.children.iter().flatten() {
            let _ = self.append_description(id, child)?;
        }
        Ok(id)
    }
}
