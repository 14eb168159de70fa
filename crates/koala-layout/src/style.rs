//! The computed style values consumed by layout.
//!
//! Style resolution happens elsewhere; this module only describes the subset
//! of [`ComputedStyle`] that box geometry reads.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::values::{AutoOr, LengthPercentage};

/// [§ 9.3.1 Choosing a positioning scheme: 'position' property](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// "The 'position' and 'float' properties determine which of the CSS 2
/// positioning algorithms is used to calculate the position of a box."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PositionType {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow.
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the
    /// 'top', 'right', 'bottom', and 'left' properties."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but in addition, the box is fixed with respect to some reference."
    Fixed,
}

impl PositionType {
    /// "An element is said to be positioned if its 'position' property has a
    /// value other than 'static'."
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }

    /// Absolutely positioned boxes (including fixed) are taken out of flow.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// [§ 9.3.2 Box offsets: 'top', 'right', 'bottom', 'left'](https://www.w3.org/TR/CSS2/visuren.html#position-props)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxOffsets {
    /// How far the top margin edge is offset below the containing block's top edge.
    pub top: AutoOr,
    /// How far the right margin edge is offset left of the containing block's right edge.
    pub right: AutoOr,
    /// How far the bottom margin edge is offset above the containing block's bottom edge.
    pub bottom: AutoOr,
    /// How far the left margin edge is offset right of the containing block's left edge.
    pub left: AutoOr,
}

/// Margins: each side is a length, a percentage of the containing block
/// width, or 'auto'.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoEdges {
    /// Top edge value.
    pub top: AutoOr,
    /// Right edge value.
    pub right: AutoOr,
    /// Bottom edge value.
    pub bottom: AutoOr,
    /// Left edge value.
    pub left: AutoOr,
}

impl Default for AutoEdges {
    // [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    // "Initial: 0"
    fn default() -> Self {
        Self::uniform(AutoOr::px(0.0))
    }
}

impl AutoEdges {
    /// The same value on all four sides.
    #[must_use]
    pub const fn uniform(value: AutoOr) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Padding: each side is a length or a percentage of the containing block
/// width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthEdges {
    /// Top edge value.
    pub top: LengthPercentage,
    /// Right edge value.
    pub right: LengthPercentage,
    /// Bottom edge value.
    pub bottom: LengthPercentage,
    /// Left edge value.
    pub left: LengthPercentage,
}

impl LengthEdges {
    /// The same value on all four sides.
    #[must_use]
    pub const fn uniform(value: LengthPercentage) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Whether any side is a percentage.
    #[must_use]
    pub const fn has_percentage(&self) -> bool {
        self.top.is_percentage()
            || self.right.is_percentage()
            || self.bottom.is_percentage()
            || self.left.is_percentage()
    }
}

/// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
///
/// Border widths in CSS pixels. "Percentages: N/A".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderWidths {
    /// Top border width.
    pub top: f32,
    /// Right border width.
    pub right: f32,
    /// Bottom border width.
    pub bottom: f32,
    /// Left border width.
    pub left: f32,
}

impl BorderWidths {
    /// The same width on all four sides.
    #[must_use]
    pub const fn uniform(width: f32) -> Self {
        Self {
            top: width,
            right: width,
            bottom: width,
            left: width,
        }
    }
}

/// The computed values layout needs from one box's style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ComputedStyle {
    /// The positioning scheme.
    pub position: PositionType,
    /// [§ 10.2 Content width](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: AutoOr,
    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: AutoOr,
    /// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    pub min_width: AutoOr,
    /// 'auto' means 'none'.
    pub max_width: AutoOr,
    /// [§ 10.7 Minimum and maximum heights](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub min_height: AutoOr,
    /// 'auto' means 'none'.
    pub max_height: AutoOr,
    /// 'top', 'right', 'bottom' and 'left'.
    #[serde(flatten)]
    pub offsets: BoxOffsets,
    /// Margin properties.
    pub margin: AutoEdges,
    /// Padding properties.
    pub padding: LengthEdges,
    /// Border width properties.
    pub border_width: BorderWidths,
}

impl ComputedStyle {
    /// Style of a box with the given positioning scheme and initial values
    /// everywhere else.
    #[must_use]
    pub fn positioned(position: PositionType) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}
