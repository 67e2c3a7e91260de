//! PlantUML C4 to draw.io conversion
//!
//! The conversion capability behind `/convert`: parse a C4 model subset,
//! place the elements on a rank grid, and emit an uncompressed draw.io
//! (mxGraph) XML document. Pure text-in, text-out; callers treat it as an
//! opaque function that either returns the document or fails with a
//! human-readable message.

mod drawio;
mod parser;

use std::fmt;

use thiserror::Error;

/// Default sibling separation within a rank, in pixels
pub const DEFAULT_NODESEP: u32 = 60;
/// Default separation between ranks, in pixels
pub const DEFAULT_RANKSEP: u32 = 80;
/// Default horizontal drawing margin, in pixels
pub const DEFAULT_MARGINX: u32 = 20;
/// Default vertical drawing margin, in pixels
pub const DEFAULT_MARGINY: u32 = 20;

/// Graph drawing orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    #[default]
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl LayoutDirection {
    /// Parse a query-string value; accepts exactly TB, BT, LR or RL
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TB" => Some(Self::TopToBottom),
            "BT" => Some(Self::BottomToTop),
            "LR" => Some(Self::LeftToRight),
            "RL" => Some(Self::RightToLeft),
            _ => None,
        }
    }

    /// Ranks advance along the x axis instead of the y axis
    const fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// Ranks are laid out from the far edge back toward the origin
    const fn is_reversed(self) -> bool {
        matches!(self, Self::BottomToTop | Self::RightToLeft)
    }
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopToBottom => "TB",
            Self::BottomToTop => "BT",
            Self::LeftToRight => "LR",
            Self::RightToLeft => "RL",
        };
        f.write_str(name)
    }
}

/// Layout options forwarded from the /convert query string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub direction: LayoutDirection,
    pub nodesep: u32,
    pub ranksep: u32,
    pub marginx: u32,
    pub marginy: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::default(),
            nodesep: DEFAULT_NODESEP,
            ranksep: DEFAULT_RANKSEP,
            marginx: DEFAULT_MARGINX,
            marginy: DEFAULT_MARGINY,
        }
    }
}

/// Conversion failure carrying a human-readable message
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("no diagram elements found in input")]
    EmptyDiagram,
}

/// Convert PlantUML C4 source text into a draw.io XML document
pub fn convert(source: &str, options: &ConvertOptions) -> Result<String, ConvertError> {
    let diagram = parser::parse(source)?;
    Ok(drawio::render(&diagram, options))
}
