//! Conversion options and their string forms.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Error returned when an option value is not one of the accepted names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for {option} (expected one of: {expected})")]
pub struct ParseOptionError {
    pub option: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// How `[label](url)` links are rendered.
#[derive(clap::ValueEnum, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// Keep only the label.
    Label,
    /// Keep only the URL.
    Url,
    /// Label, then the URL on the next line.
    #[default]
    Both,
}

/// How pipe tables are rendered.
#[derive(clap::ValueEnum, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    /// Drop tables entirely.
    Strip,
    /// Cells joined by single spaces, no pipes.
    #[default]
    Space,
    /// Raw rows without the alignment separator.
    Keep,
}

/// Which underline follows a converted heading.
#[derive(clap::ValueEnum, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeadingSeparator {
    /// `======` for levels 1-2, `------` below.
    #[default]
    Equals,
    /// `------` for every level.
    Dashes,
}

impl HeadingSeparator {
    /// Separator line for a heading of `level` (1-6).
    pub const fn line_for(self, level: usize) -> &'static str {
        match self {
            Self::Equals if level <= 2 => "======",
            Self::Equals | Self::Dashes => "------",
        }
    }
}

macro_rules! named_enum {
    ($ty:ty, $option:literal, $expected:literal, { $($variant:path => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// The lower-case name used on the command line and in flag files.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseOptionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($variant),)+
                    _ => Err(ParseOptionError {
                        option: $option,
                        value: s.to_string(),
                        expected: $expected,
                    }),
                }
            }
        }
    };
}

named_enum!(LinkMode, "links", "label, url, both", {
    LinkMode::Label => "label",
    LinkMode::Url => "url",
    LinkMode::Both => "both",
});

named_enum!(TableMode, "table", "strip, space, keep", {
    TableMode::Strip => "strip",
    TableMode::Space => "space",
    TableMode::Keep => "keep",
});

named_enum!(HeadingSeparator, "heading-separator", "equals, dashes", {
    HeadingSeparator::Equals => "equals",
    HeadingSeparator::Dashes => "dashes",
});

/// Options threaded through the conversion pipeline.
///
/// Every field has a documented default, so `ConvertOptions::default()`
/// reproduces the stock behavior.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Emit `[b]...[/b]` for bold; when false the markers are stripped.
    pub bold: bool,
    pub links: LinkMode,
    pub table: TableMode,
    pub heading_separator: HeadingSeparator,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            bold: true,
            links: LinkMode::default(),
            table: TableMode::default(),
            heading_separator: HeadingSeparator::default(),
        }
    }
}

impl ConvertOptions {
    pub const fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub const fn with_links(mut self, links: LinkMode) -> Self {
        self.links = links;
        self
    }

    pub const fn with_table(mut self, table: TableMode) -> Self {
        self.table = table;
        self
    }

    pub const fn with_heading_separator(mut self, heading_separator: HeadingSeparator) -> Self {
        self.heading_separator = heading_separator;
        self
    }
}
