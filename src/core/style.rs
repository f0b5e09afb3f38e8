//! Plot styles understood by `with <style>`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rendering style applied to every series drawn after it is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotStyle {
    Lines,
    #[default]
    Points,
    LinesPoints,
    Impulses,
    Dots,
    Steps,
    ErrorBars,
    Boxes,
    BoxErrorBars,
}

/// Returned when a style name is not one of the known styles
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown plot style: {0:?}")]
pub struct UnknownStyle(pub String);

impl PlotStyle {
    pub const ALL: [PlotStyle; 9] = [
        PlotStyle::Lines,
        PlotStyle::Points,
        PlotStyle::LinesPoints,
        PlotStyle::Impulses,
        PlotStyle::Dots,
        PlotStyle::Steps,
        PlotStyle::ErrorBars,
        PlotStyle::Boxes,
        PlotStyle::BoxErrorBars,
    ];

    /// Name as written in a gnuplot command
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotStyle::Lines => "lines",
            PlotStyle::Points => "points",
            PlotStyle::LinesPoints => "linespoints",
            PlotStyle::Impulses => "impulses",
            PlotStyle::Dots => "dots",
            PlotStyle::Steps => "steps",
            PlotStyle::ErrorBars => "errorbars",
            PlotStyle::Boxes => "boxes",
            PlotStyle::BoxErrorBars => "boxerrorbars",
        }
    }
}

impl FromStr for PlotStyle {
    type Err = UnknownStyle;

    /// Exact, case-sensitive match. `"impulses_extra"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlotStyle::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

impl fmt::Display for PlotStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
