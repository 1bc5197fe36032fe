//! matplotlib style format strings (`[color][line]`, e.g. `r--`) for the reference line

use plotters::style::{RGBColor, BLACK, BLUE, CYAN, GREEN, MAGENTA, RED, WHITE, YELLOW};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported line style '{0}', expected [color][line] with color in 'bgrcmykw' and line one of '-', '--', ':', '-.'")]
pub struct StyleError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub color: char,
    pub kind: LineKind,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: 'r',
            kind: LineKind::Dashed,
        }
    }
}

fn is_color(code: char) -> bool {
    "bgrcmykw".contains(code)
}

fn parse_kind(line: &str) -> Option<LineKind> {
    match line {
        "" | "-" => Some(LineKind::Solid),
        "--" => Some(LineKind::Dashed),
        ":" => Some(LineKind::Dotted),
        "-." => Some(LineKind::DashDot),
        _ => None,
    }
}

impl FromStr for LineStyle {
    type Err = StyleError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        let error = || StyleError(format.to_owned());
        let format_trimmed = format.trim();

        // the color may lead or trail the line specification
        let (color, line) = match (format_trimmed.chars().next(), format_trimmed.chars().last()) {
            (Some(first), _) if is_color(first) => (first, &format_trimmed[1..]),
            (_, Some(last)) if is_color(last) => {
                (last, &format_trimmed[..format_trimmed.len() - 1])
            }
            _ => ('b', format_trimmed),
        };

        Ok(Self {
            color,
            kind: parse_kind(line).ok_or_else(error)?,
        })
    }
}

impl LineStyle {
    pub fn rgb(&self) -> RGBColor {
        match self.color {
            'b' => BLUE,
            'g' => GREEN,
            'r' => RED,
            'c' => CYAN,
            'm' => MAGENTA,
            'y' => YELLOW,
            'k' => BLACK,
            'w' => WHITE,
            _ => BLUE,
        }
    }

    /// dash length and gap in pixels, `None` for a solid line
    pub fn dash_pattern(&self) -> Option<(u32, u32)> {
        match self.kind {
            LineKind::Solid => None,
            LineKind::Dashed => Some((10, 6)),
            LineKind::Dotted => Some((2, 4)),
            LineKind::DashDot => Some((8, 4)),
        }
    }
}
