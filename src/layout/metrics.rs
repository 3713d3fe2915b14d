// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storyweb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storyweb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text measurement behind an injected trait, so item bounds stay a pure
//! function of content without dragging a font stack into the engine.

use crate::model::Node;

/// Font parameters that affect measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSpec {
    size: u32,
    bold: bool,
    italic: bool,
    underline: bool,
}

impl FontSpec {
    pub fn new(size: u32, bold: bool, italic: bool, underline: bool) -> Self {
        Self { size, bold, italic, underline }
    }

    pub fn of_node(node: &Node) -> Self {
        Self::new(node.size(), node.bold(), node.italic(), node.underline())
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn italic(&self) -> bool {
        self.italic
    }

    pub fn underline(&self) -> bool {
        self.underline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSize {
    width: f64,
    height: f64,
}

impl TextSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Measures a single line of text for bounds computation.
///
/// Implementations must be deterministic: the same text and font always
/// yield the same size, so the scene can query bounds before committing a
/// mutation.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> TextSize;
}

/// Default measurer with a per-character advance table in em units.
///
/// Hosts with a real font stack inject their own measurer; this one exists
/// so the engine (and its tests) have stable metrics without font data.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCellMeasurer;

const LINE_HEIGHT_EM: f64 = 1.3;
const BOLD_FACTOR: f64 = 1.05;

impl CharCellMeasurer {
    fn advance_em(c: char) -> f64 {
        match c {
            'i' | 'j' | 'l' | 'f' | 't' | 'r' | '.' | ',' | '\'' | '!' | '|' | ':' | ';' => 0.35,
            'm' | 'w' | 'M' | 'W' | '@' => 0.85,
            ' ' => 0.4,
            c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.65,
            _ => 0.55,
        }
    }
}

impl TextMeasurer for CharCellMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> TextSize {
        let em = f64::from(font.size());
        let mut width: f64 = text.chars().map(|c| Self::advance_em(c) * em).sum();
        if font.bold() {
            width *= BOLD_FACTOR;
        }
        TextSize::new(width, em * LINE_HEIGHT_EM)
    }
}

#[cfg(test)]
mod tests {
    use super::{CharCellMeasurer, FontSpec, TextMeasurer};

    #[test]
    fn measure_is_deterministic() {
        let measurer = CharCellMeasurer;
        let font = FontSpec::new(12, false, false, false);
        let first = measurer.measure("New event", &font);
        let second = measurer.measure("New event", &font);
        assert_eq!(first, second);
    }

    #[test]
    fn wider_text_measures_wider() {
        let measurer = CharCellMeasurer;
        let font = FontSpec::new(12, false, false, false);
        let short = measurer.measure("hi", &font);
        let long = measurer.measure("a considerably longer label", &font);
        assert!(long.width() > short.width());
        assert_eq!(long.height(), short.height());
    }

    #[test]
    fn bold_text_measures_wider_than_regular() {
        let measurer = CharCellMeasurer;
        let regular = measurer.measure("label", &FontSpec::new(12, false, false, false));
        let bold = measurer.measure("label", &FontSpec::new(12, true, false, false));
        assert!(bold.width() > regular.width());
    }

    #[test]
    fn size_scales_measurement_linearly() {
        let measurer = CharCellMeasurer;
        let small = measurer.measure("label", &FontSpec::new(10, false, false, false));
        let large = measurer.measure("label", &FontSpec::new(20, false, false, false));
        assert!((large.width() - small.width() * 2.0).abs() < 1e-9);
        assert!((large.height() - small.height() * 2.0).abs() < 1e-9);
    }
}
