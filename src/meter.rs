use {
    crate::style::StyleName,
    std::iter::{once, repeat_n},
};

/// the glyph layout of a bar graph.
///
/// this describes what to draw; the caller places it on the screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Meter {
    /// the number of filled glyphs.
    pub filled: usize,
    /// the number of empty glyphs.
    pub empty: usize,
    /// the value, formatted to two decimal places with a trailing `%`.
    pub label: String,
}

// === impl Meter ===

impl Meter {
    const GLYPH: char = '|';
    const BORDER_L: char = '[';
    const BORDER_R: char = ']';

    /// lays out `value` on a bar `width` glyphs wide, where `max` fills the bar.
    ///
    /// values outside of `0..=max` are clamped, so the bar never overflows its brackets.
    pub fn render(value: f64, max: f64, width: usize) -> Self {
        debug_assert!(max > 0.0, "meter maximum must be positive");
        debug_assert!(width >= 1, "meter must be at least one glyph wide");

        let filled = if value.is_nan() || max.is_nan() || max <= 0.0 {
            0
        } else {
            let value = value.clamp(0.0, max);
            ((width as f64 * value / max).floor() as usize).min(width)
        };

        Self {
            filled,
            empty: width - filled,
            label: format!("{value:.2}%"),
        }
    }

    /// the total number of glyphs between the brackets.
    pub fn width(&self) -> usize {
        self.filled + self.empty
    }

    /// returns the styled runs of text that make up this meter, left to right.
    pub fn spans(&self) -> impl Iterator<Item = (StyleName, String)> + '_ {
        let Self {
            filled,
            empty,
            label,
        } = self;

        let run = |n: usize| repeat_n(Self::GLYPH, n).collect::<String>();

        once((StyleName::BarText, Self::BORDER_L.to_string()))
            .chain(once((StyleName::BarFilled, run(*filled))))
            .chain(once((StyleName::BarEmpty, run(*empty))))
            .chain(once((
                StyleName::BarText,
                format!("{} {label}", Self::BORDER_R),
            )))
            .filter(|(_, text)| !text.is_empty())
    }
}
