//! named styles and the palette that resolves them.

use {crossterm::style::Color, std::collections::BTreeMap};

/// a logical style, resolved to concrete colors by a [`Palette`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum StyleName {
    /// system information text.
    Info,
    /// section and table headings.
    Heading,
    /// process table rows.
    Row,
    /// the filled portion of a bar graph.
    BarFilled,
    /// the empty portion of a bar graph.
    BarEmpty,
    /// bar graph brackets and labels.
    BarText,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

/// maps each [`StyleName`] to a [`Style`].
///
/// this is built once at startup and handed to the terminal surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    styles: BTreeMap<StyleName, Style>,
}

// === impl Style ===

impl Style {
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            bold: false,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(Color::White, Color::Black)
    }
}

// === impl Palette ===

impl Palette {
    /// returns the style registered for `name`, or the default style.
    pub fn get(&self, name: StyleName) -> Style {
        self.styles.get(&name).copied().unwrap_or_default()
    }

    /// registers a style, replacing any previous one.
    pub fn with(mut self, name: StyleName, style: Style) -> Self {
        self.styles.insert(name, style);
        self
    }
}

impl Default for Palette {
    fn default() -> Self {
        use {Color::*, StyleName::*};

        let styles = [
            (Info, Style::new(Cyan, Black)),
            (Heading, Style::new(Green, Black).bold()),
            (Row, Style::new(White, Black)),
            (BarFilled, Style::new(Green, Black)),
            (BarEmpty, Style::new(Red, Black)),
            (BarText, Style::new(White, Black)),
        ]
        .into_iter()
        .collect();

        Self { styles }
    }
}
