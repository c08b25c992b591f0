//! Immutable rich-text component tree.

use crate::markup::color::Color;

/// Text decorations. A decoration set on a parent applies to all children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decorations {
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
}

impl Decorations {
    fn merge(self, other: Decorations) -> Self {
        Self {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underlined: self.underlined || other.underlined,
            strikethrough: self.strikethrough || other.strikethrough,
        }
    }
}

/// A node of rendered rich text.
///
/// Styles cascade from parent to children unless a child overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Component {
    content: String,
    color: Option<Color>,
    decorations: Decorations,
    children: Vec<Component>,
}

/// A message after template resolution and deserialization.
pub type RenderedMessage = Component;

/// A run of text with its effective (inherited) style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub color: Option<Color>,
    pub decorations: Decorations,
}

impl Component {
    /// An unstyled component with no text of its own.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An unstyled text component.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    pub fn with_decorations(mut self, decorations: Decorations) -> Self {
        self.decorations = decorations;
        self
    }

    /// Append a child.
    pub fn append(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn push_child(&mut self, child: Component) {
        self.children.push(child);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn decorations(&self) -> Decorations {
        self.decorations
    }

    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// Concatenated text of the whole tree, styles dropped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.content);
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Text runs with their effective style. Adjacent runs with the same
    /// style are merged.
    pub fn spans(&self) -> Vec<Span> {
        let mut spans = Vec::new();
        self.collect_spans(None, Decorations::default(), &mut spans);
        spans
    }

    fn collect_spans(&self, color: Option<Color>, decorations: Decorations, out: &mut Vec<Span>) {
        let color = self.color.or(color);
        let decorations = decorations.merge(self.decorations);

        if !self.content.is_empty() {
            match out.last_mut() {
                Some(last) if last.color == color && last.decorations == decorations => {
                    last.text.push_str(&self.content);
                }
                _ => out.push(Span {
                    text: self.content.clone(),
                    color,
                    decorations,
                }),
            }
        }

        for child in &self.children {
            child.collect_spans(color, decorations, out);
        }
    }
}
