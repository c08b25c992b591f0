//! Rich text: the component tree, colors, the markup codec and the
//! privilege-aware formatter.

pub mod codec;
pub mod color;
pub mod component;
pub mod formatter;

pub use codec::{MarkupCodec, MiniMarkup};
pub use color::Color;
pub use component::{Component, Decorations, RenderedMessage, Span};
pub use formatter::{last_color, TextFormatter};
