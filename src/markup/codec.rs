//! Markup codecs.
//!
//! The engine treats the rich-text language as opaque: it only needs to turn a
//! finished markup string into a component tree and to escape untrusted text.
//! `MiniMarkup` is the built-in implementation of a MiniMessage-style syntax:
//!
//! - colors: `<red>`, `<dark_gray>`, `<#00fb9a>`, `<color:gold>`
//! - decorations: `<bold>`/`<b>`, `<italic>`/`<i>`/`<em>`,
//!   `<underlined>`/`<u>`, `<strikethrough>`/`<st>`
//! - `</tag>` closes the innermost matching tag, `<reset>` closes everything
//! - `<newline>`/`<br>` inserts a line break
//! - `\<` and `\\` are literal; anything that is not a known tag is text

use crate::markup::color::Color;
use crate::markup::component::{Component, Decorations, RenderedMessage};

/// The rich-text engine consumed by the formatter.
pub trait MarkupCodec: Send + Sync {
    /// Parse a complete markup string.
    fn deserialize(&self, markup: &str) -> RenderedMessage;

    /// Escape text so that it renders literally when embedded in markup.
    fn escape(&self, text: &str) -> String;
}

/// Built-in MiniMessage-style codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct MiniMarkup;

#[derive(Debug, Clone, PartialEq)]
enum Tag {
    Color { key: String, color: Color },
    Decoration { key: &'static str, decorations: Decorations },
    Close(String),
    Reset,
    Newline,
}

/// An open tag on the parser stack.
struct Frame {
    key: String,
    is_color: bool,
    component: Component,
}

impl MarkupCodec for MiniMarkup {
    fn deserialize(&self, markup: &str) -> RenderedMessage {
        let mut root = Component::empty();
        let mut stack: Vec<Frame> = Vec::new();
        let mut buf = String::new();
        let mut chars = markup.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.peek() {
                    Some(&(_, next)) if next == '<' || next == '\\' => {
                        buf.push(next);
                        chars.next();
                    }
                    _ => buf.push('\\'),
                },
                '<' => {
                    let Some(len) = markup[i + 1..].find('>') else {
                        buf.push('<');
                        continue;
                    };
                    let raw = &markup[i + 1..i + 1 + len];
                    let Some(tag) = parse_tag(raw) else {
                        buf.push('<');
                        continue;
                    };

                    let applied = match tag {
                        Tag::Newline => {
                            buf.push('\n');
                            true
                        }
                        Tag::Reset => {
                            flush(&mut buf, &mut stack, &mut root);
                            while let Some(frame) = stack.pop() {
                                attach(frame.component, &mut stack, &mut root);
                            }
                            true
                        }
                        Tag::Color { key, color } => {
                            flush(&mut buf, &mut stack, &mut root);
                            stack.push(Frame {
                                key,
                                is_color: true,
                                component: Component::empty().with_color(Some(color)),
                            });
                            true
                        }
                        Tag::Decoration { key, decorations } => {
                            flush(&mut buf, &mut stack, &mut root);
                            stack.push(Frame {
                                key: key.to_string(),
                                is_color: false,
                                component: Component::empty().with_decorations(decorations),
                            });
                            true
                        }
                        Tag::Close(key) => close(&key, &mut buf, &mut stack, &mut root),
                    };

                    if applied {
                        let end = i + 1 + len;
                        while chars.next_if(|&(j, _)| j <= end).is_some() {}
                    } else {
                        buf.push('<');
                    }
                }
                _ => buf.push(c),
            }
        }

        flush(&mut buf, &mut stack, &mut root);
        while let Some(frame) = stack.pop() {
            attach(frame.component, &mut stack, &mut root);
        }
        root
    }

    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if c == '<' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }
}

/// Move buffered text into the innermost open component.
fn flush(buf: &mut String, stack: &mut [Frame], root: &mut Component) {
    if buf.is_empty() {
        return;
    }
    let text = Component::text(std::mem::take(buf));
    match stack.last_mut() {
        Some(frame) => frame.component.push_child(text),
        None => root.push_child(text),
    }
}

fn attach(component: Component, stack: &mut [Frame], root: &mut Component) {
    match stack.last_mut() {
        Some(frame) => frame.component.push_child(component),
        None => root.push_child(component),
    }
}

/// Close the innermost frame matching `key`, implicitly closing frames opened
/// after it. Returns false when nothing matches.
fn close(key: &str, buf: &mut String, stack: &mut Vec<Frame>, root: &mut Component) -> bool {
    let matches = |frame: &Frame| frame.key == key || (key == "color" && frame.is_color);
    let Some(pos) = stack.iter().rposition(matches) else {
        return false;
    };

    flush(buf, stack, root);
    while stack.len() > pos {
        if let Some(frame) = stack.pop() {
            attach(frame.component, stack, root);
        }
    }
    true
}

fn parse_tag(raw: &str) -> Option<Tag> {
    let lower = raw.to_lowercase();

    if let Some(name) = lower.strip_prefix('/') {
        let key = match name {
            "color" | "c" | "colour" => "color".to_string(),
            _ => match decoration(name) {
                Some((key, _)) => key.to_string(),
                None => color_key(name)?.0,
            },
        };
        return Some(Tag::Close(key));
    }

    match lower.as_str() {
        "reset" => return Some(Tag::Reset),
        "newline" | "br" => return Some(Tag::Newline),
        _ => {}
    }

    if let Some((key, decorations)) = decoration(&lower) {
        return Some(Tag::Decoration { key, decorations });
    }

    let (key, color) = color_key(&lower)?;
    Some(Tag::Color { key, color })
}

/// Canonical key and color for a color tag body.
fn color_key(name: &str) -> Option<(String, Color)> {
    let value = name
        .strip_prefix("color:")
        .or_else(|| name.strip_prefix("colour:"))
        .or_else(|| name.strip_prefix("c:"))
        .unwrap_or(name);
    let color = Color::parse(value)?;
    Some((value.to_string(), color))
}

fn decoration(name: &str) -> Option<(&'static str, Decorations)> {
    let mut decorations = Decorations::default();
    let key = match name {
        "bold" | "b" => {
            decorations.bold = true;
            "bold"
        }
        "italic" | "i" | "em" => {
            decorations.italic = true;
            "italic"
        }
        "underlined" | "u" => {
            decorations.underlined = true;
            "underlined"
        }
        "strikethrough" | "st" => {
            decorations.strikethrough = true;
            "strikethrough"
        }
        _ => return None,
    };
    Some((key, decorations))
}
