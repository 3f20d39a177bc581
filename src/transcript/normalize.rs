//! Markup normalization for message bodies.
//!
//! Exporters wrap every message in presentation markup (`font`, `b`, `i`) and
//! reference images by their in-archive location. [`normalize_content`]
//! strips the former and rewrites the latter, producing a fragment that is
//! identical for identical messages regardless of which export it came from.

use std::fmt::Write as _;

use scraper::{ElementRef, Html, Node};

use crate::container::ImageMap;

/// Elements whose children are kept but whose tags are dropped.
const UNWRAPPED: &[&str] = &["font", "b", "i"];

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text children are written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Normalizes a message body fragment.
///
/// - `font`, `b` and `i` elements are replaced by their children
/// - `img` elements get `src="images/<filename>"` when their `src` names a
///   known image, and lose `src` otherwise
/// - attributes are written sorted by name
///
/// # Example
///
/// ```rust
/// use qqmerge::container::ImageMap;
/// use qqmerge::transcript::normalize_content;
///
/// let images = ImageMap::new();
/// let content = normalize_content("<font color='red'><b>hi</b></font>", &images);
/// assert_eq!(content, "hi");
/// ```
pub fn normalize_content(content: &str, images: &ImageMap) -> String {
    let fragment = Html::parse_fragment(content);
    let mut out = String::with_capacity(content.len());
    write_children(&mut out, fragment.root_element(), images, false);
    out
}

fn write_children(out: &mut String, parent: ElementRef<'_>, images: &ImageMap, raw: bool) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) if raw => out.push_str(text),
            Node::Text(text) => escape_text(out, text),
            Node::Comment(comment) => {
                let _ = write!(out, "<!--{}-->", &**comment);
            }
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    write_element(out, element, images);
                }
            }
            _ => {}
        }
    }
}

fn write_element(out: &mut String, element: ElementRef<'_>, images: &ImageMap) {
    let name = element.value().name();

    if UNWRAPPED.contains(&name) {
        write_children(out, element, images, false);
        return;
    }

    let mut attrs: Vec<(&str, String)> = element
        .value()
        .attrs()
        .map(|(key, value)| (key, value.to_string()))
        .collect();

    if name == "img" {
        rewrite_image_source(&mut attrs, images);
    }
    attrs.sort_by(|a, b| a.0.cmp(b.0));

    out.push('<');
    out.push_str(name);
    for (key, value) in &attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attribute(out, value);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    write_children(out, element, images, RAW_TEXT_ELEMENTS.contains(&name));
    let _ = write!(out, "</{name}>");
}

fn rewrite_image_source(attrs: &mut Vec<(&str, String)>, images: &ImageMap) {
    let Some(index) = attrs.iter().position(|(key, _)| *key == "src") else {
        return;
    };

    match images.get(&attrs[index].1) {
        Some(asset) => attrs[index].1 = asset.relative_path(),
        None => {
            attrs.remove(index);
        }
    }
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}
