//! Tolerant scanner turning a normalized fragment into an element tree.
//!
//! This is not an HTML5 parser. Snippets are untrusted and frequently
//! malformed, so the scanner never fails: unknown constructs become text,
//! stray close tags are dropped, and unclosed elements are closed at end of
//! input. The resulting tree only has to be good enough for the sandbox
//! scene to measure.

use smallvec::SmallVec;

use crate::markup::normalize::tag_end;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text rather than nested markup.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// One node of a scanned fragment.
#[derive(Clone, Debug, PartialEq)]
pub enum FragmentNode {
    /// An element with attributes and children.
    Element(Element),
    /// A run of character data (whitespace-trimmed, never empty).
    Text(String),
}

/// A scanned element.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Element {
    /// Tag name, lowercased.
    pub tag: String,
    /// Attributes in source order; names lowercased, values verbatim.
    pub attrs: SmallVec<[(String, String); 4]>,
    /// Child nodes in source order.
    pub children: Vec<FragmentNode>,
}

impl Element {
    /// The value of the first attribute named `name`, if any.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The element's class list.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Declarations from the inline `style` attribute, lowercased property
    /// names, trimmed values.
    pub fn style_props(&self) -> Vec<(String, String)> {
        let Some(style) = self.attr("style") else {
            return Vec::new();
        };
        style
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                let name = name.trim().to_ascii_lowercase();
                let value = value.trim().to_string();
                (!name.is_empty() && !value.is_empty()).then_some((name, value))
            })
            .collect()
    }

    /// One inline style property, if declared.
    pub fn style_prop(&self, name: &str) -> Option<String> {
        self.style_props()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Scan a markup fragment into a list of root nodes.
pub fn parse_fragment(source: &str) -> Vec<FragmentNode> {
    let mut scanner = Scanner {
        roots: Vec::new(),
        stack: Vec::new(),
    };
    scanner.run(source);
    scanner.finish()
}

struct Scanner {
    roots: Vec<FragmentNode>,
    stack: Vec<Element>,
}

impl Scanner {
    fn run(&mut self, source: &str) {
        let mut rest = source;
        while !rest.is_empty() {
            let Some(lt) = rest.find('<') else {
                self.push_text(rest);
                break;
            };
            self.push_text(&rest[..lt]);
            rest = &rest[lt..];

            if let Some(after) = rest.strip_prefix("<!--") {
                rest = match after.find("-->") {
                    Some(end) => &after[end + 3..],
                    None => "",
                };
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                rest = match tag_end(rest, 0) {
                    Some(gt) => &rest[gt + 1..],
                    None => "",
                };
                continue;
            }
            if let Some(after) = rest.strip_prefix("</") {
                match tag_end(rest, 0) {
                    Some(gt) => {
                        let name = tag_name(after);
                        self.close_element(&name);
                        rest = &rest[gt + 1..];
                    }
                    None => rest = "",
                }
                continue;
            }
            if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                let Some(gt) = tag_end(rest, 0) else {
                    // Unterminated tag: salvage as text.
                    self.push_text(rest);
                    break;
                };
                let tag_src = &rest[1..gt];
                rest = &rest[gt + 1..];
                rest = self.open_element(tag_src, rest);
                continue;
            }
            // A lone '<' that opens nothing is character data.
            self.push_text("<");
            rest = &rest[1..];
        }
    }

    /// Open the element described by `tag_src` (between `<` and `>`); returns
    /// the remaining input (raw-text elements consume up to their close tag).
    fn open_element<'a>(&mut self, tag_src: &str, rest: &'a str) -> &'a str {
        let name = tag_name(tag_src);
        let self_closing = tag_src.trim_end().ends_with('/');
        let mut element = Element {
            tag: name.clone(),
            attrs: parse_attrs(tag_src),
            children: Vec::new(),
        };

        if RAW_TEXT_TAGS.contains(&name.as_str()) && !self_closing {
            let close = format!("</{name}");
            let (body, after) = match find_ci(rest, &close) {
                Some(at) => {
                    let after = match tag_end(rest, at) {
                        Some(gt) => &rest[gt + 1..],
                        None => "",
                    };
                    (&rest[..at], after)
                }
                None => (rest, ""),
            };
            let body = body.trim();
            if !body.is_empty() {
                element.children.push(FragmentNode::Text(body.to_string()));
            }
            self.attach(FragmentNode::Element(element));
            return after;
        }

        if self_closing || VOID_TAGS.contains(&name.as_str()) {
            self.attach(FragmentNode::Element(element));
        } else {
            self.stack.push(element);
        }
        rest
    }

    fn close_element(&mut self, name: &str) {
        // Find the nearest matching open element; close everything above it.
        // A close tag with no matching open element is dropped.
        let Some(at) = self.stack.iter().rposition(|e| e.tag == name) else {
            return;
        };
        while self.stack.len() > at {
            let done = self.stack.pop().unwrap_or_default();
            self.attach(FragmentNode::Element(done));
        }
    }

    fn attach(&mut self, node: FragmentNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn push_text(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.attach(FragmentNode::Text(text.to_string()));
        }
    }

    fn finish(mut self) -> Vec<FragmentNode> {
        while let Some(open) = self.stack.pop() {
            self.attach(FragmentNode::Element(open));
        }
        self.roots
    }
}

fn tag_name(tag_src: &str) -> String {
    tag_src
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn parse_attrs(tag_src: &str) -> SmallVec<[(String, String); 4]> {
    let mut attrs = SmallVec::new();
    let after_name = tag_src
        .find(|c: char| c.is_ascii_whitespace())
        .map_or("", |at| &tag_src[at..]);
    let bytes = after_name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
            i += 1;
            continue;
        }
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = after_name[name_start..i].to_ascii_lowercase();
        // Skip whitespace around '='.
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            if !name.is_empty() && name != "/" {
                attrs.push((name, String::new()));
            }
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let value = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
            let quote = bytes[i];
            i += 1;
            let value_start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            let value = after_name[value_start..i].to_string();
            i = (i + 1).min(bytes.len());
            value
        } else {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                i += 1;
            }
            after_name[value_start..i].to_string()
        };
        if !name.is_empty() {
            attrs.push((name, value));
        }
    }
    attrs
}

/// Case-insensitive find, local to the raw-text scan.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    crate::markup::normalize::find_ci(haystack, needle)
}

#[cfg(test)]
#[path = "../../tests/unit/markup/fragment.rs"]
mod tests;
