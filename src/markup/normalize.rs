//! Best-effort cleanup of pasted snippet source into a renderable fragment.
//!
//! Two "wrong shape" inputs are recognized: a complete HTML document (the
//! `<body>` interior is extracted, together with `<style>` blocks, font
//! stylesheet links and external scripts from `<head>`), and
//! component-framework-flavored markup (imports stripped, a single top-level
//! component unwrapped, framework attribute spellings renamed, handler and
//! ref/key bindings removed, style objects flattened, simple interpolations
//! collapsed, self-closing non-void tags expanded).
//!
//! The contract is "improves common cases", not "parses arbitrary framework
//! markup": anything that doesn't match a recognized pattern passes through
//! unchanged, and the pass never fails.

/// Hosts of the utility-styling engine the sandbox always loads itself; a
/// redundant copy in pasted input is dropped.
pub(crate) const STYLING_CDN_HOST: &str = "cdn.tailwindcss.com";

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Normalize raw snippet source into a fragment the sandbox can embed.
///
/// Input that is neither a full document nor framework-flavored is returned
/// unchanged.
pub fn normalize_markup(source: &str) -> String {
    if looks_like_full_document(source) {
        return extract_document_fragment(source);
    }
    if looks_like_framework_markup(source) {
        return rewrite_framework_markup(source);
    }
    source.to_string()
}

/// Whether the input is a complete HTML document rather than a fragment.
pub(crate) fn looks_like_full_document(source: &str) -> bool {
    find_ci(source, "<!doctype").is_some() || find_ci(source, "<html").is_some()
}

/// Heuristic detection of component-framework-flavored markup.
pub(crate) fn looks_like_framework_markup(source: &str) -> bool {
    if source.contains("className=") || source.contains("htmlFor=") || source.contains("style={{")
    {
        return true;
    }
    if has_handler_binding(source) {
        return true;
    }
    if source.contains("=> (") || source.contains("=>(") {
        return true;
    }
    source.lines().any(|line| {
        let t = line.trim_start();
        (t.starts_with("import ") && t.contains(" from ")) || t.starts_with("export ")
    })
}

/// Extract a renderable fragment from a full HTML document: head `<style>`
/// blocks, font stylesheet links and external scripts (minus the sandbox's
/// own styling CDN), concatenated ahead of the `<body>` interior.
fn extract_document_fragment(source: &str) -> String {
    let head = section_interior(source, "head").unwrap_or("");
    let body = section_interior(source, "body").unwrap_or_else(|| strip_document_shell(source));

    let mut parts: Vec<String> = Vec::new();
    collect_style_blocks(head, &mut parts);
    collect_font_links(head, &mut parts);
    collect_external_scripts(head, &mut parts);

    let body = body.trim();
    if parts.is_empty() {
        return body.to_string();
    }
    let mut out = parts.join("\n");
    out.push('\n');
    out.push_str(body);
    out
}

/// The interior of `<tag ...> ... </tag>`, case-insensitive, best-effort.
fn section_interior<'a>(source: &'a str, tag: &str) -> Option<&'a str> {
    let open = find_ci(source, &format!("<{tag}"))?;
    let open_end = tag_end(source, open)?;
    let interior = &source[open_end + 1..];
    match find_ci(interior, &format!("</{tag}")) {
        Some(close) => Some(&interior[..close]),
        None => Some(interior),
    }
}

/// When a document has no `<body>`, drop the doctype/`<html>`/`<head>`
/// wrappers and keep whatever remains.
fn strip_document_shell(source: &str) -> &str {
    let mut rest = source;
    if let Some(start) = find_ci(rest, "<!doctype")
        && let Some(end) = tag_end(rest, start)
    {
        rest = &rest[end + 1..];
    }
    if let Some(start) = find_ci(rest, "<html")
        && let Some(end) = tag_end(rest, start)
    {
        rest = &rest[end + 1..];
    }
    if let Some(head_close) = find_ci(rest, "</head")
        && let Some(close_end) = tag_end(rest, head_close)
    {
        rest = &rest[close_end + 1..];
    }
    if let Some(close) = find_ci(rest, "</html") {
        rest = &rest[..close];
    }
    rest
}

fn collect_style_blocks(head: &str, out: &mut Vec<String>) {
    let mut from = 0;
    while let Some(rel) = find_ci_from(head, "<style", from) {
        let Some(open_end) = tag_end(head, rel) else {
            break;
        };
        let Some(close) = find_ci_from(head, "</style", open_end) else {
            break;
        };
        let Some(close_end) = tag_end(head, close) else {
            break;
        };
        out.push(head[rel..=close_end].to_string());
        from = close_end + 1;
    }
}

fn collect_font_links(head: &str, out: &mut Vec<String>) {
    let mut from = 0;
    while let Some(rel) = find_ci_from(head, "<link", from) {
        let Some(end) = tag_end(head, rel) else {
            break;
        };
        let tag = &head[rel..=end];
        let lower = tag.to_ascii_lowercase();
        if lower.contains("stylesheet") && lower.contains("font") {
            out.push(tag.to_string());
        }
        from = end + 1;
    }
}

fn collect_external_scripts(head: &str, out: &mut Vec<String>) {
    let mut from = 0;
    while let Some(rel) = find_ci_from(head, "<script", from) {
        let Some(open_end) = tag_end(head, rel) else {
            break;
        };
        let open_tag = &head[rel..=open_end];
        let next = match find_ci_from(head, "</script", open_end) {
            Some(close) => tag_end(head, close).map_or(head.len(), |e| e + 1),
            None => open_end + 1,
        };
        let lower = open_tag.to_ascii_lowercase();
        // Only external scripts travel; inline script bodies stay behind. The
        // sandbox ships its own copy of the styling engine.
        if lower.contains("src=") && !lower.contains(STYLING_CDN_HOST) {
            out.push(format!("{open_tag}</script>"));
        }
        from = next;
    }
}

/// Rewrite framework-flavored markup into plain HTML, best-effort.
fn rewrite_framework_markup(source: &str) -> String {
    let mut text = strip_module_statements(source);
    text = unwrap_component_body(&text);
    text = text.replace("className=", "class=").replace("htmlFor=", "for=");
    text = flatten_style_objects(&text);
    text = strip_expression_bindings(&text);
    text = collapse_interpolations(&text);
    expand_self_closing(&text)
}

/// Drop `import` lines and peel `export` prefixes off declarations.
fn strip_module_statements(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("import ") || trimmed.starts_with("import{") {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("export default ") {
            // `export default App;` re-exports; drop it. Anything longer is a
            // declaration worth keeping.
            if rest.trim_end().trim_end_matches(';').chars().all(|c| c.is_alphanumeric() || c == '_')
            {
                continue;
            }
            out.push_str(rest);
            out.push('\n');
            continue;
        }
        if trimmed.starts_with("export {") {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("export ") {
            out.push_str(rest);
            out.push('\n');
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Unwrap the markup returned by a single top-level component definition.
///
/// Handles `const C = () => ( <markup/> );`, `function C() { return ( ... ); }`
/// and the parenless `=> <markup/>;` arrow form. When no component shape is
/// recognized the text is returned as-is.
fn unwrap_component_body(source: &str) -> String {
    for marker in ["return (", "return(", "=> (", "=>("] {
        if let Some(at) = source.find(marker) {
            let open = at + marker.len() - 1;
            if let Some(close) = matching_delim(source, open, b'(', b')') {
                return source[open + 1..close].trim().to_string();
            }
        }
    }
    if let Some(arrow) = source.find("=>") {
        let rest = source[arrow + 2..].trim_start();
        if rest.starts_with('<') {
            let rest = rest.trim_end();
            let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
            return rest.to_string();
        }
    }
    source.to_string()
}

/// Convert `style={{ backgroundColor: 'red', width: 32 }}` into
/// `style="background-color: red; width: 32px"`.
fn flatten_style_objects(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(at) = rest.find("style={{") {
        out.push_str(&rest[..at]);
        let open = at + "style={".len();
        let Some(close) = matching_delim(rest, open, b'{', b'}') else {
            // Unbalanced object: leave the remainder untouched.
            out.push_str(&rest[at..]);
            return out;
        };
        let object = &rest[open + 1..close];
        out.push_str("style=\"");
        out.push_str(&style_object_to_css(object));
        out.push('"');
        // Skip the outer `}` of `style={{...}}` as well.
        let mut next = close + 1;
        if rest.as_bytes().get(next) == Some(&b'}') {
            next += 1;
        }
        rest = &rest[next..];
    }
    out.push_str(rest);
    out
}

fn style_object_to_css(object: &str) -> String {
    let mut rules = Vec::new();
    for pair in split_top_level(object, b',') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let key = camel_to_kebab(key.trim().trim_matches(|c| c == '\'' || c == '"'));
        let value = value.trim();
        let value = value
            .strip_prefix(['\'', '"', '`'])
            .and_then(|v| v.strip_suffix(['\'', '"', '`']))
            .unwrap_or(value);
        if key.is_empty() || value.is_empty() {
            continue;
        }
        // Bare numbers mean pixels in framework style objects.
        if value.parse::<f64>().is_ok() && !unitless_css_property(&key) {
            rules.push(format!("{key}: {value}px"));
        } else {
            rules.push(format!("{key}: {value}"));
        }
    }
    rules.join("; ")
}

fn unitless_css_property(key: &str) -> bool {
    matches!(
        key,
        "opacity" | "z-index" | "flex" | "flex-grow" | "flex-shrink" | "font-weight" | "order"
    )
}

fn camel_to_kebab(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Split on `sep` at top-level only (not inside quotes, parens or braces).
fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'(' | b'{' | b'[' => depth += 1,
                b')' | b'}' | b']' => depth -= 1,
                _ if b == sep && depth == 0 => {
                    parts.push(&s[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Remove `onXxx={...}`, `ref={...}` and `key={...}` bindings (and their
/// quoted-string forms).
fn strip_expression_bindings(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    'outer: loop {
        let bytes = rest.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if !rest.is_char_boundary(i) {
                i += 1;
                continue;
            }
            if let Some(value_start) = binding_at(rest, i) {
                let end = match bytes.get(value_start) {
                    Some(b'{') => matching_delim(rest, value_start, b'{', b'}'),
                    Some(&q @ (b'"' | b'\'')) => rest[value_start + 1..]
                        .as_bytes()
                        .iter()
                        .position(|&b| b == q)
                        .map(|p| value_start + 1 + p),
                    _ => None,
                };
                if let Some(end) = end {
                    out.push_str(rest[..i].trim_end_matches(' '));
                    rest = &rest[end + 1..];
                    continue 'outer;
                }
            }
            i += 1;
        }
        out.push_str(rest);
        return out;
    }
}

/// If a stripped binding attribute starts at `i`, return the index of its
/// value (`{`, `"` or `'`).
fn binding_at(s: &str, i: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if i > 0 && !bytes[i - 1].is_ascii_whitespace() {
        return None;
    }
    let rest = &s[i..];
    let name_len = if rest.starts_with("on") {
        let tail = &rest[2..];
        if !tail.chars().next()?.is_ascii_uppercase() {
            return None;
        }
        2 + tail
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .count()
    } else if rest.starts_with("ref=") || rest.starts_with("key=") {
        3
    } else {
        return None;
    };
    if bytes.get(i + name_len) != Some(&b'=') {
        return None;
    }
    Some(i + name_len + 1)
}

/// Collapse `{'text'}`, `{"text"}` and plain `` {`text`} `` interpolations.
///
/// Templates carrying `${...}` substitutions are left alone.
fn collapse_interpolations(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(at) = rest.find('{') {
        let Some(close) = matching_delim(rest, at, b'{', b'}') else {
            break;
        };
        let inner = rest[at + 1..close].trim();
        let collapsed = inner
            .strip_prefix(['\'', '"'])
            .and_then(|v| v.strip_suffix(['\'', '"']))
            .or_else(|| {
                inner
                    .strip_prefix('`')
                    .and_then(|v| v.strip_suffix('`'))
                    .filter(|v| !v.contains("${"))
            });
        match collapsed {
            Some(text) => {
                out.push_str(&rest[..at]);
                out.push_str(text);
                rest = &rest[close + 1..];
            }
            None => {
                out.push_str(&rest[..=at]);
                rest = &rest[at + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Expand self-closing non-void tags: `<div a="b" />` → `<div a="b"></div>`.
fn expand_self_closing(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(lt) = rest.find('<') {
        let Some(gt) = tag_end(rest, lt) else {
            break;
        };
        let tag = &rest[lt..=gt];
        let name: String = tag[1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        let name_lower = name.to_ascii_lowercase();
        if tag.ends_with("/>") && !name.is_empty() && !VOID_TAGS.contains(&name_lower.as_str()) {
            out.push_str(&rest[..lt]);
            out.push_str(tag[..tag.len() - 2].trim_end());
            out.push_str(&format!("></{name}>"));
        } else {
            out.push_str(&rest[..=gt]);
        }
        rest = &rest[gt + 1..];
    }
    out.push_str(rest);
    out
}

fn has_handler_binding(source: &str) -> bool {
    let mut i = 0;
    while i < source.len() {
        if source.is_char_boundary(i)
            && let Some(value_start) = binding_at(source, i)
            && source.as_bytes().get(value_start) == Some(&b'{')
        {
            return true;
        }
        i += 1;
    }
    false
}

/// Case-insensitive substring search.
pub(crate) fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    find_ci_from(haystack, needle, 0)
}

pub(crate) fn find_ci_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || from + n.len() > h.len() {
        return None;
    }
    (from..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Index of the `>` closing the tag opened at `lt`, honoring quoted
/// attribute values.
pub(crate) fn tag_end(s: &str, lt: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut quote: Option<u8> = None;
    for i in lt..bytes.len() {
        match quote {
            Some(q) => {
                if bytes[i] == q {
                    quote = None;
                }
            }
            None => match bytes[i] {
                b'"' | b'\'' => quote = Some(bytes[i]),
                b'>' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// Index of the delimiter matching `open_idx`, skipping quoted spans.
fn matching_delim(s: &str, open_idx: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(open_idx) != Some(&open) {
        return None;
    }
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    for i in open_idx..bytes.len() {
        match quote {
            Some(q) => {
                if bytes[i] == q {
                    quote = None;
                }
            }
            None => match bytes[i] {
                b'\'' | b'"' | b'`' => quote = Some(bytes[i]),
                b if b == open => depth += 1,
                b if b == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/markup/normalize.rs"]
mod tests;
