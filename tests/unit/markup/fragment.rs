use super::*;

fn only_element(nodes: &[FragmentNode]) -> &Element {
    match nodes {
        [FragmentNode::Element(el)] => el,
        other => panic!("expected a single element, got {other:?}"),
    }
}

#[test]
fn nested_elements_keep_tree_shape() {
    let roots = parse_fragment(r#"<div class="a"><span>hi</span></div>"#);
    let div = only_element(&roots);
    assert_eq!(div.tag, "div");
    assert_eq!(div.attr("class"), Some("a"));

    let span = only_element(&div.children);
    assert_eq!(span.tag, "span");
    assert_eq!(span.children, vec![FragmentNode::Text("hi".to_string())]);
}

#[test]
fn void_and_self_closing_tags_do_not_nest() {
    let roots = parse_fragment(r#"<div><br><img src="x.png"><p/></div>"#);
    let div = only_element(&roots);
    let tags: Vec<_> = div
        .children
        .iter()
        .map(|n| match n {
            FragmentNode::Element(el) => el.tag.as_str(),
            FragmentNode::Text(_) => "#text",
        })
        .collect();
    assert_eq!(tags, vec!["br", "img", "p"]);
}

#[test]
fn unclosed_elements_close_at_end_of_input() {
    let roots = parse_fragment("<div><span>hi");
    let div = only_element(&roots);
    let span = only_element(&div.children);
    assert_eq!(span.children, vec![FragmentNode::Text("hi".to_string())]);
}

#[test]
fn stray_close_tags_are_dropped() {
    let roots = parse_fragment("</p><div>x</div>");
    let div = only_element(&roots);
    assert_eq!(div.tag, "div");
}

#[test]
fn mismatched_close_pops_through_open_elements() {
    let roots = parse_fragment("<div><span>hi</div>");
    let div = only_element(&roots);
    let span = only_element(&div.children);
    assert_eq!(span.tag, "span");
}

#[test]
fn comments_and_doctype_are_skipped() {
    let roots = parse_fragment("<!doctype html><!-- note --><p>x</p>");
    let p = only_element(&roots);
    assert_eq!(p.tag, "p");
}

#[test]
fn raw_text_elements_capture_their_body_verbatim() {
    let roots = parse_fragment("<style>.a { color: red; } </style><div>x</div>");
    assert_eq!(roots.len(), 2);
    let style = match &roots[0] {
        FragmentNode::Element(el) => el,
        other => panic!("expected style element, got {other:?}"),
    };
    assert_eq!(style.tag, "style");
    assert_eq!(
        style.children,
        vec![FragmentNode::Text(".a { color: red; }".to_string())]
    );
}

#[test]
fn script_content_is_never_parsed_as_markup() {
    let roots = parse_fragment("<script>if (a < b) { go(); }</script>");
    let script = only_element(&roots);
    assert_eq!(script.tag, "script");
    assert_eq!(script.children.len(), 1);
}

#[test]
fn lone_angle_bracket_is_character_data() {
    let roots = parse_fragment("<p>1 < 2</p>");
    let p = only_element(&roots);
    assert_eq!(
        p.children,
        vec![
            FragmentNode::Text("1".to_string()),
            FragmentNode::Text("<".to_string()),
            FragmentNode::Text("2".to_string()),
        ]
    );
}

#[test]
fn attribute_forms_parse() {
    let roots = parse_fragment("<input type=text disabled data-x='1'>");
    let input = only_element(&roots);
    assert_eq!(input.attr("type"), Some("text"));
    assert_eq!(input.attr("disabled"), Some(""));
    assert_eq!(input.attr("data-x"), Some("1"));
}

#[test]
fn tag_and_attribute_names_are_lowercased() {
    let roots = parse_fragment(r#"<DIV CLASS="a b">x</DIV>"#);
    let div = only_element(&roots);
    assert_eq!(div.tag, "div");
    assert_eq!(div.classes().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn style_props_split_and_normalize() {
    let roots = parse_fragment(r#"<div style="Width: 10px; COLOR: red;; height:50%">x</div>"#);
    let div = only_element(&roots);
    assert_eq!(div.style_prop("width").as_deref(), Some("10px"));
    assert_eq!(div.style_prop("color").as_deref(), Some("red"));
    assert_eq!(div.style_prop("height").as_deref(), Some("50%"));
    assert_eq!(div.style_prop("margin"), None);
}
