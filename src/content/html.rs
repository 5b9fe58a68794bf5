//! HTML fragment → Markdown syntax tree.
//!
//! Walks `scraper`'s DOM and builds [`Node`]s. Container elements
//! (`div`, `section`, ...) are transparent; inline content that ends up
//! directly at block level is wrapped into a paragraph. Whitespace is
//! collapsed the way a browser renders it.

use scraper::node::Node as DomNode;
use scraper::{ElementRef, Html};

use crate::markdown::{flatten_text, serialize, Node};

/// Elements whose content never reaches the output.
const DROPPED: &[&str] = &[
    "script", "style", "head", "title", "template", "noscript", "meta", "link",
];

/// Block-level elements that map to a Markdown block.
const BLOCKS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "ul", "ol", "blockquote", "pre", "hr", "table",
];

/// Block-level wrappers with no Markdown counterpart.
const CONTAINERS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "nav", "aside",
    "figure", "figcaption", "address", "details", "summary", "form", "fieldset", "center",
    "li", "dl", "dt", "dd",
];

/// Largest list start CommonMark accepts (nine digits).
const MAX_LIST_START: u64 = 999_999_999;

/// Parse an HTML fragment into a [`Node::Root`].
pub fn html_to_ast(html: &str) -> Node {
    let fragment = Html::parse_fragment(html);
    Node::Root(blocks(fragment.root_element()))
}

/// HTML fragment → Markdown text.
pub fn html_to_markdown(html: &str) -> String {
    serialize(&html_to_ast(html))
}

fn blocks(parent: ElementRef<'_>) -> Vec<Node> {
    let mut out = Vec::new();
    let mut pending = Vec::new();

    for child in parent.children() {
        if let Some(element) = ElementRef::wrap(child) {
            let tag = element.value().name();
            if DROPPED.contains(&tag) {
                continue;
            }
            if BLOCKS.contains(&tag) {
                flush_paragraph(&mut pending, &mut out);
                out.extend(block(element));
            } else if CONTAINERS.contains(&tag) {
                flush_paragraph(&mut pending, &mut out);
                out.extend(blocks(element));
            } else {
                pending.extend(inline(element));
            }
        } else if let DomNode::Text(text) = child.value() {
            pending.push(Node::Text(collapse_whitespace(text)));
        }
    }

    flush_paragraph(&mut pending, &mut out);
    out
}

fn flush_paragraph(pending: &mut Vec<Node>, out: &mut Vec<Node>) {
    let children = normalize(std::mem::take(pending));
    if !children.is_empty() {
        out.push(Node::Paragraph(children));
    }
}

fn block(element: ElementRef<'_>) -> Option<Node> {
    let tag = element.value().name();
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let depth = tag[1..].parse().unwrap_or(1);
            let children = normalize(inline_children(element));
            (!children.is_empty()).then_some(Node::Heading { depth, children })
        }
        "p" => {
            let children = normalize(inline_children(element));
            (!children.is_empty()).then_some(Node::Paragraph(children))
        }
        "ul" | "ol" => Some(list(element, tag == "ol")),
        "blockquote" => Some(Node::Blockquote(blocks(element))),
        "pre" => Some(code_block(element)),
        "hr" => Some(Node::ThematicBreak),
        "table" => table(element),
        _ => None,
    }
}

fn list(element: ElementRef<'_>, ordered: bool) -> Node {
    let start = if ordered {
        element
            .value()
            .attr("start")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|n| n.min(MAX_LIST_START))
    } else {
        None
    };
    let children = element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|item| !DROPPED.contains(&item.value().name()))
        .map(|item| Node::ListItem(blocks(item)))
        .collect();

    Node::List {
        ordered,
        start,
        children,
    }
}

fn code_block(pre: ElementRef<'_>) -> Node {
    let mut value: String = pre.text().collect();
    if value.ends_with('\n') {
        value.pop();
    }
    let code = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "code");
    let lang = code
        .into_iter()
        .chain(std::iter::once(pre))
        .flat_map(|el| el.value().classes())
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
                .map(str::to_string)
        })
        .filter(|lang| !lang.is_empty());

    Node::Code { lang, value }
}

fn table(element: ElementRef<'_>) -> Option<Node> {
    let mut rows = Vec::new();
    for child in element.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(table_row(child)),
            "thead" | "tbody" | "tfoot" => {
                for row in child.children().filter_map(ElementRef::wrap) {
                    if row.value().name() == "tr" {
                        rows.push(table_row(row));
                    }
                }
            }
            _ => {}
        }
    }
    (!rows.is_empty()).then_some(Node::Table(rows))
}

fn table_row(row: ElementRef<'_>) -> Vec<Vec<Node>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(table_cell)
        .collect()
}

/// Cell content as inline nodes. Block children are separated by breaks;
/// a nested table is reduced to its text.
fn table_cell(cell: ElementRef<'_>) -> Vec<Node> {
    let mut out = Vec::new();
    for child in cell.children() {
        if let Some(element) = ElementRef::wrap(child) {
            let tag = element.value().name();
            if DROPPED.contains(&tag) {
                continue;
            }
            if BLOCKS.contains(&tag) || CONTAINERS.contains(&tag) {
                let inner = if tag == "table" {
                    table(element)
                        .map(|t| vec![Node::Text(collapse_whitespace(&flatten_text(&t)))])
                        .unwrap_or_default()
                } else {
                    inline_children(element)
                };
                if !out.is_empty() && !inner.is_empty() {
                    out.push(Node::Break);
                }
                out.extend(inner);
            } else {
                out.extend(inline(element));
            }
        } else if let DomNode::Text(text) = child.value() {
            out.push(Node::Text(collapse_whitespace(text)));
        }
    }
    normalize(out)
}

fn inline_children(element: ElementRef<'_>) -> Vec<Node> {
    let mut out = Vec::new();
    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            out.extend(inline(el));
        } else if let DomNode::Text(text) = child.value() {
            out.push(Node::Text(collapse_whitespace(text)));
        }
    }
    out
}

fn inline(element: ElementRef<'_>) -> Vec<Node> {
    let value = element.value();
    match value.name() {
        tag if DROPPED.contains(&tag) => Vec::new(),
        "strong" | "b" => vec![Node::Strong(inline_children(element))],
        "em" | "i" => vec![Node::Emphasis(inline_children(element))],
        "s" | "del" | "strike" => vec![Node::Delete(inline_children(element))],
        "code" | "kbd" | "samp" | "tt" => {
            let text: String = element.text().collect();
            vec![Node::InlineCode(collapse_whitespace(&text))]
        }
        "a" => vec![Node::Link {
            url: value.attr("href").unwrap_or_default().to_string(),
            title: value.attr("title").map(str::to_string),
            children: inline_children(element),
        }],
        "img" => vec![Node::Image {
            url: value.attr("src").unwrap_or_default().to_string(),
            alt: value.attr("alt").unwrap_or_default().to_string(),
            title: value.attr("title").map(str::to_string),
        }],
        "br" => vec![Node::Break],
        _ => inline_children(element),
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c') {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Browser-style whitespace handling for one run of inline content:
/// no leading or trailing space, no space around line breaks, no double
/// spaces across element boundaries.
fn normalize(nodes: Vec<Node>) -> Vec<Node> {
    let mut nodes = merge_text(nodes);
    let mut prev_space = true;
    collapse_leading(&mut nodes, &mut prev_space);
    let mut nodes = prune(nodes);

    while matches!(nodes.last(), Some(Node::Break)) {
        nodes.pop();
    }
    let breaks: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| matches!(node, Node::Break).then_some(idx))
        .collect();
    for idx in breaks {
        trim_trailing(&mut nodes[..idx]);
    }
    trim_trailing(&mut nodes);

    prune(nodes)
}

fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(Node::Text(last)), Node::Text(next)) = (out.last_mut(), &node) {
            last.push_str(next);
            continue;
        }
        out.push(node);
    }
    out
}

fn collapse_leading(nodes: &mut [Node], prev_space: &mut bool) {
    for node in nodes {
        match node {
            Node::Text(text) => {
                if *prev_space && text.starts_with(' ') {
                    text.remove(0);
                }
                if !text.is_empty() {
                    *prev_space = text.ends_with(' ');
                }
            }
            Node::Break => *prev_space = true,
            Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Delete(children)
            | Node::Link { children, .. } => collapse_leading(children, prev_space),
            _ => *prev_space = false,
        }
    }
}

/// Strip trailing spaces from the last text of `nodes`. Returns `true`
/// once visible content has been reached.
fn trim_trailing(nodes: &mut [Node]) -> bool {
    for node in nodes.iter_mut().rev() {
        match node {
            Node::Text(text) => {
                let len = text.trim_end_matches(' ').len();
                text.truncate(len);
                if !text.is_empty() {
                    return true;
                }
            }
            Node::Break => {}
            Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Delete(children)
            | Node::Link { children, .. } => {
                if trim_trailing(children) {
                    return true;
                }
            }
            _ => return true,
        }
    }
    false
}

/// Drop empty text and empty formatting wrappers.
fn prune(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Text(text) if text.is_empty() => None,
            Node::Emphasis(children) => non_empty(prune(children)).map(Node::Emphasis),
            Node::Strong(children) => non_empty(prune(children)).map(Node::Strong),
            Node::Delete(children) => non_empty(prune(children)).map(Node::Delete),
            Node::Link {
                url,
                title,
                children,
            } => Some(Node::Link {
                url,
                title,
                children: prune(children),
            }),
            other => Some(other),
        })
        .collect()
}

fn non_empty(nodes: Vec<Node>) -> Option<Vec<Node>> {
    (!nodes.is_empty()).then_some(nodes)
}
