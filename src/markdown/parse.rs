//! CommonMark → [`Node`] tree.
//!
//! Only the CommonMark grammar is enabled: GFM tables, strikethrough and
//! task lists are not recognised, so `| a | b |` rows arrive as paragraph
//! text.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use super::ast::{flatten_text, Node};

/// Open container while events are being folded into a tree.
enum Frame {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock(Option<String>),
    List(Option<u64>),
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: Option<String> },
    Image { url: String, title: Option<String> },
    /// Containers with no counterpart in [`Node`]; their children are
    /// spliced into the parent.
    Transparent,
}

struct Open {
    frame: Frame,
    children: Vec<Node>,
    /// Raw text for code blocks and image alt text.
    text: String,
}

impl Open {
    fn new(frame: Frame) -> Self {
        Self {
            frame,
            children: Vec::new(),
            text: String::new(),
        }
    }

    fn push(&mut self, node: Node) {
        match (self.children.last_mut(), node) {
            (Some(Node::Text(prev)), Node::Text(next)) => prev.push_str(&next),
            (_, node) => self.children.push(node),
        }
    }
}

/// Parse Markdown into a [`Node::Root`].
pub fn parse(markdown: &str) -> Node {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut stack = vec![Open::new(Frame::Root)];

    for event in parser {
        match event {
            Event::Start(tag) => stack.push(Open::new(frame_for(tag))),
            Event::End(_) => {
                if stack.len() < 2 {
                    continue;
                }
                let Some(open) = stack.pop() else { continue };
                let Some(parent) = stack.last_mut() else { continue };
                close(open, parent);
            }
            Event::Text(text) => {
                let Some(top) = stack.last_mut() else { continue };
                match top.frame {
                    Frame::CodeBlock(_) | Frame::Image { .. } => top.text.push_str(&text),
                    _ => top.push(Node::Text(text.into_string())),
                }
            }
            Event::Code(code) => {
                if let Some(top) = stack.last_mut() {
                    top.push(Node::InlineCode(code.into_string()));
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                if let Some(top) = stack.last_mut() {
                    top.push(Node::Html(html.into_string()));
                }
            }
            Event::SoftBreak => {
                if let Some(top) = stack.last_mut() {
                    top.push(Node::Text("\n".to_string()));
                }
            }
            Event::HardBreak => {
                if let Some(top) = stack.last_mut() {
                    top.push(Node::Break);
                }
            }
            Event::Rule => {
                if let Some(top) = stack.last_mut() {
                    top.push(Node::ThematicBreak);
                }
            }
            _ => {}
        }
    }

    // Unbalanced input cannot happen with pulldown-cmark, but fold anything
    // left open so no content is lost.
    while stack.len() > 1 {
        if let Some(open) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                close(open, parent);
            }
        }
    }

    Node::Root(stack.pop().map(|root| root.children).unwrap_or_default())
}

fn frame_for(tag: Tag<'_>) -> Frame {
    match tag {
        Tag::Paragraph => Frame::Paragraph,
        Tag::Heading { level, .. } => Frame::Heading(heading_depth(level)),
        Tag::BlockQuote => Frame::BlockQuote,
        Tag::CodeBlock(kind) => Frame::CodeBlock(match kind {
            CodeBlockKind::Fenced(info) => info
                .split_whitespace()
                .next()
                .map(str::to_string),
            CodeBlockKind::Indented => None,
        }),
        Tag::List(start) => Frame::List(start),
        Tag::Item => Frame::Item,
        Tag::Emphasis => Frame::Emphasis,
        Tag::Strong => Frame::Strong,
        Tag::Strikethrough => Frame::Strikethrough,
        Tag::Link {
            dest_url, title, ..
        } => Frame::Link {
            url: dest_url.into_string(),
            title: non_empty(title.into_string()),
        },
        Tag::Image {
            dest_url, title, ..
        } => Frame::Image {
            url: dest_url.into_string(),
            title: non_empty(title.into_string()),
        },
        _ => Frame::Transparent,
    }
}

fn close(open: Open, parent: &mut Open) {
    let Open {
        frame,
        children,
        text,
    } = open;

    let node = match frame {
        Frame::Paragraph => Node::Paragraph(children),
        Frame::Heading(depth) => Node::Heading { depth, children },
        Frame::BlockQuote => Node::Blockquote(children),
        Frame::CodeBlock(lang) => Node::Code {
            lang,
            value: text.strip_suffix('\n').unwrap_or(&text).to_string(),
        },
        Frame::List(start) => Node::List {
            ordered: start.is_some(),
            start,
            children,
        },
        Frame::Item => Node::ListItem(wrap_loose_inlines(children)),
        Frame::Emphasis => Node::Emphasis(children),
        Frame::Strong => Node::Strong(children),
        Frame::Strikethrough => Node::Delete(children),
        Frame::Link { url, title } => Node::Link {
            url,
            title,
            children,
        },
        Frame::Image { url, title } => {
            let mut alt = text;
            for child in &children {
                alt.push_str(&flatten_text(child));
            }
            Node::Image { url, alt, title }
        }
        Frame::Root | Frame::Transparent => {
            for child in children {
                parent.push(child);
            }
            return;
        }
    };
    parent.push(node);
}

/// Tight list items carry bare inline content; give it a paragraph so
/// every list item holds block nodes only.
fn wrap_loose_inlines(children: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::with_capacity(children.len());
    let mut inline = Vec::new();

    for child in children {
        if child.is_inline() {
            inline.push(child);
        } else {
            if !inline.is_empty() {
                blocks.push(Node::Paragraph(std::mem::take(&mut inline)));
            }
            blocks.push(child);
        }
    }
    if !inline.is_empty() {
        blocks.push(Node::Paragraph(inline));
    }
    blocks
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
