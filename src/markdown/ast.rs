//! Markdown syntax tree shared by the parser, the serializer and the
//! block projector.

/// A Markdown syntax tree node.
///
/// Block kinds come first, inline kinds after. Children order is the
/// document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Root(Vec<Node>),
    /// `depth` is 1..=6.
    Heading { depth: u8, children: Vec<Node> },
    Paragraph(Vec<Node>),
    /// Children are [`Node::ListItem`]s.
    List {
        ordered: bool,
        start: Option<u64>,
        children: Vec<Node>,
    },
    /// Children are block nodes.
    ListItem(Vec<Node>),
    Blockquote(Vec<Node>),
    Code { lang: Option<String>, value: String },
    ThematicBreak,
    /// `rows[row][cell]`, each cell a list of inline nodes. Row 0 is the header.
    Table(Vec<Vec<Vec<Node>>>),
    Html(String),

    Text(String),
    InlineCode(String),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    Delete(Vec<Node>),
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    Break,
}

impl Node {
    /// Direct children of this node. Leaves and tables return an empty slice.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Root(c)
            | Self::Paragraph(c)
            | Self::ListItem(c)
            | Self::Blockquote(c)
            | Self::Emphasis(c)
            | Self::Strong(c)
            | Self::Delete(c)
            | Self::Heading { children: c, .. }
            | Self::List { children: c, .. }
            | Self::Link { children: c, .. } => c,
            Self::Code { .. }
            | Self::ThematicBreak
            | Self::Table(_)
            | Self::Html(_)
            | Self::Text(_)
            | Self::InlineCode(_)
            | Self::Image { .. }
            | Self::Break => &[],
        }
    }

    /// `true` for nodes that sit in inline (phrasing) position.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text(_)
                | Self::InlineCode(_)
                | Self::Emphasis(_)
                | Self::Strong(_)
                | Self::Delete(_)
                | Self::Link { .. }
                | Self::Image { .. }
                | Self::Break
        )
    }
}

/// Concatenate every text leaf below `node`, depth first, with no separator.
///
/// Inline marks are dropped; image alt text and raw HTML contribute nothing.
pub fn flatten_text(node: &Node) -> String {
    let mut out = String::new();
    push_text(node, &mut out);
    out
}

fn push_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(s) | Node::InlineCode(s) => out.push_str(s),
        Node::Code { value, .. } => out.push_str(value),
        Node::Table(rows) => {
            for cell in rows.iter().flatten().flatten() {
                push_text(cell, out);
            }
        }
        other => {
            for child in other.children() {
                push_text(child, out);
            }
        }
    }
}
