//! Markdown → editor block records.
//!
//! The projector parses CommonMark and walks the tree once. Headings,
//! paragraphs, lists, blockquotes, code blocks and thematic breaks each
//! become one block and are not descended into; every other node is
//! recursed into looking for those kinds. Text is flattened, so inline
//! marks and links are lost, and tables are not recognised.
//!
//! The result is keyed by block id. Display order lives in
//! `meta.order`; use [`in_order`] to get the sequence back.
//!
//! ```rust
//! use docshift::blocks::{in_order, markdown_to_blocks, BlockType};
//!
//! let blocks = markdown_to_blocks("# Scope\n\nSupply laptops.");
//! let ordered = in_order(&blocks);
//! assert_eq!(ordered[0].kind, BlockType::HeadingOne);
//! assert_eq!(ordered[1].children[0].text, "Supply laptops.");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::markdown::{flatten_text, parse, Node};

/// Blocks keyed by their id.
pub type BlockMap = HashMap<String, Block>;

/// Editor block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    BulletedList,
    NumberedList,
    Blockquote,
    Code,
    Divider,
}

impl BlockType {
    /// Heading block for a Markdown depth, clamped to three levels.
    pub fn heading(depth: u8) -> Self {
        match depth {
            0 | 1 => Self::HeadingOne,
            2 => Self::HeadingTwo,
            _ => Self::HeadingThree,
        }
    }
}

/// One run of plain text inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineText {
    pub text: String,
}

impl InlineText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Block properties. Only code blocks carry any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProps {
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMeta {
    /// Emission index, gapless from 0.
    pub order: usize,
    /// Nesting depth; always 0.
    pub depth: usize,
}

/// An editor block record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Random UUID v4, never derived from content.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub children: Vec<InlineText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<BlockProps>,
    pub meta: BlockMeta,
}

/// Project Markdown into editor blocks.
///
/// Empty input yields an empty map.
pub fn markdown_to_blocks(markdown: &str) -> BlockMap {
    let tree = parse(markdown);
    let mut projector = Projector::default();
    projector.visit(&tree);
    debug!(blocks = projector.blocks.len(), "projected markdown to blocks");
    projector.blocks
}

/// Blocks sorted by `meta.order`.
pub fn in_order(blocks: &BlockMap) -> Vec<&Block> {
    let mut ordered: Vec<&Block> = blocks.values().collect();
    ordered.sort_by_key(|block| block.meta.order);
    ordered
}

#[derive(Default)]
struct Projector {
    blocks: BlockMap,
    next_order: usize,
}

impl Projector {
    fn visit(&mut self, node: &Node) {
        match node {
            Node::Heading { depth, .. } => {
                self.text_block(BlockType::heading(*depth), node);
            }
            Node::Paragraph(_) => self.text_block(BlockType::Paragraph, node),
            Node::Blockquote(_) => self.text_block(BlockType::Blockquote, node),
            Node::List {
                ordered, children, ..
            } => {
                let items: Vec<InlineText> = children
                    .iter()
                    .map(|item| flatten_text(item).trim().to_string())
                    .filter(|text| !text.is_empty())
                    .map(InlineText::new)
                    .collect();
                if !items.is_empty() {
                    let kind = if *ordered {
                        BlockType::NumberedList
                    } else {
                        BlockType::BulletedList
                    };
                    self.push(kind, items, None);
                }
            }
            Node::Code { lang, value } => self.push(
                BlockType::Code,
                vec![InlineText::new(value.clone())],
                Some(BlockProps {
                    language: lang.clone(),
                }),
            ),
            Node::ThematicBreak => self.push(BlockType::Divider, vec![InlineText::new("")], None),
            other => {
                for child in other.children() {
                    self.visit(child);
                }
            }
        }
    }

    fn text_block(&mut self, kind: BlockType, node: &Node) {
        let text = flatten_text(node);
        let text = text.trim();
        if !text.is_empty() {
            self.push(kind, vec![InlineText::new(text)], None);
        }
    }

    fn push(&mut self, kind: BlockType, children: Vec<InlineText>, props: Option<BlockProps>) {
        let id = Uuid::new_v4().to_string();
        let block = Block {
            id: id.clone(),
            kind,
            children,
            props,
            meta: BlockMeta {
                order: self.next_order,
                depth: 0,
            },
        };
        self.next_order += 1;
        self.blocks.insert(id, block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(blocks: &BlockMap) -> Vec<BlockType> {
        in_order(blocks).iter().map(|b| b.kind).collect()
    }

    fn texts(block: &Block) -> Vec<&str> {
        block.children.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn empty_markdown_is_empty_map() {
        assert!(markdown_to_blocks("").is_empty());
        assert!(markdown_to_blocks("   \n\n").is_empty());
    }

    #[test]
    fn heading_depth_is_clamped() {
        let blocks = markdown_to_blocks("# One\n\n## Two\n\n### Three\n\n##### Five");
        assert_eq!(
            kinds(&blocks),
            vec![
                BlockType::HeadingOne,
                BlockType::HeadingTwo,
                BlockType::HeadingThree,
                BlockType::HeadingThree,
            ]
        );
        assert_eq!(texts(in_order(&blocks)[3]), vec!["Five"]);
    }

    #[test]
    fn order_is_gapless_emission_index() {
        let md = "# Title\n\ntext\n\n- a\n- b\n\n> quote\n\n```\n```\n\n---\n\n1. x\n";
        let blocks = markdown_to_blocks(md);
        let orders: Vec<usize> = in_order(&blocks).iter().map(|b| b.meta.order).collect();
        assert_eq!(orders, (0..blocks.len()).collect::<Vec<_>>());
        assert_eq!(blocks.len(), 7);
        assert!(blocks.values().all(|b| b.meta.depth == 0));
    }

    #[test]
    fn ids_are_unique_uuids() {
        let blocks = markdown_to_blocks("a\n\nb\n\nc");
        for (key, block) in &blocks {
            assert_eq!(key, &block.id);
            assert_eq!(Uuid::parse_str(&block.id).unwrap().get_version_num(), 4);
        }
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn empty_list_items_are_dropped() {
        let blocks = markdown_to_blocks("- first\n-   \n- third\n");
        let ordered = in_order(&blocks);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].kind, BlockType::BulletedList);
        assert_eq!(texts(ordered[0]), vec!["first", "third"]);
    }

    #[test]
    fn all_empty_list_emits_nothing() {
        assert!(markdown_to_blocks("-\n-\n").is_empty());
    }

    #[test]
    fn ordered_list_is_numbered() {
        let blocks = markdown_to_blocks("3. three\n4. four\n");
        let ordered = in_order(&blocks);
        assert_eq!(ordered[0].kind, BlockType::NumberedList);
        assert_eq!(texts(ordered[0]), vec!["three", "four"]);
    }

    #[test]
    fn nested_list_item_text_is_flattened() {
        let blocks = markdown_to_blocks("- parent\n  - child\n- next\n");
        let ordered = in_order(&blocks);
        assert_eq!(ordered.len(), 1);
        assert_eq!(texts(ordered[0]), vec!["parentchild", "next"]);
    }

    #[test]
    fn inline_marks_are_flattened() {
        let blocks = markdown_to_blocks("Use **bold**, *em* and [links](https://x.test) `code`.");
        let ordered = in_order(&blocks);
        assert_eq!(texts(ordered[0]), vec!["Use bold, em and links code."]);
        assert!(ordered[0].props.is_none());
    }

    #[test]
    fn hard_breaks_contribute_no_text() {
        let blocks = markdown_to_blocks("Lot 1  \nLot 2\\\nLot 3\n");
        assert_eq!(texts(in_order(&blocks)[0]), vec!["Lot 1Lot 2Lot 3"]);
    }

    #[test]
    fn code_blocks_always_emitted() {
        let blocks = markdown_to_blocks("```rust\nfn main() {}\n```\n\n```\n```\n");
        let ordered = in_order(&blocks);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].kind, BlockType::Code);
        assert_eq!(texts(ordered[0]), vec!["fn main() {}"]);
        assert_eq!(
            ordered[0].props,
            Some(BlockProps {
                language: Some("rust".to_string())
            })
        );
        assert_eq!(texts(ordered[1]), vec![""]);
        assert_eq!(ordered[1].props, Some(BlockProps { language: None }));
    }

    #[test]
    fn thematic_break_is_divider() {
        let blocks = markdown_to_blocks("above\n\n---\n\nbelow");
        assert_eq!(
            kinds(&blocks),
            vec![BlockType::Paragraph, BlockType::Divider, BlockType::Paragraph]
        );
    }

    #[test]
    fn blockquote_is_terminal() {
        let blocks = markdown_to_blocks("> # Inside\n> text\n");
        let ordered = in_order(&blocks);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].kind, BlockType::Blockquote);
        assert_eq!(texts(ordered[0]), vec!["Insidetext"]);
    }

    #[test]
    fn gfm_tables_degrade_to_paragraph_text() {
        let blocks = markdown_to_blocks("| a | b |\n| --- | --- |\n| 1 | 2 |\n");
        let ordered = in_order(&blocks);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].kind, BlockType::Paragraph);
        assert!(ordered[0].children[0].text.contains("| a | b |"));
    }

    #[test]
    fn serializes_editor_shape() {
        let blocks = markdown_to_blocks("## Terms");
        let block = in_order(&blocks)[0];
        let json = serde_json::to_value(block).unwrap();
        assert_eq!(json["type"], "HeadingTwo");
        assert_eq!(json["children"][0]["text"], "Terms");
        assert_eq!(json["meta"]["order"], 0);
        assert_eq!(json["meta"]["depth"], 0);
        assert!(json.get("props").is_none());

        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(&back, block);
    }
}
