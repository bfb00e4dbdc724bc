//! # Markdown Node Tree
//!
//! Parses markdown with pulldown-cmark into a small typed tree the layout
//! engine walks. Only the constructs the report renders get their own node
//! kinds; everything else becomes [`NodeKind::Unknown`] and contributes its
//! children only.
//!
//! Soft breaks are kept as line breaks: post bodies are written with
//! "one line in the editor is one line on the page" in mind.

use crate::error::{FolioError, Result};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Heading(u8),
    Paragraph,
    Emphasis,
    Strong,
    List { ordered: bool, start: u64 },
    ListItem,
    LineBreak,
    Image { url: String },
    Link { url: String },
    Text(String),
    /// Inline code span.
    Code(String),
    CodeBlock,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MdNode {
    pub kind: NodeKind,
    pub children: Vec<MdNode>,
}

impl MdNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(kind)
    }

    /// Concatenated text of this subtree.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(t) | NodeKind::Code(t) => out.push_str(t),
            NodeKind::LineBreak => out.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

fn kind_for_tag(tag: Tag) -> NodeKind {
    match tag {
        Tag::Heading { level, .. } => NodeKind::Heading(level as u8),
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::List(start) => NodeKind::List {
            ordered: start.is_some(),
            start: start.unwrap_or(1),
        },
        Tag::Item => NodeKind::ListItem,
        Tag::Image { dest_url, .. } => NodeKind::Image {
            url: dest_url.to_string(),
        },
        Tag::Link { dest_url, .. } => NodeKind::Link {
            url: dest_url.to_string(),
        },
        Tag::CodeBlock(_) => NodeKind::CodeBlock,
        _ => NodeKind::Unknown,
    }
}

/// Parse markdown source into a node tree rooted at [`NodeKind::Document`].
pub fn parse(src: &str) -> Result<MdNode> {
    let mut stack: Vec<MdNode> = vec![MdNode::new(NodeKind::Document)];
    let mut in_code_block = false;

    fn push_child(stack: &mut [MdNode], node: MdNode) -> Result<()> {
        stack
            .last_mut()
            .map(|parent| parent.children.push(node))
            .ok_or_else(|| FolioError::Markdown("node outside of document".to_string()))
    }

    for event in Parser::new(src) {
        match event {
            Event::Start(tag) => {
                let kind = kind_for_tag(tag);
                if kind == NodeKind::CodeBlock {
                    in_code_block = true;
                }
                stack.push(MdNode::new(kind));
            }
            Event::End(tag_end) => {
                if matches!(tag_end, TagEnd::CodeBlock) {
                    in_code_block = false;
                    // The closing newline is the block's own trailing break.
                    if let Some(block) = stack.last_mut() {
                        if block.children.last().map(|c| &c.kind) == Some(&NodeKind::LineBreak) {
                            block.children.pop();
                        }
                    }
                }
                if stack.len() < 2 {
                    return Err(FolioError::Markdown(format!(
                        "unbalanced end tag {:?}",
                        tag_end
                    )));
                }
                let node = stack.pop().ok_or_else(|| {
                    FolioError::Markdown("unbalanced end tag".to_string())
                })?;
                push_child(&mut stack, node)?;
            }
            Event::Text(text) if in_code_block => {
                for piece in text.split_inclusive('\n') {
                    let line = piece.trim_end_matches('\n');
                    if !line.is_empty() {
                        push_child(&mut stack, MdNode::leaf(NodeKind::Text(line.to_string())))?;
                    }
                    if piece.ends_with('\n') {
                        push_child(&mut stack, MdNode::leaf(NodeKind::LineBreak))?;
                    }
                }
            }
            Event::Text(text) => {
                push_child(&mut stack, MdNode::leaf(NodeKind::Text(text.to_string())))?;
            }
            Event::Code(code) => {
                push_child(&mut stack, MdNode::leaf(NodeKind::Code(code.to_string())))?;
            }
            Event::SoftBreak | Event::HardBreak => {
                push_child(&mut stack, MdNode::leaf(NodeKind::LineBreak))?;
            }
            other => log::trace!("Ignoring markdown event {:?}", other),
        }
    }

    if stack.len() != 1 {
        return Err(FolioError::Markdown(format!(
            "{} unclosed markdown element(s)",
            stack.len() - 1
        )));
    }
    stack
        .pop()
        .ok_or_else(|| FolioError::Markdown("empty document".to_string()))
}
