// Markdown Abstract Syntax Tree
// Represents the parsed structure of a Markdown document

use serde::{Deserialize, Serialize};
use std::fmt;

/// Types of Markdown nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeType {
    /// Block-level elements
    Paragraph,
    Heading {
        level: u8,
    }, // 1-6
    List {
        ordered: bool,
        start: u64,
    },
    ListItem,
    BlockCode {
        language: String,
    },
    BlockQuote,
    ThematicBreak, // Horizontal rule
    Image {
        url: String,
    },
    /// Explicit vertical-rhythm tokens. Some Markdown front ends emit these
    /// between blocks; the bundled pulldown-cmark front end does not, but
    /// the renderer handles them either way.
    BlankLine,
    Newline,

    /// Table extension
    Table,
    TableHead,
    TableRow,
    TableCell,

    /// Inline elements
    Text,
    Strong,
    Emphasis,
    Codespan,
    Strikethrough,
    Link {
        url: String,
    },
    SoftBreak,
    HardBreak,
    InlineHtml,
}

impl NodeType {
    /// Returns true if this node type is a block-level element
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeType::Paragraph
                | NodeType::Heading { .. }
                | NodeType::List { .. }
                | NodeType::ListItem
                | NodeType::BlockCode { .. }
                | NodeType::BlockQuote
                | NodeType::ThematicBreak
                | NodeType::Image { .. }
                | NodeType::BlankLine
                | NodeType::Newline
                | NodeType::Table
                | NodeType::TableHead
                | NodeType::TableRow
                | NodeType::TableCell
        )
    }

    /// Returns true if this node type is an inline element
    pub fn is_inline(&self) -> bool {
        !self.is_block()
    }

    /// Returns true if this node can have children
    pub fn can_have_children(&self) -> bool {
        !matches!(
            self,
            NodeType::Text
                | NodeType::Codespan
                | NodeType::SoftBreak
                | NodeType::HardBreak
                | NodeType::ThematicBreak
                | NodeType::BlankLine
                | NodeType::Newline
                | NodeType::InlineHtml
        )
    }
}

/// An AST node representing an element in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// The type and data of this node
    pub node_type: NodeType,

    /// Literal source text, for leaf/text-bearing types
    pub raw: String,

    /// Child nodes, for container types
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new childless AST node
    pub fn new(node_type: NodeType) -> Self {
        Node {
            node_type,
            raw: String::new(),
            children: Vec::new(),
        }
    }

    /// Create a leaf node carrying raw text
    pub fn text_node(node_type: NodeType, raw: impl Into<String>) -> Self {
        Node {
            node_type,
            raw: raw.into(),
            children: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Get all text content (flattened). Walks with an explicit worklist
    /// so the subtree depth never translates into call-stack depth.
    pub fn flatten_text(&self) -> String {
        let mut result = String::new();
        let mut worklist: Vec<&Node> = vec![self];

        while let Some(node) = worklist.pop() {
            match &node.node_type {
                NodeType::Text | NodeType::Codespan | NodeType::InlineHtml => {
                    result.push_str(&node.raw);
                }
                NodeType::BlockCode { .. } if node.children.is_empty() => {
                    result.push_str(&node.raw);
                }
                NodeType::SoftBreak => {
                    result.push(' ');
                }
                NodeType::HardBreak => {
                    result.push('\n');
                }
                _ => {
                    for child in node.children.iter().rev() {
                        worklist.push(child);
                    }
                }
            }
        }

        result
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_recursive(f, 0)
    }
}

impl Node {
    fn fmt_recursive(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let indent_str = "  ".repeat(indent);

        write!(f, "{}", indent_str)?;

        match &self.node_type {
            NodeType::Text => writeln!(f, "Text: {:?}", self.raw)?,
            NodeType::Codespan => writeln!(f, "Codespan: {:?}", self.raw)?,
            NodeType::Heading { level } => writeln!(f, "Heading(h{})", level)?,
            NodeType::Link { url } => writeln!(f, "Link -> {:?}", url)?,
            NodeType::Image { url } => writeln!(f, "Image -> {:?}", url)?,
            NodeType::BlockCode { language } => writeln!(f, "BlockCode({:?})", language)?,
            NodeType::List { ordered, start } => writeln!(
                f,
                "List({}, start={})",
                if *ordered { "ordered" } else { "unordered" },
                start
            )?,
            other => writeln!(f, "{:?}", other)?,
        }

        for child in &self.children {
            child.fmt_recursive(f, indent + 1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new(NodeType::Paragraph);
        assert!(node.children.is_empty());
        assert!(node.raw.is_empty());
    }

    #[test]
    fn test_add_child() {
        let mut parent = Node::new(NodeType::Paragraph);
        parent.add_child(Node::text_node(NodeType::Text, "hello"));

        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].raw, "hello");
    }

    #[test]
    fn test_flatten_text() {
        let mut para = Node::new(NodeType::Paragraph);
        para.add_child(Node::text_node(NodeType::Text, "hello"));
        para.add_child(Node::new(NodeType::SoftBreak));
        let mut strong = Node::new(NodeType::Strong);
        strong.add_child(Node::text_node(NodeType::Text, "world"));
        para.add_child(strong);

        assert_eq!(para.flatten_text(), "hello world");
    }

    #[test]
    fn test_block_inline_classification() {
        assert!(NodeType::Paragraph.is_block());
        assert!(NodeType::BlockQuote.is_block());
        assert!(NodeType::Strong.is_inline());
        assert!(NodeType::Link { url: String::new() }.is_inline());
        assert!(!NodeType::Text.can_have_children());
        assert!(NodeType::ListItem.can_have_children());
    }
}
