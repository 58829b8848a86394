// Markdown Parser - converts pulldown-cmark events into our AST
use crate::markdown_ast::*;
use pulldown_cmark::{Event, Options, Parser, Tag};

/// Containers opened past this depth are not given their own node; their
/// content attaches to the deepest real container instead. Keeps the tree
/// depth bounded for any input, so every recursive walk over the AST
/// (flattening, serialization, drop) stays within the call stack.
pub const MAX_PARSE_DEPTH: usize = 32;

/// Parse markdown text into a sequence of top-level AST nodes
pub fn parse_markdown(text: &str) -> Vec<Node> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(text, options);

    // Stack to track open container nodes
    let mut node_stack: Vec<Node> = Vec::new();
    let mut root_children: Vec<Node> = Vec::new();
    // Count of open containers past the depth bound
    let mut collapsed: usize = 0;

    for event in parser {
        match event {
            Event::Start(tag) => {
                if node_stack.len() >= MAX_PARSE_DEPTH {
                    collapsed += 1;
                } else {
                    node_stack.push(Node::new(node_type_for_tag(&tag)));
                }
            }

            Event::End(_) => {
                if collapsed > 0 {
                    collapsed -= 1;
                } else if let Some(completed) = node_stack.pop() {
                    // Pop the completed node and add to parent
                    attach(&mut node_stack, &mut root_children, completed);
                }
            }

            Event::Text(text_content) => {
                let node = Node::text_node(NodeType::Text, text_content.to_string());
                attach(&mut node_stack, &mut root_children, node);
            }

            Event::Code(code_content) => {
                let node = Node::text_node(NodeType::Codespan, code_content.to_string());
                attach(&mut node_stack, &mut root_children, node);
            }

            Event::SoftBreak => {
                attach(
                    &mut node_stack,
                    &mut root_children,
                    Node::new(NodeType::SoftBreak),
                );
            }

            Event::HardBreak => {
                attach(
                    &mut node_stack,
                    &mut root_children,
                    Node::new(NodeType::HardBreak),
                );
            }

            Event::Rule => {
                attach(
                    &mut node_stack,
                    &mut root_children,
                    Node::new(NodeType::ThematicBreak),
                );
            }

            Event::Html(html) | Event::InlineHtml(html) => {
                let node = Node::text_node(NodeType::InlineHtml, html.to_string());
                attach(&mut node_stack, &mut root_children, node);
            }

            _ => {
                // Ignore other events (FootnoteReference, TaskListMarker, etc.)
            }
        }
    }

    // Unterminated containers (malformed input) are attached as-is
    while let Some(completed) = node_stack.pop() {
        attach(&mut node_stack, &mut root_children, completed);
    }

    root_children
}

/// Add a completed node to the innermost open container that accepts
/// children, or to the root
fn attach(node_stack: &mut Vec<Node>, root_children: &mut Vec<Node>, node: Node) {
    let parent = node_stack
        .iter_mut()
        .rev()
        .find(|open| open.node_type.can_have_children());
    if let Some(parent) = parent {
        parent.add_child(node);
    } else {
        root_children.push(node);
    }
}

/// Map a pulldown-cmark Tag to our node type
fn node_type_for_tag(tag: &Tag) -> NodeType {
    match tag {
        Tag::Paragraph => NodeType::Paragraph,

        Tag::Heading { level, .. } => NodeType::Heading {
            level: *level as u8,
        },

        Tag::BlockQuote(_) => NodeType::BlockQuote,

        Tag::CodeBlock(kind) => {
            let language = match kind {
                pulldown_cmark::CodeBlockKind::Indented => String::new(),
                pulldown_cmark::CodeBlockKind::Fenced(info) => info
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            };

            NodeType::BlockCode { language }
        }

        Tag::List(start_number) => NodeType::List {
            ordered: start_number.is_some(),
            start: start_number.unwrap_or(1),
        },

        Tag::Item => NodeType::ListItem,

        Tag::Emphasis => NodeType::Emphasis,
        Tag::Strong => NodeType::Strong,
        Tag::Strikethrough => NodeType::Strikethrough,

        Tag::Link { dest_url, .. } => NodeType::Link {
            url: dest_url.to_string(),
        },

        Tag::Image { dest_url, .. } => NodeType::Image {
            url: dest_url.to_string(),
        },

        Tag::Table(_) => NodeType::Table,
        Tag::TableHead => NodeType::TableHead,
        Tag::TableRow => NodeType::TableRow,
        Tag::TableCell => NodeType::TableCell,

        // Default fallback for container tags we don't model
        _ => NodeType::Paragraph,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_paragraph() {
        let nodes = parse_markdown("This is a paragraph.");

        assert_eq!(nodes.len(), 1);
        assert!(matches!(nodes[0].node_type, NodeType::Paragraph));
        assert_eq!(nodes[0].flatten_text(), "This is a paragraph.");
    }

    #[test]
    fn test_parse_heading() {
        let nodes = parse_markdown("# Heading 1\n\nSome text.");

        assert_eq!(nodes.len(), 2);
        assert!(matches!(
            nodes[0].node_type,
            NodeType::Heading { level: 1 }
        ));
        assert!(matches!(nodes[1].node_type, NodeType::Paragraph));
    }

    #[test]
    fn test_parse_link_container() {
        let nodes = parse_markdown("This is a [link](target.md).");

        assert_eq!(nodes.len(), 1);
        let para = &nodes[0];

        let link = para
            .children
            .iter()
            .find(|child| matches!(child.node_type, NodeType::Link { .. }))
            .expect("expected a link node");
        assert!(matches!(
            &link.node_type,
            NodeType::Link { url } if url == "target.md"
        ));
        assert_eq!(link.flatten_text(), "link");
    }

    #[test]
    fn test_parse_strong_container() {
        let nodes = parse_markdown("Hello **world**!");

        let para = &nodes[0];
        let strong = para
            .children
            .iter()
            .find(|child| matches!(child.node_type, NodeType::Strong))
            .expect("expected a strong node");
        assert_eq!(strong.flatten_text(), "world");
    }

    #[test]
    fn test_parse_code_block() {
        let nodes = parse_markdown("```rust\nfn main() {}\n```");

        assert_eq!(nodes.len(), 1);
        match &nodes[0].node_type {
            NodeType::BlockCode { language } => {
                assert_eq!(language, "rust");
            }
            _ => panic!("Expected code block"),
        }
        assert_eq!(nodes[0].flatten_text(), "fn main() {}\n");
    }

    #[test]
    fn test_parse_indented_code_block_has_empty_language() {
        let nodes = parse_markdown("    indented code\n");

        match &nodes[0].node_type {
            NodeType::BlockCode { language } => assert_eq!(language, ""),
            _ => panic!("Expected code block"),
        }
    }

    #[test]
    fn test_parse_list() {
        let nodes = parse_markdown("- Item 1\n- Item 2\n- Item 3");

        assert_eq!(nodes.len(), 1);
        match &nodes[0].node_type {
            NodeType::List { ordered, .. } => {
                assert!(!ordered);
                assert_eq!(nodes[0].children.len(), 3);
            }
            _ => panic!("Expected list"),
        }
    }

    #[test]
    fn test_parse_ordered_list_start() {
        let nodes = parse_markdown("3. three\n4. four");

        match &nodes[0].node_type {
            NodeType::List { ordered, start } => {
                assert!(ordered);
                assert_eq!(*start, 3);
            }
            _ => panic!("Expected list"),
        }
    }

    #[test]
    fn test_parse_strikethrough_extension() {
        let nodes = parse_markdown("some ~~gone~~ text");

        let para = &nodes[0];
        let has_strike = para
            .children
            .iter()
            .any(|child| matches!(child.node_type, NodeType::Strikethrough));
        assert!(has_strike);
    }

    #[test]
    fn test_pathological_quote_nesting_is_depth_bounded() {
        let mut text = "> ".repeat(100_000);
        text.push_str("bottom");
        let nodes = parse_markdown(&text);

        let mut max_depth = 0;
        let mut worklist: Vec<(&Node, usize)> = nodes.iter().map(|n| (n, 1)).collect();
        while let Some((node, depth)) = worklist.pop() {
            max_depth = max_depth.max(depth);
            for child in &node.children {
                worklist.push((child, depth + 1));
            }
        }

        // Containers are capped; a leaf under the deepest container is fine
        assert!(max_depth <= MAX_PARSE_DEPTH + 1, "depth {}", max_depth);
        assert!(nodes[0].flatten_text().contains("bottom"));
    }

    #[test]
    fn test_leaf_node_types_never_gain_children() {
        let documents = [
            "para **bold** `code`\n\n---\n\n> quote\n\n- item\n  - nested",
            "# h\n\ntext with <b>html</b> and [l](u)",
        ];

        for doc in documents {
            let nodes = parse_markdown(doc);
            let mut worklist: Vec<&Node> = nodes.iter().collect();
            while let Some(node) = worklist.pop() {
                if !node.node_type.can_have_children() {
                    assert!(
                        node.children.is_empty(),
                        "{:?} should stay a leaf",
                        node.node_type
                    );
                }
                worklist.extend(node.children.iter());
            }
        }
    }

    #[test]
    fn test_parse_table_extension() {
        let nodes = parse_markdown("| a | b |\n| - | - |\n| 1 | 2 |");

        assert!(matches!(nodes[0].node_type, NodeType::Table));
        assert!(nodes[0]
            .children
            .iter()
            .any(|child| matches!(child.node_type, NodeType::TableHead)));
    }
}
