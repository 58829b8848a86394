// Markdown Serializer
// Converts the cached AST back into Markdown source text. Operates purely
// on the AST; round-trips are semantic rather than byte-identical.

use crate::markdown_ast::{Node, NodeType};

/// Serialize a sequence of top-level AST nodes to Markdown text
pub fn serialize(nodes: &[Node]) -> String {
    let blocks: Vec<String> = nodes
        .iter()
        .filter_map(|node| block_to_markdown(node, 0))
        .collect();
    blocks.join("\n\n")
}

fn block_to_markdown(node: &Node, list_depth: usize) -> Option<String> {
    match &node.node_type {
        NodeType::Paragraph => Some(inline_to_markdown(&node.children)),
        NodeType::Heading { level } => {
            let level = (*level).clamp(1, 6) as usize;
            Some(format!(
                "{} {}",
                "#".repeat(level),
                inline_to_markdown(&node.children)
            ))
        }
        NodeType::BlockCode { language } => {
            let raw = node.flatten_text();
            let code = raw.strip_suffix('\n').unwrap_or(&raw);
            Some(format!("```{}\n{}\n```", language, code))
        }
        NodeType::BlockQuote => {
            let inner: Vec<String> = node
                .children
                .iter()
                .filter_map(|child| block_to_markdown(child, list_depth))
                .collect();
            let quoted: Vec<String> = inner
                .join("\n\n")
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {}", line)
                    }
                })
                .collect();
            Some(quoted.join("\n"))
        }
        NodeType::ThematicBreak => Some("---".to_string()),
        NodeType::Image { url } => Some(format!("![{}]({})", node.flatten_text(), url)),
        NodeType::List { ordered, start } => {
            Some(list_to_markdown(node, *ordered, *start, list_depth))
        }
        NodeType::Table => Some(table_to_markdown(node)),
        // Vertical-rhythm tokens are implied by the blank line between blocks
        _ => None,
    }
}

fn list_to_markdown(node: &Node, ordered: bool, start: u64, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let mut lines: Vec<String> = Vec::new();
    let mut item_index: u64 = 0;

    for item in &node.children {
        if !matches!(item.node_type, NodeType::ListItem) {
            continue;
        }

        let marker = if ordered {
            format!("{}. ", start + item_index)
        } else {
            "- ".to_string()
        };

        // Inline content (tight items) and paragraph children make up the
        // item line; nested lists follow on their own lines
        let mut inline_parts: Vec<&Node> = Vec::new();
        let mut trailing: Vec<String> = Vec::new();
        for child in &item.children {
            match &child.node_type {
                NodeType::Paragraph => inline_parts.extend(child.children.iter()),
                NodeType::List {
                    ordered: nested_ordered,
                    start: nested_start,
                } => {
                    trailing.push(list_to_markdown(
                        child,
                        *nested_ordered,
                        *nested_start,
                        depth + 1,
                    ));
                }
                node_type if node_type.is_inline() => inline_parts.push(child),
                _ => {
                    if let Some(block) = block_to_markdown(child, depth + 1) {
                        trailing.push(block);
                    }
                }
            }
        }

        let mut owned_run = String::new();
        for part in &inline_parts {
            owned_run.push_str(&inline_node_to_markdown(part));
        }
        lines.push(format!("{}{}{}", indent, marker, owned_run));
        lines.extend(trailing);

        item_index += 1;
    }

    lines.join("\n")
}

fn table_to_markdown(node: &Node) -> String {
    let mut lines: Vec<String> = Vec::new();

    for child in &node.children {
        match child.node_type {
            NodeType::TableHead => {
                let cells = row_cells(child);
                lines.push(format!("| {} |", cells.join(" | ")));
                let separators: Vec<&str> = cells.iter().map(|_| "---").collect();
                lines.push(format!("| {} |", separators.join(" | ")));
            }
            NodeType::TableRow => {
                lines.push(format!("| {} |", row_cells(child).join(" | ")));
            }
            _ => {}
        }
    }

    lines.join("\n")
}

fn row_cells(node: &Node) -> Vec<String> {
    node.children
        .iter()
        .filter(|cell| matches!(cell.node_type, NodeType::TableCell))
        .map(|cell| inline_to_markdown(&cell.children))
        .collect()
}

fn inline_to_markdown(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&inline_node_to_markdown(node));
    }
    out
}

fn inline_node_to_markdown(node: &Node) -> String {
    match &node.node_type {
        NodeType::Text => node.raw.clone(),
        NodeType::Strong => format!("**{}**", inline_to_markdown(&node.children)),
        NodeType::Emphasis => format!("*{}*", inline_to_markdown(&node.children)),
        NodeType::Strikethrough => format!("~~{}~~", inline_to_markdown(&node.children)),
        NodeType::Codespan => format!("`{}`", node.raw),
        NodeType::Link { url } => format!("[{}]({})", inline_to_markdown(&node.children), url),
        NodeType::Image { url } => format!("![{}]({})", node.flatten_text(), url),
        NodeType::SoftBreak => " ".to_string(),
        NodeType::HardBreak => "  \n".to_string(),
        NodeType::InlineHtml => node.raw.clone(),
        _ => node.flatten_text(),
    }
}
