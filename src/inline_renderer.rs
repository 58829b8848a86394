// Inline Markup Renderer
// Converts inline AST nodes into a single markup-annotated string for the
// toolkit's rich-text label. Pure function over its configuration; no
// widgets are created here.

use crate::markdown_ast::{Node, NodeType};
use crate::theme::RenderConfig;

/// Escape text for the rich-text markup syntax.
/// The escape character `&` must be handled before the structural brackets
/// so already-escaped sequences are not escaped twice.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('[', "&bl;")
        .replace(']', "&br;")
}

/// Format a 0xRRGGBBAA color as a markup color argument
pub fn color_markup(color: u32) -> String {
    format!("#{:08x}", color)
}

pub struct InlineRenderer {
    code_font_name: String,
    link_color: u32,
    styled_links: bool,
}

impl InlineRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        InlineRenderer {
            code_font_name: config.code_font_name.clone(),
            link_color: config.link_color,
            styled_links: config.styled_links,
        }
    }

    /// Render a sequence of inline nodes into one markup string
    pub fn render<'n>(&self, nodes: impl IntoIterator<Item = &'n Node>) -> String {
        let mut out = String::new();
        for node in nodes {
            self.render_node(node, &mut out);
        }
        out
    }

    fn render_node(&self, node: &Node, out: &mut String) {
        match &node.node_type {
            NodeType::Text => {
                out.push_str(&escape_markup(&node.raw));
            }
            NodeType::Strong => {
                out.push_str("[b]");
                out.push_str(&self.render(&node.children));
                out.push_str("[/b]");
            }
            NodeType::Emphasis => {
                out.push_str("[i]");
                out.push_str(&self.render(&node.children));
                out.push_str("[/i]");
            }
            NodeType::Strikethrough => {
                out.push_str("[s]");
                out.push_str(&self.render(&node.children));
                out.push_str("[/s]");
            }
            NodeType::Codespan => {
                out.push_str(&format!(
                    "[font={}]{}[/font]",
                    self.code_font_name,
                    escape_markup(&node.raw)
                ));
            }
            NodeType::Link { url } => {
                let label = self.render(&node.children);
                if self.styled_links {
                    out.push_str(&format!(
                        "[ref={}][color={}]{}[/color][/ref]",
                        escape_markup(url),
                        color_markup(self.link_color),
                        label
                    ));
                } else {
                    out.push_str(&format!("[ref={}]{}[/ref]", escape_markup(url), label));
                }
            }
            NodeType::Image { .. } => {
                // Inline context: plain alt text only, no widget
                out.push_str(&escape_markup(&node.flatten_text()));
            }
            NodeType::SoftBreak => {
                out.push(' ');
            }
            NodeType::HardBreak => {
                out.push('\n');
            }
            // Raw inline markup and anything unrecognized degrades to
            // escaped raw text
            _ => {
                out.push_str(&escape_markup(&node.raw));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown_ast::Node;

    fn renderer() -> InlineRenderer {
        InlineRenderer::new(&RenderConfig::default())
    }

    #[test]
    fn test_escape_order_prevents_double_escaping() {
        assert_eq!(escape_markup("a&[b]"), "a&amp;&bl;b&br;");
        assert_eq!(escape_markup("&bl;"), "&amp;bl;");
    }

    #[test]
    fn test_render_plain_text() {
        let nodes = vec![Node::text_node(NodeType::Text, "hello [world]")];
        assert_eq!(renderer().render(&nodes), "hello &bl;world&br;");
    }

    #[test]
    fn test_render_strong_and_emphasis() {
        let mut strong = Node::new(NodeType::Strong);
        strong.add_child(Node::text_node(NodeType::Text, "bold"));
        let mut em = Node::new(NodeType::Emphasis);
        em.add_child(Node::text_node(NodeType::Text, "italic"));

        assert_eq!(renderer().render(&[strong, em]), "[b]bold[/b][i]italic[/i]");
    }

    #[test]
    fn test_render_codespan_uses_configured_font() {
        let mut config = RenderConfig::default();
        config.code_font_name = "Mono".to_string();
        let renderer = InlineRenderer::new(&config);

        let nodes = vec![Node::text_node(NodeType::Codespan, "a[0]")];
        assert_eq!(renderer.render(&nodes), "[font=Mono]a&bl;0&br;[/font]");
    }

    #[test]
    fn test_render_link_wraps_label_in_ref() {
        let mut link = Node::new(NodeType::Link {
            url: "http://example.com".to_string(),
        });
        link.add_child(Node::text_node(NodeType::Text, "click"));

        assert_eq!(
            renderer().render(&[link]),
            "[ref=http://example.com]click[/ref]"
        );
    }

    #[test]
    fn test_render_styled_link_adds_color() {
        let mut config = RenderConfig::default();
        config.styled_links = true;
        config.link_color = 0x0000EEFF;
        let renderer = InlineRenderer::new(&config);

        let mut link = Node::new(NodeType::Link {
            url: "page.md".to_string(),
        });
        link.add_child(Node::text_node(NodeType::Text, "go"));

        assert_eq!(
            renderer.render(&[link]),
            "[ref=page.md][color=#0000eeff]go[/color][/ref]"
        );
    }

    #[test]
    fn test_render_inline_image_as_alt_text() {
        let mut image = Node::new(NodeType::Image {
            url: "pic.png".to_string(),
        });
        image.add_child(Node::text_node(NodeType::Text, "an image"));

        assert_eq!(renderer().render(&[image]), "an image");
    }

    #[test]
    fn test_render_breaks() {
        let nodes = vec![
            Node::text_node(NodeType::Text, "a"),
            Node::new(NodeType::SoftBreak),
            Node::text_node(NodeType::Text, "b"),
            Node::new(NodeType::HardBreak),
            Node::text_node(NodeType::Text, "c"),
        ];
        assert_eq!(renderer().render(&nodes), "a b\nc");
    }

    #[test]
    fn test_render_inline_html_is_escaped_verbatim() {
        let nodes = vec![Node::text_node(NodeType::InlineHtml, "<u>[x]</u>")];
        assert_eq!(renderer().render(&nodes), "<u>&bl;x&br;</u>");
    }

    #[test]
    fn test_render_unknown_node_degrades_to_raw() {
        // A block type reaching the inline renderer degrades silently
        let nodes = vec![Node::new(NodeType::ThematicBreak)];
        assert_eq!(renderer().render(&nodes), "");
    }
}
