// Block Widget Renderer
// Walks block-level AST nodes and produces the widget tree, delegating
// inline content to the InlineRenderer. Recursion state (nesting depth,
// list depth, ordered counters) is threaded explicitly so a renderer can
// be shared across documents without shared mutable state.

use crate::inline_renderer::{InlineRenderer, escape_markup};
use crate::markdown_ast::{Node, NodeType};
use crate::theme::{self, RenderConfig, heading_scale};
use crate::widget::{Decoration, HAlign, LabelProps, Widget};
use log::trace;
use regex::Regex;
use std::sync::OnceLock;

/// Maximum recursion depth; deeper content is flattened to plain text
/// instead of overflowing the stack
pub const MAX_NESTING: u32 = 10;

const THEMATIC_BREAK_HEIGHT: f32 = 12.0;
const CODE_PADDING: f32 = 8.0;
const QUOTE_INDENT: f32 = 16.0;

/// Transient per-pass recursion state
#[derive(Debug, Default)]
struct RenderState {
    nesting_depth: u32,
    list_depth: u32,
    ordered_counters: Vec<u64>,
}

/// Derive an anchor name from heading text: lowercased, with runs of
/// non-alphanumerics collapsed to a single dash
pub fn anchor_slug(text: &str) -> String {
    static SLUG_RE: OnceLock<Regex> = OnceLock::new();
    let re = SLUG_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap());
    re.replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

pub struct BlockRenderer<'a> {
    config: &'a RenderConfig,
    inline: InlineRenderer,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        BlockRenderer {
            config,
            inline: InlineRenderer::new(config),
        }
    }

    /// Render a sequence of block-level nodes into a vertical root container
    pub fn render(&self, nodes: &[Node]) -> Widget {
        let mut state = RenderState::default();
        let mut root = Widget::vbox();
        for node in nodes {
            if let Some(widget) = self.render_token(node, &mut state) {
                root.children.push(widget);
            }
        }
        trace!(
            "rendered {} block nodes into {} widgets",
            nodes.len(),
            root.children.len()
        );
        root
    }

    /// Render one node. Unknown or misplaced node types contribute no
    /// widget; malformed content never raises.
    fn render_token(&self, node: &Node, state: &mut RenderState) -> Option<Widget> {
        match &node.node_type {
            NodeType::Paragraph => Some(self.paragraph(node, state)),
            NodeType::Heading { level } => Some(self.heading(node, *level)),
            NodeType::List { ordered, start } => Some(self.list(node, *ordered, *start, state)),
            // Defensive fallback for an item rendered outside its list
            NodeType::ListItem => {
                let mut body = Widget::vbox();
                body.children = self.render_nested(&node.children, state);
                Some(body)
            }
            NodeType::BlockCode { language } => Some(self.block_code(node, language)),
            NodeType::BlockQuote => Some(self.block_quote(node, state)),
            NodeType::ThematicBreak => Some(self.thematic_break()),
            NodeType::Image { url } => Some(self.block_image(node, url)),
            NodeType::BlankLine => Some(Widget::spacer(self.config.base_font_size)),
            NodeType::Newline => Some(Widget::spacer(self.config.base_font_size * 0.5)),
            NodeType::Table => Some(self.table(node, state)),
            // Inline types and stray table fragments at block level
            _ => None,
        }
    }

    /// Recurse into child block content with the nesting guard applied.
    /// The increment/decrement pair brackets the loop so state never leaks
    /// into sibling branches.
    fn render_nested(&self, nodes: &[Node], state: &mut RenderState) -> Vec<Widget> {
        if state.nesting_depth >= MAX_NESTING {
            // Graceful truncation: flatten remaining content to one label
            let text = nodes
                .iter()
                .map(|node| node.flatten_text())
                .collect::<Vec<_>>()
                .join(" ");
            let text = text.trim();
            if text.is_empty() {
                return Vec::new();
            }
            return vec![self.content_label(escape_markup(text), 1.0)];
        }

        state.nesting_depth += 1;
        let mut out = Vec::new();
        let mut inline_run: Vec<&Node> = Vec::new();
        for node in nodes {
            // Tight list items carry inline content directly; consecutive
            // inline nodes are folded into one paragraph-like label
            if node.node_type.is_inline() {
                inline_run.push(node);
                continue;
            }
            self.flush_inline_run(&mut inline_run, &mut out);
            if let Some(widget) = self.render_token(node, state) {
                out.push(widget);
            }
        }
        self.flush_inline_run(&mut inline_run, &mut out);
        state.nesting_depth -= 1;
        out
    }

    fn flush_inline_run(&self, run: &mut Vec<&Node>, out: &mut Vec<Widget>) {
        if run.is_empty() {
            return;
        }
        let markup = self.inline.render(run.drain(..));
        if !markup.is_empty() {
            out.push(self.content_label(markup, 1.0));
        }
    }

    /// Build a rich-text label sized relative to the base font size
    fn content_label(&self, markup: String, font_scale: f32) -> Widget {
        let mut props = LabelProps::new(markup, self.config.base_font_size * font_scale);
        props.font_scale = font_scale;
        props.font_name = self.config.font_name.clone();
        Widget::label(props)
    }

    fn paragraph(&self, node: &Node, _state: &mut RenderState) -> Widget {
        // A paragraph wrapping a single image is rendered as a block image
        if node.children.len() == 1 {
            if let NodeType::Image { url } = &node.children[0].node_type {
                let url = url.clone();
                return self.block_image(&node.children[0], &url);
            }
        }
        self.content_label(self.inline.render(&node.children), 1.0)
    }

    fn heading(&self, node: &Node, level: u8) -> Widget {
        let level = level.clamp(1, 6);
        let markup = self.inline.render(&node.children);
        let mut widget = self.content_label(markup, heading_scale(level));
        if let Some(props) = widget.label_props_mut() {
            props.bold = true;
            let slug = anchor_slug(&node.flatten_text());
            if !slug.is_empty() {
                // Seed the anchor at the label origin; the toolkit's text
                // layout refines the position once the texture exists
                props.anchors.insert(slug, (0.0, 0.0));
            }
        }
        widget.meta.heading_level = Some(level);
        widget
    }

    fn list(&self, node: &Node, ordered: bool, start: u64, state: &mut RenderState) -> Widget {
        state.list_depth += 1;
        if ordered {
            state.ordered_counters.push(start);
        }

        let mut container = Widget::vbox();
        container.padding[0] = state.list_depth as f32 * theme::LIST_INDENT;

        let mut item_index: u64 = 0;
        for child in &node.children {
            if !matches!(child.node_type, NodeType::ListItem) {
                continue;
            }

            let marker_text = if ordered {
                let counter = state.ordered_counters.last().copied().unwrap_or(1);
                format!("{}.", counter + item_index)
            } else {
                "\u{2022}".to_string()
            };

            let mut marker_props = LabelProps::new(marker_text, self.config.base_font_size);
            marker_props.markup_enabled = false;
            marker_props.halign = HAlign::Right;
            marker_props.font_name = self.config.font_name.clone();
            let mut marker = Widget::label(marker_props);
            marker.fixed_width = Some(theme::LIST_MARKER_WIDTH);

            let mut body = Widget::vbox();
            body.children = self.render_nested(&child.children, state);

            let mut row = Widget::hbox();
            row.children.push(marker);
            row.children.push(body);
            container.children.push(row);

            item_index += 1;
        }

        // Must happen even on empty/malformed lists so sibling branches
        // see consistent depth and counters
        if ordered {
            state.ordered_counters.pop();
        }
        state.list_depth -= 1;

        container
    }

    fn block_code(&self, node: &Node, language: &str) -> Widget {
        let raw = node.flatten_text();
        let code = raw.strip_suffix('\n').unwrap_or(&raw);

        let mut props = LabelProps::new(escape_markup(code), self.config.base_font_size);
        props.font_name = Some(self.config.code_font_name.clone());
        props.color = theme::CODE_TEXT_COLOR;
        props.fixed_color = true;

        let mut container = Widget::vbox();
        container.padding = [CODE_PADDING; 4];
        container.decorations.push(Decoration::FilledRect {
            color: self.config.code_bg_color,
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
        });
        container.meta.code_language = Some(language.to_string());
        container.children.push(Widget::label(props));
        container
    }

    fn block_quote(&self, node: &Node, state: &mut RenderState) -> Widget {
        let mut container = Widget::vbox();
        container.padding[0] = QUOTE_INDENT;
        container.decorations.push(Decoration::LeftBar {
            color: theme::BORDER_COLOR,
            width: theme::QUOTE_BAR_WIDTH,
            x: 0.0,
            y: 0.0,
            h: 0.0,
        });
        container.children = self.render_nested(&node.children, state);
        container
    }

    fn thematic_break(&self) -> Widget {
        let mut spacer = Widget::spacer(THEMATIC_BREAK_HEIGHT);
        spacer.decorations.push(Decoration::CenterLine {
            color: theme::BORDER_COLOR,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
        });
        spacer
    }

    fn block_image(&self, node: &Node, url: &str) -> Widget {
        Widget::image(url, node.flatten_text())
    }

    fn table(&self, node: &Node, state: &mut RenderState) -> Widget {
        let mut container = Widget::vbox();
        for child in &node.children {
            match child.node_type {
                NodeType::TableHead => container.children.push(self.table_row(child, true, state)),
                NodeType::TableRow => container.children.push(self.table_row(child, false, state)),
                _ => {}
            }
        }
        container
    }

    fn table_row(&self, node: &Node, header: bool, _state: &mut RenderState) -> Widget {
        let mut row = Widget::hbox();
        for cell in &node.children {
            if !matches!(cell.node_type, NodeType::TableCell) {
                continue;
            }
            let mut label = self.content_label(self.inline.render(&cell.children), 1.0);
            if header {
                if let Some(props) = label.label_props_mut() {
                    props.bold = true;
                }
            }
            row.children.push(label);
        }
        row
    }
}
