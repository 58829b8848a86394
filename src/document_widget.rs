// Document Widget
// The public-facing composite widget. Owns the Markdown source text, the
// cached AST and the mounted widget subtree, and implements the reactive
// update protocol: style-only changes are pushed onto mounted widgets in
// place, structure changes rebuild the subtree.
//
// Property classification (the single source of truth):
//
//   style-only  text color, disabled flag, disabled color, horizontal
//               alignment, base text direction, line height, base font size
//   structure   text, font family, code font name, link color, code
//               background color, styled-links mode
//
// Style updates never change widget identities; structure updates replace
// every descendant while the document widget itself stays.

use crate::block_renderer::BlockRenderer;
use crate::coords;
use crate::markdown_ast::Node;
use crate::markdown_parser::parse_markdown;
use crate::serializer;
use crate::theme::{self, RenderConfig};
use crate::widget::{BaseDirection, HAlign, Widget, WidgetId};
use log::debug;
use std::collections::{HashMap, HashSet};

type RefPressCallback = Box<dyn FnMut(&str)>;

pub struct DocumentWidget {
    root: Widget,
    text: String,
    ast: Vec<Node>,
    config: RenderConfig,

    // Style-only properties
    text_color: u32,
    disabled: bool,
    disabled_color: u32,
    halign: HAlign,
    base_direction: Option<BaseDirection>,
    line_height: f32,

    /// Layout width given by the host
    width: f32,

    /// Coalescing dirty flag; any number of pending structure changes
    /// collapse into one rebuild
    rebuild_pending: bool,
    rebuild_count: u64,

    /// Ids of mounted labels carrying reference tags, refreshed after
    /// every rebuild
    link_sources: HashSet<WidgetId>,
    ref_press_callbacks: Vec<RefPressCallback>,
}

impl DocumentWidget {
    pub fn new(config: RenderConfig) -> Self {
        DocumentWidget {
            root: Widget::vbox(),
            text: String::new(),
            ast: Vec::new(),
            config,
            text_color: theme::TEXT_COLOR,
            disabled: false,
            disabled_color: theme::DISABLED_COLOR,
            halign: HAlign::Auto,
            base_direction: None,
            line_height: 1.0,
            width: 800.0,
            rebuild_pending: false,
            rebuild_count: 0,
            link_sources: HashSet::new(),
            ref_press_callbacks: Vec::new(),
        }
    }

    /// Set the Markdown source. Empty text clears the document; non-empty
    /// text re-parses and rebuilds the whole subtree.
    pub fn set_text(&mut self, text: &str) {
        if text.is_empty() {
            self.text.clear();
            self.ast.clear();
            self.root.children.clear();
            self.link_sources.clear();
            self.rebuild_pending = false;
            debug!("cleared document");
            return;
        }

        self.text = text.to_string();
        self.ast = parse_markdown(text);
        self.rebuild();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The currently cached AST; empty when the document is empty
    pub fn ast(&self) -> &[Node] {
        &self.ast
    }

    /// Serialize the cached AST back to Markdown source text
    pub fn to_markdown(&self) -> String {
        serializer::serialize(&self.ast)
    }

    // --- Style-only properties -------------------------------------------

    pub fn set_text_color(&mut self, color: u32) {
        self.text_color = color;
        self.push_style();
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        self.push_style();
    }

    pub fn set_disabled_color(&mut self, color: u32) {
        self.disabled_color = color;
        self.push_style();
    }

    pub fn set_halign(&mut self, halign: HAlign) {
        self.halign = halign;
        self.push_style();
    }

    pub fn set_base_direction(&mut self, direction: Option<BaseDirection>) {
        self.base_direction = direction;
        self.push_style();
    }

    pub fn set_line_height(&mut self, line_height: f32) {
        self.line_height = line_height;
        self.push_style();
    }

    pub fn set_base_font_size(&mut self, size: f32) {
        self.config.base_font_size = size;
        self.push_style();
    }

    // --- Structure properties --------------------------------------------

    pub fn set_font_name(&mut self, font_name: Option<String>) {
        self.config.font_name = font_name;
        self.schedule_rebuild();
    }

    pub fn set_code_font_name(&mut self, font_name: impl Into<String>) {
        self.config.code_font_name = font_name.into();
        self.schedule_rebuild();
    }

    pub fn set_link_color(&mut self, color: u32) {
        self.config.link_color = color;
        self.schedule_rebuild();
    }

    pub fn set_code_bg_color(&mut self, color: u32) {
        self.config.code_bg_color = color;
        self.schedule_rebuild();
    }

    pub fn set_styled_links(&mut self, styled: bool) {
        self.config.styled_links = styled;
        self.schedule_rebuild();
    }

    // --- Rebuild scheduling ----------------------------------------------

    fn schedule_rebuild(&mut self) {
        self.rebuild_pending = true;
    }

    /// Host-loop hook: performs a pending rebuild, if any
    pub fn tick(&mut self) {
        if self.rebuild_pending {
            self.rebuild();
        }
    }

    /// Perform any pending rebuild synchronously, for callers that need
    /// up-to-date geometry before the next frame
    pub fn force_rebuild(&mut self) {
        if self.rebuild_pending {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        self.rebuild_pending = false;

        let renderer = BlockRenderer::new(&self.config);
        let rendered = renderer.render(&self.ast);

        // Fully detach the old subtree before attaching the new one so no
        // observer sees a partially-updated document
        self.root.children.clear();
        self.root.children = rendered.children;

        self.push_style();
        self.register_link_sources();
        self.rebuild_count += 1;
        debug!(
            "rebuilt document subtree: {} top-level widgets",
            self.root.children.len()
        );
    }

    /// Number of rebuilds performed so far; deferred changes coalesce, so
    /// this advances once per flush
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    // --- Style pushes ----------------------------------------------------

    /// Push the current style values onto every mounted label. Widget
    /// identities are untouched; the push completes before returning.
    fn push_style(&mut self) {
        let halign = self.resolved_halign();
        let base = self.config.base_font_size;
        let disabled = self.disabled;
        let disabled_color = self.disabled_color;
        let text_color = self.text_color;
        let line_height = self.line_height;

        self.root.for_each_mut(&mut |widget| {
            if let Some(props) = widget.label_props_mut() {
                props.font_size = base * props.font_scale;
                props.line_height = line_height;
                if props.markup_enabled {
                    props.halign = halign;
                }
                props.color = if disabled {
                    disabled_color
                } else if props.fixed_color {
                    theme::CODE_TEXT_COLOR
                } else {
                    text_color
                };
            }
        });

        // Font sizes feed label heights; keep geometry and decorations
        // consistent within the same call
        self.root.layout(self.width);
        debug!("pushed style values to mounted subtree");
    }

    /// An explicit alignment wins; the auto sentinel derives from the base
    /// text direction
    fn resolved_halign(&self) -> HAlign {
        match self.halign {
            HAlign::Auto => match self.base_direction {
                Some(BaseDirection::Rtl) | Some(BaseDirection::WeakRtl) => HAlign::Right,
                _ => HAlign::Left,
            },
            explicit => explicit,
        }
    }

    // --- Geometry ---------------------------------------------------------

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.root.layout(width);
    }

    pub fn root(&self) -> &Widget {
        &self.root
    }

    /// Mutable access for the hosting toolkit, which writes rendered
    /// texture sizes and reference zones back onto mounted labels
    pub fn root_mut(&mut self) -> &mut Widget {
        &mut self.root
    }

    /// Immediate children of the document, one widget per rendered block
    pub fn children(&self) -> &[Widget] {
        &self.root.children
    }

    /// Ids of every mounted descendant widget (excluding the document's
    /// own root)
    pub fn descendant_ids(&self) -> HashSet<WidgetId> {
        let mut ids = HashSet::new();
        for child in &self.root.children {
            child.collect_ids(&mut ids);
        }
        ids
    }

    // --- Link bubbling ----------------------------------------------------

    /// Subscribe to link activations bubbled up from descendant labels
    pub fn on_ref_press(&mut self, callback: impl FnMut(&str) + 'static) {
        self.ref_press_callbacks.push(Box::new(callback));
    }

    fn register_link_sources(&mut self) {
        let mut sources = HashSet::new();
        self.root.for_each(&mut |widget| {
            if widget.label_props().is_some_and(|props| props.has_refs()) {
                sources.insert(widget.id);
            }
        });
        self.link_sources = sources;
    }

    /// Toolkit entry point: a reference span was activated on a descendant
    /// label. Returns true when the press was bubbled to observers.
    pub fn notify_ref_press(&mut self, source: WidgetId, reference: &str) -> bool {
        if !self.link_sources.contains(&source) {
            return false;
        }
        for callback in &mut self.ref_press_callbacks {
            callback(reference);
        }
        true
    }

    // --- Interactive zones ------------------------------------------------

    /// Reference zones of every descendant label, in root coordinates
    pub fn refs(&self) -> HashMap<String, Vec<[f32; 4]>> {
        coords::aggregate_refs(&self.root)
    }

    /// Named anchors of every descendant label, in root coordinates
    pub fn anchors(&self) -> HashMap<String, (f32, f32)> {
        coords::aggregate_anchors(&self.root)
    }
}

impl Default for DocumentWidget {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn label_colors(doc: &DocumentWidget) -> Vec<u32> {
        let mut colors = Vec::new();
        doc.root().for_each(&mut |widget| {
            if let Some(props) = widget.label_props() {
                colors.push(props.color);
            }
        });
        colors
    }

    #[test]
    fn test_empty_then_rendered_then_empty() {
        let mut doc = DocumentWidget::default();
        assert!(doc.children().is_empty());
        assert!(doc.ast().is_empty());

        doc.set_text("# Hi\n\ntext");
        assert_eq!(doc.children().len(), 2);
        assert_eq!(doc.ast().len(), 2);

        doc.set_text("");
        assert!(doc.children().is_empty());
        assert!(doc.ast().is_empty());
        assert!(doc.refs().is_empty());
        assert!(doc.anchors().is_empty());
    }

    #[test]
    fn test_text_color_pushes_in_place() {
        let mut doc = DocumentWidget::default();
        doc.set_text("hello");
        let before = doc.descendant_ids();

        doc.set_text_color(0xFF0000FF);
        assert_eq!(doc.descendant_ids(), before);
        assert!(label_colors(&doc).contains(&0xFF0000FF));
    }

    #[test]
    fn test_code_color_is_not_overridden() {
        let mut doc = DocumentWidget::default();
        doc.set_text("```\ncode\n```");
        doc.set_text_color(0xFF0000FF);

        assert!(label_colors(&doc).contains(&theme::CODE_TEXT_COLOR));
        assert!(!label_colors(&doc).contains(&0xFF0000FF));
    }

    #[test]
    fn test_disabled_substitutes_every_label_color() {
        let mut doc = DocumentWidget::default();
        doc.set_text("text\n\n```\ncode\n```");
        let before = doc.descendant_ids();

        doc.set_disabled(true);
        for color in label_colors(&doc) {
            assert_eq!(color, theme::DISABLED_COLOR);
        }

        doc.set_disabled(false);
        assert!(label_colors(&doc).contains(&theme::TEXT_COLOR));
        assert!(label_colors(&doc).contains(&theme::CODE_TEXT_COLOR));
        assert_eq!(doc.descendant_ids(), before);
    }

    #[test]
    fn test_auto_alignment_follows_base_direction() {
        let mut doc = DocumentWidget::default();
        doc.set_text("hello");

        doc.set_base_direction(Some(BaseDirection::Rtl));
        let props = doc.children()[0].label_props().unwrap();
        assert_eq!(props.halign, HAlign::Right);

        doc.set_base_direction(Some(BaseDirection::WeakLtr));
        let props = doc.children()[0].label_props().unwrap();
        assert_eq!(props.halign, HAlign::Left);
    }

    #[test]
    fn test_explicit_alignment_overrides_direction() {
        let mut doc = DocumentWidget::default();
        doc.set_text("hello");
        doc.set_base_direction(Some(BaseDirection::Rtl));
        doc.set_halign(HAlign::Center);

        let props = doc.children()[0].label_props().unwrap();
        assert_eq!(props.halign, HAlign::Center);
    }

    #[test]
    fn test_base_font_size_rescales_without_rebuild() {
        let mut doc = DocumentWidget::default();
        doc.set_text("# Hello");
        let before = doc.descendant_ids();
        let rebuilds = doc.rebuild_count();

        doc.set_base_font_size(20.0);
        let props = doc.children()[0].label_props().unwrap();
        assert_eq!(props.font_size, 50.0);
        assert_eq!(doc.descendant_ids(), before);
        assert_eq!(doc.rebuild_count(), rebuilds);
    }

    #[test]
    fn test_structure_changes_coalesce_into_one_rebuild() {
        let mut doc = DocumentWidget::default();
        doc.set_text("a [link](u)");
        let rebuilds = doc.rebuild_count();

        doc.set_styled_links(true);
        doc.set_link_color(0x00FF00FF);
        doc.set_font_name(Some("Serif".to_string()));
        assert_eq!(doc.rebuild_count(), rebuilds);

        doc.tick();
        assert_eq!(doc.rebuild_count(), rebuilds + 1);

        // the flush applied the latest state
        let props = doc.children()[0].label_props().unwrap();
        assert!(props.markup.contains("[color=#00ff00ff]"));

        doc.tick();
        assert_eq!(doc.rebuild_count(), rebuilds + 1);
    }

    #[test]
    fn test_force_rebuild_flushes_synchronously() {
        let mut doc = DocumentWidget::default();
        doc.set_text("a [link](u)");
        let before = doc.descendant_ids();

        doc.set_styled_links(true);
        doc.force_rebuild();
        assert_ne!(doc.descendant_ids(), before);
    }

    #[test]
    fn test_link_press_bubbles_to_observers() {
        let mut doc = DocumentWidget::default();
        doc.set_text("go [here](target.md)");

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        doc.on_ref_press(move |reference| {
            sink.borrow_mut().push(reference.to_string());
        });

        let mut source = None;
        doc.root().for_each(&mut |widget| {
            if widget.label_props().is_some_and(|p| p.has_refs()) {
                source = Some(widget.id);
            }
        });
        let source = source.expect("expected a link label");

        assert!(doc.notify_ref_press(source, "target.md"));
        assert_eq!(seen.borrow().as_slice(), ["target.md".to_string()]);

        // Unknown widgets are not bubbled
        assert!(!doc.notify_ref_press(u64::MAX, "target.md"));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_to_markdown_round_trips_cached_ast() {
        let mut doc = DocumentWidget::default();
        doc.set_text("# Title\n\nBody text.");
        assert_eq!(doc.to_markdown(), "# Title\n\nBody text.");
    }

    #[test]
    fn test_heading_anchor_is_exposed() {
        let mut doc = DocumentWidget::default();
        doc.set_text("# My Heading\n\nbody");
        doc.set_width(400.0);

        assert!(doc.anchors().contains_key("my-heading"));
    }
}
