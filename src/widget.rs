// Widget tree
// Models the consumed toolkit capability set as a concrete retained tree:
// box layouts, rich-text labels, spacers and async images, with decorations
// (paint primitives) kept in sync with widget geometry by an explicit hook.

use crate::theme;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for widgets; style-only updates never change the id set
/// of a mounted subtree, structural rebuilds always do
pub type WidgetId = u64;

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

fn next_widget_id() -> WidgetId {
    NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    /// Resolved from the base text direction at style-push time
    Auto,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDirection {
    Ltr,
    WeakLtr,
    Rtl,
    WeakRtl,
}

/// Paint primitives attached to a widget; geometry is local to the widget
/// and recomputed by `sync_decorations` whenever the widget's box changes
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    FilledRect {
        color: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    LeftBar {
        color: u32,
        width: f32,
        x: f32,
        y: f32,
        h: f32,
    },
    CenterLine {
        color: u32,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
}

/// Rich-text label properties
#[derive(Debug, Clone, PartialEq)]
pub struct LabelProps {
    /// Markup-annotated display text
    pub markup: String,
    pub markup_enabled: bool,
    pub font_name: Option<String>,
    pub font_size: f32,
    /// Multiplier relative to the document base font size; lets style-time
    /// base-size changes recompute sizes without a rebuild
    pub font_scale: f32,
    pub bold: bool,
    pub color: u32,
    /// Color is not overridden by document color pushes (code text)
    pub fixed_color: bool,
    pub halign: HAlign,
    pub line_height: f32,
    /// Rendered texture size, reported by the toolkit's text layout
    pub texture_size: Option<(f32, f32)>,
    /// Interactive reference zones in label-local/texture coordinates
    pub refs: HashMap<String, Vec<[f32; 4]>>,
    /// Named anchor positions in label-local/texture coordinates
    pub anchors: HashMap<String, (f32, f32)>,
}

impl LabelProps {
    pub fn new(markup: impl Into<String>, font_size: f32) -> Self {
        LabelProps {
            markup: markup.into(),
            markup_enabled: true,
            font_name: None,
            font_size,
            font_scale: 1.0,
            bold: false,
            color: theme::TEXT_COLOR,
            fixed_color: false,
            halign: HAlign::Left,
            line_height: 1.0,
            texture_size: None,
            refs: HashMap::new(),
            anchors: HashMap::new(),
        }
    }

    /// True when the markup carries interactive reference tags
    pub fn has_refs(&self) -> bool {
        self.markup_enabled && self.markup.contains("[ref=")
    }
}

/// Asynchronously-loading image properties
#[derive(Debug, Clone, PartialEq)]
pub struct ImageProps {
    pub source: String,
    /// Fallback text retained for failed loads
    pub alt_text: String,
    pub natural_size: Option<(f32, f32)>,
}

/// Introspectable metadata that does not affect layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub heading_level: Option<u8>,
    pub code_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Layout(Orientation),
    Label(LabelProps),
    Spacer,
    Image(ImageProps),
}

/// A node in the widget tree. The parent exclusively owns its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: WidgetId,
    pub kind: WidgetKind,
    /// Position relative to the parent widget
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Width kept through layout instead of the assigned share
    pub fixed_width: Option<f32>,
    /// Left, top, right, bottom
    pub padding: [f32; 4],
    pub children: Vec<Widget>,
    pub decorations: Vec<Decoration>,
    pub meta: Meta,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        Widget {
            id: next_widget_id(),
            kind,
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            fixed_width: None,
            padding: [0.0; 4],
            children: Vec::new(),
            decorations: Vec::new(),
            meta: Meta::default(),
        }
    }

    pub fn vbox() -> Self {
        Widget::new(WidgetKind::Layout(Orientation::Vertical))
    }

    pub fn hbox() -> Self {
        Widget::new(WidgetKind::Layout(Orientation::Horizontal))
    }

    pub fn spacer(height: f32) -> Self {
        let mut widget = Widget::new(WidgetKind::Spacer);
        widget.h = height;
        widget
    }

    pub fn label(props: LabelProps) -> Self {
        Widget::new(WidgetKind::Label(props))
    }

    pub fn image(source: impl Into<String>, alt_text: impl Into<String>) -> Self {
        let mut widget = Widget::new(WidgetKind::Image(ImageProps {
            source: source.into(),
            alt_text: alt_text.into(),
            natural_size: None,
        }));
        widget.h = theme::IMAGE_PLACEHOLDER_HEIGHT;
        widget
    }

    pub fn label_props(&self) -> Option<&LabelProps> {
        match &self.kind {
            WidgetKind::Label(props) => Some(props),
            _ => None,
        }
    }

    pub fn label_props_mut(&mut self) -> Option<&mut LabelProps> {
        match &mut self.kind {
            WidgetKind::Label(props) => Some(props),
            _ => None,
        }
    }

    /// Visit this widget and every descendant, depth-first
    pub fn for_each(&self, f: &mut impl FnMut(&Widget)) {
        f(self);
        for child in &self.children {
            child.for_each(f);
        }
    }

    /// Visit this widget and every descendant, depth-first, mutably
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Widget)) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }

    /// Collect the ids of this widget and every descendant
    pub fn collect_ids(&self, out: &mut std::collections::HashSet<WidgetId>) {
        self.for_each(&mut |widget| {
            out.insert(widget.id);
        });
    }

    /// Report an image's natural dimensions once the asynchronous load
    /// completes; height is recomputed to preserve aspect ratio, and
    /// unusable dimensions keep the placeholder height
    pub fn image_loaded(&mut self, natural_w: f32, natural_h: f32) {
        if let WidgetKind::Image(props) = &mut self.kind {
            props.natural_size = Some((natural_w, natural_h));
            if natural_w > 0.0 && natural_h > 0.0 {
                self.h = if self.w > 0.0 {
                    self.w * natural_h / natural_w
                } else {
                    natural_h
                };
            } else {
                self.h = theme::IMAGE_PLACEHOLDER_HEIGHT;
            }
        }
    }

    /// Lay out this widget and its subtree within the given width.
    /// Box layouts stack their children and auto-size to them; labels
    /// estimate their height from font size, line height and line count.
    pub fn layout(&mut self, width: f32) {
        self.w = self.fixed_width.unwrap_or(width);
        self.layout_inner();
    }

    fn layout_inner(&mut self) {
        let [pad_l, pad_t, pad_r, pad_b] = self.padding;

        match &self.kind {
            WidgetKind::Layout(Orientation::Vertical) => {
                let inner_w = (self.w - pad_l - pad_r).max(0.0);
                let mut cursor = pad_t;
                for child in &mut self.children {
                    child.x = pad_l;
                    child.y = cursor;
                    child.layout(inner_w);
                    cursor += child.h;
                }
                self.h = cursor + pad_b;
            }
            WidgetKind::Layout(Orientation::Horizontal) => {
                let inner_w = (self.w - pad_l - pad_r).max(0.0);
                let fixed: f32 = self
                    .children
                    .iter()
                    .filter_map(|child| child.fixed_width)
                    .sum();
                let flex_count = self
                    .children
                    .iter()
                    .filter(|child| child.fixed_width.is_none())
                    .count();
                let flex_w = if flex_count > 0 {
                    ((inner_w - fixed) / flex_count as f32).max(0.0)
                } else {
                    0.0
                };

                let mut cursor = pad_l;
                let mut max_h: f32 = 0.0;
                for child in &mut self.children {
                    child.x = cursor;
                    child.y = pad_t;
                    child.layout(flex_w);
                    cursor += child.w;
                    max_h = max_h.max(child.h);
                }
                self.h = pad_t + max_h + pad_b;
            }
            WidgetKind::Label(props) => {
                let lines = props.markup.lines().count().max(1) as f32;
                self.h = props.font_size * props.line_height.max(1.0) * lines
                    + pad_t
                    + pad_b;
            }
            WidgetKind::Spacer | WidgetKind::Image(_) => {
                // Height is owned by the widget itself
            }
        }

        self.sync_decorations();
    }

    /// Recompute decoration geometry from the widget's current box.
    /// Registered once at construction and re-run on every layout pass so
    /// paint primitives track the widget under parent resize.
    pub fn sync_decorations(&mut self) {
        let (w, h) = (self.w, self.h);
        for decoration in &mut self.decorations {
            match decoration {
                Decoration::FilledRect {
                    x, y, w: dw, h: dh, ..
                } => {
                    *x = 0.0;
                    *y = 0.0;
                    *dw = w;
                    *dh = h;
                }
                Decoration::LeftBar { x, y, h: dh, .. } => {
                    *x = 0.0;
                    *y = 0.0;
                    *dh = h;
                }
                Decoration::CenterLine { x1, y1, x2, y2, .. } => {
                    *x1 = 0.0;
                    *y1 = h / 2.0;
                    *x2 = w;
                    *y2 = h / 2.0;
                }
            }
        }
    }
}
