// Coordinate Translation Utility
// Re-expresses label-local reference zones and anchors in root-local
// coordinates. The toolkit's vertical axis is inverted relative to
// texture-local coordinates, so local Y components are subtracted.

use crate::widget::Widget;
use std::collections::HashMap;

/// Collect every reference zone in the subtree, translated to root space.
/// Multiple boxes per reference name are preserved.
pub fn aggregate_refs(root: &Widget) -> HashMap<String, Vec<[f32; 4]>> {
    let mut out = HashMap::new();
    for child in &root.children {
        visit_refs(child, (child.x, child.y), &mut out);
    }
    out
}

/// Collect every named anchor in the subtree, translated to root space
pub fn aggregate_anchors(root: &Widget) -> HashMap<String, (f32, f32)> {
    let mut out = HashMap::new();
    for child in &root.children {
        visit_anchors(child, (child.x, child.y), &mut out);
    }
    out
}

/// Base point of a widget: the cumulative ancestor offset plus the widget's
/// center, pulled back by half its texture size. Falls back to the box size
/// when no usable texture size is available.
fn base_point(widget: &Widget, offset: (f32, f32)) -> (f32, f32) {
    let (tex_w, tex_h) = widget
        .label_props()
        .and_then(|props| props.texture_size)
        .filter(|&(w, h)| w > 0.0 && h > 0.0)
        .unwrap_or((widget.w, widget.h));

    let center_x = widget.x + widget.w / 2.0;
    let center_y = widget.y + widget.h / 2.0;
    (
        offset.0 + center_x - tex_w / 2.0,
        offset.1 + center_y - tex_h / 2.0,
    )
}

fn visit_refs(widget: &Widget, offset: (f32, f32), out: &mut HashMap<String, Vec<[f32; 4]>>) {
    if let Some(props) = widget.label_props() {
        if !props.refs.is_empty() {
            // offset currently includes this widget's own position;
            // the base point works from the ancestor chain only
            let ancestors = (offset.0 - widget.x, offset.1 - widget.y);
            let (base_x, base_y) = base_point(widget, ancestors);
            for (name, boxes) in &props.refs {
                let translated = out.entry(name.clone()).or_insert_with(Vec::new);
                for [x1, y1, x2, y2] in boxes {
                    translated.push([base_x + x1, base_y - y1, base_x + x2, base_y - y2]);
                }
            }
        }
    }

    for child in &widget.children {
        visit_refs(child, (offset.0 + child.x, offset.1 + child.y), out);
    }
}

fn visit_anchors(widget: &Widget, offset: (f32, f32), out: &mut HashMap<String, (f32, f32)>) {
    if let Some(props) = widget.label_props() {
        if !props.anchors.is_empty() {
            let ancestors = (offset.0 - widget.x, offset.1 - widget.y);
            let (base_x, base_y) = base_point(widget, ancestors);
            for (name, (ax, ay)) in &props.anchors {
                out.insert(name.clone(), (base_x + ax, base_y - ay));
            }
        }
    }

    for child in &widget.children {
        visit_anchors(child, (offset.0 + child.x, offset.1 + child.y), out);
    }
}
