use web_sys::CanvasRenderingContext2d;

use crate::constants::*;
use crate::models::{Node, NodeStatus};

/// Horizontal control-point offset for an edge between connectors that are
/// `dx` apart: half the span, but never flatter than the minimum so short
/// and backward edges still read as curves.
pub fn edge_control_offset(dx: f64) -> f64 {
    (dx.abs() * EDGE_CURVE_RATIO).max(EDGE_CURVE_MIN)
}

/// Right-center of a node body, where its output connector sits.
pub fn output_anchor(node: &Node) -> (f64, f64) {
    (node.x + NODE_WIDTH, node.y + NODE_HEIGHT / 2.0)
}

/// Left-center of a node body, where its input connector sits.
pub fn input_anchor(node: &Node) -> (f64, f64) {
    (node.x, node.y + NODE_HEIGHT / 2.0)
}

pub fn draw_node(context: &CanvasRenderingContext2d, node: &Node) {
    context.save();

    // Shadow for depth
    context.set_shadow_color("rgba(0, 0, 0, 0.1)");
    context.set_shadow_blur(8.0);
    context.set_shadow_offset_x(0.0);
    context.set_shadow_offset_y(2.0);

    context.set_fill_style_str("#ffffff");
    rounded_rect_path(context, node.x, node.y, NODE_WIDTH, NODE_HEIGHT, 10.0);
    context.fill();

    // Remove shadow for the border and text
    context.set_shadow_color("rgba(0, 0, 0, 0)");
    context.set_shadow_blur(0.0);
    context.set_shadow_offset_y(0.0);

    // Border color carries the execution status
    let border = match node.status {
        Some(NodeStatus::Running) => STATUS_RUNNING_COLOR,
        Some(NodeStatus::Success) => STATUS_SUCCESS_COLOR,
        Some(NodeStatus::Error) => STATUS_ERROR_COLOR,
        Some(NodeStatus::Idle) => STATUS_IDLE_COLOR,
        None => NODE_BORDER_DEFAULT,
    };
    context.set_stroke_style_str(border);
    context.set_line_width(if node.status.is_some() { 2.5 } else { 1.5 });
    context.stroke();

    // Label and node-type caption
    context.set_font("14px system-ui, -apple-system, sans-serif");
    context.set_fill_style_str(NODE_TEXT_COLOR);
    context.set_text_align("left");
    context.set_text_baseline("top");
    let _ = context.fill_text(&node.label, node.x + 14.0, node.y + 16.0);

    context.set_font("11px system-ui, -apple-system, sans-serif");
    context.set_fill_style_str(NODE_SUBTEXT_COLOR);
    let _ = context.fill_text(
        node.node_type.display_name(),
        node.x + 14.0,
        node.y + 40.0,
    );

    draw_connectors(context, node);

    context.restore();
}

fn draw_connectors(context: &CanvasRenderingContext2d, node: &Node) {
    let (in_x, in_y) = input_anchor(node);
    let (out_x, out_y) = output_anchor(node);

    // Input: hollow circle
    context.begin_path();
    let _ = context.arc(in_x, in_y, CONNECTOR_RADIUS, 0.0, std::f64::consts::TAU);
    context.set_fill_style_str("#ffffff");
    context.fill();
    context.set_stroke_style_str(NODE_BORDER_DEFAULT);
    context.set_line_width(1.5);
    context.stroke();

    // Output: filled circle
    context.begin_path();
    let _ = context.arc(out_x, out_y, CONNECTOR_RADIUS, 0.0, std::f64::consts::TAU);
    context.set_fill_style_str(EDGE_COLOR);
    context.fill();
}

/// Cubic Bézier from one node's output connector to another's input
/// connector.  Works unchanged for self-loops: the control offset pushes
/// the curve out and back.
pub fn draw_edge(context: &CanvasRenderingContext2d, source: &Node, target: &Node) {
    let (start_x, start_y) = output_anchor(source);
    let (end_x, end_y) = input_anchor(target);
    let offset = edge_control_offset(end_x - start_x);

    context.begin_path();
    context.move_to(start_x, start_y);
    context.bezier_curve_to(
        start_x + offset,
        start_y,
        end_x - offset,
        end_y,
        end_x,
        end_y,
    );
    context.set_stroke_style_str(EDGE_COLOR);
    context.set_line_width(2.0);
    context.stroke();
}

/// Dashed curve from a source node to the floating endpoint of an
/// in-progress connection drag.
pub fn draw_pending_connection(
    context: &CanvasRenderingContext2d,
    source: &Node,
    x: f64,
    y: f64,
) {
    let (start_x, start_y) = output_anchor(source);
    let offset = edge_control_offset(x - start_x);

    context.save();
    let dash = js_sys::Array::of2(&6.0.into(), &4.0.into());
    let _ = context.set_line_dash(&dash);
    context.begin_path();
    context.move_to(start_x, start_y);
    context.bezier_curve_to(start_x + offset, start_y, x - offset, y, x, y);
    context.set_stroke_style_str(PENDING_EDGE_COLOR);
    context.set_line_width(2.0);
    context.stroke();
    context.restore();
}

fn rounded_rect_path(
    context: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    radius: f64,
) {
    context.begin_path();
    context.move_to(x + radius, y);
    context.line_to(x + width - radius, y);
    context.quadratic_curve_to(x + width, y, x + width, y + radius);
    context.line_to(x + width, y + height - radius);
    context.quadratic_curve_to(x + width, y + height, x + width - radius, y + height);
    context.line_to(x + radius, y + height);
    context.quadratic_curve_to(x, y + height, x, y + height - radius);
    context.line_to(x, y + radius);
    context.quadratic_curve_to(x, y, x + radius, y);
    context.close_path();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_offset_is_half_the_span_for_long_edges() {
        assert_eq!(edge_control_offset(400.0), 200.0);
        assert_eq!(edge_control_offset(-400.0), 200.0);
    }

    #[test]
    fn control_offset_never_drops_below_the_minimum() {
        assert_eq!(edge_control_offset(0.0), 60.0);
        assert_eq!(edge_control_offset(50.0), 60.0);
        assert_eq!(edge_control_offset(-50.0), 60.0);
        // Crossover point: |dx| * 0.5 == 60 at dx == 120
        assert_eq!(edge_control_offset(120.0), 60.0);
        assert_eq!(edge_control_offset(121.0), 60.5);
    }
}
