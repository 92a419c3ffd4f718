use crate::constants::*;
use crate::state::AppState;

use super::shapes;

/// Redraw the whole canvas from state.  No-op until the canvas element is
/// mounted, so it is safe to call after every dispatch.
pub fn draw_canvas(state: &AppState) {
    if let (Some(canvas_el), Some(context)) = (&state.canvas, &state.context) {
        let _ = canvas_el
            .style()
            .set_property("background-color", CANVAS_BACKGROUND_COLOR);

        // Clear in device space before applying the view transform
        context.save();
        let _ = context.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        context.set_fill_style_str(CANVAS_BACKGROUND_COLOR);
        context.fill_rect(
            0.0,
            0.0,
            canvas_el.width() as f64,
            canvas_el.height() as f64,
        );
        context.restore();

        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);

        context.save();
        let _ = context.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        let _ = context.scale(dpr, dpr);
        let _ = context.scale(state.zoom_level, state.zoom_level);
        let _ = context.translate(-state.viewport_x, -state.viewport_y);

        // Edges sit under the nodes
        for edge in &state.edges {
            if let (Some(source), Some(target)) =
                (state.nodes.get(&edge.source), state.nodes.get(&edge.target))
            {
                shapes::draw_edge(context, source, target);
            }
        }

        if let Some(conn) = &state.connection {
            if let Some(source) = state.nodes.get(&conn.source_id) {
                shapes::draw_pending_connection(context, source, conn.x, conn.y);
            }
        }

        for node in state.nodes.values() {
            shapes::draw_node(context, node);
        }

        context.restore();
    }
}
