// Tunables shared across the canvas and reducers - single source of truth.

// Node visual defaults
pub const NODE_WIDTH: f64 = 200.0;
pub const NODE_HEIGHT: f64 = 80.0;
pub const CONNECTOR_RADIUS: f64 = 8.0;

// View transform bounds
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

// Autosave debounce after the last node/edge mutation
pub const AUTOSAVE_DEBOUNCE_MS: u32 = 1000;

// Canvas palette
pub const CANVAS_BACKGROUND_COLOR: &str = "#f8fafc";
pub const NODE_BORDER_DEFAULT: &str = "#cbd5e1";
pub const NODE_TEXT_COLOR: &str = "#1e293b";
pub const NODE_SUBTEXT_COLOR: &str = "#64748b";
pub const EDGE_COLOR: &str = "#94a3b8";
pub const PENDING_EDGE_COLOR: &str = "#6366f1";

// Status accents (match the execution log colors in the chat panel)
pub const STATUS_RUNNING_COLOR: &str = "#fcd34d";
pub const STATUS_SUCCESS_COLOR: &str = "#86efac";
pub const STATUS_ERROR_COLOR: &str = "#fca5a5";
pub const STATUS_IDLE_COLOR: &str = "#e0e7ff";

// Edge curvature: control-point offset is max(|dx| * EDGE_CURVE_RATIO, EDGE_CURVE_MIN)
pub const EDGE_CURVE_RATIO: f64 = 0.5;
pub const EDGE_CURVE_MIN: f64 = 60.0;
