pub mod canvas_editor;
pub mod chat_view;
pub mod dashboard;
pub mod node_palette;
pub mod user_menu;
