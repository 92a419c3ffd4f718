pub mod canvas;
pub mod chat;
pub mod project;
