//! Server-rendered page markup.

pub mod html;
pub mod page;

pub use page::{render_page, render_tab};
