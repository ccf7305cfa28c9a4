//! Static site output

pub mod html;
pub mod writer;

pub use html::{escape_html, render_html};
pub use writer::SiteWriter;
