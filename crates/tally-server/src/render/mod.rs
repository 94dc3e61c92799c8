//! Rendering of the SVG badge and the HTML dashboard pages.

pub mod html;
pub mod svg;
