//! Renderer implementations.
//!
//! - `HttpRenderer` - reqwest fetch of server-rendered HTML
//! - `HtmlPage` / `HtmlElement` - page handles over a static document

pub mod html;
pub mod http;

pub use html::{HtmlElement, HtmlPage};
pub use http::{HttpRenderer, RendererConfig};
