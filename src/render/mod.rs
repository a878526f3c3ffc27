mod core;

pub use core::{BoardRenderer, RendererSettings, TermRect};
