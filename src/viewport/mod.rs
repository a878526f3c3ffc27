mod core;

pub use core::{
    ResizeRelay, ResizeSubscription, SharedResizeRelay, ViewportTracker, columns_for_width,
};
