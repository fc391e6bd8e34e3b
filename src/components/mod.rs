//! Reusable UI components.
//!
//! ARCHITECTURE
//! ============
//! Components read shared state from context; session mutations go through
//! `Session`, never through the mirrored signal.

pub mod main_layout;
pub mod navigation_bridge;
pub mod protected_route;
