//! Coordinate and geometry types shared by the frame stager and the GPU backend.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! The vertex shader converts to NDC using the view uniform.

mod bounds;
mod transform;
mod viewport;

pub use bounds::Bounds;
pub use transform::Transform;
pub use viewport::Viewport;
