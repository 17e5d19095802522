//! Paint model consumed by the frame stager.
//!
//! Scope:
//! - straight-alpha colors as submitted by the tessellator
//! - paint sources (solid, gradients, image patterns)
//! - scissor regions
//! - composite operations and their resolved blend factors
//!
//! `convert` turns these into the shader parameter block.

mod color;
mod composite;
mod convert;
mod paint;
mod scissor;

pub use color::Color;
pub use composite::{Blend, BlendFactor, CompositeOperation, CompositeOperationState};
pub use convert::convert_paint;
pub use paint::Paint;
pub use scissor::Scissor;
