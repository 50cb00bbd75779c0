pub mod config;
pub mod error;
pub mod layout;
pub mod render;
pub mod types;

pub use error::{LayoutError, Result};
pub use layout::{
    compute_stack_layout, compute_unit_layout, plan_stack_layout, plan_unit_layout,
};
