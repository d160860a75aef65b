pub mod plan;
pub mod services;
pub mod verify;

pub use plan::Plan;
pub use services::{apply, ApplyOptions};
pub use verify::verify;
