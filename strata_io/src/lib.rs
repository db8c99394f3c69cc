pub mod fs;
pub mod paths;

pub use fs::*;
pub use paths::*;
