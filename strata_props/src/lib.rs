#![forbid(unsafe_code)]

pub mod factory;
pub mod format;
pub mod property;
pub mod transform;

pub use factory::*;
pub use property::*;
pub use transform::*;

use indexmap::IndexMap;

/// Properties of one object, in authoring order.
pub type PropertyMap = IndexMap<String, Property>;
