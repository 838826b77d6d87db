pub mod catalog;
pub mod descriptors;
pub mod selector;

pub use catalog::{HardwareTemplate, CATALOG};
pub use descriptors::Descriptor;
pub use selector::{consistent_serial, render, select, DescriptorKind};
