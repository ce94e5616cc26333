// Domain layer - Layout descriptors and rendered output models
pub mod layout;
pub mod rendered;
pub mod value;
