mod capability_provider;
mod virtual_provider;

pub use capability_provider::*;
pub use virtual_provider::*;
