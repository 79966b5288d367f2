mod component;
mod component_id;
mod component_name;

pub use component::{resolve, HttpMessageComponent};
pub use component_id::HttpMessageComponentId;
pub use component_name::DerivedComponentName;
