pub mod page;
pub mod resources;
