pub mod api;
pub mod months;
pub mod page;
pub mod source;
pub mod table;
