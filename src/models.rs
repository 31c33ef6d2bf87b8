pub mod catalog;
pub mod crm;
pub mod import;
pub mod orders;
