pub mod import_repo;
pub use import_repo::ImportRepository;
pub mod store;
pub use store::ImportStore;
