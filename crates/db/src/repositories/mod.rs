pub mod catalog_repo;
pub mod death_record_repo;

pub use catalog_repo::CatalogRepo;
pub use death_record_repo::DeathRecordRepo;
