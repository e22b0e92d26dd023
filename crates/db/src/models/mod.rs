pub mod catalog;
pub mod death_record;
