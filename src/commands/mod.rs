pub mod create_db;
pub mod import_items;
pub mod status;
