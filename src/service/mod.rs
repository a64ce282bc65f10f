pub mod directory;
pub mod record_loader;
