mod files;
mod health;

pub use files::{delete_file, list_files, set_rendered, upload_file};
pub use health::health;
