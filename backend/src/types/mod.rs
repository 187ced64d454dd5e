mod config;
mod environment;
mod error;
mod extractors;
mod flash;

pub use config::{AdminCredentials, AppConfig, ConfigError, StoreConfig, MAX_UPLOAD_BYTES};
pub use environment::Environment;
pub use error::AppError;
pub use extractors::{BookDraft, BookSubmission, UploadedImage};
pub use flash::{Flash, Notice, NoticeLevel};
