use std::env;
use std::path::PathBuf;

use crate::env_parse;

#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Public prefix the upload directory is served under
    pub public_path: String,
    pub max_file_size: usize,
    /// Whole-request cap; several files may share one form
    pub max_body_size: usize,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        let max_file_size = env_parse("UPLOAD_MAX_FILE_SIZE").unwrap_or(5 * 1024 * 1024);
        Self {
            dir: PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string())),
            public_path: "/uploads".to_string(),
            max_file_size,
            max_body_size: env_parse("UPLOAD_MAX_BODY_SIZE").unwrap_or(max_file_size * 8),
        }
    }
}
