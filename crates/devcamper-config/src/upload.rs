use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Route prefix the upload directory is served under.
    pub public_path: String,
    pub max_file_size: usize,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self {
            dir: env::var("FILE_UPLOAD_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./public/uploads")),
            public_path: "/uploads".to_string(),
            max_file_size: env::var("MAX_FILE_UPLOAD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_000_000),
        }
    }
}
