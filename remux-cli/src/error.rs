use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MP4 error: {0}")]
    Mp4(#[from] mp4box::Mp4BoxError),
}

pub type Result<T> = std::result::Result<T, AppError>;
