use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlimeError {
    #[error("Field dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("A simulation needs at least one agent")]
    NoAgents,
    #[error("A step is already in flight")]
    Busy,
    #[error("Couldn't find a preset named '{0}', please check your spelling")]
    UnknownPreset(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Config(#[from] config::ConfigError),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Settings watcher encountered an issue: {0}")]
    Watch(#[from] notify::Error),
}
