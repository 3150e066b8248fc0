use std::fmt;

#[derive(Debug)]
pub enum ShutterboxError {
    Io(std::io::Error),
    Exif(String),
    InvalidSource(String),
    ScanFailed(String),
    ConfigurationInvalid(String),
    SettingsFile(String),
}

impl fmt::Display for ShutterboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutterboxError::Io(err) => write!(f, "IO error: {err}"),
            ShutterboxError::Exif(msg) => write!(f, "EXIF error: {msg}"),
            ShutterboxError::InvalidSource(path) => {
                write!(f, "Scan source is not a directory: {path}")
            }
            ShutterboxError::ScanFailed(msg) => write!(f, "Scan failed: {msg}"),
            ShutterboxError::ConfigurationInvalid(msg) => {
                write!(f, "Configuration invalid: {msg}")
            }
            ShutterboxError::SettingsFile(msg) => write!(f, "Malformed settings file: {msg}"),
        }
    }
}

impl std::error::Error for ShutterboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShutterboxError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ShutterboxError {
    fn from(err: std::io::Error) -> Self {
        ShutterboxError::Io(err)
    }
}

impl From<rexif::ExifError> for ShutterboxError {
    fn from(err: rexif::ExifError) -> Self {
        ShutterboxError::Exif(format!("Failed to parse EXIF: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, ShutterboxError>;
