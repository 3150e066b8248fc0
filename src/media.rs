use crate::exif::{self, ExifRecord};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Extensions routed to the photo pipeline, matched case-insensitively.
pub const PHOTO_EXTENSIONS: [&str; 18] = [
    "jpeg", "jpg", "png", "gif", "bmp", "tiff", "tif", "svg", "webp", "heif", "heic", "raw",
    "cr2", "nef", "orf", "psd", "ico", "exr",
];

/// Extensions recognized as video files. Classification only; video
/// processing itself is a placeholder.
pub const VIDEO_EXTENSIONS: [&str; 13] = [
    "avi", "flv", "wmv", "mov", "mp4", "m4v", "mpg", "mpeg", "3gp", "mkv", "webm", "vob", "ogg",
];

/// Applies the target-filename rules: an empty request falls back to the
/// source filename, the extension always ends up equal to the source's,
/// and a request without a directory component stays a bare filename.
pub fn normalize_target_file_name(source_path: &Path, requested: &str) -> String {
    let source_name = source_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    if requested.is_empty() {
        return source_name;
    }

    let source_ext = source_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let current_ext = Path::new(requested)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    let mut name = requested.to_string();
    if current_ext != source_ext {
        if current_ext.is_empty() {
            name.push_str(&source_ext);
        } else {
            name.truncate(name.len() - current_ext.len());
            name.push_str(&source_ext);
        }
    }

    let path = Path::new(&name);
    let has_directory = path.parent().is_some_and(|p| !p.as_os_str().is_empty());
    if has_directory {
        name
    } else {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&name)
            .to_string()
    }
}

/// A source file outside the photo pipeline: just its path and the name it
/// would be transferred under.
#[derive(Debug, Clone)]
pub struct BasicFile {
    pub source_file_path: PathBuf,
    pub target_file_name: String,
}

impl BasicFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let mut file = Self {
            source_file_path: path.as_ref().to_path_buf(),
            target_file_name: String::new(),
        };
        file.set_target_file_name("");
        file
    }

    pub fn source_file_name(&self) -> String {
        self.source_file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn set_target_file_name(&mut self, name: &str) {
        self.target_file_name = normalize_target_file_name(&self.source_file_path, name);
    }
}

/// A photo-pipeline file. EXIF extraction happens at construction; failures
/// along the way are recorded in the flags, never raised as errors.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub source_file_path: PathBuf,
    pub target_file_name: String,
    pub exif: Option<ExifRecord>,
    pub file_valid: bool,
    pub contains_exif_data: bool,
    pub valid_creation_date: bool,
    pub original_date_time: Option<DateTime<Local>>,
    pub camera_model: String,
    pub overwrite_enabled: bool,
    pub file_creation_time: Option<SystemTime>,
}

impl PhotoFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let mut photo = Self {
            source_file_path: path.as_ref().to_path_buf(),
            target_file_name: String::new(),
            exif: None,
            file_valid: false,
            contains_exif_data: false,
            valid_creation_date: false,
            original_date_time: None,
            camera_model: String::new(),
            overwrite_enabled: false,
            file_creation_time: None,
        };
        photo.set_target_file_name("");
        photo.extract_exif();
        photo
    }

    fn extract_exif(&mut self) {
        let scan = exif::read_exif(&self.source_file_path);
        self.file_valid = scan.file_valid;
        let Some(record) = scan.record else {
            return;
        };

        self.contains_exif_data = true;
        self.camera_model = record.model.clone();
        if let Some(instant) = exif::parse_exif_datetime(&record.date_time_original) {
            self.original_date_time = Some(instant);
            self.valid_creation_date = true;
        }
        self.exif = Some(record);
    }

    pub fn source_file_name(&self) -> String {
        self.source_file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn set_target_file_name(&mut self, name: &str) {
        self.target_file_name = normalize_target_file_name(&self.source_file_path, name);
    }

    /// Filesystem last-write time, fetched on demand unless a cached value
    /// was installed.
    pub fn file_creation_time(&self) -> SystemTime {
        if let Some(instant) = self.file_creation_time {
            return instant;
        }
        fs::metadata(&self.source_file_path)
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

/// One scanned file, tagged by the pipeline it belongs to.
#[derive(Debug)]
pub enum MediaFile {
    Basic(BasicFile),
    Video(BasicFile),
    Photo(PhotoFile),
}

/// Builds the handler matching the file's extension. Photo files attempt
/// EXIF extraction immediately.
pub fn make_file_handler<P: AsRef<Path>>(path: P) -> MediaFile {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if PHOTO_EXTENSIONS.contains(&extension.as_str()) {
        MediaFile::Photo(PhotoFile::new(path))
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        MediaFile::Video(BasicFile::new(path))
    } else {
        MediaFile::Basic(BasicFile::new(path))
    }
}
