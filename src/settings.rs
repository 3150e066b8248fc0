use crate::error::{Result, ShutterboxError};
use std::fs;
use std::path::{Path, PathBuf};

/// The duplicate-resolution choices offered by front-ends, in display order.
pub const DUPLICATE_POLICY_OPTIONS: [&str; 4] = [
    "Add 'Copy##' and Move/Copy",
    "Do Not Move or Copy",
    "Overwrite",
    "Move To Folder",
];

/// The output folder layouts offered by front-ends, in display order.
pub const FOLDER_STRUCTURE_OPTIONS: [&str; 9] = [
    "Year",
    "Month",
    "Day",
    "Year, Month",
    "Year, Month, Day",
    "Year, Month, Day, Camera Model",
    "Camera Model, Year",
    "Camera Model, Year, Month",
    "Camera Model, Year, Month, Day",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    CopySuffix,
    Skip,
    Overwrite,
    MoveToFolder,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::CopySuffix => "Add 'Copy##' and Move/Copy",
            DuplicatePolicy::Skip => "Do Not Move or Copy",
            DuplicatePolicy::Overwrite => "Overwrite",
            DuplicatePolicy::MoveToFolder => "Move To Folder",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "Add 'Copy##' and Move/Copy" => Ok(DuplicatePolicy::CopySuffix),
            "Do Not Move or Copy" => Ok(DuplicatePolicy::Skip),
            "Overwrite" => Ok(DuplicatePolicy::Overwrite),
            "Move To Folder" => Ok(DuplicatePolicy::MoveToFolder),
            other => Err(ShutterboxError::SettingsFile(format!(
                "unknown duplicate policy: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateIdentity {
    FileNames,
    ExifContents,
    Disabled,
}

impl DuplicateIdentity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateIdentity::FileNames => "File Names Match",
            DuplicateIdentity::ExifContents => "All EXIF and Exact File Contents Match",
            DuplicateIdentity::Disabled => "",
        }
    }

    // Any unrecognized value disables duplicate detection.
    pub fn parse(value: &str) -> Self {
        match value {
            "File Names Match" => DuplicateIdentity::FileNames,
            "All EXIF and Exact File Contents Match" => DuplicateIdentity::ExifContents,
            _ => DuplicateIdentity::Disabled,
        }
    }
}

/// Immutable snapshot of everything the engine is configured with. A
/// snapshot is built once and passed by reference into each long-running
/// operation; changing configuration means building a new snapshot.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source_directory: PathBuf,
    pub output_directory: PathBuf,
    pub invalid_file_meta_directory: PathBuf,
    pub duplicates_directory: PathBuf,
    pub duplicates_found_selection: DuplicatePolicy,
    pub photos_output_folder_structure: String,
    pub photos_duplicate_identity: DuplicateIdentity,
    pub move_invalid_file_meta: bool,
    pub include_subdirectories: bool,
    pub photos_replace_dashes_with_underscores: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::new(),
            output_directory: PathBuf::new(),
            invalid_file_meta_directory: PathBuf::new(),
            duplicates_directory: PathBuf::new(),
            duplicates_found_selection: DuplicatePolicy::CopySuffix,
            photos_output_folder_structure: "Year, Month, Day".to_string(),
            photos_duplicate_identity: DuplicateIdentity::Disabled,
            move_invalid_file_meta: false,
            include_subdirectories: false,
            photos_replace_dashes_with_underscores: false,
        }
    }
}

impl Settings {
    pub fn new(source_directory: PathBuf, output_directory: PathBuf) -> Self {
        Self {
            source_directory,
            output_directory,
            ..Self::default()
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates_found_selection = policy;
        self
    }

    pub fn with_duplicate_identity(mut self, identity: DuplicateIdentity) -> Self {
        self.photos_duplicate_identity = identity;
        self
    }

    pub fn with_folder_structure(mut self, structure: &str) -> Self {
        self.photos_output_folder_structure = structure.to_string();
        self
    }

    pub fn with_invalid_file_meta_directory(mut self, directory: PathBuf) -> Self {
        self.invalid_file_meta_directory = directory;
        self.move_invalid_file_meta = true;
        self
    }

    pub fn with_duplicates_directory(mut self, directory: PathBuf) -> Self {
        self.duplicates_directory = directory;
        self
    }

    pub fn with_subdirectories(mut self, include: bool) -> Self {
        self.include_subdirectories = include;
        self
    }

    pub fn with_replace_dashes(mut self, replace: bool) -> Self {
        self.photos_replace_dashes_with_underscores = replace;
        self
    }

    /// Loads the ten-line settings file: four directories, the duplicate
    /// policy, the folder structure, the duplicate identity, then three
    /// 0/1 flags.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let lines: Vec<&str> = contents.lines().collect();
        if lines.len() < 10 {
            return Err(ShutterboxError::SettingsFile(format!(
                "expected 10 lines, found {}",
                lines.len()
            )));
        }

        Ok(Self {
            source_directory: PathBuf::from(lines[0]),
            output_directory: PathBuf::from(lines[1]),
            invalid_file_meta_directory: PathBuf::from(lines[2]),
            duplicates_directory: PathBuf::from(lines[3]),
            duplicates_found_selection: DuplicatePolicy::parse(lines[4])?,
            photos_output_folder_structure: lines[5].to_string(),
            photos_duplicate_identity: DuplicateIdentity::parse(lines[6]),
            move_invalid_file_meta: parse_flag(lines[7])?,
            include_subdirectories: parse_flag(lines[8])?,
            photos_replace_dashes_with_underscores: parse_flag(lines[9])?,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
            self.source_directory.display(),
            self.output_directory.display(),
            self.invalid_file_meta_directory.display(),
            self.duplicates_directory.display(),
            self.duplicates_found_selection.as_str(),
            self.photos_output_folder_structure,
            self.photos_duplicate_identity.as_str(),
            flag_str(self.move_invalid_file_meta),
            flag_str(self.include_subdirectories),
            flag_str(self.photos_replace_dashes_with_underscores),
        );
        fs::write(path, contents)?;
        Ok(())
    }

    /// A scan can start only when the source directory exists.
    pub fn scan_configuration_valid(&self) -> Result<()> {
        check_directory_exists(&self.source_directory, "Source")
    }

    /// A transfer can start only when every directory the active options
    /// route files into exists.
    pub fn copy_configuration_valid(&self) -> Result<()> {
        if self.move_invalid_file_meta {
            check_directory_exists(&self.invalid_file_meta_directory, "Invalid File Meta")?;
        }
        if self.duplicates_found_selection == DuplicatePolicy::MoveToFolder {
            check_directory_exists(&self.duplicates_directory, "Duplicates")?;
        }
        Ok(())
    }
}

fn check_directory_exists(path: &Path, kind: &str) -> Result<()> {
    if path.as_os_str().is_empty() || !path.is_dir() {
        return Err(ShutterboxError::ConfigurationInvalid(format!(
            "{kind} directory does not exist: {}",
            path.display()
        )));
    }
    Ok(())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(ShutterboxError::SettingsFile(format!(
            "expected 0 or 1, found {other:?}"
        ))),
    }
}

fn flag_str(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
