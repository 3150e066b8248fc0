pub mod error;
pub mod exif;
pub mod manager;
pub mod media;
pub mod scanner;
pub mod settings;
pub mod transfer;

pub use error::{Result, ShutterboxError};
pub use exif::{ExifField, ExifRecord};
pub use manager::{TransferManager, generate_directory_path};
pub use media::{BasicFile, MediaFile, PhotoFile, make_file_handler};
pub use scanner::Scanner;
pub use settings::{
    DUPLICATE_POLICY_OPTIONS, DuplicateIdentity, DuplicatePolicy, FOLDER_STRUCTURE_OPTIONS,
    Settings,
};
pub use transfer::DirectoryTransfer;

/// What a completed scan-and-transfer run saw before the transfer started.
#[derive(Debug)]
pub struct OrganizeReport {
    pub files_found: usize,
    pub valid_photos: usize,
    pub invalid_photos: usize,
    pub video_files: usize,
    pub basic_files: usize,
}

/// Scans the configured source directory and transfers everything the
/// settings route somewhere. One blocking call through the whole engine;
/// front-ends that want progress run the two stages on their own threads.
pub fn organize_photos(settings: &Settings, move_files: bool) -> Result<OrganizeReport> {
    settings.scan_configuration_valid()?;
    settings.copy_configuration_valid()?;

    let mut scanner = Scanner::new();
    scanner.scan(&settings.source_directory, settings.include_subdirectories)?;

    let report = OrganizeReport {
        files_found: scanner.total_files_found(),
        valid_photos: scanner.photo_files().len(),
        invalid_photos: scanner.invalid_photo_files().len(),
        video_files: scanner.video_files().len(),
        basic_files: scanner.basic_files().len(),
    };

    let valid_photos = scanner.take_photo_files();
    let invalid_photos = scanner.take_invalid_photo_files();

    let mut manager = TransferManager::new();
    manager.process_photo_files(settings, valid_photos, invalid_photos, move_files);

    Ok(report)
}
