use crate::media::PhotoFile;
use crate::settings::{DuplicateIdentity, DuplicatePolicy, Settings};
use crate::transfer::DirectoryTransfer;
use chrono::Datelike;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

lazy_static! {
    static ref COPY_SUFFIX_RE: Regex = Regex::new(r"_Copy\d+$").unwrap();
}

/// Orchestrates a full transfer: plans a destination per photo, groups the
/// plan into per-directory batches, pulls duplicates out and reinserts them
/// under the configured policy, then executes batch by batch. Progress and
/// the running/cancel/complete flags are atomics for cross-thread polling.
///
/// The batch map is ordered by target directory, so batches execute in a
/// deterministic order for a given plan.
pub struct TransferManager {
    directory_transfers: BTreeMap<String, DirectoryTransfer>,
    progress: Arc<AtomicUsize>,
    transfer_running: Arc<AtomicBool>,
    cancel_transfer: Arc<AtomicBool>,
    transfer_complete: Arc<AtomicBool>,
}

impl Default for TransferManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferManager {
    pub fn new() -> Self {
        Self {
            directory_transfers: BTreeMap::new(),
            progress: Arc::new(AtomicUsize::new(0)),
            transfer_running: Arc::new(AtomicBool::new(false)),
            cancel_transfer: Arc::new(AtomicBool::new(false)),
            transfer_complete: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs the whole pipeline over the scanned photo buckets. Blocks until
    /// every batch has been processed or the transfer is cancelled; either
    /// way the manager ends up reset with the completion flag raised.
    pub fn process_photo_files(
        &mut self,
        settings: &Settings,
        valid_photos: Vec<PhotoFile>,
        invalid_photos: Vec<PhotoFile>,
        move_files: bool,
    ) {
        self.transfer_running.store(true, Ordering::SeqCst);
        self.cancel_transfer.store(false, Ordering::SeqCst);
        self.transfer_complete.store(false, Ordering::SeqCst);
        self.progress.store(0, Ordering::SeqCst);

        self.add_directory_transfers(settings, valid_photos);
        self.process_duplicate_photo_files(settings);

        if settings.move_invalid_file_meta {
            let directory = path_string(&settings.invalid_file_meta_directory);
            self.add_batch(directory, invalid_photos);
        }

        self.directory_transfers
            .retain(|_, batch| batch.files_to_move_count() > 0);

        self.process_file_transfers(settings, move_files);

        self.transfer_running.store(false, Ordering::SeqCst);
        self.reset_transfer_manager();
        self.transfer_complete.store(true, Ordering::SeqCst);
    }

    fn add_directory_transfers(&mut self, settings: &Settings, photos: Vec<PhotoFile>) {
        for photo in photos {
            let directory = generate_directory_path(settings, &photo);
            self.insert_photo(directory, photo);
        }
    }

    fn add_batch(&mut self, directory: String, photos: Vec<PhotoFile>) {
        let batch = self.directory_transfers.entry(directory.clone()).or_default();
        batch.set_target_directory(&directory);
        batch.set_photo_files(photos);
    }

    fn insert_photo(&mut self, directory: String, photo: PhotoFile) {
        let batch = self.directory_transfers.entry(directory.clone()).or_default();
        batch.set_target_directory(&directory);
        batch.add_photo_file(photo);
    }

    fn process_duplicate_photo_files(&mut self, settings: &Settings) {
        let mut duplicates: Vec<PhotoFile> = Vec::new();
        match settings.photos_duplicate_identity {
            DuplicateIdentity::FileNames => {
                for batch in self.directory_transfers.values_mut() {
                    duplicates.extend(batch.filename_duplicates());
                }
            }
            DuplicateIdentity::ExifContents => {
                for batch in self.directory_transfers.values_mut() {
                    duplicates.extend(batch.exif_duplicates());
                }
            }
            DuplicateIdentity::Disabled => {}
        }

        if !duplicates.is_empty() {
            log::info!("Found {} duplicate photo files", duplicates.len());
        }
        self.add_duplicate_transfers(settings, duplicates);
    }

    fn add_duplicate_transfers(&mut self, settings: &Settings, duplicates: Vec<PhotoFile>) {
        match settings.duplicates_found_selection {
            DuplicatePolicy::CopySuffix => {
                for mut photo in duplicates {
                    let directory = generate_directory_path(settings, &photo);
                    let file_name = self.create_numerical_file_name(
                        &photo.target_file_name,
                        &directory,
                        false,
                    );
                    photo.set_target_file_name(&file_name);
                    self.insert_photo(directory, photo);
                }
            }
            DuplicatePolicy::Skip => {}
            DuplicatePolicy::Overwrite => {
                for mut photo in duplicates {
                    photo.overwrite_enabled = true;
                    let directory = generate_directory_path(settings, &photo);
                    self.insert_photo(directory, photo);
                }
            }
            DuplicatePolicy::MoveToFolder => {
                let directory = path_string(&settings.duplicates_directory);
                for mut photo in duplicates {
                    let file_name = self.create_numerical_file_name(
                        &photo.target_file_name,
                        &directory,
                        false,
                    );
                    photo.set_target_file_name(&file_name);
                    self.insert_photo(directory.clone(), photo);
                }
            }
        }
    }

    fn process_file_transfers(&mut self, settings: &Settings, move_files: bool) {
        let total = self.directory_transfers.len();
        let mut processed = 0usize;

        for batch in self.directory_transfers.values_mut() {
            if self.cancel_transfer.load(Ordering::SeqCst) {
                self.progress.store(0, Ordering::SeqCst);
                break;
            }
            if !batch.transfer_files(
                move_files,
                settings.photos_replace_dashes_with_underscores,
            ) {
                log::error!("{}: batch transfer failed", batch.target_directory());
            }
            processed += 1;
            self.progress.store(processed * 100 / total, Ordering::SeqCst);
        }
    }

    /// Allocates a `_Copy##` filename that collides neither with the target
    /// directory's contents nor with anything already planned into it. A
    /// name whose plain form is still free is returned unchanged unless a
    /// suffix is forced; an existing `_Copy\d+` suffix is always stripped
    /// before reallocation.
    pub fn create_numerical_file_name(
        &self,
        file_name: &str,
        target_directory: &str,
        force_copy_suffix: bool,
    ) -> String {
        let directory = Path::new(target_directory);
        if !directory.join(file_name).exists() && !force_copy_suffix {
            return file_name.to_string();
        }

        let path = Path::new(file_name);
        let base = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file_name);
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let base = COPY_SUFFIX_RE.replace(base, "").into_owned();

        let Ok(taken_pattern) = Regex::new(&format!(
            "^{}_Copy(\\d+){}$",
            regex::escape(&base),
            regex::escape(&extension)
        )) else {
            return file_name.to_string();
        };

        let mut taken: HashSet<u32> = HashSet::new();
        if let Ok(entries) = fs::read_dir(directory) {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Some(caps) = taken_pattern.captures(name) {
                        if let Ok(number) = caps[1].parse::<u32>() {
                            taken.insert(number);
                        }
                    }
                }
            }
        }
        if let Some(batch) = self.directory_transfers.get(target_directory) {
            for queued in batch.photo_files() {
                if let Some(caps) = taken_pattern.captures(&queued.target_file_name) {
                    if let Ok(number) = caps[1].parse::<u32>() {
                        taken.insert(number);
                    }
                }
            }
        }

        let mut number = 0u32;
        while taken.contains(&number) {
            number += 1;
        }
        format!("{base}_Copy{number:02}{extension}")
    }

    pub fn reset_transfer_manager(&mut self) {
        self.progress.store(0, Ordering::SeqCst);
        self.directory_transfers.clear();
    }

    pub fn directory_transfer_count(&self) -> usize {
        self.directory_transfers.len()
    }

    pub fn transfer_progress(&self) -> usize {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn is_transfer_running(&self) -> bool {
        self.transfer_running.load(Ordering::SeqCst)
    }

    pub fn is_transfer_complete(&self) -> bool {
        self.transfer_complete.load(Ordering::SeqCst)
    }

    pub fn request_cancel(&self) {
        self.cancel_transfer.store(true, Ordering::SeqCst);
    }

    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_transfer)
    }

    pub fn progress_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.progress)
    }

    pub fn complete_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.transfer_complete)
    }
}

/// Derives the target directory for a photo from the configured folder
/// template. Tokens are comma-separated with all whitespace stripped, which
/// also makes "Camera Model" and "CameraModel" interchangeable. A pure
/// function of the settings and the photo's date and camera model.
pub fn generate_directory_path(settings: &Settings, photo: &PhotoFile) -> String {
    let mut path = format!("{}/", settings.output_directory.display());

    for token in settings.photos_output_folder_structure.split(',') {
        let token: String = token.chars().filter(|c| !c.is_whitespace()).collect();
        match token.as_str() {
            "CameraModel" => {
                path.push_str(&photo.camera_model);
                path.push('/');
            }
            "Year" => {
                if let Some(instant) = photo.original_date_time {
                    path.push_str(&format!("{}/", instant.year()));
                }
            }
            "Month" => {
                if let Some(instant) = photo.original_date_time {
                    path.push_str(&format!("{}/", month_name(instant.month())));
                }
            }
            "Day" => {
                if let Some(instant) = photo.original_date_time {
                    path.push_str(&format!("{}/", instant.day()));
                }
            }
            _ => {}
        }
    }

    to_native_separators(&path)
}

fn month_name(month: u32) -> String {
    match month {
        1 => "January".to_string(),
        2 => "February".to_string(),
        3 => "March".to_string(),
        4 => "April".to_string(),
        5 => "May".to_string(),
        6 => "June".to_string(),
        7 => "July".to_string(),
        8 => "August".to_string(),
        9 => "September".to_string(),
        10 => "October".to_string(),
        11 => "November".to_string(),
        12 => "December".to_string(),
        other => other.to_string(),
    }
}

fn to_native_separators(path: &str) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace('/', std::path::MAIN_SEPARATOR_STR)
    }
}

fn path_string(path: &Path) -> String {
    to_native_separators(&path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::fixtures;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn photo_at(dir: &Path, name: &str, model: &str, datetime: &str) -> PhotoFile {
        let bytes = fixtures::jpeg_with_exif("Canon", model, datetime);
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        PhotoFile::new(&path)
    }

    fn settings_with_output(output: &Path) -> Settings {
        Settings::new(PathBuf::from("/unused"), output.to_path_buf())
    }

    #[test]
    fn test_month_name_table() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(7), "July");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "13");
        assert_eq!(month_name(0), "0");
    }

    #[test]
    fn test_generate_directory_path_year_month_day() {
        let dir = TempDir::new().unwrap();
        let photo = photo_at(dir.path(), "a.jpg", "NIKON D750", "2023:07:15 12:00:00");
        let settings =
            settings_with_output(Path::new("/out")).with_folder_structure("Year, Month, Day");

        assert_eq!(
            generate_directory_path(&settings, &photo),
            "/out/2023/July/15/"
        );
    }

    #[test]
    fn test_generate_directory_path_camera_model_year() {
        let dir = TempDir::new().unwrap();
        let photo = photo_at(dir.path(), "a.jpg", "NIKON D750", "2022:12:31 08:30:00");
        let settings =
            settings_with_output(Path::new("/out")).with_folder_structure("Camera Model, Year");

        assert_eq!(
            generate_directory_path(&settings, &photo),
            "/out/NIKON D750/2022/"
        );
    }

    #[test]
    fn test_generate_directory_path_accepts_both_model_spellings() {
        let dir = TempDir::new().unwrap();
        let photo = photo_at(dir.path(), "a.jpg", "NIKON D750", "2022:12:31 08:30:00");

        let spaced =
            settings_with_output(Path::new("/out")).with_folder_structure("Camera Model, Year");
        let fused =
            settings_with_output(Path::new("/out")).with_folder_structure("CameraModel,Year");

        assert_eq!(
            generate_directory_path(&spaced, &photo),
            generate_directory_path(&fused, &photo)
        );
    }

    #[test]
    fn test_generate_directory_path_ignores_unknown_tokens() {
        let dir = TempDir::new().unwrap();
        let photo = photo_at(dir.path(), "a.jpg", "NIKON D750", "2022:12:31 08:30:00");
        let settings =
            settings_with_output(Path::new("/out")).with_folder_structure("Year, Rating, Day");

        assert_eq!(generate_directory_path(&settings, &photo), "/out/2022/31/");
    }

    #[test]
    fn test_generate_directory_path_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let photo = photo_at(dir.path(), "a.jpg", "NIKON D750", "2022:12:31 08:30:00");
        let settings = settings_with_output(Path::new("/out"))
            .with_folder_structure("Camera Model, Year, Month, Day");

        let first = generate_directory_path(&settings, &photo);
        let second = generate_directory_path(&settings, &photo);
        assert_eq!(first, second);
    }

    #[test]
    fn test_numerical_name_unchanged_when_free() {
        let target = TempDir::new().unwrap();
        let manager = TransferManager::new();

        let name = manager.create_numerical_file_name(
            "a.jpg",
            target.path().to_str().unwrap(),
            false,
        );
        assert_eq!(name, "a.jpg");
    }

    #[test]
    fn test_numerical_name_forced_suffix() {
        let target = TempDir::new().unwrap();
        let manager = TransferManager::new();

        let name =
            manager.create_numerical_file_name("a.jpg", target.path().to_str().unwrap(), true);
        assert_eq!(name, "a_Copy00.jpg");
    }

    #[test]
    fn test_numerical_name_skips_taken_numbers_on_disk() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("a.jpg"), b"x").unwrap();
        fs::write(target.path().join("a_Copy00.jpg"), b"x").unwrap();
        fs::write(target.path().join("a_Copy01.jpg"), b"x").unwrap();

        let manager = TransferManager::new();
        let name = manager.create_numerical_file_name(
            "a.jpg",
            target.path().to_str().unwrap(),
            false,
        );
        assert_eq!(name, "a_Copy02.jpg");
    }

    #[test]
    fn test_numerical_name_strips_existing_suffix() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("a_Copy07.jpg"), b"x").unwrap();

        let manager = TransferManager::new();
        let name = manager.create_numerical_file_name(
            "a_Copy07.jpg",
            target.path().to_str().unwrap(),
            false,
        );
        assert_eq!(name, "a_Copy00.jpg");
    }

    #[test]
    fn test_numerical_name_considers_planned_files() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("p.jpg"), b"x").unwrap();

        let mut manager = TransferManager::new();
        let directory = target.path().to_str().unwrap().to_string();

        let mut planned = photo_at(source.path(), "p.jpg", "MX-5", "2020:03:03 10:00:00");
        planned.set_target_file_name("p_Copy00.jpg");
        manager.insert_photo(directory.clone(), planned);

        let name = manager.create_numerical_file_name("p.jpg", &directory, false);
        assert_eq!(name, "p_Copy01.jpg");
    }

    #[test]
    fn test_numerical_name_ignores_other_stems() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("a.jpg"), b"x").unwrap();
        fs::write(target.path().join("banana_Copy00.jpg"), b"x").unwrap();

        let manager = TransferManager::new();
        let name = manager.create_numerical_file_name(
            "a.jpg",
            target.path().to_str().unwrap(),
            false,
        );
        assert_eq!(name, "a_Copy00.jpg");
    }

    #[test]
    fn test_process_photo_files_plans_copies_and_finishes() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let photo = photo_at(source.path(), "a.jpg", "MX-5", "2023:07:15 12:00:00");
        let settings = settings_with_output(out.path());

        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, vec![photo], Vec::new(), false);

        let expected = out
            .path()
            .join("2023")
            .join("July")
            .join("15")
            .join("a.jpg");
        assert!(expected.is_file());
        assert!(source.path().join("a.jpg").is_file());
        assert!(manager.is_transfer_complete());
        assert!(!manager.is_transfer_running());
        // The manager resets itself after finishing.
        assert_eq!(manager.transfer_progress(), 0);
        assert_eq!(manager.directory_transfer_count(), 0);
    }

    #[test]
    fn test_process_photo_files_filename_duplicates_get_suffixes() {
        // Two incoming files with the same name, plus that name already
        // present at the destination from an earlier run.
        let source = TempDir::new().unwrap();
        let sub_a = source.path().join("a");
        let sub_b = source.path().join("b");
        fs::create_dir_all(&sub_a).unwrap();
        fs::create_dir_all(&sub_b).unwrap();

        let out = TempDir::new().unwrap();
        let destination = out.path().join("2020").join("March").join("3");
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("p.jpg"), b"from an earlier run").unwrap();

        let first = photo_at(&sub_a, "p.jpg", "MX-5", "2020:03:03 10:00:00");
        let second = photo_at(&sub_b, "p.jpg", "MX-5", "2020:03:03 11:00:00");

        let settings = settings_with_output(out.path())
            .with_duplicate_identity(DuplicateIdentity::FileNames)
            .with_duplicate_policy(DuplicatePolicy::CopySuffix);

        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, vec![first, second], Vec::new(), false);

        assert_eq!(
            fs::read(destination.join("p.jpg")).unwrap(),
            b"from an earlier run"
        );
        assert!(destination.join("p_Copy00.jpg").is_file());
        assert!(destination.join("p_Copy01.jpg").is_file());
    }

    #[test]
    fn test_process_photo_files_exif_duplicates_copy_suffix_policy() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        // Identical EXIF under two names; both still land in the same
        // dated directory, the duplicate keeping its own free name.
        let x = photo_at(source.path(), "x.jpg", "MX-5", "2024:01:02 09:00:00");
        let y = photo_at(source.path(), "y.jpg", "MX-5", "2024:01:02 09:00:00");

        let settings = settings_with_output(out.path())
            .with_duplicate_identity(DuplicateIdentity::ExifContents)
            .with_duplicate_policy(DuplicatePolicy::CopySuffix);

        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, vec![x, y], Vec::new(), false);

        let destination = out.path().join("2024").join("January").join("2");
        let mut names: Vec<String> = fs::read_dir(&destination)
            .unwrap()
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["x.jpg".to_string(), "y.jpg".to_string()]);
    }

    #[test]
    fn test_process_photo_files_skip_policy_drops_duplicates() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let destination = out.path().join("2020").join("March").join("3");
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("p.jpg"), b"original").unwrap();

        let incoming = photo_at(source.path(), "p.jpg", "MX-5", "2020:03:03 10:00:00");
        let settings = settings_with_output(out.path())
            .with_duplicate_identity(DuplicateIdentity::FileNames)
            .with_duplicate_policy(DuplicatePolicy::Skip);

        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, vec![incoming], Vec::new(), false);

        assert_eq!(fs::read(destination.join("p.jpg")).unwrap(), b"original");
        assert_eq!(fs::read_dir(&destination).unwrap().count(), 1);
    }

    #[test]
    fn test_process_photo_files_overwrite_policy() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let destination = out.path().join("2020").join("March").join("3");
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("p.jpg"), b"stale").unwrap();

        let incoming = photo_at(source.path(), "p.jpg", "MX-5", "2020:03:03 10:00:00");
        let settings = settings_with_output(out.path())
            .with_duplicate_identity(DuplicateIdentity::FileNames)
            .with_duplicate_policy(DuplicatePolicy::Overwrite);

        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, vec![incoming], Vec::new(), false);

        assert_ne!(fs::read(destination.join("p.jpg")).unwrap(), b"stale");
    }

    #[test]
    fn test_process_photo_files_move_to_folder_policy() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let dups = TempDir::new().unwrap();
        let destination = out.path().join("2020").join("March").join("3");
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("p.jpg"), b"original").unwrap();

        let incoming = photo_at(source.path(), "p.jpg", "MX-5", "2020:03:03 10:00:00");
        let settings = settings_with_output(out.path())
            .with_duplicate_identity(DuplicateIdentity::FileNames)
            .with_duplicate_policy(DuplicatePolicy::MoveToFolder)
            .with_duplicates_directory(dups.path().to_path_buf());

        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, vec![incoming], Vec::new(), false);

        assert_eq!(fs::read(destination.join("p.jpg")).unwrap(), b"original");
        assert!(dups.path().join("p.jpg").is_file());
    }

    #[test]
    fn test_process_photo_files_invalid_bypass() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let invalid_dir = TempDir::new().unwrap();

        // No EXIF at all: the scanner would have routed this to the
        // invalid bucket.
        let path = source.path().join("q.jpg");
        fs::write(&path, [0xff, 0xd8, 0xff, 0xd9]).unwrap();
        let invalid = PhotoFile::new(&path);
        assert!(!invalid.contains_exif_data);

        let settings = settings_with_output(out.path())
            .with_invalid_file_meta_directory(invalid_dir.path().to_path_buf());

        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, Vec::new(), vec![invalid], false);

        assert!(invalid_dir.path().join("q.jpg").is_file());
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_process_photo_files_invalid_ignored_without_flag() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let path = source.path().join("q.jpg");
        fs::write(&path, [0xff, 0xd8, 0xff, 0xd9]).unwrap();
        let invalid = PhotoFile::new(&path);

        let settings = settings_with_output(out.path());
        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, Vec::new(), vec![invalid], false);

        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
        assert!(manager.is_transfer_complete());
    }

    #[test]
    fn test_process_photo_files_move_removes_sources() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let photo = photo_at(source.path(), "a.jpg", "MX-5", "2023:07:15 12:00:00");
        let settings = settings_with_output(out.path());

        let mut manager = TransferManager::new();
        manager.process_photo_files(&settings, vec![photo], Vec::new(), true);

        assert!(!source.path().join("a.jpg").exists());
        assert!(
            out.path()
                .join("2023")
                .join("July")
                .join("15")
                .join("a.jpg")
                .is_file()
        );
    }

    #[test]
    fn test_cancel_stops_before_next_batch() {
        let source = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let mut manager = TransferManager::new();
        for (name, datetime) in [
            ("a.jpg", "2023:07:15 12:00:00"),
            ("b.jpg", "2023:08:15 12:00:00"),
            ("c.jpg", "2023:09:15 12:00:00"),
        ] {
            let photo = photo_at(source.path(), name, "MX-5", datetime);
            let settings = settings_with_output(out.path());
            let directory = generate_directory_path(&settings, &photo);
            manager.insert_photo(directory, photo);
        }
        assert_eq!(manager.directory_transfer_count(), 3);

        manager.cancel_handle().store(true, Ordering::SeqCst);
        let settings = settings_with_output(out.path());
        manager.process_file_transfers(&settings, false);

        // The flag is checked before the first batch: nothing transferred,
        // progress back at zero.
        assert_eq!(manager.transfer_progress(), 0);
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_transfer_manager() {
        let source = TempDir::new().unwrap();
        let mut manager = TransferManager::new();
        let photo = photo_at(source.path(), "a.jpg", "MX-5", "2023:07:15 12:00:00");
        manager.insert_photo("/out/somewhere".to_string(), photo);
        assert_eq!(manager.directory_transfer_count(), 1);

        manager.reset_transfer_manager();
        assert_eq!(manager.directory_transfer_count(), 0);
        assert_eq!(manager.transfer_progress(), 0);
    }
}
