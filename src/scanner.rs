use crate::error::{Result, ShutterboxError};
use crate::media::{self, BasicFile, MediaFile, PhotoFile};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Walks a directory tree and sorts every regular file into one of four
/// buckets: photos with a usable EXIF date, photos without one, videos, and
/// everything else. Counters and flags are atomics so observers on other
/// threads can poll a running scan; the buckets themselves belong to the
/// scanner until drained.
pub struct Scanner {
    photo_files: Vec<PhotoFile>,
    invalid_photo_files: Vec<PhotoFile>,
    video_files: Vec<BasicFile>,
    basic_files: Vec<BasicFile>,
    files_found: Arc<AtomicUsize>,
    photo_files_with_exif: Arc<AtomicUsize>,
    photo_files_with_valid_date: Arc<AtomicUsize>,
    photo_files_unsupported: Arc<AtomicUsize>,
    scan_running: Arc<AtomicBool>,
    cancel_scan: Arc<AtomicBool>,
    scan_completed: Arc<AtomicBool>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            photo_files: Vec::new(),
            invalid_photo_files: Vec::new(),
            video_files: Vec::new(),
            basic_files: Vec::new(),
            files_found: Arc::new(AtomicUsize::new(0)),
            photo_files_with_exif: Arc::new(AtomicUsize::new(0)),
            photo_files_with_valid_date: Arc::new(AtomicUsize::new(0)),
            photo_files_unsupported: Arc::new(AtomicUsize::new(0)),
            scan_running: Arc::new(AtomicBool::new(false)),
            cancel_scan: Arc::new(AtomicBool::new(false)),
            scan_completed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Blocks until the walk finishes or is cancelled. Cancellation is not
    /// an error; the buckets are simply left empty.
    pub fn scan<P: AsRef<Path>>(
        &mut self,
        directory_path: P,
        include_subdirectories: bool,
    ) -> Result<()> {
        let directory_path = directory_path.as_ref();
        if !directory_path.is_dir() {
            return Err(ShutterboxError::InvalidSource(
                directory_path.display().to_string(),
            ));
        }

        log::info!("Scanning {}", directory_path.display());
        self.reset_buckets();
        self.cancel_scan.store(false, Ordering::SeqCst);
        self.scan_completed.store(false, Ordering::SeqCst);
        self.scan_running.store(true, Ordering::SeqCst);

        let outcome = self.scan_directory(directory_path, include_subdirectories);

        self.scan_running.store(false, Ordering::SeqCst);
        self.scan_completed.store(true, Ordering::SeqCst);
        outcome
    }

    fn scan_directory(
        &mut self,
        directory_path: &Path,
        include_subdirectories: bool,
    ) -> Result<()> {
        if self.cancel_requested() {
            self.reset_buckets();
            return Ok(());
        }

        let entries = fs::read_dir(directory_path).map_err(|err| {
            ShutterboxError::ScanFailed(format!("{}: {err}", directory_path.display()))
        })?;

        for entry in entries {
            if self.cancel_requested() {
                self.reset_buckets();
                return Ok(());
            }

            let entry = entry.map_err(|err| {
                ShutterboxError::ScanFailed(format!("{}: {err}", directory_path.display()))
            })?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|err| {
                ShutterboxError::ScanFailed(format!("{}: {err}", path.display()))
            })?;

            if file_type.is_dir() {
                if include_subdirectories {
                    self.scan_directory(&path, true)?;
                }
            } else if file_type.is_file() {
                self.classify(media::make_file_handler(&path));
            } else {
                log::debug!("{}: not a file or directory, ignoring", path.display());
            }
        }
        Ok(())
    }

    fn classify(&mut self, handler: MediaFile) {
        match handler {
            MediaFile::Video(video) => {
                self.video_files.push(video);
                self.files_found.fetch_add(1, Ordering::SeqCst);
            }
            MediaFile::Photo(photo) => {
                if !photo.contains_exif_data {
                    log::debug!(
                        "{}: no EXIF data, routed to invalid bucket",
                        photo.source_file_path.display()
                    );
                    self.photo_files_unsupported.fetch_add(1, Ordering::SeqCst);
                    self.invalid_photo_files.push(photo);
                } else if !photo.valid_creation_date {
                    log::debug!(
                        "{}: EXIF present but no usable original date",
                        photo.source_file_path.display()
                    );
                    self.photo_files_unsupported.fetch_add(1, Ordering::SeqCst);
                    self.invalid_photo_files.push(photo);
                } else {
                    self.photo_files_with_exif.fetch_add(1, Ordering::SeqCst);
                    self.photo_files_with_valid_date
                        .fetch_add(1, Ordering::SeqCst);
                    self.photo_files.push(photo);
                }
                self.files_found.fetch_add(1, Ordering::SeqCst);
            }
            MediaFile::Basic(basic) => {
                self.basic_files.push(basic);
                self.photo_files_unsupported.fetch_add(1, Ordering::SeqCst);
                self.files_found.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Clears buckets and counters. Does nothing while a scan is running.
    pub fn reset_scanner(&mut self) {
        if self.scan_running.load(Ordering::SeqCst) {
            return;
        }
        self.reset_buckets();
    }

    fn reset_buckets(&mut self) {
        self.photo_files.clear();
        self.invalid_photo_files.clear();
        self.video_files.clear();
        self.basic_files.clear();
        self.files_found.store(0, Ordering::SeqCst);
        self.photo_files_with_exif.store(0, Ordering::SeqCst);
        self.photo_files_with_valid_date.store(0, Ordering::SeqCst);
        self.photo_files_unsupported.store(0, Ordering::SeqCst);
    }

    /// Whether the last completed scan found anything at all.
    pub fn check_scan_results(&self) -> bool {
        self.total_files_found() > 0
    }

    pub fn photo_files(&self) -> &[PhotoFile] {
        &self.photo_files
    }

    pub fn invalid_photo_files(&self) -> &[PhotoFile] {
        &self.invalid_photo_files
    }

    pub fn video_files(&self) -> &[BasicFile] {
        &self.video_files
    }

    pub fn basic_files(&self) -> &[BasicFile] {
        &self.basic_files
    }

    pub fn take_photo_files(&mut self) -> Vec<PhotoFile> {
        std::mem::take(&mut self.photo_files)
    }

    pub fn take_invalid_photo_files(&mut self) -> Vec<PhotoFile> {
        std::mem::take(&mut self.invalid_photo_files)
    }

    pub fn total_files_found(&self) -> usize {
        self.files_found.load(Ordering::SeqCst)
    }

    pub fn total_photo_files_with_exif(&self) -> usize {
        self.photo_files_with_exif.load(Ordering::SeqCst)
    }

    pub fn total_photo_files_with_valid_date(&self) -> usize {
        self.photo_files_with_valid_date.load(Ordering::SeqCst)
    }

    pub fn total_photo_files_unsupported(&self) -> usize {
        self.photo_files_unsupported.load(Ordering::SeqCst)
    }

    pub fn is_scan_running(&self) -> bool {
        self.scan_running.load(Ordering::SeqCst)
    }

    pub fn is_scan_completed(&self) -> bool {
        self.scan_completed.load(Ordering::SeqCst)
    }

    pub fn request_cancel(&self) {
        self.cancel_scan.store(true, Ordering::SeqCst);
    }

    fn cancel_requested(&self) -> bool {
        self.cancel_scan.load(Ordering::SeqCst)
    }

    /// Shared handle for observers that outlive a borrow of the scanner.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_scan)
    }

    pub fn files_found_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.files_found)
    }

    pub fn completed_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.scan_completed)
    }
}
