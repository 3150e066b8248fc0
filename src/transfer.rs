use crate::media::PhotoFile;
use crate::scanner::Scanner;
use std::fs;
use std::path::Path;

/// One planned transfer batch: the photo files bound for a single target
/// directory. The planner fills it, the duplicate searches drain matches
/// out of it, and `transfer_files` materializes what is left.
#[derive(Debug, Default)]
pub struct DirectoryTransfer {
    target_directory: String,
    photo_files: Vec<PhotoFile>,
}

impl DirectoryTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target_directory(&mut self, target_directory: &str) {
        self.target_directory = target_directory.to_string();
    }

    pub fn target_directory(&self) -> &str {
        &self.target_directory
    }

    pub fn add_photo_file(&mut self, photo: PhotoFile) {
        self.photo_files.push(photo);
    }

    pub fn set_photo_files(&mut self, photos: Vec<PhotoFile>) {
        self.photo_files.extend(photos);
    }

    pub fn photo_files(&self) -> &[PhotoFile] {
        &self.photo_files
    }

    /// Removes the entry whose source path matches; reports whether
    /// anything was removed.
    pub fn remove_photo_file(&mut self, photo: &PhotoFile) -> bool {
        let before = self.photo_files.len();
        self.photo_files
            .retain(|candidate| candidate.source_file_path != photo.source_file_path);
        self.photo_files.len() != before
    }

    /// Hands the matching entry over to another collection; reports whether
    /// anything moved.
    pub fn move_photo_file_to(&mut self, photo: &PhotoFile, target: &mut Vec<PhotoFile>) -> bool {
        let position = self
            .photo_files
            .iter()
            .position(|candidate| candidate.source_file_path == photo.source_file_path);
        match position {
            Some(index) => {
                target.push(self.photo_files.remove(index));
                true
            }
            None => false,
        }
    }

    /// Pulls out every file whose target filename already exists in the
    /// target directory. A missing target directory means no conflicts.
    pub fn filename_duplicates(&mut self) -> Vec<PhotoFile> {
        let directory = Path::new(&self.target_directory);
        if !directory.is_dir() {
            return Vec::new();
        }

        let (duplicates, kept): (Vec<PhotoFile>, Vec<PhotoFile>) =
            std::mem::take(&mut self.photo_files)
                .into_iter()
                .partition(|photo| directory.join(&photo.target_file_name).is_file());
        self.photo_files = kept;
        duplicates
    }

    /// Pulls out every file whose EXIF record duplicates another's. First
    /// the batch is compared against itself (the older file of a matching
    /// pair is the duplicate; on a tie the later-discovered one is), then
    /// what remains is compared against the photos already present in the
    /// target directory.
    pub fn exif_duplicates(&mut self) -> Vec<PhotoFile> {
        let mut duplicates = Vec::new();

        let mut unique: Vec<PhotoFile> = Vec::new();
        for photo in std::mem::take(&mut self.photo_files) {
            let matched = unique
                .iter()
                .position(|kept| exif_matches(&photo, kept));
            match matched {
                Some(index)
                    if photo.file_creation_time() <= unique[index].file_creation_time() =>
                {
                    duplicates.push(photo);
                }
                Some(index) => duplicates.push(std::mem::replace(&mut unique[index], photo)),
                None => unique.push(photo),
            }
        }
        self.photo_files = unique;

        if Path::new(&self.target_directory).exists() {
            let mut scanner = Scanner::new();
            match scanner.scan(&self.target_directory, false) {
                Ok(()) => {
                    let existing = scanner.take_photo_files();
                    let (found, kept): (Vec<PhotoFile>, Vec<PhotoFile>) =
                        std::mem::take(&mut self.photo_files).into_iter().partition(
                            |photo| existing.iter().any(|present| exif_matches(photo, present)),
                        );
                    self.photo_files = kept;
                    duplicates.extend(found);
                }
                Err(err) => log::warn!(
                    "{}: duplicate check scan of target failed: {err}",
                    self.target_directory
                ),
            }
        }

        duplicates
    }

    /// Copies or moves every file in the batch into the target directory,
    /// creating it as needed. The first filesystem error fails the whole
    /// batch; an existing target with overwrite disabled is only a skip.
    pub fn transfer_files(&mut self, move_files: bool, replace_dashes_with_underscores: bool) -> bool {
        if let Err(err) = fs::create_dir_all(&self.target_directory) {
            log::error!(
                "{}: cannot create target directory: {err}",
                self.target_directory
            );
            return false;
        }

        for photo in &self.photo_files {
            let mut file_name = photo.target_file_name.clone();
            if replace_dashes_with_underscores {
                file_name = file_name.replace('-', "_");
            }
            let source = &photo.source_file_path;
            let target = Path::new(&self.target_directory).join(&file_name);

            let outcome = if move_files {
                if photo.overwrite_enabled || !target.exists() {
                    fs::rename(source, &target).map(|()| {
                        log::info!("Moved {} to {}", source.display(), target.display());
                    })
                } else {
                    log::warn!(
                        "{}: already exists and overwrite is disabled",
                        target.display()
                    );
                    Ok(())
                }
            } else if photo.overwrite_enabled || !target.exists() {
                fs::copy(source, &target).map(|_| {
                    log::info!("Copied {} to {}", source.display(), target.display());
                })
            } else {
                log::debug!("{}: already exists, copy skipped", target.display());
                Ok(())
            };

            if let Err(err) = outcome {
                log::error!(
                    "{} -> {}: transfer failed: {err}",
                    source.display(),
                    target.display()
                );
                return false;
            }
        }
        true
    }

    pub fn files_to_move_count(&self) -> usize {
        self.photo_files.len()
    }

    pub fn clear(&mut self) {
        self.photo_files.clear();
        self.target_directory.clear();
    }
}

fn exif_matches(a: &PhotoFile, b: &PhotoFile) -> bool {
    match (&a.exif, &b.exif) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}
