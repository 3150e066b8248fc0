use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::Path;

/// One decoded EXIF entry, reduced to the raw tag number and the decoder's
/// readable rendition of its value.
#[derive(Debug, Clone, PartialEq)]
pub struct ExifField {
    pub tag: u16,
    pub value: String,
}

/// Projection of the decoder's output. Equality is field-wise over the
/// ordered entry list, which is as close to "structural equality of the
/// parsed record" as the decoder allows: it exposes no equality of its own.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExifRecord {
    pub make: String,
    pub model: String,
    pub date_time_original: String,
    pub entries: Vec<ExifField>,
}

/// Result of attempting EXIF extraction on one file. An unreadable or
/// oversized file is invalid; a readable file without decodable EXIF is
/// valid but carries no record. Neither case is an error.
#[derive(Debug)]
pub struct ExifScan {
    pub file_valid: bool,
    pub record: Option<ExifRecord>,
}

pub fn read_exif(path: &Path) -> ExifScan {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::debug!("{}: cannot open file: {err}", path.display());
            return ExifScan {
                file_valid: false,
                record: None,
            };
        }
    };

    // The decoder addresses the buffer with 32-bit offsets.
    if bytes.len() as u64 > u64::from(u32::MAX) {
        log::debug!("{}: file too large for EXIF decoding", path.display());
        return ExifScan {
            file_valid: false,
            record: None,
        };
    }

    match rexif::parse_buffer(&bytes) {
        Ok(data) => ExifScan {
            file_valid: true,
            record: Some(project(&data)),
        },
        Err(err) => {
            log::debug!("{}: no usable EXIF: {err}", path.display());
            ExifScan {
                file_valid: true,
                record: None,
            }
        }
    }
}

fn project(data: &rexif::ExifData) -> ExifRecord {
    let mut record = ExifRecord::default();
    for entry in &data.entries {
        let value = entry.value_more_readable.to_string();
        match entry.tag {
            rexif::ExifTag::Make => record.make = value.clone(),
            rexif::ExifTag::Model => record.model = value.clone(),
            rexif::ExifTag::DateTimeOriginal => record.date_time_original = value.clone(),
            _ => {}
        }
        record.entries.push(ExifField {
            tag: entry.tag as u16,
            value,
        });
    }
    record
}

/// Parses the EXIF `YYYY:MM:DD HH:MM:SS` form into a local-time instant.
pub fn parse_exif_datetime(raw: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), "%Y:%m:%d %H:%M:%S").ok()?;
    naive.and_local_timezone(Local).earliest()
}
