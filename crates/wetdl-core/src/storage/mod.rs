//! Disk I/O and file lifecycle for one transfer.
//!
//! Each transfer streams into its own temp file next to the destination,
//! preallocated to the declared size (fallocate on Linux when available, else
//! set_len), then fsyncs and atomically renames it into place. Anything short of a
//! complete body is discarded, so the destination either holds a whole object or
//! does not exist.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;

use std::path::{Path, PathBuf};

use crate::url_model::NAME_MAX;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Temp path for transfer `seq`: `file.gz` → `file.gz.<seq>.part`, in the same
/// directory as `final_path`.
///
/// The sequence number keeps two tasks that target the same destination from
/// writing into the same temp file. A name too long to take the suffix is cut (on a
/// char boundary) so the temp file name still fits in NAME_MAX bytes; the sequence
/// number keeps cut names unique.
pub fn temp_path(final_path: &Path, seq: u64) -> PathBuf {
    let suffix = format!(".{}{}", seq, TEMP_SUFFIX);
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut end = name.len().min(NAME_MAX.saturating_sub(suffix.len()));
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    final_path.with_file_name(format!("{}{}", &name[..end], suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_seq_and_part() {
        let p = temp_path(Path::new("file.gz"), 0);
        assert_eq!(p.to_string_lossy(), "file.gz.0.part");
        let p2 = temp_path(Path::new("/tmp/wet/a.warc.wet.gz"), 17);
        assert_eq!(p2.to_string_lossy(), "/tmp/wet/a.warc.wet.gz.17.part");
    }

    #[test]
    fn temp_name_fits_name_max_for_long_destinations() {
        let long = format!("{}.gz", "a".repeat(250));
        let p = temp_path(&Path::new("/out").join(&long), 12345);
        let name = p.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), NAME_MAX);
        assert!(name.ends_with(".12345.part"));
        assert_eq!(p.parent(), Some(Path::new("/out")));

        let wide = "é".repeat(127);
        let p = temp_path(Path::new(&wide), 7);
        let name = p.file_name().unwrap().to_str().unwrap();
        assert!(name.len() <= NAME_MAX);
        assert!(name.ends_with(".7.part"));
    }

    #[test]
    fn long_destination_round_trips_through_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join(format!("{}.gz", "b".repeat(250)));
        let writer = StorageWriterBuilder::create(&temp_path(&final_path, 99))
            .unwrap()
            .build();
        writer.write_at(0, b"long").unwrap();
        writer.finalize(&final_path).unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"long");
    }

    #[test]
    fn create_write_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("nested/out/segment.gz");
        let tp = temp_path(&final_path, 3);

        let mut builder = StorageWriterBuilder::create(&tp).unwrap();
        builder.preallocate(10).unwrap();
        let writer = builder.build();

        writer.write_at(0, b"hello").unwrap();
        writer.write_at(5, b"world").unwrap();
        writer.sync().unwrap();
        writer.finalize(&final_path).unwrap();

        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"helloworld");
    }

    #[test]
    fn discard_removes_temp_and_leaves_no_destination() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("segment.gz");
        let tp = temp_path(&final_path, 0);

        let mut builder = StorageWriterBuilder::create(&tp).unwrap();
        builder.preallocate(100).unwrap();
        let writer = builder.build();
        writer.write_at(0, b"partial").unwrap();
        writer.discard();

        assert!(!tp.exists());
        assert!(!final_path.exists());
    }

    #[test]
    fn finalize_replaces_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("file.gz");
        std::fs::write(&final_path, b"first").unwrap();

        let writer = StorageWriterBuilder::create(&temp_path(&final_path, 1))
            .unwrap()
            .build();
        writer.write_at(0, b"second").unwrap();
        writer.finalize(&final_path).unwrap();

        assert_eq!(std::fs::read(&final_path).unwrap(), b"second");
    }
}
