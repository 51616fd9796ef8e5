//! Symlink manifest and marker files.
//!
//! The manifest is a headerless delimited-text file, `symlinks.txt`, inside
//! the archive metadata directory. Each row holds three fields: the
//! destination path of a link relative to the package root, its raw target
//! text, and a directory flag (`"1"` when the target resolved to a
//! directory at scan time, `"0"` otherwise). Fields containing a comma,
//! quote, or line break are quoted with embedded quotes doubled; rows end
//! with `\n`.
//!
//! Two zero-byte markers live next to the manifest: `axle.lck`, always
//! written so consumers can tell a link-aware archive from an ordinary one,
//! and `requires-libpython`, written only when the payload declares a hard
//! libpython dependency.

use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::registry::{LinkRecord, LinkRegistry};

/// Manifest file name inside the metadata directory.
pub const SYMLINKS_FILE: &str = "symlinks.txt";

/// Zero-byte marker identifying a link-aware archive.
pub const LOCK_FILE: &str = "axle.lck";

/// Zero-byte marker declaring a hard libpython dependency.
pub const REQUIRES_LIBPYTHON_FILE: &str = "requires-libpython";

/// Write the manifest and its markers into `metadata_dir`.
///
/// The directory is created if missing. An empty registry still produces
/// the manifest file and the lock marker; absence of links and absence of
/// the manifest mean different things to consumers.
///
/// # Errors
///
/// Returns [`ManifestError::Write`] when the directory or any of the files
/// cannot be written.
pub fn write_manifest(
    registry: &LinkRegistry,
    metadata_dir: &Path,
    require_libpython: bool,
) -> Result<(), ManifestError> {
    std::fs::create_dir_all(metadata_dir).map_err(|source| ManifestError::Write {
        path: metadata_dir.to_path_buf(),
        source,
    })?;

    let mut rows = String::new();
    for record in registry.all() {
        render_row(record, &mut rows);
    }
    write_file(&metadata_dir.join(SYMLINKS_FILE), &rows)?;
    write_file(&metadata_dir.join(LOCK_FILE), "")?;
    if require_libpython {
        write_file(&metadata_dir.join(REQUIRES_LIBPYTHON_FILE), "")?;
    }
    Ok(())
}

/// Read a manifest back into link records, in file order.
///
/// Accepts `\r\n` row terminators as well as `\n`. Quoted fields may carry
/// embedded delimiters, quotes, and line breaks.
///
/// # Errors
///
/// Returns [`ManifestError::Read`] when the file cannot be read and
/// [`ManifestError::Parse`] for malformed content, carrying the one-based
/// line number where parsing stopped.
pub fn parse_manifest(path: &Path) -> Result<Vec<LinkRecord>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rows(&content)
}

fn write_file(path: &Path, content: &str) -> Result<(), ManifestError> {
    std::fs::write(path, content).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Append one record as a manifest row.
fn render_row(record: &LinkRecord, out: &mut String) {
    push_field(&record.destination_path.to_string_lossy(), out);
    out.push(',');
    push_field(&record.target.to_string_lossy(), out);
    out.push(',');
    out.push_str(if record.is_directory { "1" } else { "0" });
    out.push('\n');
}

/// Append one field, quoted only when the raw text requires it.
fn push_field(raw: &str, out: &mut String) {
    if raw.contains([',', '"', '\r', '\n']) {
        out.push('"');
        for ch in raw.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(raw);
    }
}

/// Parse manifest content into records.
fn parse_rows(content: &str) -> Result<Vec<LinkRecord>, ManifestError> {
    let mut records = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_started = false;
    let mut line = 1_usize;

    let mut chars = content.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() => {
                in_quotes = true;
                row_started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_started = true;
            }
            // CR before LF belongs to the terminator, not the field.
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if row_started || !field.is_empty() {
                    row.push(std::mem::take(&mut field));
                    records.push(record_from_row(&row, line)?);
                    row.clear();
                    row_started = false;
                }
                line += 1;
            }
            _ => {
                field.push(ch);
                row_started = true;
            }
        }
    }

    if in_quotes {
        return Err(ManifestError::Parse {
            line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if row_started || !field.is_empty() {
        row.push(field);
        records.push(record_from_row(&row, line)?);
    }
    Ok(records)
}

fn record_from_row(row: &[String], line: usize) -> Result<LinkRecord, ManifestError> {
    let [destination, target, flag] = row else {
        return Err(ManifestError::Parse {
            line,
            message: format!("expected 3 fields, found {}", row.len()),
        });
    };
    let is_directory = match flag.as_str() {
        "0" => false,
        "1" => true,
        other => {
            return Err(ManifestError::Parse {
                line,
                message: format!("directory flag must be \"0\" or \"1\", found \"{other}\""),
            });
        }
    };
    Ok(LinkRecord::new(
        PathBuf::from(destination),
        PathBuf::from(target),
        is_directory,
    ))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;

    fn registry_of(records: Vec<LinkRecord>) -> LinkRegistry {
        let mut registry = LinkRegistry::new();
        registry.extend(records);
        registry
    }

    #[test]
    fn writes_rows_in_registry_order() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = registry_of(vec![
            LinkRecord::new("lib/foo.so", "../bar/foo.so", false),
            LinkRecord::new("scripts/script2", "script1", false),
            LinkRecord::new("pkg/data", "real_data", true),
        ]);

        write_manifest(&registry, tmp.path(), false).unwrap();

        let content = std::fs::read_to_string(tmp.path().join(SYMLINKS_FILE)).unwrap();
        assert_eq!(
            content,
            "lib/foo.so,../bar/foo.so,0\nscripts/script2,script1,0\npkg/data,real_data,1\n"
        );
    }

    #[test]
    fn empty_registry_still_writes_manifest_and_lock() {
        let tmp = tempfile::tempdir().unwrap();

        write_manifest(&LinkRegistry::new(), tmp.path(), false).unwrap();

        let manifest = tmp.path().join(SYMLINKS_FILE);
        let lock = tmp.path().join(LOCK_FILE);
        assert!(manifest.is_file());
        assert_eq!(std::fs::read(&manifest).unwrap(), b"");
        assert!(lock.is_file());
        assert_eq!(std::fs::metadata(&lock).unwrap().len(), 0);
        assert!(!tmp.path().join(REQUIRES_LIBPYTHON_FILE).exists());
    }

    #[test]
    fn libpython_marker_written_only_when_requested() {
        let tmp = tempfile::tempdir().unwrap();

        write_manifest(&LinkRegistry::new(), tmp.path(), true).unwrap();

        let marker = tmp.path().join(REQUIRES_LIBPYTHON_FILE);
        assert!(marker.is_file());
        assert_eq!(std::fs::metadata(&marker).unwrap().len(), 0);
    }

    #[test]
    fn creates_the_metadata_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let meta = tmp.path().join("demo-1.0.dist-info");

        write_manifest(&LinkRegistry::new(), &meta, false).unwrap();

        assert!(meta.join(SYMLINKS_FILE).is_file());
    }

    #[test]
    fn quotes_fields_with_commas_and_quotes() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = registry_of(vec![
            LinkRecord::new("odd,name", "target", false),
            LinkRecord::new("quoted\"name", "t", false),
        ]);

        write_manifest(&registry, tmp.path(), false).unwrap();

        let content = std::fs::read_to_string(tmp.path().join(SYMLINKS_FILE)).unwrap();
        assert_eq!(content, "\"odd,name\",target,0\n\"quoted\"\"name\",t,0\n");
    }

    #[test]
    fn round_trips_awkward_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let records = vec![
            LinkRecord::new("plain/link", "../up/one", false),
            LinkRecord::new("comma,path", "target,with,commas", true),
            LinkRecord::new("with\"quote", "line\nbreak", false),
        ];
        let registry = registry_of(records.clone());

        write_manifest(&registry, tmp.path(), false).unwrap();
        let parsed = parse_manifest(&tmp.path().join(SYMLINKS_FILE)).unwrap();

        assert_eq!(parsed, records);
    }

    #[test]
    fn parses_empty_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SYMLINKS_FILE);
        std::fs::write(&path, "").unwrap();

        assert!(parse_manifest(&path).unwrap().is_empty());
    }

    #[test]
    fn tolerates_crlf_terminators() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SYMLINKS_FILE);
        std::fs::write(&path, "a/b,c,0\r\nd,e,1\r\n").unwrap();

        let parsed = parse_manifest(&path).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].destination_path, Path::new("a/b"));
        assert!(!parsed[0].is_directory);
        assert!(parsed[1].is_directory);
    }

    #[test]
    fn tolerates_missing_final_newline() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SYMLINKS_FILE);
        std::fs::write(&path, "a,b,0").unwrap();

        let parsed = parse_manifest(&path).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].target, Path::new("b"));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SYMLINKS_FILE);
        std::fs::write(&path, "only,two\n").unwrap();

        let err = parse_manifest(&path).unwrap_err();
        let ManifestError::Parse { line, message } = err else {
            panic!("expected a parse error");
        };
        assert_eq!(line, 1);
        assert!(message.contains("3 fields"));
    }

    #[test]
    fn rejects_bad_directory_flag() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SYMLINKS_FILE);
        std::fs::write(&path, "a,b,0\nc,d,yes\n").unwrap();

        let err = parse_manifest(&path).unwrap_err();
        let ManifestError::Parse { line, message } = err else {
            panic!("expected a parse error");
        };
        assert_eq!(line, 2);
        assert!(message.contains("yes"));
    }

    #[test]
    fn rejects_unterminated_quote() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SYMLINKS_FILE);
        std::fs::write(&path, "\"never closed,b,0\n").unwrap();

        let err = parse_manifest(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = parse_manifest(&tmp.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
