//! Index artifact encoding.
//!
//! The artifact is pretty-printed JSON with two-space indentation and every
//! non-ASCII character escaped, so it survives any transport that mangles
//! UTF-8.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use lca_core::error::{IndexError, Result};
use lca_core::models::EmployerIndex;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use tempfile::NamedTempFile;
use tracing::debug;

// ── AsciiFormatter ────────────────────────────────────────────────────────────

/// [`PrettyFormatter`] that writes non-ASCII characters as `\uXXXX` escapes.
pub struct AsciiFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl<'a> AsciiFormatter<'a> {
    pub fn with_indent(indent: &'a [u8]) -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(indent),
        }
    }
}

impl Default for AsciiFormatter<'_> {
    fn default() -> Self {
        Self::with_indent(b"  ")
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..idx])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Serialize `value` with [`AsciiFormatter`] into `writer`.
pub fn write_ascii_pretty<W: Write, T: Serialize + ?Sized>(
    writer: W,
    value: &T,
) -> serde_json::Result<()> {
    let mut ser = serde_json::Serializer::with_formatter(writer, AsciiFormatter::default());
    value.serialize(&mut ser)
}

/// Render `index` as the artifact text.
pub fn to_ascii_pretty_string(index: &EmployerIndex) -> Result<String> {
    let mut buf = Vec::new();
    write_ascii_pretty(&mut buf, index)?;
    // Only ASCII bytes are emitted.
    String::from_utf8(buf).map_err(|e| IndexError::Other(e.into()))
}

// ── File I/O ──────────────────────────────────────────────────────────────────

/// Write `index` to `path`.
///
/// The artifact goes to a uniquely named temporary file next to the target and
/// is renamed into place, so readers never observe a half-written index. A
/// symlinked `path` is written through to the file it points at.
pub fn write_index(index: &EmployerIndex, path: &Path) -> Result<()> {
    let write_err = |source: io::Error| IndexError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let target = resolve_output_path(path).map_err(write_err)?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_ascii_pretty(&mut writer, index).map_err(|e| {
            if e.is_io() {
                write_err(e.into())
            } else {
                IndexError::JsonParse(e)
            }
        })?;
        writer.flush().map_err(write_err)?;
    }
    if let Some(perms) = output_permissions(&target) {
        tmp.as_file().set_permissions(perms).map_err(write_err)?;
    }

    // On failure the temporary file is removed when `PersistError` drops.
    tmp.persist(&target).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} employers to {}", index.len(), target.display());
    Ok(())
}

/// Follow a symlinked output path to the file it names.
///
/// Paths that do not exist yet, or are not links, are returned unchanged. A
/// dangling link resolves to its (not yet existing) destination.
fn resolve_output_path(path: &Path) -> io::Result<PathBuf> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match std::fs::canonicalize(path) {
            Ok(resolved) => Ok(resolved),
            Err(_) => {
                let dest = std::fs::read_link(path)?;
                Ok(match path.parent() {
                    Some(parent) if dest.is_relative() => parent.join(dest),
                    _ => dest,
                })
            }
        },
        _ => Ok(path.to_path_buf()),
    }
}

/// Permissions for the artifact: those of the file being replaced, or
/// `rw-r--r--` for a new file on unix. `None` keeps the temporary file's own.
fn output_permissions(target: &Path) -> Option<std::fs::Permissions> {
    if let Ok(meta) = std::fs::metadata(target) {
        return Some(meta.permissions());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(std::fs::Permissions::from_mode(0o644))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// Read an artifact back, keeping its key order.
pub fn load_index(path: &Path) -> Result<EmployerIndex> {
    let file = File::open(path).map_err(|source| IndexError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let index: EmployerIndex = serde_json::from_reader(BufReader::new(file))?;
    debug!("Loaded {} employers from {}", index.len(), path.display());
    Ok(index)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lca_core::models::EmployerRecord;
    use tempfile::TempDir;

    fn sample_index() -> EmployerIndex {
        let mut index = EmployerIndex::new();
        index.insert(
            "BETA",
            EmployerRecord {
                company: "Beta LLC".to_string(),
                year: Some(2023),
                count: 2,
                roles: vec!["Engineer".to_string(), "Analyst".to_string()],
            },
        );
        index.insert(
            "GAMMA",
            EmployerRecord {
                company: "Gamma Co".to_string(),
                year: None,
                count: 1,
                roles: vec![],
            },
        );
        index
    }

    #[test]
    fn test_pretty_layout() {
        let text = to_ascii_pretty_string(&sample_index()).unwrap();
        let expected = r#"{
  "BETA": {
    "company": "Beta LLC",
    "year": 2023,
    "count": 2,
    "roles": [
      "Engineer",
      "Analyst"
    ]
  },
  "GAMMA": {
    "company": "Gamma Co",
    "year": null,
    "count": 1,
    "roles": []
  }
}"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_non_ascii_escaped() {
        let mut index = EmployerIndex::new();
        index.insert(
            "SOCI T G N RALE",
            EmployerRecord {
                company: "Société Générale \"SG\" 🚀".to_string(),
                year: Some(2023),
                count: 1,
                roles: vec!["Ingénieur".to_string()],
            },
        );

        let text = to_ascii_pretty_string(&index).unwrap();
        assert!(text.is_ascii());
        assert!(text.contains(r#""Soci\u00e9t\u00e9 G\u00e9n\u00e9rale \"SG\" \ud83d\ude80""#));
        assert!(text.contains(r#""Ing\u00e9nieur""#));

        let parsed: EmployerIndex = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, index);
    }

    #[test]
    fn test_empty_index() {
        assert_eq!(to_ascii_pretty_string(&EmployerIndex::new()).unwrap(), "{}");
    }

    #[test]
    fn test_write_and_load_preserve_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        let index = sample_index();

        write_index(&index, &path).unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("index.json")]);

        let loaded = load_index(&path).unwrap();
        let keys: Vec<&str> = loaded.keys().collect();
        assert_eq!(keys, vec!["BETA", "GAMMA"]);
        assert_eq!(loaded, index);
    }

    #[test]
    fn test_write_overwrites_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, "stale").unwrap();

        write_index(&sample_index(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with('{'));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_through_symlink() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.json");
        let link = dir.path().join("link.json");
        std::fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_index(&EmployerIndex::new(), &link).unwrap();

        let meta = std::fs::symlink_metadata(&link).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(std::fs::read_link(&link).unwrap(), real);
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "{}");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_through_dangling_symlink_creates_target() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("link.json");
        std::os::unix::fs::symlink("real.json", &link).unwrap();

        write_index(&sample_index(), &link).unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        let loaded = load_index(&dir.path().join("real.json")).unwrap();
        assert_eq!(loaded, sample_index());
    }

    #[test]
    fn test_write_leaves_sibling_tmp_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        let sibling = dir.path().join("index.json.tmp");
        std::fs::write(&sibling, "someone else's data").unwrap();

        write_index(&sample_index(), &path).unwrap();

        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "someone else's data");
        assert_eq!(load_index(&path).unwrap(), sample_index());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, "stale").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_index(&sample_index(), &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("index.json");
        let err = write_index(&sample_index(), &path).unwrap_err();
        assert!(matches!(err, IndexError::FileWrite { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_index(Path::new("/tmp/does-not-exist-lca-index-xyz.json")).unwrap_err();
        assert!(matches!(err, IndexError::FileRead { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, "{\"A\": 1}").unwrap();
        let err = load_index(&path).unwrap_err();
        assert!(matches!(err, IndexError::JsonParse(_)));
    }
}
