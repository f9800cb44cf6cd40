//! Publication of the target group document.
//!
//! File destinations are replaced atomically: the document is written to a
//! sibling `<name>.new` file and renamed over the destination, so readers see
//! either the previous document or the new one.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DiscoveryError;

/// Sentinel destination meaning standard output.
pub const STDOUT_SENTINEL: &str = "-";

const TEMP_SUFFIX: &str = ".new";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn parse(raw: &str) -> Self {
        if raw == STDOUT_SENTINEL {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str(STDOUT_SENTINEL),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Write `payload` to `dest`.
pub fn publish(dest: &Destination, payload: &[u8]) -> Result<(), DiscoveryError> {
    let result = match dest {
        Destination::Stdout => write_stream(&mut io::stdout().lock(), payload),
        Destination::File(path) => write_atomic(path, payload),
    };
    result.map_err(|source| DiscoveryError::Publish {
        path: dest.to_string(),
        source,
    })
}

/// Write `payload` to a stream without any temp file.
pub fn write_stream<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    writer.write_all(payload)?;
    writer.flush()
}

/// Atomically replace `path` with `payload` (temp file + rename).
///
/// On failure the temp file may be left behind; `path` itself is untouched.
pub fn write_atomic(path: &Path, payload: &[u8]) -> io::Result<()> {
    let tmp_path = temp_path(path)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    debug!(path = %path.display(), tmp = %tmp_path.display(), bytes = payload.len(), "writing target groups");

    let mut file = File::create(&tmp_path)?;
    file.write_all(payload)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)
}

/// Sibling temp path in the destination's directory, so the rename never
/// crosses filesystems.
pub fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("destination has no file name: {}", path.display()),
        )
    })?;
    let mut tmp_name = name.to_os_string();
    tmp_name.push(TEMP_SUFFIX);
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_means_stdout() {
        assert_eq!(Destination::parse("-"), Destination::Stdout);
        assert_eq!(
            Destination::parse("tgroups/targets.json"),
            Destination::File(PathBuf::from("tgroups/targets.json"))
        );
    }

    #[test]
    fn temp_path_is_a_sibling() {
        let tmp = temp_path(Path::new("/etc/prometheus/targets.json")).expect("temp path");
        assert_eq!(tmp, PathBuf::from("/etc/prometheus/targets.json.new"));
    }

    #[test]
    fn write_atomic_creates_and_replaces() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("targets.json");

        write_atomic(&path, b"[]\n").expect("first write");
        assert_eq!(fs::read(&path).expect("read"), b"[]\n");

        write_atomic(&path, b"[1]\n").expect("second write");
        assert_eq!(fs::read(&path).expect("read"), b"[1]\n");
        assert!(!temp_path(&path).expect("temp path").exists());
    }

    #[test]
    fn failed_write_leaves_previous_document() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("targets.json");
        fs::write(&path, b"previous\n").expect("seed");
        // A directory squatting on the temp path makes the write fail midway.
        fs::create_dir(temp_path(&path).expect("temp path")).expect("block temp");

        let err = publish(&Destination::File(path.clone()), b"next\n").expect_err("should fail");
        assert!(matches!(err, DiscoveryError::Publish { .. }));
        assert_eq!(fs::read(&path).expect("read"), b"previous\n");
    }

    #[test]
    fn failed_write_does_not_create_destination() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("targets.json");
        fs::create_dir(temp_path(&path).expect("temp path")).expect("block temp");

        write_atomic(&path, b"[]\n").expect_err("should fail");
        assert!(!path.exists());
    }

    #[test]
    fn write_stream_writes_payload_verbatim() {
        let mut out = Vec::new();
        write_stream(&mut out, b"[]\n").expect("write");
        assert_eq!(out, b"[]\n");
    }
}
