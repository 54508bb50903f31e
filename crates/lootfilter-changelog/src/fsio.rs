//! Whole-file replace with rename semantics.
//!
//! Both the change log and the protocol's response files are rewritten in
//! full on every request. A plain truncating write would let a polling
//! reader observe an empty or partial file, so all rewrites go through a
//! sibling temp file followed by a rename.

use std::fs;
use std::io;
use std::path::Path;

/// Writes `contents` to `path` by writing a sibling `.tmp` file and renaming
/// it over the destination. Creates missing parent directories.
pub fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);
    fs::write(tmp, contents)?;
    fs::rename(tmp, path)
}
