//! Release archive extraction
//!
//! Native tar.gz unpacking with path-safety checks. Entries that would land
//! outside the destination, directly or through links, abort the extraction.

use super::internal::fs_utils;
use super::internal::progress::{self, ProgressGuard};
use crate::core::error::{RecipeError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path (no filesystem access), keeping leading `..`
/// on relative paths.
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut has_root = false;

    for c in path.components() {
        match c {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
                has_root = true;
            }
            Component::RootDir => {
                out.push(Component::RootDir.as_os_str());
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = out
                    .components()
                    .next_back()
                    .is_some_and(|last| matches!(last, Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !has_root {
                    out.push("..");
                }
            }
            Component::Normal(seg) => out.push(seg),
        }
    }

    out
}

/// Reject writes through an existing symlink anywhere below `dest`.
fn ensure_no_symlink_components(dest: &Path, full_path: &Path) -> Result<()> {
    let rel = full_path.strip_prefix(dest).map_err(|_| {
        RecipeError::extract(format!(
            "tar contains path outside destination: {}",
            full_path.display()
        ))
    })?;

    let mut cur = dest.to_path_buf();
    for comp in rel.components() {
        cur.push(comp);
        if let Ok(md) = std::fs::symlink_metadata(&cur)
            && md.file_type().is_symlink()
        {
            return Err(RecipeError::extract(format!(
                "symlink in path component: {}",
                cur.display()
            )));
        }
    }

    Ok(())
}

fn ensure_link_target_within_dest(dest: &Path, link_parent: &Path, link_name: &Path) -> Result<()> {
    if link_name.is_absolute()
        || link_name
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(RecipeError::extract(format!(
            "tar contains unsafe link target (absolute): {}",
            link_name.display()
        )));
    }

    let candidate = normalize_lexical(&link_parent.join(link_name));
    let norm_dest = normalize_lexical(dest);
    if candidate.strip_prefix(&norm_dest).is_err() {
        return Err(RecipeError::extract(format!(
            "tar contains unsafe link target (escapes dest): {} -> {}",
            link_parent.display(),
            link_name.display()
        )));
    }

    Ok(())
}

/// Unpack a tar stream into `dest`, entry by entry.
fn extract_tar<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);

    let entries = archive
        .entries()
        .map_err(|e| RecipeError::extract(format!("tar read error: {}", e)))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| RecipeError::extract(format!("tar entry error: {}", e)))?;

        let path = entry
            .path()
            .map_err(|e| RecipeError::extract(format!("tar path error: {}", e)))?
            .into_owned();

        if !fs_utils::is_safe_path(&path) {
            return Err(RecipeError::extract(format!(
                "tar contains unsafe path: {}",
                path.display()
            )));
        }

        // GitHub archives carry a pax_global_header with the commit id
        let entry_type = entry.header().entry_type();
        if entry_type == tar::EntryType::XGlobalHeader {
            continue;
        }

        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let full_path = dest.join(&path);
        ensure_no_symlink_components(dest, &full_path)?;

        if entry_type == tar::EntryType::Symlink || entry_type == tar::EntryType::Link {
            let link_name = entry
                .link_name()
                .map_err(|e| RecipeError::extract(format!("tar link_name error: {}", e)))?
                .ok_or_else(|| {
                    RecipeError::extract(format!(
                        "tar contains link without target: {}",
                        path.display()
                    ))
                })?;
            // Hardlink targets are archive-relative, symlinks are entry-relative
            let link_parent = if entry_type == tar::EntryType::Link {
                dest
            } else {
                full_path.parent().unwrap_or(dest)
            };
            ensure_link_target_within_dest(dest, link_parent, &link_name)?;
        }

        if let Some(parent) = full_path.parent() {
            if parent.starts_with(dest) {
                ensure_no_symlink_components(dest, parent)?;
            }
            std::fs::create_dir_all(parent).map_err(|e| {
                RecipeError::io(format!("cannot create directory {}", parent.display()), e)
            })?;
        }

        entry
            .unpack(&full_path)
            .map_err(|e| RecipeError::extract(format!("unpack error for {}: {}", path.display(), e)))?;
    }

    Ok(())
}

/// Extract a `.tar.gz` archive into `dest`, creating it if needed.
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .map_err(|e| RecipeError::io(format!("cannot create {}", dest.display()), e))?;

    let file = File::open(archive_path)
        .map_err(|e| RecipeError::io(format!("cannot open {}", archive_path.display()), e))?;

    let filename = archive_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());
    let _guard = ProgressGuard::new(progress::create_spinner(&format!(
        "extracting {}",
        filename
    )));

    let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
    extract_tar(decoder, dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tar_gz(path: &Path, build: impl FnOnce(&mut tar::Builder<flate2::write::GzEncoder<File>>)) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        build(&mut builder);
        let encoder = builder.into_inner().unwrap();
        encoder.finish().unwrap();
    }

    fn file_header(len: usize) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_size(len as u64);
        header.set_mode(0o644);
        header.set_cksum();
        header
    }

    #[test]
    fn test_extract_nested_tree() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("v1.0.tar.gz");
        write_tar_gz(&archive, |b| {
            let content = b"#pragma once\n";
            b.append_data(&mut file_header(content.len()), "pkg-1.0/include/pkg/a.h", &content[..])
                .unwrap();
        });

        let dest = temp.path().join("out");
        extract_tar_gz(&archive, &dest).unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("pkg-1.0/include/pkg/a.h")).unwrap(),
            "#pragma once\n"
        );
    }

    /// Append a file entry whose name is written verbatim, bypassing the
    /// builder's own path checks.
    fn append_raw(
        b: &mut tar::Builder<flate2::write::GzEncoder<File>>,
        name: &str,
        content: &[u8],
    ) {
        let mut header = tar::Header::new_old();
        let raw = &mut header.as_old_mut().name;
        raw.fill(0);
        raw[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        b.append(&header, content).unwrap();
    }

    #[test]
    fn test_extract_rejects_parent_dir_entry() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("traversal.tar.gz");
        write_tar_gz(&archive, |b| append_raw(b, "../evil.h", b"pwned"));

        let dest = temp.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, RecipeError::Extract { .. }), "got: {err}");
        assert!(err.to_string().contains("unsafe path"), "got: {err}");
        assert!(!temp.path().join("evil.h").exists());
    }

    #[test]
    fn test_extract_rejects_absolute_entry() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("absolute.tar.gz");
        let target = temp.path().join("abs.h");
        let name = target.to_str().unwrap().to_string();
        write_tar_gz(&archive, |b| append_raw(b, &name, b"pwned"));

        let dest = temp.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, RecipeError::Extract { .. }), "got: {err}");
        assert!(!target.exists());
        assert!(!dest.join(name.trim_start_matches('/')).exists());
    }

    #[test]
    fn test_extract_blocks_symlink_escape() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("escape.tar.gz");
        write_tar_gz(&archive, |b| {
            let mut link = tar::Header::new_gnu();
            link.set_entry_type(tar::EntryType::Symlink);
            link.set_size(0);
            link.set_mode(0o777);
            link.set_link_name("/").unwrap();
            link.set_cksum();
            b.append_data(&mut link, "a", std::io::empty()).unwrap();

            let content = b"pwned";
            b.append_data(&mut file_header(content.len()), "a/evil.txt", &content[..])
                .unwrap();
        });

        let dest = temp.path().join("out");
        let err = extract_tar_gz(&archive, &dest).unwrap_err();
        assert!(matches!(err, RecipeError::Extract { .. }), "got: {err}");
        assert!(!dest.join("a/evil.txt").exists());
    }

    #[test]
    fn test_extract_blocks_relative_symlink_escape() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("escape.tar.gz");
        write_tar_gz(&archive, |b| {
            let mut link = tar::Header::new_gnu();
            link.set_entry_type(tar::EntryType::Symlink);
            link.set_size(0);
            link.set_mode(0o777);
            link.set_link_name("../../outside").unwrap();
            link.set_cksum();
            b.append_data(&mut link, "pkg/up", std::io::empty()).unwrap();
        });

        let err = extract_tar_gz(&archive, &temp.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("escapes dest"), "got: {err}");
    }

    #[test]
    fn test_extract_blocks_hardlink_outside_dest() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("hardlink.tar.gz");
        write_tar_gz(&archive, |b| {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Link);
            header.set_size(0);
            header.set_mode(0o777);
            header.set_link_name("/etc/passwd").unwrap();
            header.set_cksum();
            b.append_data(&mut header, "hl", std::io::empty()).unwrap();
        });

        let err = extract_tar_gz(&archive, &temp.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("unsafe link target"), "got: {err}");
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("not-an-archive.tar.gz");
        std::fs::write(&archive, b"<html>404</html>").unwrap();

        let err = extract_tar_gz(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, RecipeError::Extract { .. }), "got: {err}");
    }

    #[test]
    fn test_extract_missing_archive_is_io_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = extract_tar_gz(&temp.path().join("missing.tar.gz"), &temp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, RecipeError::Io { .. }));
    }

    #[test]
    fn test_normalize_lexical() {
        assert_eq!(normalize_lexical(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_lexical(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize_lexical(Path::new("a/./b")), PathBuf::from("a/b"));
    }
}
