//! Crash-safe file replacement: write a sibling temp file, fsync it, rename it
//! over the target. Readers see either the old or the new file, never a torn one.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Temp files live next to the target so the rename never crosses filesystems.
pub(crate) const TEMP_SUFFIX: &str = ".tmp";

fn temp_path_for(path: &Path) -> PathBuf {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = path.file_name().and_then(|n| n.to_str()).unwrap_or("collection");
    dir.join(format!(".{stem}-{}{TEMP_SUFFIX}", Uuid::new_v4()))
}

/// True for leftovers of [`write_atomic`] on a collection file, i.e. names shaped
/// `.{collection}.json-{uuid}.tmp`. Anything else in the directory is left alone.
pub(crate) fn is_temp_file(name: &str) -> bool {
    const UUID_LEN: usize = 36;
    let Some(inner) = name.strip_prefix('.').and_then(|n| n.strip_suffix(TEMP_SUFFIX)) else {
        return false;
    };
    let Some(split) = inner.len().checked_sub(UUID_LEN) else {
        return false;
    };
    if !inner.is_char_boundary(split) {
        return false;
    }
    let (stem, id) = inner.split_at(split);
    stem.len() > ".json-".len() && stem.ends_with(".json-") && Uuid::parse_str(id).is_ok()
}

pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_path_for(path);
    if let Err(e) = write_and_sync(&tmp, bytes).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    sync_parent(path).await
}

async fn write_and_sync(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

/// Makes the rename itself durable. Windows has no directory fsync; NTFS
/// journals the metadata update instead.
#[cfg(unix)]
async fn sync_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::File::open(dir).await?.sync_all().await,
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replaces_contents_and_leaves_no_temp_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("books.json");
        fs::write(&target, b"[1,2,3]").await?;

        write_atomic(&target, b"[4]").await?;
        assert_eq!(fs::read(&target).await?, b"[4]");

        let mut entries = fs::read_dir(dir.path()).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["books.json".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_keeps_old_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let missing_parent = dir.path().join("nope").join("books.json");
        assert!(write_atomic(&missing_parent, b"[]").await.is_err());
        assert!(!missing_parent.exists());
        Ok(())
    }

    #[test]
    fn temp_names_are_recognised() {
        let tmp = temp_path_for(Path::new("data/users.json"));
        let name = tmp.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".users.json-"));
        assert!(is_temp_file(name));
        assert!(!is_temp_file("users.json"));
        assert_eq!(tmp.parent(), Some(Path::new("data")));
    }

    #[test]
    fn foreign_dotfiles_are_not_temp_files() {
        assert!(!is_temp_file(".notes.tmp"));
        assert!(!is_temp_file(".books.json-deadbeef.tmp"));
        assert!(!is_temp_file(&format!(".books.txt-{}.tmp", Uuid::new_v4())));
        assert!(!is_temp_file(&format!("..json-{}.tmp", Uuid::new_v4())));
        assert!(!is_temp_file(".é.tmp"));
        assert!(is_temp_file(&format!(".books.json-{}.tmp", Uuid::new_v4())));
    }
}
