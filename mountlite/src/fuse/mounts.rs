//! Mount table inspection.

use crate::constants::PROC_SELF_MOUNTS;
use std::path::{Path, PathBuf};

/// Mount points listed in a `/proc/mounts`-format table.
///
/// The kernel escapes space, tab, newline and backslash in paths as
/// three-digit octal sequences (`\040` for space); these are decoded.
pub fn parse_mount_points(table: &str) -> Vec<PathBuf> {
    table
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(|field| PathBuf::from(unescape_octal(field)))
        .collect()
}

fn unescape_octal(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 3 < bytes.len()
            && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let value = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            out.push(value as u8);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Whether `target` is currently a mount point of this process.
///
/// `target` is compared as given; pass a canonical path. An unreadable mount
/// table counts as "not mounted".
pub async fn is_mount_point(target: &Path) -> bool {
    match tokio::fs::read_to_string(PROC_SELF_MOUNTS).await {
        Ok(table) => parse_mount_points(&table).iter().any(|p| p == target),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read mount table");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
s3fs /var/lib/kubelet/pods/abc/volumes/data fuse.s3fs rw,nosuid,nodev,relatime,user_id=0,group_id=0,allow_other 0 0
s3fs /mnt/my\\040bucket fuse.s3fs rw,relatime 0 0
";

    #[test]
    fn test_parse_mount_points() {
        let points = parse_mount_points(TABLE);
        assert_eq!(
            points,
            vec![
                PathBuf::from("/sys"),
                PathBuf::from("/proc"),
                PathBuf::from("/var/lib/kubelet/pods/abc/volumes/data"),
                PathBuf::from("/mnt/my bucket"),
            ]
        );
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        assert!(parse_mount_points("\n\nonlyonefield\n").is_empty());
    }

    #[test]
    fn test_unescape_octal() {
        assert_eq!(unescape_octal("/a\\040b"), "/a b");
        assert_eq!(unescape_octal("/tab\\011x"), "/tab\tx");
        assert_eq!(unescape_octal("/back\\134slash"), "/back\\slash");
        assert_eq!(unescape_octal("/trailing\\04"), "/trailing\\04");
        assert_eq!(unescape_octal("/plain"), "/plain");
    }

    #[tokio::test]
    async fn test_fresh_directory_is_not_a_mount_point() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!is_mount_point(dir.path()).await);
    }

    #[tokio::test]
    async fn test_root_is_a_mount_point() {
        assert!(is_mount_point(Path::new("/")).await);
    }
}
