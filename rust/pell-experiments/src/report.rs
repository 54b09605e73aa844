//! Console and JSON output shared by the experiment modes.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;

pub fn print_banner(title: &str) {
    let rule = "=".repeat(title.chars().count() + 8);
    println!("{}", rule);
    println!("    {}", title);
    println!("{}", rule);
    println!();
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Write `value` as pretty JSON through [`write_text`].
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    write_text(path, &serde_json::to_string_pretty(value)?)?;
    log::info!("Results written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        write_json(&vec![1u32, 2, 3], &path).unwrap();
        let back: Vec<u32> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn test_write_text_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.csv");
        write_text(&path, "first").unwrap();
        write_text(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        // A bare file name has an empty parent.
        assert!(write_text(Path::new(""), "x").is_err());
    }
}
