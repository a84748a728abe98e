use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::enumerate::Enumeration;

pub const CLASSES_FILE: &str = "classes.txt";
pub const VARIANTS_FILE: &str = "variants.txt";

/// Paths of the files written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub classes: PathBuf,
    pub variants: PathBuf,
}

/// Write `classes.txt` and `variants.txt` into `out_dir`, replacing any previous contents
pub fn write_outputs(out_dir: &Path, enumeration: &Enumeration) -> Result<OutputFiles> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    let files = OutputFiles {
        classes: out_dir.join(CLASSES_FILE),
        variants: out_dir.join(VARIANTS_FILE),
    };

    fs::write(&files.classes, enumeration.classes_text())
        .with_context(|| format!("Failed to write output file: {:?}", files.classes))?;
    fs::write(&files.variants, enumeration.variants_text())
        .with_context(|| format!("Failed to write output file: {:?}", files.variants))?;

    info!("Classes written to: {:?}", files.classes);
    info!("Variants written to: {:?}", files.variants);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_write_outputs_creates_dir_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("nested/_build");
        let enumeration = Enumeration {
            classes: vec!["flex".to_owned(), "bg-brand".to_owned()],
            variants: vec!["hover".to_owned()],
        };

        write_outputs(&out_dir, &enumeration).unwrap();
        fs::write(out_dir.join(CLASSES_FILE), "stale\nstale\nstale").unwrap();
        let files = write_outputs(&out_dir, &enumeration).unwrap();

        assert_eq!(fs::read_to_string(files.classes).unwrap(), "flex\nbg-brand");
        assert_eq!(fs::read_to_string(files.variants).unwrap(), "hover");
    }
}
