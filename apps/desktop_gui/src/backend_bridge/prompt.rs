//! Native file dialogs for open/save.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lwv_client_core::PathPrompt;

/// Designs are `.aedb` directories.
pub const DESIGN_EXTENSION: &str = "aedb";
const DEFAULT_SAVE_NAME: &str = "new_project.aedb";

pub struct RfdPrompt;

#[async_trait]
impl PathPrompt for RfdPrompt {
    async fn pick_open(&self) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_title("Open design")
            .pick_folder()
            .await
            .map(|handle| handle.path().to_path_buf())
    }

    async fn pick_save(&self) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_title("Save design as")
            .set_file_name(DEFAULT_SAVE_NAME)
            .save_file()
            .await
            .map(|handle| with_design_extension(handle.path()))
    }
}

/// Appends `.aedb` unless the path already carries it.
pub fn with_design_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DESIGN_EXTENSION));
    if has_extension {
        return path.to_path_buf();
    }
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(DESIGN_EXTENSION);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_path_gets_design_extension() {
        assert_eq!(
            with_design_extension(Path::new("/tmp/board")),
            PathBuf::from("/tmp/board.aedb")
        );
        assert_eq!(
            with_design_extension(Path::new("/tmp/board.v2")),
            PathBuf::from("/tmp/board.v2.aedb")
        );
    }

    #[test]
    fn existing_extension_is_kept() {
        assert_eq!(
            with_design_extension(Path::new("/tmp/board.AEDB")),
            PathBuf::from("/tmp/board.AEDB")
        );
    }
}
