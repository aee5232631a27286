use std::fs;
use std::path::{Path, PathBuf};

use crate::editor::{Editor, EditorError};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid document {path}: {source}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: EditorError,
    },
}

/// Read a markup document
pub fn read_document(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Write markup to a document file
pub fn write_document(path: &Path, content: &str) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

/// Read a document file into the editor
pub fn load_into(editor: &mut Editor, path: &Path) -> Result<(), IoError> {
    let markup = read_document(path)?;
    editor
        .set_data(&markup)
        .map_err(|source| IoError::InvalidDocument {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the editor's current data to a file
pub fn save_from(editor: &Editor, path: &Path) -> Result<(), IoError> {
    write_document(path, &editor.get_data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_dir, create_test_file};

    #[test]
    fn test_read_document_success() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "letter.html", "<p>Dear Sam,</p>");

        let content = read_document(&path).unwrap();
        assert_eq!(content, "<p>Dear Sam,</p>");
    }

    #[test]
    fn test_read_document_not_found() {
        let dir = create_test_dir();
        let result = read_document(&dir.path().join("missing.html"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_write_document_creates_parent_directories() {
        let dir = create_test_dir();
        let path = dir.path().join("forms").join("nested").join("letter.html");

        write_document(&path, "<p>x</p>").unwrap();

        assert_eq!(read_document(&path).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_write_document_overwrites_existing() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "letter.html", "<p>old</p>");

        write_document(&path, "<p>new</p>").unwrap();

        assert_eq!(read_document(&path).unwrap(), "<p>new</p>");
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "letter.html", "<p>a &amp; b</p>\n<p>c</p>\n");

        let mut editor = Editor::new();
        load_into(&mut editor, &path).unwrap();
        save_from(&editor, &path).unwrap();

        assert_eq!(read_document(&path).unwrap(), "<p>a &amp; b</p><p>c</p>");
    }

    #[test]
    fn test_load_reports_invalid_markup() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "broken.html", "<p>unclosed");

        let mut editor = Editor::new();
        let err = load_into(&mut editor, &path).unwrap_err();
        assert!(matches!(err, IoError::InvalidDocument { .. }));
        assert!(err.to_string().contains("broken.html"));
    }
}
