use pdf_engine::PdfEngineError;
use std::path::PathBuf;

/// Coarse classification shown to the user and used by tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileNotFound,
    NotAPdf,
    ParseError,
    Render,
    OutOfRange,
    NoDocument,
}

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: PdfEngineError,
    },
    #[error("failed to render page {}: {source}", page + 1)]
    Render {
        page: u32,
        source: PdfEngineError,
    },
    #[error("no document is open")]
    NoDocument,
}

impl ViewerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ViewerError::Open { source, .. } => match source {
                PdfEngineError::FileNotFound(_) => ErrorKind::FileNotFound,
                PdfEngineError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    ErrorKind::FileNotFound
                }
                PdfEngineError::NotAPdf(_) => ErrorKind::NotAPdf,
                PdfEngineError::PageOutOfRange { .. } => ErrorKind::OutOfRange,
                _ => ErrorKind::ParseError,
            },
            ViewerError::Render { source, .. } => match source {
                PdfEngineError::PageOutOfRange { .. } => ErrorKind::OutOfRange,
                _ => ErrorKind::Render,
            },
            ViewerError::NoDocument => ErrorKind::NoDocument,
        }
    }

    /// Short text for the error dialog
    pub fn user_message(&self) -> String {
        let file_name = |path: &PathBuf| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        };

        match self {
            ViewerError::Open { path, source } => match self.kind() {
                ErrorKind::FileNotFound => format!("File not found: {}", file_name(path)),
                ErrorKind::NotAPdf => format!("{} is not a PDF file.", file_name(path)),
                _ => format!("Failed to open PDF {}: {}", file_name(path), source),
            },
            ViewerError::Render { page, source } => {
                format!("Failed to render page {}: {}", page + 1, source)
            }
            ViewerError::NoDocument => "Open a PDF file first.".to_string(),
        }
    }
}

pub type ViewerResult<T> = Result<T, ViewerError>;
