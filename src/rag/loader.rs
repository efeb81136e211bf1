use std::fs;
use std::path::{Path, PathBuf};

use super::PipelineError;

/// The knowledge-base document, loaded whole into memory.
///
/// Suitable for a small FAQ file; large corpora are out of scope.
#[derive(Debug, Clone)]
pub struct KnowledgeDocument {
    pub text: String,
    pub source: PathBuf,
}

pub fn load_document(path: &Path) -> Result<KnowledgeDocument, PipelineError> {
    let text = fs::read_to_string(path)
        .map_err(|e| PipelineError::NotFound(format!("{}: {}", path.display(), e)))?;

    Ok(KnowledgeDocument {
        text,
        source: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.txt");
        fs::write(&path, "Q: What?\nA: That.\n").unwrap();

        let doc = load_document(&path).unwrap();

        assert_eq!(doc.text, "Q: What?\nA: That.\n");
        assert_eq!(doc.source, path);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");

        let result = load_document(&path);

        assert!(matches!(result, Err(PipelineError::NotFound(_))));
    }
}
