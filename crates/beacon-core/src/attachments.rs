//! Attachment building for error reports

use std::path::PathBuf;

use crate::model::Attachment;

/// Build the attachments for an error report.
///
/// A file attachment comes first, then a text attachment. Blank inputs
/// produce nothing. The file path is not checked for existence.
pub fn build(file_path: Option<&str>, text: Option<&str>) -> Vec<Attachment> {
    let mut attachments = Vec::with_capacity(2);

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        attachments.push(Attachment::File {
            path: PathBuf::from(path),
        });
    }

    if let Some(text) = text.filter(|t| !t.is_empty()) {
        attachments.push(Attachment::Text {
            text: text.to_string(),
        });
    }

    attachments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_nothing() {
        assert!(build(Some(""), Some("")).is_empty());
        assert!(build(None, None).is_empty());
    }

    #[test]
    fn test_build_file_only() {
        let attachments = build(Some("x.txt"), Some(""));
        assert_eq!(
            attachments,
            vec![Attachment::File {
                path: PathBuf::from("x.txt")
            }]
        );
    }

    #[test]
    fn test_build_text_only() {
        let attachments = build(None, Some("note"));
        assert_eq!(
            attachments,
            vec![Attachment::Text {
                text: "note".to_string()
            }]
        );
    }

    #[test]
    fn test_build_both_file_first() {
        let attachments = build(Some("x.txt"), Some("note"));
        assert_eq!(attachments.len(), 2);
        assert!(matches!(attachments[0], Attachment::File { .. }));
        assert!(matches!(attachments[1], Attachment::Text { .. }));
    }

    #[test]
    fn test_missing_file_still_attached() {
        let attachments = build(Some("/definitely/not/here.log"), None);
        assert_eq!(attachments.len(), 1);
    }
}
