//! Avatar and resume "uploads".
//!
//! There is no object store behind the `users` table, so picking a file only
//! records the file's name in the corresponding column. The bytes never leave
//! the machine; the avatar can still be previewed from the local path.

use std::path::Path;

use crate::model::{Field, UserPatch};

pub const RESUME_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];
pub const AVATAR_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// The value stored for a picked file: its last path component.
pub fn stored_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

pub fn avatar_patch(path: &Path) -> Option<UserPatch> {
    stored_name(path).map(|name| UserPatch::new().text(Field::AvatarUrl, name))
}

pub fn resume_patch(path: &Path) -> Option<UserPatch> {
    stored_name(path).map(|name| UserPatch::new().text(Field::ResumeUrl, name))
}

pub fn clear_resume_patch() -> UserPatch {
    UserPatch::new().clear(Field::ResumeUrl)
}

/// What can be shown for a stored resume value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumePreview {
    /// A public PDF that can be displayed inline.
    Embedded(String),
    /// A public URL that can only be opened externally.
    Linked(String),
    /// A bare file name.
    Unavailable,
}

impl ResumePreview {
    pub const UNAVAILABLE_MESSAGE: &str = "Preview not available. File is not a public URL.";

    pub fn for_value(value: &str) -> Self {
        if !value.starts_with("http") {
            return Self::Unavailable;
        }

        if value.to_lowercase().ends_with(".pdf") {
            Self::Embedded(value.to_string())
        } else {
            Self::Linked(value.to_string())
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Embedded(url) | Self::Linked(url) => Some(url),
            Self::Unavailable => None,
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;
    use crate::model::FieldValue;

    #[test]
    fn test_only_file_name_is_stored() {
        let patch = resume_patch(&PathBuf::from("/home/a/docs/cv.pdf")).unwrap();

        assert_eq!(
            patch.iter().collect::<Vec<_>>(),
            vec![(Field::ResumeUrl, &FieldValue::Text(Some("cv.pdf".into())))]
        );
    }

    #[test]
    fn test_directory_like_path_has_no_name() {
        assert_eq!(stored_name(Path::new("/")), None);
    }

    #[test]
    fn test_resume_preview() {
        assert_eq!(ResumePreview::for_value("cv.pdf"), ResumePreview::Unavailable);
        assert_eq!(
            ResumePreview::for_value("https://x.com/CV.PDF"),
            ResumePreview::Embedded("https://x.com/CV.PDF".into())
        );
        assert_eq!(
            ResumePreview::for_value("https://x.com/cv.docx").url(),
            Some("https://x.com/cv.docx")
        );
    }
}
