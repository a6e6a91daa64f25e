// extension.rs - Input file extension rules

use crate::error::MergeError;

/// Input formats accepted by the merger
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["osb", "osg"];

/// Extension of `path`: everything after the last '.', lower-cased.
/// The whole string is searched, so a dot in a directory name counts.
pub fn get_extension(path: &str) -> Result<String, MergeError> {
    let pos = path
        .rfind('.')
        .ok_or_else(|| MergeError::MissingExtension(path.to_string()))?;
    Ok(path[pos + 1..].to_lowercase())
}

/// Extension of `path` if it is one of [`ALLOWED_EXTENSIONS`]
pub fn check_extension(path: &str) -> Result<String, MergeError> {
    let ext = get_extension(path)?;
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(MergeError::UnknownExtension(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension("scene.osg").unwrap(), "osg");
        assert_eq!(get_extension("a.b.OSB").unwrap(), "osb");
        assert_eq!(get_extension("trailing.").unwrap(), "");
        assert!(matches!(
            get_extension("noext"),
            Err(MergeError::MissingExtension(_))
        ));
    }

    #[test]
    fn test_check_extension_is_case_insensitive() {
        assert_eq!(check_extension("FILE.OSG").unwrap(), "osg");
        assert_eq!(check_extension("file.osg").unwrap(), "osg");
        assert_eq!(check_extension("File.Osb").unwrap(), "osb");
    }

    #[test]
    fn test_check_extension_rejects() {
        assert!(matches!(
            check_extension("a.txt"),
            Err(MergeError::UnknownExtension(ext)) if ext == "txt"
        ));
        assert!(matches!(
            check_extension("dir.osg/file"),
            Err(MergeError::UnknownExtension(_))
        ));
        assert!(matches!(
            check_extension("Makefile"),
            Err(MergeError::MissingExtension(_))
        ));
    }
}
