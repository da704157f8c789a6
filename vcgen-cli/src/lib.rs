#![warn(unused_extern_crates)]
pub mod summary;
pub mod ux;

use std::path::{Path, PathBuf};

/// Output directory of the description specified. Description's directory is used if not set explicitly.
#[must_use]
pub fn output_dir(description: &str, explicit: Option<&str>) -> PathBuf {
    match explicit {
        Some(dir) => PathBuf::from(dir),
        None => parent_of(description).to_path_buf(),
    }
}

#[must_use]
pub fn parent_of(path: &str) -> &Path {
    Path::new(path).parent().unwrap_or_else(|| Path::new(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ws/workspace.json", None, "ws")]
    #[case("workspace.json", None, "")]
    #[case("ws/workspace.json", Some("out"), "out")]
    #[trace]
    fn output_dir_tests(#[case] description: &str, #[case] explicit: Option<&str>, #[case] expected: &str) {
        // Arrange

        // Act
        let actual = output_dir(description, explicit);

        // Assert
        assert_eq!(actual, PathBuf::from(expected));
    }
}
