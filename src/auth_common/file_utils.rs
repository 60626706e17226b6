//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, SeaTableError};
use dirs;
use std::path::PathBuf;

/// Generates the absolute file path of the path provided based on the underlying platform
///
/// # Arguments
///
/// * `file_path`: The file path that needs to be corrected
///
/// # Returns
///
/// The absolute file path to be used based on the platform being used, or an
/// error if the path starts with `~` and the home directory cannot be determined
///
pub(crate) fn expand_user_home(file_path: &str) -> Result<String, SeaTableError> {
    if file_path.starts_with("~/") || file_path.starts_with("~\\") {
        if let Some(home_dir) = dirs::home_dir() {
            let full_path = home_dir.join(PathBuf::from(correct_path(&file_path[2..])));
            Ok(format!("{}", full_path.display()))
        } else {
            ia_err!("cannot expand '{}': unable to determine home directory", file_path)
        }
    } else {
        Ok(String::from(file_path))
    }
}

fn correct_path(file_path: &str) -> String {
    if cfg!(target_os = "windows") {
        file_path.replace("/", "\\")
    } else {
        String::from(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_unchanged() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(expand_user_home("/tmp/cache.json")?, "/tmp/cache.json");
        assert_eq!(expand_user_home("relative/cache.json")?, "relative/cache.json");
        Ok(())
    }

    #[test]
    fn home_prefix_is_expanded() -> Result<(), Box<dyn std::error::Error>> {
        if let Some(home) = dirs::home_dir() {
            let p = expand_user_home("~/.seatable/config")?;
            assert!(p.starts_with(&format!("{}", home.display())));
            assert!(!p.contains('~'));
        }
        Ok(())
    }
}
