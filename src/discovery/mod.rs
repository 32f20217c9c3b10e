//! Candidate discovery
//!
//! Expands the inputs given on the command line into the list of candidate
//! files the filter chain is applied to. Files are taken as given; directories
//! are walked with the `ignore` crate so .gitignore / .ignore rules and hidden
//! file handling match what developers expect from ripgrep.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::InputConfig;

/// Candidates found for a run, plus anything worth telling the user about
#[derive(Debug, Default)]
pub struct Discovery {
    pub candidates: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// Expand `inputs` into a sorted, de-duplicated candidate list
pub fn discover<P: AsRef<Path>>(inputs: &[P], options: &InputConfig) -> Discovery {
    let mut candidates = BTreeSet::new();
    let mut warnings = Vec::new();

    for input in inputs {
        let input = input.as_ref();

        if input.is_file() {
            candidates.insert(input.to_path_buf());
        } else if input.is_dir() {
            walk_directory(input, options, &mut candidates, &mut warnings);
        } else {
            warnings.push(format!("Input not found: {}", input.display()));
        }
    }

    tracing::info!(
        "Discovered {} candidate(s) from {} input(s)",
        candidates.len(),
        inputs.len()
    );

    Discovery {
        candidates: candidates.into_iter().collect(),
        warnings,
    }
}

fn walk_directory(
    root: &Path,
    options: &InputConfig,
    candidates: &mut BTreeSet<PathBuf>,
    warnings: &mut Vec<String>,
) {
    let respect = options.respect_ignore_files;
    let walker = WalkBuilder::new(root)
        .follow_links(options.follow_symlinks)
        .hidden(!options.include_hidden)
        .ignore(respect)
        .git_ignore(respect)
        .git_global(respect)
        .git_exclude(respect)
        .parents(respect)
        .require_git(false)
        .max_depth((options.max_depth > 0).then_some(options.max_depth))
        .build();

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_file()) {
                    candidates.insert(entry.into_path());
                }
            }
            Err(e) => {
                tracing::warn!("Walk error under {}: {}", root.display(), e);
                warnings.push(format!("Walk error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layout() -> anyhow::Result<TempDir> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("nested/deeper"))?;
        fs::create_dir_all(root.join(".hidden"))?;
        fs::create_dir_all(root.join("build"))?;
        fs::write(root.join("a.xml"), "<a/>")?;
        fs::write(root.join("nested/b.xml"), "<b/>")?;
        fs::write(root.join("nested/deeper/c.xml"), "<c/>")?;
        fs::write(root.join(".hidden/d.xml"), "<d/>")?;
        fs::write(root.join("build/e.xml"), "<e/>")?;
        fs::write(root.join(".gitignore"), "build/\n")?;
        Ok(temp_dir)
    }

    fn names(discovery: &Discovery) -> Vec<String> {
        discovery
            .candidates
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_walk_respects_ignore_and_hidden() -> anyhow::Result<()> {
        let temp_dir = layout()?;
        let discovery = discover(&[temp_dir.path()], &InputConfig::default());

        let mut found = names(&discovery);
        found.sort();
        assert_eq!(found, vec!["a.xml", "b.xml", "c.xml"]);
        assert!(discovery.warnings.is_empty());
        Ok(())
    }

    #[test]
    fn test_walk_everything() -> anyhow::Result<()> {
        let temp_dir = layout()?;
        let options = InputConfig {
            respect_ignore_files: false,
            include_hidden: true,
            ..InputConfig::default()
        };
        let discovery = discover(&[temp_dir.path()], &options);

        let found = names(&discovery);
        assert!(found.contains(&"d.xml".to_string()));
        assert!(found.contains(&"e.xml".to_string()));
        assert!(found.contains(&".gitignore".to_string()));
        Ok(())
    }

    #[test]
    fn test_max_depth() -> anyhow::Result<()> {
        let temp_dir = layout()?;
        let options = InputConfig {
            max_depth: 1,
            ..InputConfig::default()
        };
        let discovery = discover(&[temp_dir.path()], &options);
        assert_eq!(names(&discovery), vec!["a.xml"]);
        Ok(())
    }

    #[test]
    fn test_files_missing_inputs_and_duplicates() -> anyhow::Result<()> {
        let temp_dir = layout()?;
        let file = temp_dir.path().join("a.xml");
        let missing = temp_dir.path().join("missing.xml");

        let discovery = discover(&[file.clone(), file.clone(), missing], &InputConfig::default());
        assert_eq!(discovery.candidates, vec![file]);
        assert_eq!(discovery.warnings.len(), 1);
        assert!(discovery.warnings[0].contains("missing.xml"));
        Ok(())
    }
}
