use super::{FileNamePattern, StorageIndex, RHCHP_EXTENSION};
use crate::utils::{copy_new_file, Error, Result};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CelCollationSummary {
    pub specimens: usize,
    pub copied: usize,
    pub already_present: usize,
    pub copy_failed: usize,
    /// Specimens with zero or several matching CEL files.
    pub unexpected_count: usize,
}

/// Copies every CEL file matching each specimen into `output_folder`,
/// keeping original file names. Files already present are left untouched.
pub fn collate_cel_files(
    specimens: &[String],
    cel_index: &StorageIndex,
    output_folder: &Path,
) -> CelCollationSummary {
    let mut summary = CelCollationSummary {
        specimens: specimens.len(),
        ..Default::default()
    };

    for specimen in specimens {
        let matches = cel_index.all_matches(specimen);
        for source in &matches {
            let Some(destination) = destination_for(source, output_folder) else {
                continue;
            };
            match copy_new_file(source, &destination) {
                Ok(true) => summary.copied += 1,
                Ok(false) => {
                    log::debug!("{} already present, skipping", destination.display());
                    summary.already_present += 1;
                }
                Err(e) => {
                    log::warn!("Could not copy {}: {}", source.display(), e);
                    summary.copy_failed += 1;
                }
            }
        }
        if matches.len() != 1 {
            log::warn!(
                "Warning - {} CEL files found for specimen {}",
                matches.len(),
                specimen
            );
            summary.unexpected_count += 1;
        }
    }

    summary
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RhchpCollationSummary {
    pub specimens: usize,
    /// Files skipped because a file of the same name is already in the output folder.
    pub already_present: usize,
    pub copied: usize,
    pub not_found: usize,
    pub copy_failed: usize,
}

/// Copies every rhchp file matching each specimen into `output_folder`.
/// Files already there are left untouched, so a specimen analysed against
/// several references keeps all of its rhchp files.
pub fn collate_rhchp_files(
    specimens: &[String],
    rhchp_index: &StorageIndex,
    output_folder: &Path,
) -> Result<RhchpCollationSummary> {
    let present = list_file_names(output_folder)?;
    let mut summary = RhchpCollationSummary {
        specimens: specimens.len(),
        ..Default::default()
    };

    for specimen in specimens {
        let matches = rhchp_index.all_matches(specimen);
        if matches.is_empty() {
            let pattern = FileNamePattern::new(specimen, RHCHP_EXTENSION);
            if present.iter().any(|name| pattern.matches(name)) {
                log::debug!("rhchp file for {} only present in output folder", specimen);
                summary.already_present += 1;
            } else {
                log::error!(
                    "{}",
                    Error::NotFound {
                        kind: "rhchp",
                        key: specimen.clone(),
                    }
                );
                summary.not_found += 1;
            }
            continue;
        }

        for source in &matches {
            let Some(destination) = destination_for(source, output_folder) else {
                continue;
            };
            match copy_new_file(source, &destination) {
                Ok(true) => summary.copied += 1,
                Ok(false) => summary.already_present += 1,
                Err(e) => {
                    log::warn!("Could not copy {}: {}", source.display(), e);
                    summary.copy_failed += 1;
                }
            }
        }
    }

    Ok(summary)
}

fn destination_for(source: &Path, output_folder: &Path) -> Option<PathBuf> {
    source.file_name().map(|name| output_folder.join(name))
}

fn list_file_names(folder: &Path) -> Result<HashSet<String>> {
    let entries = fs::read_dir(folder).map_err(|e| Error::io(folder, e))?;
    let mut names = HashSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(folder, e))?;
        if let Some(name) = entry.file_name().to_str() {
            names.insert(name.to_string());
        }
    }
    Ok(names)
}
