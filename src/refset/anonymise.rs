use super::{classify_samples, SampleCallSet, StorageIndex, SyndromeRegion, CEL_EXTENSION};
use crate::utils::{copy_new_file, Error, Result};
use rand::{distr::Alphanumeric, rngs::ThreadRng, Rng};
use std::{collections::HashSet, path::Path};

pub const TOKEN_LEN: usize = 8;
const MAX_TOKEN_ATTEMPTS: usize = 64;
const RHCHP_SUFFIX: &str = ".rhchp";
const REFERENCE_SUFFIX: &str = "._hg38CuRef";

/// Draws random `[A-Za-z0-9]` names, never handing out the same one twice.
pub struct TokenGenerator<R> {
    rng: R,
    issued: HashSet<String>,
}

impl TokenGenerator<ThreadRng> {
    pub fn from_thread_rng() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: Rng> TokenGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            issued: HashSet::new(),
        }
    }

    fn draw(&mut self) -> String {
        (0..TOKEN_LEN)
            .map(|_| {
                let byte: u8 = self.rng.sample(Alphanumeric);
                char::from(byte)
            })
            .collect()
    }

    /// Returns a token that was not issued earlier and for which `is_taken`
    /// is false.
    pub fn next_token(&mut self, is_taken: impl Fn(&str) -> bool) -> Result<String> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = self.draw();
            if self.issued.contains(&token) || is_taken(&token) {
                continue;
            }
            self.issued.insert(token.clone());
            return Ok(token);
        }
        Err(Error::TokenExhausted(MAX_TOKEN_ATTEMPTS))
    }
}

/// Multi-sample report tokens carry the analysis file name; the CEL file is
/// named after the part before these suffixes.
pub fn cel_search_key(sample_token: &str) -> &str {
    let key = sample_token
        .strip_suffix(RHCHP_SUFFIX)
        .unwrap_or(sample_token);
    key.strip_suffix(REFERENCE_SUFFIX).unwrap_or(key)
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AnonymisationSummary {
    pub samples: usize,
    pub missing_artifact: usize,
    pub excluded: usize,
    pub retained: usize,
    pub copied: usize,
    pub not_found: usize,
    pub copy_failed: usize,
}

/// Copies the CEL file of every sample without a syndromic call into
/// `output_folder` under a random name.
///
/// Samples are only considered when their rhchp file is present in
/// `rhchp_folder`. Lookup and copy failures are logged and counted; they do
/// not stop the batch. Which sample ended up under which name is not recorded
/// anywhere.
pub fn anonymise_normals<R: Rng>(
    call_set: &SampleCallSet,
    regions: &[SyndromeRegion],
    cel_index: &StorageIndex,
    rhchp_folder: &Path,
    output_folder: &Path,
    tokens: &mut TokenGenerator<R>,
) -> AnonymisationSummary {
    let mut summary = AnonymisationSummary {
        samples: call_set.len(),
        ..Default::default()
    };

    let present: Vec<_> = call_set
        .iter()
        .filter(|sample_calls| {
            let found = rhchp_folder.join(&sample_calls.sample).exists();
            if !found {
                log::warn!(
                    "rhchp file for sample {} not present in folder {}",
                    sample_calls.sample,
                    rhchp_folder.display()
                );
            }
            found
        })
        .collect();
    summary.missing_artifact = summary.samples - present.len();

    let (classifications, classified) = classify_samples(present, regions);
    summary.excluded = classified.excluded;
    summary.retained = classified.retained;

    for classification in classifications.iter().filter(|c| !c.excluded) {
        let key = cel_search_key(&classification.sample);
        let Some(cel_path) = cel_index.first_match(key) else {
            log::warn!(
                "{}",
                Error::NotFound {
                    kind: "CEL",
                    key: classification.sample.clone(),
                }
            );
            summary.not_found += 1;
            continue;
        };

        let copied = tokens
            .next_token(|token| output_folder.join(anonymised_name(token)).exists())
            .and_then(|token| {
                let destination = output_folder.join(anonymised_name(&token));
                copy_new_file(cel_path, &destination)
            });
        match copied {
            Ok(true) => summary.copied += 1,
            Ok(false) => {
                log::warn!(
                    "Could not copy {}: destination already exists",
                    cel_path.display()
                );
                summary.copy_failed += 1;
            }
            Err(e) => {
                log::warn!("Could not copy {}: {}", cel_path.display(), e);
                summary.copy_failed += 1;
            }
        }
    }

    summary
}

fn anonymised_name(token: &str) -> String {
    format!("{}{}", token, CEL_EXTENSION)
}
