mod anonymise;
mod calls;
mod classify;
mod collate;
mod locate;
mod specimens;
mod syndromes;

pub use anonymise::{
    anonymise_normals, cel_search_key, AnonymisationSummary, TokenGenerator, TOKEN_LEN,
};
pub use calls::{calls_from_reader, load_call_report, SampleCallSet, SampleCalls};
pub use classify::{
    classify_samples, find_overlap, is_excluded, Classification, ClassificationSummary,
};
pub use collate::{
    collate_cel_files, collate_rhchp_files, CelCollationSummary, RhchpCollationSummary,
};
pub use locate::{
    rank_storage_roots, FileNamePattern, RootListing, RootScanner, StorageIndex, StorageRoot,
    WalkDirScanner, CEL_EXTENSION, RHCHP_EXTENSION,
};
pub use specimens::{load_specimens, specimens_from_reader, SPECIMEN_COLUMN};
pub use syndromes::{load_syndrome_regions, regions_from_reader, SyndromeRegion};
