use crate::cli::CollateArgs;
use crate::refset::{collate_cel_files, load_specimens, StorageIndex, WalkDirScanner, CEL_EXTENSION};
use crate::utils::{ensure_output_dir, Result};
use std::{sync::Arc, time};

pub fn collate(args: CollateArgs) -> Result<()> {
    let start_timer = time::Instant::now();
    args.validate()?;
    ensure_output_dir(&args.output_dir)?;

    let specimens = load_specimens(&args.specimens_path)?;
    let cel_index = StorageIndex::build(
        &args.ranked_storage_roots(),
        CEL_EXTENSION,
        Arc::new(WalkDirScanner),
        args.io_timeout,
    );
    log::info!("Indexed {} CEL files", cel_index.file_count());

    let summary = collate_cel_files(&specimens, &cel_index, &args.output_dir);
    log::info!(
        "Specimens={}, copied={}, already present={}, copy failures={}, unexpected file count={}",
        summary.specimens,
        summary.copied,
        summary.already_present,
        summary.copy_failed,
        summary.unexpected_count
    );
    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    Ok(())
}
