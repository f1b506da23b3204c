use crate::cli::{PrenatalArgs, SyndromeFilterConfig};
use crate::refset::{
    anonymise_normals, collate_rhchp_files, load_call_report, load_specimens,
    load_syndrome_regions, StorageIndex, StorageRoot, TokenGenerator, WalkDirScanner,
    CEL_EXTENSION, RHCHP_EXTENSION,
};
use crate::utils::{ensure_output_dir, Result};
use std::{path::Path, sync::Arc, time};

pub fn prenatal(args: PrenatalArgs) -> Result<()> {
    let start_timer = time::Instant::now();
    let filter = args.syndrome_filter()?;

    ensure_output_dir(&args.output_dir)?;
    if let Some(filter) = &filter {
        ensure_output_dir(&filter.syndrome_free_dir)?;
    }

    let specimens = load_specimens(&args.specimens_path)?;
    let rhchp_index = StorageIndex::build(
        &[StorageRoot::new("input", &args.input_dir, 0)],
        RHCHP_EXTENSION,
        Arc::new(WalkDirScanner),
        args.io_timeout,
    );
    let collated = collate_rhchp_files(&specimens, &rhchp_index, &args.output_dir)?;
    log::info!(
        "rhchp files: specimens={}, already present={}, copied={}, not found={}, copy failures={}",
        collated.specimens,
        collated.already_present,
        collated.copied,
        collated.not_found,
        collated.copy_failed
    );

    if let Some(filter) = filter {
        filter_and_anonymise(&filter, &args.output_dir, args.io_timeout)?;
    }

    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    Ok(())
}

fn filter_and_anonymise(
    filter: &SyndromeFilterConfig,
    rhchp_dir: &Path,
    io_timeout: Option<time::Duration>,
) -> Result<()> {
    let regions = load_syndrome_regions(&filter.regions_path)?;
    let call_set = load_call_report(&filter.report_path)?;

    let cel_index = StorageIndex::build(
        &filter.storage_roots,
        CEL_EXTENSION,
        Arc::new(WalkDirScanner),
        io_timeout,
    );
    log::info!("Indexed {} CEL files", cel_index.file_count());

    let mut tokens = TokenGenerator::from_thread_rng();
    let summary = anonymise_normals(
        &call_set,
        &regions,
        &cel_index,
        rhchp_dir,
        &filter.syndrome_free_dir,
        &mut tokens,
    );
    log::info!(
        "Samples={}, missing rhchp={}, skipped={}, not skipped={}, copied={}, CEL not found={}, copy failures={}",
        summary.samples,
        summary.missing_artifact,
        summary.excluded,
        summary.retained,
        summary.copied,
        summary.not_found,
        summary.copy_failed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn end_to_end_filter_and_anonymise() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let write = |rel: &str, contents: &str| {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        };

        write("manifest.csv", "Name,Specimen ID,Date\nA,2128184,2024-01-01\nB,2128185,2024-01-02\nC,2128186,2024-01-03\n");
        write("regions.bed", "chr\tstart\tstop\ttype\nchr1\t1000\t2000\tLoss\n");
        write(
            "report.txt",
            "File\tType\tState\tChromosome\tStart\tStop\n\
             2128184_SNP_1.rhchp\tLossHet\t1\t1\t1500\t1600\n\
             2128185_SNP_1.rhchp\tLossHet\t1\t1\t2000\t2500\n\
             2128186_SNP_1.rhchp\tGain\t3\t1\t1500\t1600\n",
        );
        write("input/run1/2128184_SNP_1.rhchp", "rhchp");
        write("input/run1/2128185_SNP_1.rhchp", "rhchp");
        write("input/run2/2128186_SNP_1.rhchp", "rhchp");
        write("archive/2128184_SNP_1_A01.CEL", "abnormal");
        write("archive/2128185_SNP_1_A02.CEL", "normal-1");
        write("upload/2128186_SNP_1_A03.CEL", "normal-2");

        let args = PrenatalArgs {
            specimens_path: root.join("manifest.csv"),
            input_dir: root.join("input"),
            output_dir: root.join("rhchp"),
            syndrome_regions_path: Some(root.join("regions.bed")),
            report_path: Some(root.join("report.txt")),
            syndrome_free_dir: Some(root.join("anonymised")),
            storage_roots: vec![
                StorageRoot::new("archive", root.join("archive"), 0),
                StorageRoot::new("upload", root.join("upload"), 0),
            ],
            io_timeout: None,
        };
        prenatal(args).unwrap();

        assert_eq!(fs::read_dir(root.join("rhchp")).unwrap().count(), 3);

        let mut contents: Vec<String> = fs::read_dir(root.join("anonymised"))
            .unwrap()
            .map(|entry| {
                let path = entry.unwrap().path();
                let name = path.file_name().unwrap().to_string_lossy().to_string();
                assert_eq!(name.len(), 12);
                assert!(name.ends_with(".CEL"));
                fs::read_to_string(path).unwrap()
            })
            .collect();
        contents.sort();
        assert_eq!(contents, vec!["normal-1", "normal-2"]);
    }

    #[test]
    fn sample_cited_by_original_rhchp_name_is_anonymised() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let write = |rel: &str, contents: &str| {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        };

        write("manifest.csv", "Specimen ID\n2128184\n");
        write("regions.bed", "1\t1000\t2000\tLoss\n");
        write(
            "report.txt",
            "File\tType\tState\tChromosome\tStart\tStop\n\
             2128184_SNP_1.rhchp\tGain\t3\t1\t1500\t1600\n",
        );
        write("input/2128184_SNP_1.rhchp", "rhchp");
        write("input/2128184_SNP_1._hg38CuRef.rhchp", "rhchp");
        write("archive/2128184_SNP_1_A01.CEL", "normal");

        let args = PrenatalArgs {
            specimens_path: root.join("manifest.csv"),
            input_dir: root.join("input"),
            output_dir: root.join("rhchp"),
            syndrome_regions_path: Some(root.join("regions.bed")),
            report_path: Some(root.join("report.txt")),
            syndrome_free_dir: Some(root.join("anonymised")),
            storage_roots: vec![StorageRoot::new("archive", root.join("archive"), 0)],
            io_timeout: None,
        };
        prenatal(args).unwrap();

        assert!(root.join("rhchp/2128184_SNP_1.rhchp").exists());
        assert!(root.join("rhchp/2128184_SNP_1._hg38CuRef.rhchp").exists());
        assert_eq!(fs::read_dir(root.join("anonymised")).unwrap().count(), 1);
    }

    #[test]
    fn malformed_region_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("manifest.csv"), "Specimen ID\n").unwrap();
        fs::write(root.join("regions.bed"), "1\t1000\tLoss\n").unwrap();
        fs::write(root.join("report.txt"), "File\n").unwrap();
        fs::create_dir(root.join("input")).unwrap();

        let args = PrenatalArgs {
            specimens_path: root.join("manifest.csv"),
            input_dir: root.join("input"),
            output_dir: root.join("rhchp"),
            syndrome_regions_path: Some(root.join("regions.bed")),
            report_path: Some(root.join("report.txt")),
            syndrome_free_dir: Some(root.join("anonymised")),
            storage_roots: vec![StorageRoot::new("archive", root.join("input"), 0)],
            io_timeout: None,
        };
        let result = prenatal(args);
        assert!(matches!(result, Err(crate::utils::Error::Parse { .. })));
    }
}
