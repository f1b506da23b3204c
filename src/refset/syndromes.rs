use crate::utils::{open_text_reader, parse_coordinate, Error, GenomicInterval, Result};
use std::{io::BufRead, path::Path};

/// A clinically significant interval; calls overlapping one disqualify a sample.
pub type SyndromeRegion = GenomicInterval;

const EXPECTED_FIELD_COUNT: usize = 4;

pub fn load_syndrome_regions(path: &Path) -> Result<Vec<SyndromeRegion>> {
    let reader = open_text_reader(path)?;
    let regions = regions_from_reader(reader, &path.display().to_string())?;
    log::info!(
        "Loaded {} syndrome regions from {}",
        regions.len(),
        path.display()
    );
    Ok(regions)
}

pub fn regions_from_reader<R: BufRead>(reader: R, source_name: &str) -> Result<Vec<SyndromeRegion>> {
    let mut regions = Vec::new();
    let mut seen_row = false;

    for (line_index, line) in reader.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line.map_err(|e| Error::parse(source_name, line_number, e.to_string()))?;
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if !seen_row {
            seen_row = true;
            if is_header(line) {
                continue;
            }
        }
        let region = parse_region(line).map_err(|e| Error::parse(source_name, line_number, e))?;
        regions.push(region);
    }
    Ok(regions)
}

fn is_header(line: &str) -> bool {
    line.contains("start") || line.contains("stop")
}

fn parse_region(line: &str) -> std::result::Result<SyndromeRegion, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    let (chrom, start, stop, call_type) = match &fields[..] {
        [chrom, start, stop, call_type] => (*chrom, *start, *stop, *call_type),
        _ => {
            return Err(format!(
                "Expected {} tab-separated fields in the format 'chr start stop type', found {}",
                EXPECTED_FIELD_COUNT,
                fields.len()
            ))
        }
    };
    let start = parse_coordinate(start, "start")?;
    let stop = parse_coordinate(stop, "stop")?;
    GenomicInterval::new(chrom.trim(), start, stop, call_type.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_rows_and_skips_header() {
        let data = "chr\tstart\tstop\ttype\nchr1\t1000\t2000\tLoss\n22\t5\t10\tGain\n";
        let regions = regions_from_reader(Cursor::new(data), "regions.bed").unwrap();
        assert_eq!(
            regions,
            vec![
                GenomicInterval::new("1", 1000, 2000, "Loss").unwrap(),
                GenomicInterval::new("22", 5, 10, "Gain").unwrap(),
            ]
        );
    }

    #[test]
    fn headerless_file_keeps_first_row() {
        let data = "chrX\t1\t2\tLoss\r\n\nchrY\t3\t4\tGain\r\n";
        let regions = regions_from_reader(Cursor::new(data), "regions.bed").unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].chrom, "X");
        assert_eq!(regions[1].call_type, "Gain");
    }

    #[test]
    fn only_first_row_can_be_header() {
        let data = "1\t1\t2\tLoss\nchr\tstart\tstop\ttype\n";
        let err = regions_from_reader(Cursor::new(data), "regions.bed").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        let data = "1\t1000\t2000\tLoss\t\n2\t5\t10\tGain  \r\n";
        let regions = regions_from_reader(Cursor::new(data), "regions.bed").unwrap();
        assert_eq!(regions[0], GenomicInterval::new("1", 1000, 2000, "Loss").unwrap());
        assert_eq!(regions[1].call_type, "Gain");
    }

    #[test]
    fn wrong_field_count_err() {
        let data = "1\t1000\t2000\n";
        let err = regions_from_reader(Cursor::new(data), "regions.bed").unwrap_err();
        match err {
            Error::Parse {
                source_name,
                line,
                message,
            } => {
                assert_eq!(source_name, "regions.bed");
                assert_eq!(line, 1);
                assert!(message.contains("found 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_coordinate_err() {
        let data = "1\t1000\tabc\tLoss\n";
        let result = regions_from_reader(Cursor::new(data), "regions.bed");
        assert!(matches!(result, Err(Error::Parse { line: 1, .. })));
    }

    #[test]
    fn inverted_region_err() {
        let data = "1\t2000\t1000\tLoss\n";
        let result = regions_from_reader(Cursor::new(data), "regions.bed");
        assert!(matches!(result, Err(Error::Parse { line: 1, .. })));
    }
}
