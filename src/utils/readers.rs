use super::{Error, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read as ioRead};
use std::path::Path;

/// Opens a tab-delimited input, transparently decompressing `.gz`/`.gzip` files.
pub fn open_text_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::InvalidData, "invalid gzip header"),
            ))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::{BufRead, Write};

    #[test]
    fn reads_plain_and_gzipped_files() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("regions.bed");
        std::fs::write(&plain, "1\t10\t20\tLoss\n").unwrap();

        let gzipped = dir.path().join("regions.bed.gz");
        let mut encoder = GzEncoder::new(File::create(&gzipped).unwrap(), Compression::default());
        encoder.write_all(b"1\t10\t20\tLoss\n").unwrap();
        encoder.finish().unwrap();

        for path in [&plain, &gzipped] {
            let lines: Vec<String> = open_text_reader(path)
                .unwrap()
                .lines()
                .map(|l| l.unwrap())
                .collect();
            assert_eq!(lines, vec!["1\t10\t20\tLoss".to_string()]);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_text_reader(&dir.path().join("absent.tsv"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
