use std::fmt;

/// Removes a leading `chr` so that `chr1` and `1` compare equal.
pub fn normalize_chromosome(chrom: &str) -> &str {
    chrom.strip_prefix("chr").unwrap_or(chrom)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicInterval {
    pub chrom: String,
    pub start: u64,
    pub stop: u64,
    pub call_type: String,
}

impl GenomicInterval {
    pub fn new(
        chrom: &str,
        start: u64,
        stop: u64,
        call_type: impl Into<String>,
    ) -> std::result::Result<Self, String> {
        if start > stop {
            return Err(format!("Invalid interval: start {} > stop {}", start, stop));
        }
        Ok(Self {
            chrom: normalize_chromosome(chrom).to_string(),
            start,
            stop,
            call_type: call_type.into(),
        })
    }

    /// Half-open overlap: intervals that only touch at a boundary do not overlap.
    pub fn overlaps(&self, other: &GenomicInterval) -> bool {
        self.chrom == other.chrom && self.start < other.stop && self.stop > other.start
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{} ({})",
            self.chrom, self.start, self.stop, self.call_type
        )
    }
}

pub(crate) fn parse_coordinate(field: &str, name: &str) -> std::result::Result<u64, String> {
    field
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("Invalid {} coordinate: '{}'", name, field))
}
