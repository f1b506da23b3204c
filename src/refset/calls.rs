use crate::utils::{open_text_reader, parse_coordinate, Error, GenomicInterval, Result};
use std::{collections::HashMap, io::BufRead, path::Path};

const HEADER_SENTINEL: &str = "File";
const MIN_FIELD_COUNT: usize = 6;
const CALL_TYPE_LEN: usize = 4;

/// All calls for one sample token, in report order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleCalls {
    pub sample: String,
    pub calls: Vec<GenomicInterval>,
}

/// Calls per sample, ordered by first appearance in the report.
#[derive(Debug, Default)]
pub struct SampleCallSet {
    samples: Vec<SampleCalls>,
    index: HashMap<String, usize>,
}

impl SampleCallSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call, creating the sample's entry the first time it is seen.
    pub fn push(&mut self, sample: &str, call: GenomicInterval) {
        let slot = match self.index.get(sample) {
            Some(&slot) => slot,
            None => {
                self.samples.push(SampleCalls {
                    sample: sample.to_string(),
                    calls: Vec::new(),
                });
                self.index.insert(sample.to_string(), self.samples.len() - 1);
                self.samples.len() - 1
            }
        };
        self.samples[slot].calls.push(call);
    }

    pub fn get(&self, sample: &str) -> Option<&[GenomicInterval]> {
        self.index
            .get(sample)
            .map(|&slot| self.samples[slot].calls.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleCalls> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub fn load_call_report(path: &Path) -> Result<SampleCallSet> {
    let reader = open_text_reader(path)?;
    let call_set = calls_from_reader(reader, &path.display().to_string())?;
    log::info!(
        "Loaded calls for {} samples from {}",
        call_set.len(),
        path.display()
    );
    Ok(call_set)
}

pub fn calls_from_reader<R: BufRead>(reader: R, source_name: &str) -> Result<SampleCallSet> {
    let mut call_set = SampleCallSet::new();
    for (line_index, line) in reader.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line.map_err(|e| Error::parse(source_name, line_number, e.to_string()))?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields[0] == HEADER_SENTINEL {
            continue;
        }
        let (sample, call) =
            parse_call(&fields).map_err(|e| Error::parse(source_name, line_number, e))?;
        call_set.push(sample, call);
    }
    Ok(call_set)
}

fn parse_call<'a>(fields: &[&'a str]) -> std::result::Result<(&'a str, GenomicInterval), String> {
    if fields.len() < MIN_FIELD_COUNT {
        return Err(format!(
            "Expected at least {} tab-separated fields (file, type, state, chr, start, stop), found {}",
            MIN_FIELD_COUNT,
            fields.len()
        ));
    }
    let (sample, call_type, chrom, start, stop) =
        (fields[0], fields[1], fields[3], fields[4], fields[5]);
    if sample.is_empty() {
        return Err("Empty sample token".to_string());
    }
    let start = parse_coordinate(start, "start")?;
    let stop = parse_coordinate(stop, "stop")?;
    let call = GenomicInterval::new(chrom.trim(), start, stop, truncate_call_type(call_type))?;
    Ok((sample, call))
}

/// Report types are longer than region types ("LossHet" vs "Loss"), so only
/// the leading four characters take part in type matching.
fn truncate_call_type(call_type: &str) -> String {
    call_type.chars().take(CALL_TYPE_LEN).collect()
}
