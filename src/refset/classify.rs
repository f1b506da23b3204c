use super::{SampleCalls, SyndromeRegion};
use crate::utils::GenomicInterval;

/// True when any call overlaps a region of the same type.
pub fn is_excluded(calls: &[GenomicInterval], regions: &[SyndromeRegion]) -> bool {
    calls.iter().any(|call| find_overlap(call, regions).is_some())
}

pub fn find_overlap<'a>(
    call: &GenomicInterval,
    regions: &'a [SyndromeRegion],
) -> Option<&'a SyndromeRegion> {
    regions
        .iter()
        .find(|region| region.call_type == call.call_type && call.overlaps(region))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub sample: String,
    pub excluded: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassificationSummary {
    pub excluded: usize,
    pub retained: usize,
}

pub fn classify_samples<'a>(
    samples: impl IntoIterator<Item = &'a SampleCalls>,
    regions: &[SyndromeRegion],
) -> (Vec<Classification>, ClassificationSummary) {
    let mut summary = ClassificationSummary::default();
    let classifications = samples
        .into_iter()
        .map(|sample_calls| {
            let excluded = is_excluded(&sample_calls.calls, regions);
            if excluded {
                summary.excluded += 1;
            } else {
                summary.retained += 1;
            }
            Classification {
                sample: sample_calls.sample.clone(),
                excluded,
            }
        })
        .collect();
    (classifications, summary)
}
