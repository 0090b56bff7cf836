use std::fs::File;
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::error::DetectError;
use super::extension::is_text_by_extension;
use super::heuristic::is_likely_text;
use super::mime::is_text_content_type;
use super::sniff::{detect_content_type, SNIFF_LEN};

/// MIME hint reported when the extension or the byte heuristic decides.
pub const TEXT_PLAIN: &str = "text/plain";

/// Which detection method produced a positive verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionStage {
    Extension,
    ContentType,
    ByteHeuristic,
}

/// Outcome of [`classify`].
///
/// `mime_hint` is meaningful when `is_text` is true; on a negative verdict
/// it still carries the sniffed type for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationVerdict {
    pub is_text: bool,
    pub mime_hint: &'static str,
    pub decided_by: Option<DetectionStage>,
}

impl ClassificationVerdict {
    fn text(mime_hint: &'static str, stage: DetectionStage) -> Self {
        Self {
            is_text: true,
            mime_hint,
            decided_by: Some(stage),
        }
    }

    fn not_text(mime_hint: &'static str) -> Self {
        Self {
            is_text: false,
            mime_hint,
            decided_by: None,
        }
    }
}

/// The leading bytes of a file, at most [`SNIFF_LEN`] of them.
pub struct ByteSample {
    buf: [u8; SNIFF_LEN],
    len: usize,
}

impl ByteSample {
    /// Reads until the buffer is full or the reader is exhausted.
    pub fn read_from<R: Read>(reader: R) -> io::Result<Self> {
        let mut buf = [0u8; SNIFF_LEN];
        let mut len = 0;
        let mut reader = reader.take(SNIFF_LEN as u64);
        loop {
            match reader.read(&mut buf[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(Self { buf, len })
    }
}

impl Deref for ByteSample {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// A content-based detection step: returns the MIME hint when it recognises
/// the sample as text.
type SampleProbe = fn(sample: &[u8], sniffed: &'static str) -> Option<&'static str>;

/// Content-based steps, cheapest and most precise first.
const SAMPLE_PROBES: &[(DetectionStage, SampleProbe)] = &[
    (DetectionStage::ContentType, probe_content_type),
    (DetectionStage::ByteHeuristic, probe_byte_heuristic),
];

fn probe_content_type(_sample: &[u8], sniffed: &'static str) -> Option<&'static str> {
    is_text_content_type(sniffed).then_some(sniffed)
}

fn probe_byte_heuristic(sample: &[u8], _sniffed: &'static str) -> Option<&'static str> {
    (!sample.is_empty() && is_likely_text(sample)).then_some(TEXT_PLAIN)
}

/// Decides whether a file is text.
///
/// The file name is checked first and the file is only opened when the
/// extension is inconclusive. A negative verdict is not an error.
pub fn classify(path: &Path) -> Result<ClassificationVerdict, DetectError> {
    if is_text_by_extension(path) {
        debug!("{} is text by extension", path.display());
        return Ok(ClassificationVerdict::text(TEXT_PLAIN, DetectionStage::Extension));
    }

    let file = File::open(path).map_err(DetectError::Open)?;
    let sample = ByteSample::read_from(file).map_err(DetectError::ReadSample)?;
    Ok(classify_sample(&sample))
}

/// Runs the content-based steps over an already-read sample.
pub fn classify_sample(sample: &[u8]) -> ClassificationVerdict {
    let sniffed = detect_content_type(sample);

    let verdict = SAMPLE_PROBES
        .iter()
        .find_map(|(stage, probe)| {
            probe(sample, sniffed).map(|mime| ClassificationVerdict::text(mime, *stage))
        })
        .unwrap_or_else(|| ClassificationVerdict::not_text(sniffed));

    debug!(
        "sample of {} bytes sniffed as {}: is_text={} decided_by={:?}",
        sample.len(),
        sniffed,
        verdict.is_text,
        verdict.decided_by
    );
    verdict
}
