// src/supervisor/batch.rs
// Text framing for attenuated samples: "x,y,z" triples, batches joined by ';',
// sent NUL-terminated.

use super::dataset::AccelerometerSample;
use nalgebra::Vector3;

/// Samples per batched frame
pub const BATCH_SIZE: usize = 24;

const SAMPLE_DELIMITER: &str = ";";
const AXIS_DELIMITER: &str = ",";

/// Renders a sample as a comma-joined decimal triple
pub fn format_sample(sample: &AccelerometerSample) -> String {
    format!(
        "{:.6}{d}{:.6}{d}{:.6}",
        sample.x,
        sample.y,
        sample.z,
        d = AXIS_DELIMITER
    )
}

/// One outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    text: String,
    samples: usize,
}

impl Frame {
    /// Frame carrying a single sample
    pub fn single(sample: &AccelerometerSample) -> Self {
        Frame {
            text: format_sample(sample),
            samples: 1,
        }
    }

    fn from_triples(triples: &[String]) -> Self {
        Frame {
            text: triples.join(SAMPLE_DELIMITER),
            samples: triples.len(),
        }
    }

    /// Frame text without terminator
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of samples in the frame
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Bytes handed to the emitter, NUL-terminated
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.text.len() + 1);
        payload.extend_from_slice(self.text.as_bytes());
        payload.push(0);
        payload
    }
}

/// Pending samples awaiting a full frame
#[derive(Debug, Clone)]
pub struct Batch {
    pending: Vec<String>,
    capacity: usize,
}

impl Batch {
    /// Batch that flushes every `capacity` samples (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Batch {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds a sample. Returns the frame once `capacity` samples are pending;
    /// the batch is empty again afterwards.
    pub fn push(&mut self, sample: &AccelerometerSample) -> Option<Frame> {
        self.pending.push(format_sample(sample));
        if self.pending.len() < self.capacity {
            return None;
        }
        let frame = Frame::from_triples(&self.pending);
        self.pending.clear();
        Some(frame)
    }

    /// Samples waiting
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Samples per frame
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Batch {
    fn default() -> Self {
        Batch::new(BATCH_SIZE)
    }
}

/// Errors decoding an inbound frame
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FrameError {
    /// Payload was not UTF-8 text
    #[error("frame is not valid text")]
    NotText,
    /// Nothing left after stripping terminators
    #[error("empty frame")]
    Empty,
    /// A sample did not have exactly three axes
    #[error("sample {index} has {axes} axes, expected 3")]
    WrongAxisCount {
        /// Position of the sample in the frame
        index: usize,
        /// Axes found
        axes: usize,
    },
    /// An axis value was not a number
    #[error("sample {index}: invalid number {value:?}")]
    InvalidNumber {
        /// Position of the sample in the frame
        index: usize,
        /// Offending text
        value: String,
    },
}

/// Decodes a received payload back into samples.
///
/// Accepts both single-sample and batched frames; trailing NULs and
/// surrounding whitespace are ignored.
pub fn decode_frame(payload: &[u8]) -> Result<Vec<AccelerometerSample>, FrameError> {
    let text = std::str::from_utf8(payload).map_err(|_| FrameError::NotText)?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if text.is_empty() {
        return Err(FrameError::Empty);
    }

    text.split(SAMPLE_DELIMITER)
        .enumerate()
        .map(|(index, triple)| -> Result<AccelerometerSample, FrameError> {
            let axes = triple
                .split(AXIS_DELIMITER)
                .map(|value| {
                    value.trim().parse::<f64>().map_err(|_| FrameError::InvalidNumber {
                        index,
                        value: value.to_string(),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            match axes.as_slice() {
                [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
                _ => Err(FrameError::WrongAxisCount {
                    index,
                    axes: axes.len(),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_six_decimals() {
        assert_eq!(format_sample(&Vector3::new(1.0, -0.5, 0.125)), "1.000000,-0.500000,0.125000");
    }

    #[test]
    fn twenty_four_samples_make_one_frame() {
        let mut batch = Batch::default();
        for i in 0..BATCH_SIZE - 1 {
            assert!(batch.push(&Vector3::new(i as f64, 0.0, 0.0)).is_none());
        }
        assert_eq!(batch.len(), BATCH_SIZE - 1);

        let frame = batch.push(&Vector3::new(99.0, 0.0, 0.0)).expect("frame on 24th sample");
        assert!(batch.is_empty());
        assert_eq!(frame.sample_count(), BATCH_SIZE);
        assert_eq!(frame.as_str().split(';').count(), BATCH_SIZE);
        assert!(frame.as_str().split(';').all(|t| t.split(',').count() == 3));
    }

    #[test]
    fn payload_is_nul_terminated() {
        let payload = Frame::single(&Vector3::new(1.0, 2.0, 3.0)).to_payload();
        assert_eq!(payload.last(), Some(&0));
        assert_eq!(&payload[..payload.len() - 1], b"1.000000,2.000000,3.000000");
    }

    #[test]
    fn decode_accepts_terminated_batch() {
        let samples = decode_frame(b"1,2,3;4.5,-5,6\0").unwrap();
        assert_eq!(samples, vec![Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.5, -5.0, 6.0)]);
    }

    #[test]
    fn decode_reports_bad_input() {
        assert_eq!(decode_frame(b"\0\0"), Err(FrameError::Empty));
        assert_eq!(
            decode_frame(b"1,2"),
            Err(FrameError::WrongAxisCount { index: 0, axes: 2 })
        );
        assert!(matches!(
            decode_frame(b"1,2,3;a,b,c"),
            Err(FrameError::InvalidNumber { index: 1, .. })
        ));
        assert_eq!(decode_frame(&[0xff, 0xfe]), Err(FrameError::NotText));
    }
}
