//! Supervisor controller
//!
//! The supervisor replays a recorded accelerometer capture as if it were
//! felt by the robot:
//! - Each tick's sample is damped by the robot's distance to the vibration source
//! - Damped samples are framed (one per tick, or 24 per frame) and emitted
//! - A classification label may come back; one packet is drained per tick

pub mod attenuation;
pub mod batch;
pub mod dataset;
pub mod map;

pub use attenuation::{attenuation, AttenuationModel};
pub use batch::{decode_frame, format_sample, Batch, Frame, FrameError, BATCH_SIZE};
pub use dataset::{read_accelerometer_data, AccelerometerSample, Dataset};
pub use map::{MapConfig, MapError, VibrationMap, VibrationMapEntry};

use crate::host::{MessageSink, MessageSource, PositionSource, StepClock};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How samples are packed into outbound frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    /// One sample per frame, every tick
    Single,
    /// `batch_size` samples per frame
    #[default]
    Batched,
}

/// Supervisor parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Tab-separated accelerometer capture
    pub dataset_path: PathBuf,
    /// Vibration source on the ground plane
    pub source: [f64; 2],
    /// Frame packing
    pub frame_mode: FrameMode,
    /// Samples per batched frame
    pub batch_size: usize,
    /// Robot position used when no simulator is attached
    pub robot_position: [f64; 3],
    /// Ticks to run when no simulator is attached
    pub max_ticks: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        SupervisorConfig {
            dataset_path: PathBuf::from("data/capture1_60hz_30vol.txt"),
            source: [5.0, 5.0],
            frame_mode: FrameMode::Batched,
            batch_size: BATCH_SIZE,
            robot_position: [0.0, 0.0, 0.0],
            max_ticks: 1200,
        }
    }
}

/// Label returned by the robot's classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationLabel(pub i32);

impl ClassificationLabel {
    /// Decodes a native-endian `i32` packet. Short packets are rejected.
    pub fn from_packet(packet: &[u8]) -> Option<Self> {
        let bytes: [u8; 4] = packet.get(..4)?.try_into().ok()?;
        Some(ClassificationLabel(i32::from_ne_bytes(bytes)))
    }

    /// Encodes the label as the robot would send it
    pub fn to_packet(self) -> [u8; 4] {
        self.0.to_ne_bytes()
    }
}

/// What one supervisor tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A frame was handed to the emitter
    Sent(Frame),
    /// The sample was added to the pending batch
    Buffered,
    /// The row had fewer than three fields
    IncompleteRow,
    /// The emitter refused the frame; it is dropped
    Dropped,
    /// The capture has been fully replayed
    OutOfData,
}

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Host steps taken
    pub ticks: u64,
    /// Frames emitted
    pub frames_sent: u64,
    /// Frames the emitter refused
    pub frames_dropped: u64,
    /// Labels received
    pub labels_received: u64,
}

/// Supervisor controller context
pub struct Supervisor<P, E, R> {
    config: SupervisorConfig,
    dataset: Dataset,
    model: AttenuationModel,
    batch: Batch,
    tick: usize,
    robot: P,
    emitter: E,
    receiver: R,
    last_label: Option<ClassificationLabel>,
    labels_received: u64,
}

impl<P, E, R> Supervisor<P, E, R>
where
    P: PositionSource,
    E: MessageSink,
    R: MessageSource,
{
    /// Creates a supervisor replaying `dataset`
    pub fn new(config: SupervisorConfig, dataset: Dataset, robot: P, emitter: E, receiver: R) -> Self {
        let model = AttenuationModel::new(config.source);
        let batch = Batch::new(config.batch_size);
        Supervisor {
            config,
            dataset,
            model,
            batch,
            tick: 0,
            robot,
            emitter,
            receiver,
            last_label: None,
            labels_received: 0,
        }
    }

    /// Creates a supervisor, loading the capture named in `config`.
    /// An unreadable capture leaves the supervisor with no data.
    pub fn from_config(config: SupervisorConfig, robot: P, emitter: E, receiver: R) -> Self {
        let dataset = read_accelerometer_data(&config.dataset_path);
        Self::new(config, dataset, robot, emitter, receiver)
    }

    /// Next dataset row to replay
    pub fn tick_index(&self) -> usize {
        self.tick
    }

    /// Most recent label received
    pub fn last_label(&self) -> Option<ClassificationLabel> {
        self.last_label
    }

    /// Samples waiting for a full frame
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// The emitter, e.g. to inspect what was sent
    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    /// The receiver, e.g. to queue labels in tests
    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    /// Takes at most one packet off the receiver queue
    pub fn poll_label(&mut self) -> Option<ClassificationLabel> {
        if self.receiver.queue_length() == 0 {
            return None;
        }
        let label = self.receiver.data().and_then(|packet| {
            let label = ClassificationLabel::from_packet(&packet);
            if label.is_none() {
                warn!("ignoring {}-byte packet, expected a 4-byte label", packet.len());
            }
            label
        });
        self.receiver.next_packet();

        if let Some(label) = label {
            info!("received classification label {}", label.0);
            self.last_label = Some(label);
            self.labels_received += 1;
        }
        label
    }

    /// Runs one supervisor tick
    pub fn step(&mut self) -> TickOutcome {
        self.poll_label();

        if self.tick >= self.dataset.len() {
            info!("out of data");
            return TickOutcome::OutOfData;
        }
        let index = self.tick;
        self.tick += 1;

        let Some(sample) = self.dataset.sample(index) else {
            warn!("row {} has fewer than three values, skipping", index + 1);
            return TickOutcome::IncompleteRow;
        };
        let felt = self.model.attenuate(&sample, self.robot.position());

        let frame = match self.config.frame_mode {
            FrameMode::Single => Frame::single(&felt),
            FrameMode::Batched => match self.batch.push(&felt) {
                Some(frame) => frame,
                None => return TickOutcome::Buffered,
            },
        };

        match self.emitter.send(&frame.to_payload()) {
            Ok(()) => TickOutcome::Sent(frame),
            Err(e) => {
                error!("dropping frame of {} samples: {}", frame.sample_count(), e);
                TickOutcome::Dropped
            }
        }
    }

    /// Steps until the host stops the simulation
    pub fn run<C: StepClock + ?Sized>(&mut self, clock: &mut C, time_step_ms: u32) -> RunSummary {
        let mut summary = RunSummary::default();
        let labels_before = self.labels_received;
        while clock.step(time_step_ms) != -1 {
            let outcome = self.step();
            summary.ticks += 1;
            match outcome {
                TickOutcome::Sent(_) => summary.frames_sent += 1,
                TickOutcome::Dropped => summary.frames_dropped += 1,
                _ => {}
            }
        }
        summary.labels_received = self.labels_received - labels_before;
        info!(
            "supervisor stopped after {} ticks: {} frames sent, {} dropped",
            summary.ticks, summary.frames_sent, summary.frames_dropped
        );
        summary
    }
}
