//! Sample capture module
//!
//! Provides lock-free pointer-sample transport and the two sampling loops
//! that feed a trial: the seeded pointer source and the gaze pump. Both
//! loops poll the trial's cancellation token so a closing window stops them
//! without blocking the capture path.

pub mod gaze_pump;
pub mod pointer_source;
pub mod ring_buffer;
pub mod types;

pub use gaze_pump::{
    extract_eye_centers, EyeDetector, FaceDetector, Frame, FrameSource, GazePump, ScriptedScene,
};
pub use pointer_source::{trajectory_point, SyntheticPointerSource};
pub use ring_buffer::{SampleConsumer, SampleProducer, SampleRingBuffer};
pub use types::{CancelToken, Point, PointerSample, Region};
