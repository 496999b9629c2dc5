//! # Transform Pipeline
//!
//! The per-frame driver that sits between the pure math in [`crate::transform`] and
//! [`crate::camera`] and the GPU. Each call to [`TransformPipeline::frame`]:
//!
//! 1. uploads the camera matrices if they are pending (startup, resize);
//! 2. in [`PipelineMode::Animated`], advances the [`AnimationState`] by the time since the
//!    previous frame and uploads the new model matrix;
//! 3. in [`PipelineMode::StaticCamera`], uploads the model matrix only if it is pending;
//! 4. issues one indexed draw over the whole cube;
//! 5. remembers the frame timestamp for the next delta.
//!
//! The GPU side is reached only through the [`FrameSink`] trait, so the whole schedule of
//! uploads can be checked with a recording sink in tests.
//!
//! ## Variants
//!
//! Both variants are configurations of the same pipeline. The static variant hoists the model
//! upload out of the frame loop because its source values never change. Switching back to
//! the animated variant at runtime puts the model upload back on every frame; switching to
//! the static variant resets the animation to its initial state and uploads it once.

use nalgebra_glm as glm;

use crate::camera::Camera;
use crate::config::Config;
use crate::geometry::INDEX_COUNT;
use crate::transform::{time_delta, AnimationState};

/// Receiver of the uploads and draw produced by one frame.
pub trait FrameSink {
    /// Sets the model-matrix uniform.
    fn submit_model(&mut self, model: &glm::Mat4);

    /// Sets the view- and projection-matrix uniforms.
    fn submit_camera(&mut self, view: &glm::Mat4, projection: &glm::Mat4);

    /// Clears color and depth and draws `index_count` indices as a triangle list.
    fn draw_indexed(&mut self, index_count: u32);
}

/// Which variant of the pipeline runs.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum PipelineMode {
    /// The cube rotates about z; the model matrix is rebuilt and uploaded every frame.
    #[default]
    Animated,
    /// Nothing moves; every uniform is uploaded once and frames only clear and draw.
    StaticCamera,
}

impl PipelineMode {
    pub fn label(self) -> &'static str {
        match self {
            PipelineMode::Animated => "animated",
            PipelineMode::StaticCamera => "static camera",
        }
    }
}

/// Summary of the last frame, for the overlay.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FrameStats {
    /// Seconds since the previous frame.
    pub delta_seconds: f32,
    /// Rotation angle used for the frame, in degrees.
    pub rotation: f32,
    /// Whether the model matrix was uploaded during the frame.
    pub model_uploaded: bool,
    /// Frames drawn so far, this one included.
    pub frames_drawn: u64,
}

pub struct TransformPipeline {
    mode: PipelineMode,
    rotation_speed: f32,
    initial_state: AnimationState,
    state: AnimationState,
    camera: Camera,
    aspect_ratio: f32,
    previous_ms: f64,
    camera_pending: bool,
    model_pending: bool,
    frames_drawn: u64,
}

impl TransformPipeline {
    pub fn new(config: &Config, aspect_ratio: f32) -> Self {
        let initial_state = config.initial_state();
        Self {
            mode: config.mode,
            rotation_speed: config.rotation_speed,
            initial_state,
            state: initial_state,
            camera: config.camera,
            aspect_ratio,
            previous_ms: 0.0,
            camera_pending: true,
            model_pending: true,
            frames_drawn: 0,
        }
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Switches variant. Takes effect on the next frame.
    pub fn set_mode(&mut self, mode: PipelineMode) {
        if mode == self.mode {
            return;
        }
        log::info!("Switching transform pipeline to {} mode", mode.label());
        if mode == PipelineMode::StaticCamera {
            self.state = self.initial_state;
            self.model_pending = true;
        }
        self.mode = mode;
    }

    /// Records a new surface aspect ratio; the projection is re-uploaded on the next frame.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio != self.aspect_ratio {
            self.aspect_ratio = aspect_ratio;
            self.camera_pending = true;
        }
    }

    /// Uploads every pending uniform without drawing.
    ///
    /// Called once before the first frame so the static variant has nothing left to upload
    /// inside the loop.
    pub fn prime<S: FrameSink>(&mut self, sink: &mut S) {
        self.upload_camera_if_pending(sink);
        if self.model_pending {
            sink.submit_model(&self.state.model_matrix());
            self.model_pending = false;
        }
    }

    /// Runs one frame stamped `now_ms` milliseconds after the clock origin.
    pub fn frame<S: FrameSink>(&mut self, now_ms: f64, sink: &mut S) -> FrameStats {
        let delta_seconds = time_delta(self.previous_ms, now_ms);
        self.upload_camera_if_pending(sink);

        let model_uploaded = match self.mode {
            PipelineMode::Animated => {
                self.state = self.state.advance(delta_seconds, self.rotation_speed);
                sink.submit_model(&self.state.model_matrix());
                true
            }
            PipelineMode::StaticCamera if self.model_pending => {
                sink.submit_model(&self.state.model_matrix());
                true
            }
            PipelineMode::StaticCamera => false,
        };
        self.model_pending = false;

        sink.draw_indexed(INDEX_COUNT);
        self.previous_ms = now_ms;
        self.frames_drawn = self.frames_drawn.wrapping_add(1);

        FrameStats {
            delta_seconds,
            rotation: self.state.rotation,
            model_uploaded,
            frames_drawn: self.frames_drawn,
        }
    }

    fn upload_camera_if_pending<S: FrameSink>(&mut self, sink: &mut S) {
        if self.camera_pending {
            sink.submit_camera(
                &self.camera.view_matrix(),
                &self.camera.projection_matrix(self.aspect_ratio),
            );
            self.camera_pending = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Model(glm::Mat4),
        Camera,
        Draw(u32),
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<Call>,
    }

    impl RecordingSink {
        fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|call| predicate(call)).count()
        }

        fn models(&self) -> usize {
            self.count(|call| matches!(call, Call::Model(_)))
        }

        fn cameras(&self) -> usize {
            self.count(|call| matches!(call, Call::Camera))
        }

        fn draws(&self) -> usize {
            self.count(|call| matches!(call, Call::Draw(36)))
        }
    }

    impl FrameSink for RecordingSink {
        fn submit_model(&mut self, model: &glm::Mat4) {
            self.calls.push(Call::Model(*model));
        }

        fn submit_camera(&mut self, _view: &glm::Mat4, _projection: &glm::Mat4) {
            self.calls.push(Call::Camera);
        }

        fn draw_indexed(&mut self, index_count: u32) {
            self.calls.push(Call::Draw(index_count));
        }
    }

    fn pipeline(mode: PipelineMode) -> TransformPipeline {
        let config = Config {
            mode,
            ..Config::default()
        };
        TransformPipeline::new(&config, 4.0 / 3.0)
    }

    #[test]
    fn animated_first_frame_uses_whole_timestamp() {
        let mut pipeline = pipeline(PipelineMode::Animated);
        let mut sink = RecordingSink::default();

        let stats = pipeline.frame(1000.0, &mut sink);
        assert!((stats.delta_seconds - 1.0).abs() < 1e-6);
        assert!((stats.rotation - 20.0).abs() < 1e-4);
        assert_eq!(sink.calls.first(), Some(&Call::Camera));
        assert_eq!(sink.calls.last(), Some(&Call::Draw(36)));
    }

    #[test]
    fn animated_uploads_model_every_frame() {
        let mut pipeline = pipeline(PipelineMode::Animated);
        let mut sink = RecordingSink::default();

        for frame in 1..=10 {
            pipeline.frame(frame as f64 * 16.0, &mut sink);
        }
        assert_eq!(sink.models(), 10);
        assert_eq!(sink.cameras(), 1);
        assert_eq!(sink.draws(), 10);
        assert!((pipeline.state().rotation - 0.16 * 20.0).abs() < 1e-3);
    }

    #[test]
    fn animated_model_follows_rotation() {
        let mut pipeline = pipeline(PipelineMode::Animated);
        let mut sink = RecordingSink::default();
        pipeline.frame(4500.0, &mut sink);

        let expected = pipeline.state().model_matrix();
        let uploaded = sink.calls.iter().find_map(|call| match call {
            Call::Model(model) => Some(*model),
            _ => None,
        });
        assert_eq!(uploaded, Some(expected));
        assert!((pipeline.state().rotation - 90.0).abs() < 1e-3);
    }

    #[test]
    fn static_camera_hoists_all_uploads() {
        let mut pipeline = pipeline(PipelineMode::StaticCamera);
        let mut sink = RecordingSink::default();
        pipeline.prime(&mut sink);
        assert_eq!(sink.calls.len(), 2);

        for frame in 1..=100 {
            let stats = pipeline.frame(frame as f64 * 16.0, &mut sink);
            assert!(!stats.model_uploaded);
            assert_eq!(stats.rotation, 0.0);
        }
        assert_eq!(sink.models(), 1);
        assert_eq!(sink.cameras(), 1);
        assert_eq!(sink.draws(), 100);
    }

    #[test]
    fn resize_reuploads_camera_once() {
        let mut pipeline = pipeline(PipelineMode::StaticCamera);
        let mut sink = RecordingSink::default();
        pipeline.prime(&mut sink);

        pipeline.set_aspect_ratio(2.0);
        pipeline.frame(16.0, &mut sink);
        pipeline.frame(32.0, &mut sink);
        pipeline.set_aspect_ratio(2.0);
        pipeline.frame(48.0, &mut sink);

        assert_eq!(sink.cameras(), 2);
        assert_eq!(sink.models(), 1);
    }

    #[test]
    fn switching_to_static_resets_and_uploads_once() {
        let mut pipeline = pipeline(PipelineMode::Animated);
        let mut sink = RecordingSink::default();
        pipeline.frame(2000.0, &mut sink);
        assert!(pipeline.state().rotation > 0.0);

        pipeline.set_mode(PipelineMode::StaticCamera);
        let stats = pipeline.frame(2016.0, &mut sink);
        assert!(stats.model_uploaded);
        assert_eq!(stats.rotation, 0.0);

        let stats = pipeline.frame(2032.0, &mut sink);
        assert!(!stats.model_uploaded);
        assert_eq!(sink.models(), 2);
    }

    #[test]
    fn switching_back_to_animated_resumes_per_frame_uploads() {
        let mut pipeline = pipeline(PipelineMode::StaticCamera);
        let mut sink = RecordingSink::default();
        pipeline.prime(&mut sink);
        pipeline.frame(1000.0, &mut sink);

        pipeline.set_mode(PipelineMode::Animated);
        let stats = pipeline.frame(1500.0, &mut sink);
        assert!(stats.model_uploaded);
        // Measured from the last drawn frame, not from the clock origin.
        assert!((stats.rotation - 10.0).abs() < 1e-4);
        pipeline.frame(1516.0, &mut sink);
        assert_eq!(sink.models(), 3);
    }

    #[test]
    fn frame_count_tracks_drawn_frames_only() {
        let mut pipeline = pipeline(PipelineMode::Animated);
        let mut sink = RecordingSink::default();
        pipeline.prime(&mut sink);
        assert_eq!(sink.draws(), 0);

        let mut last = FrameStats::default();
        for frame in 1..=5 {
            last = pipeline.frame(frame as f64 * 16.0, &mut sink);
        }
        assert_eq!(last.frames_drawn, 5);
        assert_eq!(last.frames_drawn, sink.draws() as u64);

        pipeline.set_mode(PipelineMode::StaticCamera);
        let stats = pipeline.frame(96.0, &mut sink);
        assert_eq!(stats.frames_drawn, 6);
    }

    #[test]
    fn mode_labels() {
        assert_eq!(PipelineMode::default(), PipelineMode::Animated);
        assert_eq!(PipelineMode::StaticCamera.label(), "static camera");
    }
}
