use serde::Serialize;
use std::path::PathBuf;

use crate::config::{DetectionConfig, RegionMode};
use crate::detection::DetectionPipeline;
use crate::error::{DetectionError, Result};
use crate::models::{BackgroundFrame, BoundingBox, EdgeMap, Frame, RegionSet};

/// Debug configuration for session execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// What a session reports for each processed frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame_index: u64,
    pub mode: RegionMode,
    pub regions: RegionSet,
    pub primary: Option<BoundingBox>,
}

/// A detection session bound to one background frame.
///
/// Frames are processed one at a time. New settings staged with
/// [`Session::update_config`] take effect when the next frame starts.
pub struct Session {
    background: BackgroundFrame,
    pipeline: DetectionPipeline,
    pending: Option<DetectionConfig>,
    frames_processed: u64,
    debug: Option<DebugConfig>,
}

impl Session {
    pub fn new(background: Frame, config: DetectionConfig) -> Result<Self> {
        let pipeline = DetectionPipeline::new(config)?;
        let (width, height) = background.dimensions();
        tracing::info!(width, height, "background frame captured");

        Ok(Self {
            background: BackgroundFrame::new(background),
            pipeline,
            pending: None,
            frames_processed: 0,
            debug: None,
        })
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(DetectionError::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        let background_dir = output_dir.join("00_background");
        std::fs::create_dir_all(&background_dir)?;
        self.background.as_frame().save(background_dir.join("01.png"))?;
        tracing::debug!("saved 00_background/01.png");

        self.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    pub fn background(&self) -> &BackgroundFrame {
        &self.background
    }

    /// Settings used by the most recent (or next, if none is staged) frame
    pub fn config(&self) -> &DetectionConfig {
        self.pipeline.config()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Validate and stage a new configuration snapshot for the next frame
    pub fn update_config(&mut self, config: DetectionConfig) -> Result<()> {
        config.validate()?;
        self.pending = Some(config);
        Ok(())
    }

    /// Run one detection pass.
    ///
    /// A frame that does not match the background's dimensions is a
    /// structural error; callers should end the session on it.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameReport> {
        if let Some(config) = self.pending.take() {
            tracing::info!(mode = %config.mode, "applying updated configuration");
            self.pipeline = DetectionPipeline::new(config)?;
        }

        let detection = self.pipeline.detect(frame, &self.background)?;
        let frame_index = self.frames_processed;
        self.frames_processed += 1;

        self.save_debug_edges(frame_index, &detection.edges)?;

        let selection = detection.selection;
        tracing::info!(
            frame = frame_index,
            mode = %selection.mode,
            regions = selection.regions.len(),
            "frame processed"
        );

        Ok(FrameReport {
            frame_index,
            mode: selection.mode,
            regions: selection.regions,
            primary: selection.primary,
        })
    }

    fn save_debug_edges(&self, frame_index: u64, edges: &EdgeMap) -> Result<()> {
        if let Some(debug_config) = &self.debug {
            let step_dir = debug_config.output_dir.join("01_edges");
            std::fs::create_dir_all(&step_dir)?;
            let filename = format!("{:04}.png", frame_index);
            edges.as_image().save(step_dir.join(&filename))?;
            tracing::debug!("saved 01_edges/{}", filename);
        }

        Ok(())
    }
}
