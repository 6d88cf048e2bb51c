use std::path::PathBuf;

use super::config::RunConfig;
use crate::annotator::{AnnotationClient, Annotator};
use crate::decoder::{FrameSampler, FrameSource, OpenCvSource, VideoInfo};
use crate::error::{PipelineError, PipelineResult};
use crate::output::{Row, TableWriter};
use crate::shared::constants;
use crate::utils::logger;
use crate::utils::time_utils::{format_timestamp, Timer};

/// `Idle -> Sampling -> (Annotating -> Writing)* -> Done`, or `Failed` from any live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Sampling,
    Annotating,
    Writing,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFrame {
    pub timestamp: f64,
    pub reason: String,
    /// Model output that could not be read as an annotation, kept for the summary.
    pub raw_reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub sampled: u64,
    pub annotated: u64,
    pub skipped: Vec<SkippedFrame>,
    pub output: PathBuf,
}

/// Drives frames from a sampler through an annotator into a writer, strictly in order.
///
/// Per-frame failures (decode, transport, parse) are reported and the frame is skipped;
/// anything fatal stops the run with whatever rows were already flushed.
pub struct Pipeline<A: Annotator> {
    annotator: A,
    state: RunState,
}

impl<A: Annotator> Pipeline<A> {
    pub fn new(annotator: A) -> Self {
        Self {
            annotator,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        logger::debug(&format!("state {:?} -> {:?}", self.state, next));
        self.state = next;
    }

    fn fail(&mut self, error: PipelineError) -> PipelineError {
        logger::error(&error.to_string());
        self.transition(RunState::Failed);
        error
    }

    pub fn run<S: FrameSource>(
        &mut self,
        sampler: FrameSampler<S>,
        mut writer: TableWriter,
    ) -> PipelineResult<RunSummary> {
        self.transition(RunState::Sampling);

        let total = sampler.total();
        let run_timer = Timer::new();
        let mut sampled = 0u64;
        let mut skipped = Vec::new();

        for (index, item) in sampler.enumerate() {
            let position = index as u64 + 1;

            let frame = match item {
                Ok(frame) => frame,
                Err(e) if !e.is_fatal() => {
                    let timestamp = match &e {
                        PipelineError::MediaRead { timestamp, .. } => *timestamp,
                        _ => f64::NAN,
                    };
                    skipped.push(report_skip(position, total, timestamp, &e));
                    continue;
                }
                Err(e) => return Err(self.fail(e)),
            };
            sampled += 1;

            self.transition(RunState::Annotating);
            let frame_timer = Timer::new();
            let annotation = match self.annotator.annotate(&frame.image) {
                Ok(annotation) => annotation,
                Err(e) if !e.is_fatal() => {
                    skipped.push(report_skip(position, total, frame.timestamp, &e));
                    self.transition(RunState::Sampling);
                    continue;
                }
                Err(e) => return Err(self.fail(e)),
            };
            logger::debug(&format!(
                "Frame {}s annotated in {} ms",
                format_timestamp(frame.timestamp),
                frame_timer.elapsed_ms()
            ));

            self.transition(RunState::Writing);
            let row = Row::from_annotation(frame.timestamp, &annotation);
            if let Err(e) = writer.append(&row) {
                return Err(self.fail(e));
            }
            logger::debug(&format!("Row {} written", writer.rows_written()));
            println!(
                "  [{}/{}] ✅ {}s  {}: {}",
                position,
                total,
                format_timestamp(frame.timestamp),
                row.title,
                row.caption
            );

            self.transition(RunState::Sampling);
        }

        let output = writer.path().to_path_buf();
        let annotated = match writer.finalize() {
            Ok(rows) => rows,
            Err(e) => return Err(self.fail(e)),
        };
        self.transition(RunState::Done);

        logger::info(&format!(
            "Run finished in {:.1}s: {} annotated, {} skipped, {} boundaries",
            run_timer.elapsed().as_secs_f64(),
            annotated,
            skipped.len(),
            total
        ));

        Ok(RunSummary {
            sampled,
            annotated,
            skipped,
            output,
        })
    }
}

fn report_skip(position: u64, total: u64, timestamp: f64, error: &PipelineError) -> SkippedFrame {
    eprintln!(
        "  [{}/{}] ⚠️  {}s skipped: {}",
        position,
        total,
        format_timestamp(timestamp),
        error
    );
    logger::warn(&format!("Skipped frame at {}s: {}", format_timestamp(timestamp), error));
    let raw_reply = match error {
        PipelineError::AnnotationParse { raw, .. } => {
            logger::warn(&format!("Raw model reply:\n{}", raw));
            Some(raw.clone())
        }
        _ => None,
    };

    SkippedFrame {
        timestamp,
        reason: error.to_string(),
        raw_reply,
    }
}

fn print_banner(info: &VideoInfo, config: &RunConfig, total: u64) {
    println!("🎬 Video Info:");
    println!("  - Path: {}", info.path);
    println!("  - FPS: {:.2}", info.fps);
    println!("  - Duration: {:.2}s", info.duration_secs());
    println!("  - Frame size: {}x{}", info.width, info.height);
    println!(
        "🔍 Analyzing one frame every {}s with '{}' ({} frames).",
        format_timestamp(config.interval),
        config.model,
        total
    );
}

/// Full run from a validated config: check the server, open the video, then stream rows.
pub fn run(config: &RunConfig) -> PipelineResult<RunSummary> {
    config.validate()?;

    let client = AnnotationClient::new(config.annotator_config())?;
    if config.health_check {
        client.health_check()?;
        logger::info(&format!("Server reachable at {}", config.api_url));
    }

    let source = OpenCvSource::open(&config.video, config.max_dimension)?;
    let info = source.info().clone();
    let sampler = FrameSampler::new(source, config.interval);
    print_banner(&info, config, sampler.total());

    let output = config.output_path();
    let writer = TableWriter::create(&output)?;
    logger::info(&format!("Writing rows to {}", output.display()));

    Pipeline::new(client).run(sampler, writer)
}

pub fn print_summary(summary: &RunSummary) {
    if summary.annotated == 0 {
        println!(
            "\nNo annotations were generated; {} contains only the header.",
            summary.output.display()
        );
    } else {
        println!(
            "\n✨ Analysis complete! {}/{} frame(s) annotated. Results saved to: {}",
            summary.annotated,
            summary.sampled,
            summary.output.display()
        );
    }

    if !summary.skipped.is_empty() {
        eprintln!("⚠️  {} frame(s) skipped:", summary.skipped.len());
        for skip in &summary.skipped {
            eprintln!("  - {}s: {}", format_timestamp(skip.timestamp), skip.reason);
            if skip.raw_reply.is_some() {
                eprintln!("    (raw reply saved to {})", constants::DEBUG_LOG_FILE);
            }
        }
    }
}
