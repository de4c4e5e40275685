//! Headless commands: run the simulation without a terminal UI, and print
//! the stage blueprint.
//!
//! Output goes to stdout, either as colored text or as one JSON object per
//! line (the serialized `Event`s, ending with a final `snapshot` event).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use colored::Colorize;
use gta_core::engine::SimulationEngine;
use gta_core::state::initial_stages;
use gta_protocol::config_models::SimulationConfig;
use gta_protocol::ipc::{Event, Op, PipelineSnapshot};
use gta_protocol::stage_models::{Stage, StageStatus};
use gta_tui::event_handler::handle_core_event;
use tokio::sync::broadcast::error::RecvError;

/// How headless output is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Start a run and print every event until the pipeline finishes or the
/// user interrupts it.
///
/// Returns the final state of the pipeline.
pub async fn run_headless(
    config: &SimulationConfig,
    format: OutputFormat,
) -> Result<PipelineSnapshot> {
    let engine = SimulationEngine::from_config(config).spawn();
    let mut events = engine.subscribe();
    let mut mirror = engine.snapshot().await.map_err(|e| eyre!(e))?;

    engine.send(Op::Start).map_err(|e| eyre!(e))?;

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    let finished = ends_run(&event);
                    handle_core_event(&mut mirror, event.clone());
                    emit(format, &mirror, &event)?;
                    if finished {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // The snapshot lands in this same stream and replaces the mirror
                    tracing::warn!(skipped, "headless printer lagged, requesting snapshot");
                    engine.send(Op::GetSnapshot).map_err(|e| eyre!(e))?;
                }
                Err(RecvError::Closed) => {
                    return Err(eyre!("simulation engine stopped before the pipeline finished"));
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, pausing run");
                engine.send(Op::Pause).map_err(|e| eyre!(e))?;
                break;
            }
        }
    }

    let snapshot = engine.snapshot().await.map_err(|e| eyre!(e))?;
    engine.shutdown().await.map_err(|e| eyre!(e))?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&Event::Snapshot {
                snapshot: snapshot.clone()
            })?
        ),
        OutputFormat::Text => println!("{}", format_summary(&snapshot)),
    }

    Ok(snapshot)
}

/// Whether `event` shows the run is over.
///
/// A lagged receiver may never see `PipelineFinished`, only the snapshot it
/// asked for afterwards, so a snapshot of a finished pipeline ends it too.
/// The engine sends `RunStateChanged` ahead of `PipelineFinished`; that one
/// does not end the loop, or the finish event would go unprinted.
fn ends_run(event: &Event) -> bool {
    match event {
        Event::PipelineFinished { .. } => true,
        Event::Snapshot { snapshot } => !snapshot.running && snapshot.all_completed(),
        _ => false,
    }
}

fn emit(format: OutputFormat, mirror: &PipelineSnapshot, event: &Event) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(event)?),
        OutputFormat::Text => {
            if let Some(line) = format_event(mirror, event) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// One human-readable line for `event`, or `None` for events that only
/// matter to the UI.
pub fn format_event(mirror: &PipelineSnapshot, event: &Event) -> Option<String> {
    let name = |id| mirror.stage(id).map_or("?", |s: &Stage| s.name.as_str()).to_string();

    match event {
        Event::RunStarted { run_id, .. } => {
            Some(format!("▶ Run {run_id} started").bold().to_string())
        }
        Event::StageStatusUpdate {
            stage_id,
            status: StageStatus::Processing,
            ..
        } => Some(format!(
            "[{stage_id}] {} {}",
            name(*stage_id).bold(),
            "processing".yellow()
        )),
        Event::StageLogChunk { content, .. } => {
            Some(format!("    $ {content}").dimmed().to_string())
        }
        Event::StageCompleted { stage_id, output } => Some(format!(
            "[{stage_id}] {} {} {}",
            name(*stage_id).bold(),
            "✔".green(),
            output
        )),
        Event::PipelineFinished { .. } => Some("■ Pipeline finished".green().bold().to_string()),
        Event::PipelineReset { .. } => Some("Pipeline reset".to_string()),
        Event::StageStatusUpdate { .. }
        | Event::RunStateChanged { .. }
        | Event::StageSelected { .. }
        | Event::Snapshot { .. } => None,
    }
}

/// Per-stage summary printed after a text-mode run.
pub fn format_summary(snapshot: &PipelineSnapshot) -> String {
    let mut lines = vec![String::new(), "Summary".bold().underline().to_string()];
    for stage in &snapshot.stages {
        let status = match stage.status {
            StageStatus::Completed => stage.status.label().green(),
            StageStatus::Processing => stage.status.label().yellow(),
            StageStatus::Error => stage.status.label().red(),
            StageStatus::Idle => stage.status.label().dimmed(),
        };
        let elapsed = match (stage.started_at, stage.completed_at) {
            (Some(start), Some(end)) => {
                format!("{:.1}s", (end - start).num_milliseconds() as f64 / 1000.0)
            }
            _ => "-".to_string(),
        };
        lines.push(format!(
            "  [{}] {:<24} {:<11} {:>3} log lines  {}",
            stage.id,
            stage.name,
            status,
            stage.logs.len(),
            elapsed
        ));
    }
    let completed = snapshot.stages.iter().filter(|s| s.is_completed()).count();
    lines.push(format!("  {completed}/{} stages completed", snapshot.stages.len()));
    lines.join("\n")
}

/// Print the static blueprint of the built-in stages.
pub fn print_stages(format: OutputFormat) -> Result<()> {
    let stages = initial_stages();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stages)?),
        OutputFormat::Text => {
            for stage in &stages {
                println!("{}", format_stage(stage));
            }
        }
    }
    Ok(())
}

fn format_stage(stage: &Stage) -> String {
    let join = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };
    format!(
        "{} {} ({})\n    {}\n    model: {}  temperature: {}\n    \
         tools: {}\n    inputs: {}\n    outputs: {}\n",
        format!("[{}]", stage.id).cyan(),
        stage.name.bold(),
        stage.agent_name,
        stage.description,
        stage.model,
        stage.temperature,
        join(&stage.tools),
        join(&stage.inputs),
        join(&stage.outputs),
    )
}
