//! The gather action pipeline: equip, teleport, flag.
//!
//! Once a target node is chosen, three stages run strictly in order, each
//! optionally sending one chat command:
//!
//! | Stage    | Command                                   | Toggle            |
//! |----------|-------------------------------------------|-------------------|
//! | Equip    | `/gearset change <set>`                   | `use_gear_change` |
//! | Teleport | `/tp <aetheryte name>`                    | `use_teleport`    |
//! | SetFlag  | `/coord <x> <y> : <territory name>`       | `use_coordinates` |
//!
//! Every stage reports a [`StageOutcome`]. `Ok` and `OkWithWarning` let
//! the next stage run; `Halt` stops the pipeline. A warning is shown to
//! the user as a headline plus a hint, both on the error channel.
//!
//! After each accepted command the pipeline waits a short settle delay so
//! the game can act on it. The wait is cancellable: once the session's
//! token fires, no further command is sent.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use forager_types::{ClientLanguage, Node, NodeId};
use forager_world::WorldMap;
use tokio_util::sync::CancellationToken;

use crate::config::FeatureConfig;
use crate::host::{CommandExecutor, NotificationSink};
use crate::language::LanguageMirror;

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Switch to the node's gear set.
    Equip,
    /// Teleport to the node's aetheryte.
    Teleport,
    /// Flag the node on the map.
    SetFlag,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Self; 3] = [Self::Equip, Self::Teleport, Self::SetFlag];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Equip => "equip",
            Self::Teleport => "teleport",
            Self::SetFlag => "set flag",
        };
        f.write_str(label)
    }
}

/// A non-fatal problem the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageWarning {
    /// What went wrong.
    pub headline: String,
    /// How to fix it.
    pub hint: String,
}

/// Result of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Done (or skipped); continue.
    Ok,
    /// Done with a warning; continue.
    OkWithWarning(StageWarning),
    /// Stop the pipeline.
    Halt(String),
}

impl StageOutcome {
    /// Whether the next stage may run.
    pub const fn continues(&self) -> bool {
        !matches!(self, Self::Halt(_))
    }
}

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Every stage ran.
    Completed,
    /// A stage halted the run.
    Halted {
        /// The halting stage.
        stage: Stage,
        /// Why it halted.
        reason: String,
    },
    /// The session was cancelled before or during `stage`.
    Cancelled {
        /// The stage that did not finish.
        stage: Stage,
    },
}

/// Record of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// The target node.
    pub node: NodeId,
    /// Outcomes of the stages that finished, in order.
    pub stages: Vec<(Stage, StageOutcome)>,
    /// How the run ended.
    pub status: PipelineStatus,
}

impl PipelineReport {
    const fn new(node: NodeId) -> Self {
        Self {
            node,
            stages: Vec::new(),
            status: PipelineStatus::Completed,
        }
    }

    /// Whether every stage ran.
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, PipelineStatus::Completed)
    }

    /// Warnings raised along the way.
    pub fn warnings(&self) -> impl Iterator<Item = &StageWarning> {
        self.stages.iter().filter_map(|(_, outcome)| match outcome {
            StageOutcome::OkWithWarning(warning) => Some(warning),
            StageOutcome::Ok | StageOutcome::Halt(_) => None,
        })
    }
}

/// The session was cancelled while a stage was in flight.
struct Interrupted;

/// Runs the three stages for one target node.
///
/// Cloning is cheap (shared handles only); each gather request runs its own
/// clone on its own task.
#[derive(Clone)]
pub struct ActionPipeline {
    world: Arc<WorldMap>,
    features: Arc<FeatureConfig>,
    language: Arc<LanguageMirror>,
    executor: Arc<dyn CommandExecutor>,
    sink: Arc<dyn NotificationSink>,
    cancel: CancellationToken,
}

impl ActionPipeline {
    /// Create a pipeline over shared session handles.
    pub fn new(
        world: Arc<WorldMap>,
        features: Arc<FeatureConfig>,
        language: Arc<LanguageMirror>,
        executor: Arc<dyn CommandExecutor>,
        sink: Arc<dyn NotificationSink>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            world,
            features,
            language,
            executor,
            sink,
            cancel,
        }
    }

    /// Run every stage for `node_id` in order.
    pub async fn run(&self, node_id: NodeId) -> PipelineReport {
        let mut report = PipelineReport::new(node_id);
        let Some(node) = self.world.node(node_id) else {
            report.status = PipelineStatus::Halted {
                stage: Stage::Equip,
                reason: format!("node {node_id} is not in the world data"),
            };
            return report;
        };
        tracing::info!(node = %node.id, place = %node.place, "gather pipeline started");

        for stage in Stage::ALL {
            let outcome = match self.run_stage(stage, node).await {
                Ok(outcome) => outcome,
                Err(Interrupted) => {
                    tracing::info!(node = %node.id, %stage, "gather pipeline cancelled");
                    report.status = PipelineStatus::Cancelled { stage };
                    return report;
                }
            };
            match &outcome {
                StageOutcome::Ok => {}
                StageOutcome::OkWithWarning(warning) => {
                    tracing::warn!(node = %node.id, %stage, headline = %warning.headline, "stage warning");
                    self.sink.print_error(&warning.headline);
                    self.sink.print_error(&warning.hint);
                }
                StageOutcome::Halt(reason) => {
                    tracing::debug!(node = %node.id, %stage, reason = %reason, "stage halted pipeline");
                    report.status = PipelineStatus::Halted {
                        stage,
                        reason: reason.clone(),
                    };
                }
            }
            let halted = !outcome.continues();
            report.stages.push((stage, outcome));
            if halted {
                return report;
            }
        }
        tracing::info!(node = %node.id, "gather pipeline completed");
        report
    }

    async fn run_stage(&self, stage: Stage, node: &Node) -> Result<StageOutcome, Interrupted> {
        if self.cancel.is_cancelled() {
            return Err(Interrupted);
        }
        match stage {
            Stage::Equip => self.equip(node).await,
            Stage::Teleport => self.teleport(node).await,
            Stage::SetFlag => self.set_flag(node).await,
        }
    }

    async fn equip(&self, node: &Node) -> Result<StageOutcome, Interrupted> {
        if !self.features.use_gear_change {
            return Ok(StageOutcome::Ok);
        }
        let Some(job) = node.gathering_type.job() else {
            return Ok(StageOutcome::Halt(format!(
                "no gear set for {} nodes",
                node.gathering_type.label()
            )));
        };
        let set = self.features.set_name(job);
        if self.dispatch(&format!("/gearset change {set}")).await? {
            Ok(StageOutcome::Ok)
        } else {
            Ok(StageOutcome::OkWithWarning(StageWarning {
                headline: format!("The gear set \"{set}\" was not recognized."),
                hint: format!(
                    "Check features.{}, or set features.use_gear_change to false.",
                    FeatureConfig::set_name_key(job)
                ),
            }))
        }
    }

    async fn teleport(&self, node: &Node) -> Result<StageOutcome, Interrupted> {
        if !self.features.use_teleport {
            return Ok(StageOutcome::Ok);
        }
        let Some(aetheryte) = self.world.node_aetheryte(node) else {
            return Ok(StageOutcome::Halt(format!(
                "node {} has no aetheryte to teleport to",
                node.id
            )));
        };
        let language = self.language.get();
        let Some(name) = aetheryte.names.get(language) else {
            return Ok(StageOutcome::Halt(format!(
                "aetheryte {} has no {language:?} name",
                aetheryte.id
            )));
        };
        if self.dispatch(&format!("/tp {name}")).await? {
            Ok(StageOutcome::Ok)
        } else {
            Ok(StageOutcome::OkWithWarning(StageWarning {
                headline: "The teleport command was not recognized.".to_owned(),
                hint: "Install the Teleporter plugin, or set features.use_teleport to false."
                    .to_owned(),
            }))
        }
    }

    async fn set_flag(&self, node: &Node) -> Result<StageOutcome, Interrupted> {
        if !self.features.use_coordinates || node.position.is_unset() {
            return Ok(StageOutcome::Ok);
        }
        let Some(territory) = self.world.territory(node.territory) else {
            return Ok(StageOutcome::Halt(format!(
                "territory {} is not in the world data",
                node.territory
            )));
        };
        let language = self.session_language();
        let Some(territory_name) = territory.names.get(language) else {
            return Ok(StageOutcome::Halt(format!(
                "territory {} has no {language:?} name",
                territory.id
            )));
        };
        let command = format!(
            "/coord {:.1} {:.1} : {territory_name}",
            node.position.x, node.position.y
        );
        if self.dispatch(&command).await? {
            Ok(StageOutcome::Ok)
        } else {
            Ok(StageOutcome::OkWithWarning(StageWarning {
                headline: "The coordinate command was not recognized.".to_owned(),
                hint: "Install the ChatCoordinates plugin, or set features.use_coordinates to false."
                    .to_owned(),
            }))
        }
    }

    fn session_language(&self) -> ClientLanguage {
        self.language.session()
    }

    /// Send `command`, then wait for it to settle if it was accepted.
    async fn dispatch(&self, command: &str) -> Result<bool, Interrupted> {
        if self.cancel.is_cancelled() {
            return Err(Interrupted);
        }
        let accepted = self.executor.execute(command);
        tracing::debug!(command, accepted, "command sent");
        let settle = Duration::from_millis(self.features.command_settle_ms);
        if accepted && !settle.is_zero() {
            tokio::select! {
                () = self.cancel.cancelled() => return Err(Interrupted),
                () = tokio::time::sleep(settle) => {}
            }
        }
        Ok(accepted)
    }
}
