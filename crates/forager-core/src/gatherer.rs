//! The gather orchestrator.
//!
//! [`Gatherer`] owns the session: the shared world graph, timed groups,
//! alarms and host handles. A gather request is resolved to a target node
//! synchronously on the caller's thread (including every "nothing found"
//! message), then the action pipeline runs on its own task so the caller
//! returns immediately. Concurrent requests run independent pipelines.
//!
//! Failures that are not the user's fault (a dangling node reference, no
//! async runtime) are caught here and logged at `error`. They end the
//! request quietly and never propagate to the host.

use std::sync::Arc;
use std::time::Duration;

use forager_types::{Job, Node, NodeId};
use forager_world::{DumpKind, WorldMap};
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::alarm::{AlarmEvent, AlarmManager};
use crate::clock::EorzeaTime;
use crate::config::FeatureConfig;
use crate::host::{CommandExecutor, GameState, NotificationSink};
use crate::language::LanguageMirror;
use crate::pipeline::{ActionPipeline, PipelineReport};
use crate::selector::NodeSelector;
use crate::timed_group::TimedGroups;

/// Unexpected failures while serving a gather request.
#[derive(Debug, thiserror::Error)]
pub enum GatherError {
    /// A resolved reference points at a node missing from the world graph.
    #[error("node {0} is not in the world data")]
    UnknownNode(NodeId),

    /// The request was made outside an async runtime.
    #[error("no async runtime available: {source}")]
    NoRuntime {
        /// The underlying runtime lookup error.
        #[from]
        source: TryCurrentError,
    },
}

/// What the user asked to gather.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatherRequest {
    /// The best node for an item, optionally restricted to one job.
    Item {
        /// Item name in any client language.
        name: String,
        /// Restrict candidates to this job's nodes.
        job: Option<Job>,
    },
    /// The node of the most recently fired alarm.
    Alarm,
    /// The current entry of a timed group, or the group list when `None`.
    Group {
        /// Group name, case-insensitive.
        name: Option<String>,
    },
}

/// Shared handles a [`Gatherer`] is built from.
pub struct GatherSession {
    /// Static world graph.
    pub world: Arc<WorldMap>,
    /// Timed group rotations.
    pub groups: Arc<TimedGroups>,
    /// Registered alarms.
    pub alarms: Arc<AlarmManager>,
    /// Pipeline feature toggles.
    pub features: Arc<FeatureConfig>,
    /// Teleport-language mirror.
    pub language: Arc<LanguageMirror>,
    /// Chat command sink.
    pub executor: Arc<dyn CommandExecutor>,
    /// User-facing messages.
    pub sink: Arc<dyn NotificationSink>,
    /// Clock and player location.
    pub game: Arc<dyn GameState>,
}

/// Session-level gather orchestrator.
pub struct Gatherer {
    world: Arc<WorldMap>,
    groups: Arc<TimedGroups>,
    alarms: Arc<AlarmManager>,
    sink: Arc<dyn NotificationSink>,
    game: Arc<dyn GameState>,
    pipeline: ActionPipeline,
    cancel: CancellationToken,
}

impl Gatherer {
    /// Build a gatherer with a fresh session cancellation token.
    pub fn new(session: GatherSession) -> Self {
        let cancel = CancellationToken::new();
        let pipeline = ActionPipeline::new(
            Arc::clone(&session.world),
            session.features,
            session.language,
            session.executor,
            Arc::clone(&session.sink),
            cancel.clone(),
        );
        Self {
            world: session.world,
            groups: session.groups,
            alarms: session.alarms,
            sink: session.sink,
            game: session.game,
            pipeline,
            cancel,
        }
    }

    /// The world graph.
    pub fn world(&self) -> &WorldMap {
        &self.world
    }

    /// The timed groups.
    pub fn groups(&self) -> &TimedGroups {
        &self.groups
    }

    /// The alarm manager.
    pub fn alarms(&self) -> &AlarmManager {
        &self.alarms
    }

    /// Token cancelled by [`Gatherer::shutdown`]. Background loops should
    /// watch it (or a child of it).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolve and start a gather request.
    ///
    /// Returns the pipeline's task handle, or `None` when nothing was
    /// started. Lookup misses are reported to the user; faults are only
    /// logged and end the request quietly.
    pub fn gather(&self, request: GatherRequest) -> Option<JoinHandle<PipelineReport>> {
        match self.try_gather(&request) {
            Ok(handle) => handle,
            Err(err) => {
                error!(error = %err, ?request, "gather request failed");
                None
            }
        }
    }

    fn try_gather(
        &self,
        request: &GatherRequest,
    ) -> Result<Option<JoinHandle<PipelineReport>>, GatherError> {
        let Some(node) = self.resolve(request)? else {
            return Ok(None);
        };
        let runtime = Handle::try_current()?;
        if self.cancel.is_cancelled() {
            debug!(%node, "session shut down; gather request ignored");
            return Ok(None);
        }
        let pipeline = self.pipeline.clone();
        Ok(Some(runtime.spawn(async move { pipeline.run(node).await })))
    }

    /// Resolve a request to its target node, telling the user when there
    /// is nothing to do.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::UnknownNode`] if an alarm or group entry
    /// refers to a node missing from the world graph.
    pub fn resolve(&self, request: &GatherRequest) -> Result<Option<NodeId>, GatherError> {
        match request {
            GatherRequest::Item { name, job } => Ok(self.resolve_item(name, *job)),
            GatherRequest::Alarm => self.resolve_alarm(),
            GatherRequest::Group { name } => self.resolve_group(name.as_deref()),
        }
    }

    fn resolve_item(&self, name: &str, job: Option<Job>) -> Option<NodeId> {
        let Some(item) = self.world.find_item_by_name(name) else {
            self.sink
                .print_error(&format!("No item named \"{}\" is known.", name.trim()));
            return None;
        };
        let hour = EorzeaTime::hours_at(self.game.now(), 0);
        let player = self.game.player_location();
        let selector = NodeSelector::new(&self.world);
        let Some(selection) = selector.closest_node_for_item(item, job, hour, player.as_ref())
        else {
            let message = match job {
                Some(job) => format!(
                    "No known {} node yields {}.",
                    job.default_set_name().to_lowercase(),
                    item.names.display()
                ),
                None => format!("No known node yields {}.", item.names.display()),
            };
            self.sink.print_error(&message);
            return None;
        };
        info!(
            item = %item.id,
            node = %selection.node.id,
            up_now = selection.up_now,
            distance = ?selection.distance,
            "node selected"
        );
        self.sink.print(&format!(
            "Gathering {} at {}: {}.",
            item.names.display(),
            self.place_label(selection.node),
            selection.reason()
        ));
        Some(selection.node.id)
    }

    fn resolve_alarm(&self) -> Result<Option<NodeId>, GatherError> {
        let Some(event) = self.alarms.last_alarm() else {
            self.sink.print_error("No alarm has fired yet.");
            return Ok(None);
        };
        let node = self.node(event.node)?;
        self.sink.print(&format!(
            "Gathering for alarm {} at {}.",
            event.name,
            self.place_label(node)
        ));
        Ok(Some(node.id))
    }

    fn resolve_group(&self, name: Option<&str>) -> Result<Option<NodeId>, GatherError> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            self.sink.print(&self.groups.print_help());
            return Ok(None);
        };
        let Some(group) = self.groups.get(name) else {
            self.sink
                .print_error(&format!("No gathering group named \"{name}\"."));
            self.sink.print(&self.groups.print_help());
            return Ok(None);
        };
        let hour = EorzeaTime::hours_at(self.game.now(), 0);
        let Some(entry) = group.current_node(hour) else {
            self.sink.print(&format!(
                "Group {} has nothing scheduled at Eorzea {}.",
                group.name(),
                EorzeaTime::format_hour(hour)
            ));
            return Ok(None);
        };
        let node = self.node(entry.node)?;
        let message = if entry.description.is_empty() {
            format!("Group {}: {}.", group.name(), self.place_label(node))
        } else {
            format!(
                "Group {}: {} ({}).",
                group.name(),
                self.place_label(node),
                entry.description
            )
        };
        self.sink.print(&message);
        Ok(Some(node.id))
    }

    /// Evaluate alarms at the game's current time and announce any that
    /// fired.
    pub fn poll_alarms(&self) -> Vec<Arc<AlarmEvent>> {
        let events = self.alarms.tick(self.game.now());
        for event in &events {
            let place = self
                .world
                .node(event.node)
                .map_or_else(|| event.node.to_string(), |node| self.place_label(node));
            self.sink.print(&event.announcement(&place));
        }
        events
    }

    /// Poll alarms every `interval` until the session is cancelled.
    pub fn spawn_alarm_loop(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let gatherer = Arc::clone(self);
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        debug!("alarm loop stopped");
                        return;
                    }
                    _ = ticker.tick() => {
                        gatherer.poll_alarms();
                    }
                }
            }
        })
    }

    /// Render a diagnostic dump, logging each line.
    pub fn dump(&self, kind: DumpKind) -> Vec<String> {
        let lines = self.world.dump(kind);
        info!(?kind, count = lines.len(), "world dump");
        for line in &lines {
            debug!(target: "forager::dump", "{line}");
        }
        lines
    }

    /// Cancel in-flight pipelines and background loops.
    pub fn shutdown(&self) {
        info!("gather session shutting down");
        self.cancel.cancel();
    }

    fn node(&self, id: NodeId) -> Result<&Node, GatherError> {
        self.world.node(id).ok_or(GatherError::UnknownNode(id))
    }

    fn place_label(&self, node: &Node) -> String {
        self.world.territory(node.territory).map_or_else(
            || node.place.clone(),
            |territory| format!("{}, {}", node.place, territory.names.display()),
        )
    }
}
