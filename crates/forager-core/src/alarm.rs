//! Alarms: one-shot notifications when a node's window is about to open,
//! and the "last alarm" slot that `/gather alarm` travels to.
//!
//! Each alarm runs a small state machine evaluated on every poll, with
//! `up` being the node's availability at `now + offset`:
//!
//! ```text
//! Idle  --(!up)--> Armed --(up)--> Fired --(next poll)--> Idle
//! ```
//!
//! An alarm only fires on an observed down-to-up transition, so starting
//! the session in the middle of a window does not ring. Nodes that are
//! always up never transition and therefore never fire.
//!
//! The last-alarm slot holds an `Arc` that is swapped whole: readers get
//! either the previous event or the new one, never a mix.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use forager_types::{Node, NodeId, UptimeWindow};
use forager_world::WorldMap;

use crate::clock::EorzeaTime;
use crate::config::AlarmConfig;

/// Errors raised while registering alarms.
#[derive(Debug, thiserror::Error)]
pub enum AlarmError {
    /// The alarm names a node that is not in the world graph.
    #[error("alarm {name:?} refers to unknown node {node}")]
    UnknownNode {
        /// Alarm name from the configuration.
        name: String,
        /// The missing node.
        node: NodeId,
    },
}

/// Where an alarm is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmPhase {
    /// Waiting to observe the node down.
    Idle,
    /// Node observed down; fires when it comes up.
    Armed,
    /// Fired on the last poll.
    Fired,
}

/// A fired alarm.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmEvent {
    /// Alarm name.
    pub name: String,
    /// Node whose window is opening.
    pub node: NodeId,
    /// Eorzea hour (at `now + offset`) observed when the alarm fired.
    pub hour: f64,
    /// Real minutes of lead time configured for the alarm.
    pub offset_minutes: i64,
    /// Real instant of the poll that fired the alarm.
    pub fired_at: DateTime<Utc>,
}

impl AlarmEvent {
    /// One-line announcement for the user.
    pub fn announcement(&self, place: &str) -> String {
        if self.offset_minutes > 0 {
            format!(
                "[Alarm] {}: {} opens in about {} real minutes (Eorzea {}).",
                self.name,
                place,
                self.offset_minutes,
                EorzeaTime::format_hour(self.hour)
            )
        } else {
            format!(
                "[Alarm] {}: {} is up now (Eorzea {}).",
                self.name,
                place,
                EorzeaTime::format_hour(self.hour)
            )
        }
    }
}

#[derive(Debug, Clone)]
struct Alarm {
    name: String,
    node: NodeId,
    window: UptimeWindow,
    offset_minutes: i64,
    phase: AlarmPhase,
}

impl Alarm {
    /// Advance one poll. Returns `true` when the alarm fires.
    fn step(&mut self, up: bool) -> bool {
        let (next, fired) = match (self.phase, up) {
            (AlarmPhase::Idle | AlarmPhase::Armed, false) => (AlarmPhase::Armed, false),
            (AlarmPhase::Idle, true) | (AlarmPhase::Fired, _) => (AlarmPhase::Idle, false),
            (AlarmPhase::Armed, true) => (AlarmPhase::Fired, true),
        };
        self.phase = next;
        fired
    }
}

/// Registered alarms plus the last-fired slot.
#[derive(Debug, Default)]
pub struct AlarmManager {
    alarms: Mutex<Vec<Alarm>>,
    last_alarm: RwLock<Option<Arc<AlarmEvent>>>,
}

impl AlarmManager {
    /// Create a manager with no alarms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every enabled alarm from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::UnknownNode`] if an enabled alarm names a node
    /// missing from `world`.
    pub fn from_config(configs: &[AlarmConfig], world: &WorldMap) -> Result<Self, AlarmError> {
        let manager = Self::new();
        for config in configs.iter().filter(|c| c.enabled) {
            let node = world.node(config.node).ok_or_else(|| AlarmError::UnknownNode {
                name: config.name.clone(),
                node: config.node,
            })?;
            manager.add_alarm(&config.name, node, config.offset_minutes);
        }
        Ok(manager)
    }

    /// Register an alarm on `node`'s window with `offset_minutes` of lead
    /// time.
    pub fn add_alarm(&self, name: &str, node: &Node, offset_minutes: i64) {
        if node.uptime.always_up() {
            tracing::warn!(alarm = name, node = %node.id, "node is always up; alarm will never fire");
        }
        tracing::debug!(alarm = name, node = %node.id, offset_minutes, "alarm registered");
        self.lock_alarms().push(Alarm {
            name: name.to_owned(),
            node: node.id,
            window: node.uptime.clone(),
            offset_minutes,
            phase: AlarmPhase::Idle,
        });
    }

    /// Number of registered alarms.
    pub fn len(&self) -> usize {
        self.lock_alarms().len()
    }

    /// Whether no alarms are registered.
    pub fn is_empty(&self) -> bool {
        self.lock_alarms().is_empty()
    }

    /// Current phase of every alarm, in registration order.
    pub fn phases(&self) -> Vec<(String, AlarmPhase)> {
        self.lock_alarms()
            .iter()
            .map(|a| (a.name.clone(), a.phase))
            .collect()
    }

    /// Evaluate every alarm at `now`. Fired events are recorded as the
    /// last alarm (in registration order, so the last one wins) and
    /// returned.
    pub fn tick(&self, now: DateTime<Utc>) -> Vec<Arc<AlarmEvent>> {
        let fired: Vec<AlarmEvent> = {
            let mut alarms = self.lock_alarms();
            alarms
                .iter_mut()
                .filter_map(|alarm| {
                    let hour = EorzeaTime::hours_at(now, alarm.offset_minutes);
                    alarm.step(alarm.window.is_up_at(hour)).then(|| AlarmEvent {
                        name: alarm.name.clone(),
                        node: alarm.node,
                        hour,
                        offset_minutes: alarm.offset_minutes,
                        fired_at: now,
                    })
                })
                .collect()
        };
        fired.into_iter().map(|event| self.record_fire(event)).collect()
    }

    /// Overwrite the last-alarm slot.
    pub fn record_fire(&self, event: AlarmEvent) -> Arc<AlarmEvent> {
        tracing::info!(alarm = %event.name, node = %event.node, hour = event.hour, "alarm fired");
        let event = Arc::new(event);
        *self
            .last_alarm
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&event));
        event
    }

    /// The most recently fired alarm, if any.
    pub fn last_alarm(&self) -> Option<Arc<AlarmEvent>> {
        self.last_alarm
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_alarms(&self) -> std::sync::MutexGuard<'_, Vec<Alarm>> {
        self.alarms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use forager_types::{GatheringType, MapPosition, TerritoryId};
    use forager_world::create_sample_world;

    use super::*;

    const DAY: i64 = 30_000;

    fn node(id: u32, window: &[(u8, u8)]) -> Node {
        Node {
            id: NodeId(id),
            place: format!("Spot {id}"),
            territory: TerritoryId(1),
            position: MapPosition::new(1.0, 1.0),
            aetheryte: None,
            gathering_type: GatheringType::Mining,
            uptime: UptimeWindow::new(window).unwrap(),
            items: Vec::new(),
        }
    }

    fn at(hour: f64) -> DateTime<Utc> {
        EorzeaTime::real_instant_for(DAY, hour).unwrap()
    }

    #[test]
    fn fires_once_on_window_open() {
        let manager = AlarmManager::new();
        manager.add_alarm("cobalt", &node(3, &[(2, 4)]), 0);

        assert!(manager.tick(at(1.0)).is_empty());
        assert_eq!(manager.phases()[0].1, AlarmPhase::Armed);

        let fired = manager.tick(at(2.0));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].node, NodeId(3));
        assert_eq!(manager.phases()[0].1, AlarmPhase::Fired);

        // Still inside the window: no second fire.
        assert!(manager.tick(at(2.5)).is_empty());
        assert!(manager.tick(at(3.5)).is_empty());
        assert_eq!(manager.phases()[0].1, AlarmPhase::Idle);

        // Next cycle re-arms and fires again.
        assert!(manager.tick(at(5.0)).is_empty());
        assert_eq!(manager.tick(at(2.0 + 24.0)).len(), 1);
    }

    #[test]
    fn starting_mid_window_does_not_fire() {
        let manager = AlarmManager::new();
        manager.add_alarm("late", &node(3, &[(2, 4)]), 0);
        assert!(manager.tick(at(3.0)).is_empty());
        assert!(manager.tick(at(3.9)).is_empty());
        assert!(manager.last_alarm().is_none());
    }

    #[test]
    fn offset_fires_ahead_of_window() {
        let manager = AlarmManager::new();
        // Six real minutes is just over two Eorzea hours.
        manager.add_alarm("early", &node(3, &[(10, 12)]), 6);
        assert!(manager.tick(at(7.0)).is_empty());
        let fired = manager.tick(at(8.0));
        assert_eq!(fired.len(), 1);
        assert!(fired[0].hour >= 10.0);
    }

    #[test]
    fn always_up_node_never_fires() {
        let manager = AlarmManager::new();
        manager.add_alarm("copper", &node(1, &[]), 0);
        for hour in 0..48 {
            assert!(manager.tick(at(f64::from(hour))).is_empty());
        }
        assert_eq!(manager.phases()[0].1, AlarmPhase::Idle);
    }

    #[test]
    fn later_fire_overwrites_last_alarm() {
        let manager = AlarmManager::new();
        manager.add_alarm("three", &node(3, &[(2, 4)]), 0);
        manager.add_alarm("four", &node(4, &[(6, 8)]), 0);

        manager.tick(at(1.0));
        manager.tick(at(2.0));
        assert_eq!(manager.last_alarm().unwrap().node, NodeId(3));

        manager.tick(at(5.0));
        manager.tick(at(6.0));
        assert_eq!(manager.last_alarm().unwrap().node, NodeId(4));
    }

    #[test]
    fn record_fire_replaces_slot() {
        let manager = AlarmManager::new();
        let first = manager.record_fire(AlarmEvent {
            name: "a".to_owned(),
            node: NodeId(3),
            hour: 2.0,
            offset_minutes: 0,
            fired_at: at(2.0),
        });
        let held = manager.last_alarm().unwrap();
        manager.record_fire(AlarmEvent {
            name: "b".to_owned(),
            node: NodeId(4),
            hour: 6.0,
            offset_minutes: 0,
            fired_at: at(6.0),
        });
        // A reader keeps the event it loaded.
        assert!(Arc::ptr_eq(&first, &held));
        assert_eq!(manager.last_alarm().unwrap().node, NodeId(4));
    }

    #[test]
    fn from_config_skips_disabled_and_rejects_unknown() {
        let (world, _) = create_sample_world().unwrap();
        let configs = vec![
            AlarmConfig {
                name: "cobalt".to_owned(),
                node: NodeId(101),
                offset_minutes: 1,
                enabled: true,
            },
            AlarmConfig {
                name: "ghost".to_owned(),
                node: NodeId(9999),
                offset_minutes: 0,
                enabled: false,
            },
        ];
        let manager = AlarmManager::from_config(&configs, &world).unwrap();
        assert_eq!(manager.len(), 1);

        let mut bad = configs;
        bad[1].enabled = true;
        let err = AlarmManager::from_config(&bad, &world).unwrap_err();
        assert!(matches!(err, AlarmError::UnknownNode { node: NodeId(9999), .. }));
    }

    #[test]
    fn announcement_mentions_lead_time() {
        let event = AlarmEvent {
            name: "cobalt".to_owned(),
            node: NodeId(101),
            hour: 2.0,
            offset_minutes: 3,
            fired_at: at(2.0),
        };
        assert_eq!(
            event.announcement("Summerford"),
            "[Alarm] cobalt: Summerford opens in about 3 real minutes (Eorzea 02:00)."
        );
    }
}
