//! Node selection: which node to travel to for a requested item.
//!
//! Candidates are the item's nodes, optionally narrowed to one job. They
//! are ranked lexicographically:
//!
//! 1. nodes up at the queried hour before nodes that are down,
//! 2. smaller aetheryte-to-aetheryte distance from the player,
//! 3. nodes without a teleport anchor last,
//! 4. original node-list order.
//!
//! Availability always outranks distance: a near node that is down never
//! beats a far node that is up.

use std::cmp::Ordering;

use forager_types::{Item, Job, Node, PlayerLocation};
use forager_world::WorldMap;

use crate::clock::EorzeaTime;

/// A ranked candidate node with the facts that placed it.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'w> {
    /// The candidate node.
    pub node: &'w Node,
    /// Whether the node is up at the queried hour.
    pub up_now: bool,
    /// Stream-map distance from the player's anchor to the node's anchor.
    /// `None` when the node has no teleport anchor.
    pub distance: Option<f64>,
    /// Eorzea hours until the node's next window opens (0 when up).
    pub hours_until_up: f64,
}

impl Selection<'_> {
    /// Short human-readable explanation of why this node was picked.
    pub fn reason(&self) -> String {
        let availability = if self.node.uptime.always_up() {
            "always up".to_owned()
        } else if self.up_now {
            format!("up now ({})", self.node.uptime.printable_hours())
        } else {
            format!(
                "opens in {:.1} Eorzea hours, about {:.0} real minutes ({})",
                self.hours_until_up,
                EorzeaTime::real_minutes(self.hours_until_up),
                self.node.uptime.printable_hours()
            )
        };
        match self.distance {
            Some(distance) if distance > 0.0 => {
                format!("{availability}, {distance:.0} from your nearest aetheryte")
            }
            Some(_) => availability,
            None => format!("{availability}, no aetheryte to teleport to"),
        }
    }
}

/// Ranks an item's nodes against the clock and the player's position.
#[derive(Debug, Clone, Copy)]
pub struct NodeSelector<'w> {
    world: &'w WorldMap,
}

impl<'w> NodeSelector<'w> {
    /// Create a selector over `world`.
    pub const fn new(world: &'w WorldMap) -> Self {
        Self { world }
    }

    /// Every candidate node for `item`, best first.
    ///
    /// `filter` keeps only nodes gathered by that job; spearfishing nodes
    /// belong to neither job and are dropped by any filter.
    pub fn rank(
        &self,
        item: &Item,
        filter: Option<Job>,
        hour: f64,
        player: Option<&PlayerLocation>,
    ) -> Vec<Selection<'w>> {
        let mut candidates: Vec<Selection<'w>> = item
            .nodes
            .iter()
            .filter_map(|id| self.world.node(*id))
            .filter(|node| filter.is_none_or(|job| node.gathering_type.job() == Some(job)))
            .map(|node| Selection {
                node,
                up_now: node.uptime.is_up_at(hour),
                distance: self.world.anchor_distance(player, node),
                hours_until_up: node.uptime.hours_until_up(hour),
            })
            .collect();
        // Stable sort keeps node-list order among equals.
        candidates.sort_by(compare);
        candidates
    }

    /// The best node for `item`, or `None` if no node passes the filter.
    pub fn closest_node_for_item(
        &self,
        item: &Item,
        filter: Option<Job>,
        hour: f64,
        player: Option<&PlayerLocation>,
    ) -> Option<Selection<'w>> {
        self.rank(item, filter, hour, player).into_iter().next()
    }
}

fn compare(a: &Selection<'_>, b: &Selection<'_>) -> Ordering {
    b.up_now
        .cmp(&a.up_now)
        .then_with(|| match (a.distance, b.distance) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use forager_types::{
        Aetheryte, AetheryteId, ClientLanguage, GatheringType, ItemId, LocalizedNames,
        MapPosition, NodeId, Territory, TerritoryId, UptimeWindow,
    };
    use forager_world::create_sample_world;
    use forager_world::sample_world::COPPER_ORE;

    use super::*;

    fn names(name: &str) -> LocalizedNames {
        LocalizedNames::new().with(ClientLanguage::English, name)
    }

    /// Two territories 50 stream units apart plus a third 5 units from the
    /// first. Node 1 (far, up 0-12), node 2 (near, up 12-24).
    fn make_world() -> WorldMap {
        let mut map = WorldMap::new();
        for id in [1, 2, 3] {
            map.add_territory(Territory {
                id: TerritoryId(id),
                names: names(&format!("Zone {id}")),
                aetherytes: Vec::new(),
            })
            .unwrap();
        }
        for (id, territory, stream) in [(10, 1, (0.0, 0.0)), (20, 2, (50.0, 0.0)), (30, 3, (5.0, 0.0))] {
            map.add_aetheryte(Aetheryte {
                id: AetheryteId(id),
                territory: TerritoryId(territory),
                names: names(&format!("Crystal {id}")),
                position: MapPosition::new(10.0, 10.0),
                stream: MapPosition::new(stream.0, stream.1),
                teleportable: true,
            })
            .unwrap();
        }
        let nodes = [
            (1, GatheringType::Mining, 2, vec![(0, 12)]),
            (2, GatheringType::Quarrying, 3, vec![(12, 24)]),
            (3, GatheringType::Logging, 3, vec![]),
        ];
        for (id, gathering_type, territory, window) in nodes {
            map.add_node(Node {
                id: NodeId(id),
                place: format!("Spot {id}"),
                territory: TerritoryId(territory),
                position: MapPosition::new(12.0, 12.0),
                aetheryte: None,
                gathering_type,
                uptime: UptimeWindow::new(&window).unwrap(),
                items: Vec::new(),
            })
            .unwrap();
        }
        map.add_item(Item {
            id: ItemId(1),
            names: names("Ore"),
            nodes: vec![NodeId(1), NodeId(2)],
        })
        .unwrap();
        map
    }

    fn player_in_zone_one() -> PlayerLocation {
        PlayerLocation {
            territory: TerritoryId(1),
            position: MapPosition::new(10.0, 10.0),
        }
    }

    #[test]
    fn up_node_beats_nearer_down_node() {
        let map = make_world();
        let item = map.item(ItemId(1)).unwrap();
        let player = player_in_zone_one();
        let selection = NodeSelector::new(&map)
            .closest_node_for_item(item, None, 6.0, Some(&player))
            .unwrap();
        assert_eq!(selection.node.id, NodeId(1));
        assert!(selection.up_now);
        assert_eq!(selection.distance, Some(50.0));
    }

    #[test]
    fn near_node_wins_once_it_is_up() {
        let map = make_world();
        let item = map.item(ItemId(1)).unwrap();
        let player = player_in_zone_one();
        let ranked = NodeSelector::new(&map).rank(item, None, 12.5, Some(&player));
        assert_eq!(ranked[0].node.id, NodeId(2));
        assert_eq!(ranked[0].distance, Some(5.0));
        assert!(!ranked[1].up_now);
        assert_eq!(ranked[1].hours_until_up, 11.5);
    }

    #[test]
    fn job_filter_narrows_candidates() {
        let map = make_world();
        let item = map.item(ItemId(1)).unwrap();
        let selector = NodeSelector::new(&map);
        let selection = selector
            .closest_node_for_item(item, Some(Job::Miner), 6.0, None)
            .unwrap();
        assert_eq!(selection.node.id, NodeId(1));
        assert!(
            selector
                .closest_node_for_item(item, Some(Job::Botanist), 6.0, None)
                .is_none()
        );
    }

    #[test]
    fn unknown_player_ties_fall_back_to_node_order() {
        let map = make_world();
        let item = map.item(ItemId(1)).unwrap();
        // At hour 0 node 1 is up and node 2 is down; at hour 12 the reverse.
        let selector = NodeSelector::new(&map);
        let ranked = selector.rank(item, None, 0.0, None);
        assert_eq!(ranked[0].node.id, NodeId(1));
        assert_eq!(ranked[0].distance, Some(0.0));
        let ranked = selector.rank(item, None, 12.0, None);
        assert_eq!(ranked[0].node.id, NodeId(2));
    }

    #[test]
    fn node_without_anchor_ranks_last() {
        let (map, _) = create_sample_world().unwrap();
        let mut item = map.item(COPPER_ORE).unwrap().clone();
        item.nodes.insert(0, forager_world::sample_world::DIADEM_NODE);
        let ranked = NodeSelector::new(&map).rank(&item, None, 8.0, None);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[2].node.id, forager_world::sample_world::DIADEM_NODE);
        assert!(ranked[2].distance.is_none());
        assert!(ranked[2].reason().contains("no aetheryte"));
    }

    #[test]
    fn empty_node_list_selects_nothing() {
        let (map, _) = create_sample_world().unwrap();
        let tin = map.find_item_by_name("Tin Ore").unwrap();
        assert!(
            NodeSelector::new(&map)
                .closest_node_for_item(tin, None, 0.0, None)
                .is_none()
        );
    }

    #[test]
    fn reason_mentions_next_window() {
        let map = make_world();
        let item = map.item(ItemId(1)).unwrap();
        let ranked = NodeSelector::new(&map).rank(item, None, 6.0, None);
        let down = ranked.iter().find(|s| !s.up_now).unwrap();
        let reason = down.reason();
        assert!(reason.contains("opens in 6.0 Eorzea hours"), "{reason}");
        assert!(reason.contains("12:00-24:00"), "{reason}");
    }
}
