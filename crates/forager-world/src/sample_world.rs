//! Bundled sample world used when no world-data export is configured.
//!
//! Six territories across La Noscea, Thanalan and the Black Shroud plus one
//! instanced area without aetherytes, a handful of nodes covering every
//! gathering type, and one timed rotation (`daily`).

use forager_types::{
    Aetheryte, AetheryteId, ClientLanguage, GatheringType, Item, ItemId, LocalizedNames,
    MapPosition, Node, NodeId, Territory, TerritoryId, UptimeWindow,
};

use crate::definition::{GroupDefinition, GroupEntryDefinition, WorldDefinition};
use crate::error::WorldError;
use crate::world_map::WorldMap;

/// Item id of Copper Ore, gatherable at two always-up nodes.
pub const COPPER_ORE: ItemId = ItemId(5106);

/// Node id of the instanced node without a fixed position.
pub const DIADEM_NODE: NodeId = NodeId(401);

fn names(en: &str, ja: &str, de: &str, fr: &str) -> LocalizedNames {
    LocalizedNames::new()
        .with(ClientLanguage::English, en)
        .with(ClientLanguage::Japanese, ja)
        .with(ClientLanguage::German, de)
        .with(ClientLanguage::French, fr)
}

fn english(en: &str) -> LocalizedNames {
    LocalizedNames::new().with(ClientLanguage::English, en)
}

fn territory(id: u32, names: LocalizedNames) -> Territory {
    Territory {
        id: TerritoryId(id),
        names,
        aetherytes: Vec::new(),
    }
}

fn aetheryte(
    id: u32,
    territory: u32,
    names: LocalizedNames,
    position: (f64, f64),
    stream: (f64, f64),
) -> Aetheryte {
    Aetheryte {
        id: AetheryteId(id),
        territory: TerritoryId(territory),
        names,
        position: MapPosition::new(position.0, position.1),
        stream: MapPosition::new(stream.0, stream.1),
        teleportable: true,
    }
}

fn node(
    id: u32,
    gathering_type: GatheringType,
    territory: u32,
    place: &str,
    position: (f64, f64),
    uptime: &[(u8, u8)],
) -> Result<Node, WorldError> {
    let uptime = UptimeWindow::new(uptime)?;
    Ok(Node {
        id: NodeId(id),
        place: place.to_owned(),
        territory: TerritoryId(territory),
        position: MapPosition::new(position.0, position.1),
        aetheryte: None,
        gathering_type,
        uptime,
        items: Vec::new(),
    })
}

fn item(id: u32, names: LocalizedNames, nodes: &[u32]) -> Item {
    Item {
        id: ItemId(id),
        names,
        nodes: nodes.iter().copied().map(NodeId).collect(),
    }
}

fn entry(
    window: &[(u8, u8)],
    node: u32,
    description: &str,
) -> Result<GroupEntryDefinition, WorldError> {
    let window = UptimeWindow::new(window)?;
    Ok(GroupEntryDefinition {
        window,
        node: NodeId(node),
        description: description.to_owned(),
    })
}

/// The sample world as a raw definition.
///
/// # Errors
///
/// Returns [`WorldError`] if the hard-coded data is inconsistent (should
/// not happen).
pub fn sample_definition() -> Result<WorldDefinition, WorldError> {
    let territories = vec![
        territory(
            129,
            names("Limsa Lominsa Lower Decks", "リムサ・ロミンサ：下甲板層", "Limsa Lominsa - Untere Decks", "Limsa Lominsa - L'Entrepont"),
        ),
        territory(
            134,
            names("Middle La Noscea", "中央ラノシア", "Zentrales La Noscea", "Noscea centrale"),
        ),
        territory(
            135,
            names("Lower La Noscea", "低地ラノシア", "Unteres La Noscea", "Basse-Noscea"),
        ),
        territory(
            140,
            names("Western Thanalan", "西ザナラーン", "Westliches Thanalan", "Thanalan occidental"),
        ),
        territory(
            148,
            names("Central Shroud", "黒衣森：中央森林", "Tiefer Wald", "Forêt centrale"),
        ),
        territory(901, english("The Diadem")),
    ];

    let aetherytes = vec![
        aetheryte(8, 129, names("Limsa Lominsa", "リムサ・ロミンサ", "Limsa Lominsa", "Limsa Lominsa"), (9.5, 11.8), (120.0, 300.0)),
        aetheryte(52, 134, names("Summerford Farms", "サマーフォード庄", "Sommerfurt-Höfe", "Ferme de Bellesplaines"), (24.0, 16.0), (130.0, 270.0)),
        aetheryte(10, 135, names("Moraby Drydocks", "モラビー造船廠", "Moraby-Trockendocks", "Chantier naval de Moraby"), (24.0, 35.0), (140.0, 330.0)),
        aetheryte(17, 140, names("Horizon", "ホライズン", "Horizont", "Horizon"), (8.0, 20.0), (300.0, 420.0)),
        aetheryte(3, 148, names("Bentbranch Meadows", "ベントブランチ牧場", "Gabelhain", "Ranch de Brancharquée"), (22.0, 21.0), (440.0, 210.0)),
    ];

    let nodes = vec![
        node(1, GatheringType::Mining, 135, "Moraby Bay", (26.0, 29.0), &[])?,
        node(2, GatheringType::Mining, 140, "Hammerlea", (15.0, 15.0), &[])?,
        node(101, GatheringType::Quarrying, 134, "Summerford", (21.0, 18.0), &[(2, 4), (14, 16)])?,
        node(201, GatheringType::Logging, 148, "Jadeite Thick", (25.0, 25.0), &[(10, 14)])?,
        node(202, GatheringType::Harvesting, 148, "Bentbranch", (20.0, 24.0), &[(22, 2)])?,
        node(301, GatheringType::Spearfishing, 135, "Ralbeth Shallows", (30.0, 20.0), &[])?,
        node(401, GatheringType::Mining, 901, "Diadem Skylands", (0.0, 0.0), &[])?,
    ];

    let items = vec![
        item(5106, names("Copper Ore", "銅鉱", "Kupfererz", "Minerai de cuivre"), &[1, 2]),
        item(5107, english("Tin Ore"), &[]),
        item(7590, names("Cobalt Ore", "コバルト鉱", "Kobalterz", "Minerai de cobalt"), &[101]),
        item(5386, english("Ancient Lumber"), &[201]),
        item(5542, english("Scarlet Sap"), &[202]),
        item(4930, english("Sea Pickle"), &[301]),
        item(29939, english("Diadem Iron Ore"), &[401]),
    ];

    let groups = vec![GroupDefinition {
        name: "daily".to_owned(),
        entries: vec![
            entry(&[(2, 4)], 101, "Cobalt at dawn")?,
            entry(&[(10, 14)], 201, "Ancient Lumber before noon")?,
            entry(&[(22, 2)], 202, "Scarlet Sap around midnight")?,
            entry(&[], 1, "Copper to fill the gaps")?,
        ],
    }];

    Ok(WorldDefinition {
        territories,
        aetherytes,
        nodes,
        items,
        groups,
    })
}

/// Build the sample world graph and its group definitions.
///
/// # Errors
///
/// Returns [`WorldError`] if the hard-coded data is inconsistent (should
/// not happen).
pub fn create_sample_world() -> Result<(WorldMap, Vec<GroupDefinition>), WorldError> {
    sample_definition()?.build()
}
