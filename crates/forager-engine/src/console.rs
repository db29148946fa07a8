//! Console command parsing.
//!
//! The engine reads one command per line from standard input, using the
//! same slash commands players type in game:
//!
//! ```text
//! /gather <item>         best node for an item
//! /gather alarm          node of the last fired alarm
//! /gathermin <item>      miner nodes only
//! /gatherbtn <item>      botanist nodes only
//! /gathergroup [name]    current node of a timed group, or the group list
//! /gatherdump <kind>     items | nodes | territories | aetherytes
//! /pos <territory> <x> <y>   set the player's location (no args: clear)
//! /help
//! /quit
//! ```

use forager_core::gatherer::GatherRequest;
use forager_types::{Job, MapPosition, PlayerLocation, TerritoryId};
use forager_world::DumpKind;

/// Help text printed by `/help`.
pub const HELP: &str = "\
/gather <item>            gather an item at its best node
/gather alarm             travel to the last alarm's node
/gathermin <item>         like /gather, miner nodes only
/gatherbtn <item>         like /gather, botanist nodes only
/gathergroup [name]       current entry of a timed group (no name: list groups)
/gatherdump <kind>        dump items, nodes, territories or aetherytes
/pos <territory> <x> <y>  set your location (no arguments: forget it)
/quit                     leave";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Start a gather request.
    Gather(GatherRequest),
    /// Print a world dump.
    Dump(DumpKind),
    /// Set (or clear) the player's location.
    Position(Option<PlayerLocation>),
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

/// Why a console line could not be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The command word is not known.
    #[error("unknown command {0:?}; try /help")]
    Unknown(String),

    /// The command is known but its arguments are wrong.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one console line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown commands or malformed arguments.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_lowercase().as_str() {
        "/gather" => match rest {
            "" => return Err(ParseError::Usage("/gather <item> | /gather alarm")),
            r if r.eq_ignore_ascii_case("alarm") => ConsoleCommand::Gather(GatherRequest::Alarm),
            name => item(name, None),
        },
        "/gathermin" => job_item(rest, Job::Miner, "/gathermin <item>")?,
        "/gatherbtn" => job_item(rest, Job::Botanist, "/gatherbtn <item>")?,
        "/gathergroup" => ConsoleCommand::Gather(GatherRequest::Group {
            name: (!rest.is_empty()).then(|| rest.to_owned()),
        }),
        "/gatherdump" => DumpKind::parse(rest).map(ConsoleCommand::Dump).ok_or(
            ParseError::Usage("/gatherdump items|nodes|territories|aetherytes"),
        )?,
        "/pos" => ConsoleCommand::Position(position(rest)?),
        "/help" => ConsoleCommand::Help,
        "/quit" | "/exit" => ConsoleCommand::Quit,
        _ => return Err(ParseError::Unknown(word.to_owned())),
    };
    Ok(Some(command))
}

fn item(name: &str, job: Option<Job>) -> ConsoleCommand {
    ConsoleCommand::Gather(GatherRequest::Item {
        name: name.to_owned(),
        job,
    })
}

fn job_item(rest: &str, job: Job, usage: &'static str) -> Result<ConsoleCommand, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    Ok(item(rest, Some(job)))
}

fn position(rest: &str) -> Result<Option<PlayerLocation>, ParseError> {
    const USAGE: &str = "/pos <territory id> <x> <y>";
    if rest.is_empty() {
        return Ok(None);
    }
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [territory, x, y] = parts.as_slice() else {
        return Err(ParseError::Usage(USAGE));
    };
    let (Some(territory), Some(x), Some(y)) = (
        territory.parse::<u32>().ok(),
        x.parse::<f64>().ok().filter(|v| v.is_finite()),
        y.parse::<f64>().ok().filter(|v| v.is_finite()),
    ) else {
        return Err(ParseError::Usage(USAGE));
    };
    Ok(Some(PlayerLocation {
        territory: TerritoryId(territory),
        position: MapPosition::new(x, y),
    }))
}
