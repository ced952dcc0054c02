//! Shell commands

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Error, bail};

use rr_core::{CandidateId, Place};

pub const HELP: &str = "\
Commands:
  pull                  pull the lever (spin, or open the finale once all places are out)
  close                 close the current overlay
  reset                 start the raffle over (slots and candidates are kept)
  list                  list the active candidates
  slots                 show the pre-assigned winners
  assign <place> <id>   rig a place (3rd, 2nd, 1st) for a candidate
  clear <place>         unassign a place
  source default|custom switch the candidate set
  upload <file>...      use image files as the custom candidate set
  podium                show the podium
  status                show raffle progress
  help                  show this help
  quit                  leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pull,
    Close,
    Reset,
    List,
    Slots,
    Assign { place: Place, id: CandidateId },
    Clear(Place),
    Source { custom: bool },
    Upload(Vec<PathBuf>),
    Podium,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("Empty command");
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("pull" | "spin" | "p", []) => Self::Pull,
            ("close" | "c", []) => Self::Close,
            ("reset", []) => Self::Reset,
            ("list" | "ls", []) => Self::List,
            ("slots", []) => Self::Slots,
            ("assign", [place, id]) => Self::Assign {
                place: place.parse()?,
                id: CandidateId::new(*id),
            },
            ("clear", [place]) => Self::Clear(place.parse()?),
            ("source", ["default"]) => Self::Source { custom: false },
            ("source", ["custom"]) => Self::Source { custom: true },
            ("upload", files) if !files.is_empty() => {
                Self::Upload(files.iter().map(PathBuf::from).collect())
            }
            ("podium", []) => Self::Podium,
            ("status", []) => Self::Status,
            ("help" | "?", []) => Self::Help,
            ("quit" | "exit" | "q", []) => Self::Quit,
            (verb, _) => bail!("Unknown command or arguments: '{}' (try 'help')", verb),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("pull".parse::<Command>().unwrap(), Command::Pull);
        assert_eq!("  Quit ".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(
            "assign 1st custom-4".parse::<Command>().unwrap(),
            Command::Assign {
                place: Place::First,
                id: "custom-4".into()
            }
        );
        assert_eq!("clear third".parse::<Command>().unwrap(), Command::Clear(Place::Third));
        assert_eq!(
            "source custom".parse::<Command>().unwrap(),
            Command::Source { custom: true }
        );
        assert_eq!(
            "upload a.png b.jpg".parse::<Command>().unwrap(),
            Command::Upload(vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")])
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!("".parse::<Command>().is_err());
        assert!("assign fourth 3".parse::<Command>().is_err());
        assert!("assign 1st".parse::<Command>().is_err());
        assert!("source elsewhere".parse::<Command>().is_err());
        assert!("upload".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }
}
