//! Text rendering of machine state

use std::fmt::Write;

use rr_core::{Candidate, MachineEvent, MachineSnapshot, Place};
use rr_machine::ReelStrip;

/// Shown for a podium place with no winner
pub const PLACEHOLDER_NAME: &str = "TBD";
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/100";

/// Podium columns, left to right
const PODIUM_ORDER: [Place; 3] = [Place::Second, Place::First, Place::Third];

/// Headline above the reels
pub fn title(snapshot: &MachineSnapshot) -> String {
    match snapshot.next_place() {
        Some(place) => format!("Now revealing: {}", place),
        None => "Final results".to_string(),
    }
}

pub fn status(snapshot: &MachineSnapshot) -> String {
    format!(
        "{} | {} of 3 revealed | {} set, {} candidates | {} slots assigned",
        title(snapshot),
        snapshot.revealed_count,
        if snapshot.use_custom_images { "custom" } else { "default" },
        snapshot.candidates.len(),
        snapshot.winners_config.assigned_count()
    )
}

pub fn candidate_list(snapshot: &MachineSnapshot) -> String {
    let mut out = String::new();
    for candidate in &snapshot.candidates {
        let _ = write!(out, "  {:>20}  {}", candidate.id, candidate.name);
        if let Some(slot) = snapshot.winners_config.slot_of(&candidate.id) {
            if let Some(place) = Place::from_round(slot) {
                let _ = write!(out, "  <{}>", place);
            }
        }
        out.push('\n');
    }
    out.pop();
    out
}

pub fn slot_table(snapshot: &MachineSnapshot) -> String {
    Place::REVEAL_ORDER
        .iter()
        .map(|&place| {
            let assigned = match snapshot.winners_config.for_place(place) {
                None => "(random)".to_string(),
                Some(id) => match snapshot.winners_config.resolve(place.slot(), &snapshot.candidates) {
                    Some(candidate) => format!("{} ({})", candidate.name, id),
                    None => format!("{} (not in the active set, drawn at random)", id),
                },
            };
            format!("  {:<10} {}", place.label(), assigned)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One frame of the spinning reels
pub fn reel_frame(strips: &[ReelStrip], frame: usize) -> String {
    let cells: Vec<&str> = strips
        .iter()
        .enumerate()
        .map(|(reel, strip)| strip.at(frame + reel).map_or("?", |c| c.name.as_str()))
        .collect();
    format!("[ {} ]", cells.join(" | "))
}

pub fn celebration(place: Place, winner: &Candidate) -> String {
    format!(
        "\n  ========== {} ==========\n  Winner: {}\n  {}\n  (close to continue)",
        place.label(),
        winner.name,
        winner.image
    )
}

pub fn podium(snapshot: &MachineSnapshot) -> String {
    let mut out = String::from("\n  ******** The Winners ********\n");
    for place in PODIUM_ORDER {
        let (name, image) = match snapshot.podium_winner(place) {
            Some(winner) => (winner.name.as_str(), winner.image.as_str()),
            None => (PLACEHOLDER_NAME, PLACEHOLDER_IMAGE),
        };
        let _ = writeln!(out, "  {:<10} {:<24} {}", place.label(), name, image);
    }
    out.push_str("  (close to leave the podium)");
    out
}

/// Notice for changes made outside a spin
pub fn event_notice(event: &MachineEvent) -> Option<String> {
    match event {
        MachineEvent::GameReset => Some("Raffle reset".to_string()),
        MachineEvent::WinnersConfigUpdated => Some("Winner slots updated".to_string()),
        MachineEvent::CandidatesUpdated { count } => Some(format!("{} candidates loaded", count)),
        MachineEvent::DataSourceChanged { use_custom_images } => Some(format!(
            "Using the {} candidate set",
            if *use_custom_images { "custom" } else { "default" }
        )),
        MachineEvent::SpinStarted { .. } | MachineEvent::SpinCompleted { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rr_core::WinnersConfig;

    fn snapshot() -> MachineSnapshot {
        MachineSnapshot {
            candidates: vec![
                Candidate::new("a", "Ada", "a.png"),
                Candidate::new("b", "Grace", "b.png"),
            ],
            winners_config: WinnersConfig::from_slots([None, Some("gone".into()), Some("a".into())]),
            ..MachineSnapshot::default()
        }
    }

    #[test]
    fn test_title_follows_progress() {
        let mut s = snapshot();
        assert_eq!(title(&s), "Now revealing: 3rd place");
        s.revealed_count = 3;
        assert_eq!(title(&s), "Final results");
    }

    #[test]
    fn test_slot_table_marks_stale_ids() {
        let table = slot_table(&snapshot());
        assert!(table.contains("3rd place  (random)"));
        assert!(table.contains("gone (not in the active set"));
        assert!(table.contains("Ada (a)"));
    }

    #[test]
    fn test_podium_placeholders() {
        let mut s = snapshot();
        s.revealed[0] = Some(Candidate::new("b", "Grace", "b.png"));
        let text = podium(&s);

        assert!(text.contains("Grace"));
        assert!(text.contains("Ada"));
        // 2nd place names a missing id
        assert_eq!(text.matches(PLACEHOLDER_NAME).count(), 1);
        assert!(text.find("2nd place") < text.find("1st place"));
        assert!(text.find("1st place") < text.find("3rd place"));
    }

    #[test]
    fn test_candidate_list_shows_slots() {
        let list = candidate_list(&snapshot());
        assert_eq!(list.lines().count(), 2);
        assert!(list.lines().next().unwrap().ends_with("<1st place>"));
    }

    #[test]
    fn test_spin_events_have_no_notice() {
        assert!(event_notice(&MachineEvent::GameReset).is_some());
        assert!(
            event_notice(&MachineEvent::SpinStarted {
                round: 0,
                place: Place::Third
            })
            .is_none()
        );
    }
}
