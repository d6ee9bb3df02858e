use crate::NameEntry;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// A generated team: a display name plus its members.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    pub members: Vec<NameEntry>,
}

/// Shuffle a copy of the roster and deal it round-robin into `team_count`
/// teams named "Team 1".."Team N". Team sizes differ by at most one.
///
/// The caller guarantees `team_count >= 1` and a roster at least that large.
pub fn split_into_teams<R: Rng>(
    rng: &mut R,
    entries: &[NameEntry],
    team_count: usize,
) -> Vec<Team> {
    let mut pool = entries.to_vec();
    pool.shuffle(rng);

    let mut teams: Vec<Team> = (1..=team_count)
        .map(|i| Team {
            name: format!("Team {}", i),
            members: Vec::new(),
        })
        .collect();

    for (i, entry) in pool.into_iter().enumerate() {
        teams[i % team_count].members.push(entry);
    }

    teams
}
