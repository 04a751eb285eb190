//! Per-frame team aggregates
//!
//! Economy series (gold, experience) reduced over each team's five players,
//! and per-frame event tallies for kills, destroyed structures and elite
//! monsters. Every output row or column triple is laid out as
//! `[team 0, team 1, team 0 - team 1]`.

use crate::features::categories::{MonsterKind, TowerTier};
use crate::{Event, FeatureError, Frame, ParticipantFrame, Result, TeamSide, TimelineRecord};
use crate::{NUM_PARTICIPANTS, TEAM_SIZE};
use ndarray::{s, Array1, Array2, Array3, ArrayView1, Axis};

/// Rows of an event matrix: team 0, team 1, difference
pub const TEAM_ROWS: usize = 3;

/// Per-participant value tracked in every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    CurrentGold,
    TotalGold,
    Xp,
}

impl Metric {
    pub fn read(self, frame: &ParticipantFrame) -> f64 {
        match self {
            Metric::CurrentGold => frame.current_gold as f64,
            Metric::TotalGold => frame.total_gold as f64,
            Metric::Xp => frame.xp as f64,
        }
    }
}

/// How a team's five values collapse into one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Team total
    Sum,
    /// Best single player on the team
    Max,
}

impl Reduction {
    pub fn apply(self, values: ArrayView1<f64>) -> f64 {
        match self {
            Reduction::Sum => values.sum(),
            Reduction::Max => values.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)),
        }
    }
}

/// One metric reduced per team for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamAggregate {
    pub team0: f64,
    pub team1: f64,
}

impl TeamAggregate {
    /// Reduce a row of participant values laid out positionally
    pub fn from_participants(values: ArrayView1<f64>, reduction: Reduction) -> Self {
        TeamAggregate {
            team0: reduction.apply(values.slice(s![..TEAM_SIZE])),
            team1: reduction.apply(values.slice(s![TEAM_SIZE..])),
        }
    }

    pub fn diff(&self) -> f64 {
        self.team0 - self.team1
    }

    pub fn to_row(&self) -> [f64; TEAM_ROWS] {
        [self.team0, self.team1, self.diff()]
    }
}

/// Metric values for every participant, shaped [frame, participant]
pub fn participant_matrix(timeline: &TimelineRecord, metric: Metric) -> Result<Array2<f64>> {
    let mut values = Array2::zeros((timeline.frames.len(), NUM_PARTICIPANTS));
    for (f, frame) in timeline.frames.iter().enumerate() {
        for p in 0..NUM_PARTICIPANTS {
            values[[f, p]] = metric.read(frame.participant(p + 1)?);
        }
    }
    Ok(values)
}

/// Team series from a [frame, participant] matrix, shaped [frame, 3]
pub fn team_series(participants: &Array2<f64>, reduction: Reduction) -> Array2<f64> {
    let mut series = Array2::zeros((participants.nrows(), TEAM_ROWS));
    for (row, mut out) in participants
        .axis_iter(Axis(0))
        .zip(series.axis_iter_mut(Axis(0)))
    {
        let aggregate = TeamAggregate::from_participants(row, reduction);
        out.assign(&Array1::from(aggregate.to_row().to_vec()));
    }
    series
}

/// Team series of one metric over the whole timeline, shaped [frame, 3]
pub fn aggregate_metric(
    timeline: &TimelineRecord,
    metric: Metric,
    reduction: Reduction,
) -> Result<Array2<f64>> {
    let participants = participant_matrix(timeline, metric)?;
    Ok(team_series(&participants, reduction))
}

/// Count events of one frame into a [3, width] matrix.
///
/// `classify` returns the acting team and column for events it counts and
/// `None` for everything else. Row 2 is filled once the frame is tallied.
fn tally_frame<F>(frame: &Frame, width: usize, classify: F) -> Result<Array2<f64>>
where
    F: Fn(&Event) -> Result<Option<(TeamSide, usize)>>,
{
    let mut counts = Array2::zeros((TEAM_ROWS, width));
    for event in &frame.events {
        if let Some((side, column)) = classify(event)? {
            counts[[side.index(), column]] += 1.0;
        }
    }
    let diff = &counts.row(0) - &counts.row(1);
    counts.row_mut(2).assign(&diff);
    Ok(counts)
}

fn classify_kill(event: &Event) -> Result<Option<(TeamSide, usize)>> {
    Ok(match event {
        Event::ChampionKill { killer_id } => Some((TeamSide::from_actor(*killer_id), 0)),
        _ => None,
    })
}

fn classify_building(event: &Event) -> Result<Option<(TeamSide, usize)>> {
    match event {
        Event::BuildingKill {
            killer_id,
            tower_type,
            ..
        } => {
            let tier: TowerTier = tower_type
                .as_deref()
                .ok_or_else(|| FeatureError::missing("towerType"))?
                .parse()?;
            Ok(Some((TeamSide::from_actor(*killer_id), tier.index())))
        }
        _ => Ok(None),
    }
}

fn classify_monster(event: &Event) -> Result<Option<(TeamSide, usize)>> {
    match event {
        Event::EliteMonsterKill {
            killer_id,
            monster_type,
            monster_sub_type,
        } => {
            let kind = MonsterKind::resolve(monster_type, monster_sub_type.as_deref())?;
            Ok(Some((TeamSide::from_actor(*killer_id), kind.index())))
        }
        _ => Ok(None),
    }
}

/// Kills in one frame as `[team 0, team 1, difference]`
pub fn kills_in_frame(frame: &Frame) -> Result<Array1<f64>> {
    let counts = tally_frame(frame, 1, classify_kill)?;
    Ok(counts.column(0).to_owned())
}

/// Structures destroyed in one frame, shaped [3, tower tier]
pub fn buildings_in_frame(frame: &Frame) -> Result<Array2<f64>> {
    tally_frame(frame, TowerTier::COUNT, classify_building)
}

/// Elite monsters killed in one frame, shaped [3, monster kind]
pub fn monsters_in_frame(frame: &Frame) -> Result<Array2<f64>> {
    tally_frame(frame, MonsterKind::COUNT, classify_monster)
}

/// Kills per frame, shaped [frame, 3]
pub fn kills_by_frame(timeline: &TimelineRecord) -> Result<Array2<f64>> {
    let mut kills = Array2::zeros((timeline.frames.len(), TEAM_ROWS));
    for (frame, mut row) in timeline.frames.iter().zip(kills.axis_iter_mut(Axis(0))) {
        row.assign(&kills_in_frame(frame)?);
    }
    Ok(kills)
}

fn stack_frames<F>(timeline: &TimelineRecord, width: usize, per_frame: F) -> Result<Array3<f64>>
where
    F: Fn(&Frame) -> Result<Array2<f64>>,
{
    let mut stacked = Array3::zeros((timeline.frames.len(), TEAM_ROWS, width));
    for (frame, mut slot) in timeline.frames.iter().zip(stacked.axis_iter_mut(Axis(0))) {
        slot.assign(&per_frame(frame)?);
    }
    Ok(stacked)
}

/// Structures destroyed per frame, shaped [frame, 3, 5]
pub fn buildings_by_frame(timeline: &TimelineRecord) -> Result<Array3<f64>> {
    stack_frames(timeline, TowerTier::COUNT, buildings_in_frame)
}

/// Elite monsters killed per frame, shaped [frame, 3, 7]
pub fn monsters_by_frame(timeline: &TimelineRecord) -> Result<Array3<f64>> {
    stack_frames(timeline, MonsterKind::COUNT, monsters_in_frame)
}

/// Every per-frame series of one match
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAggregates {
    pub current_gold: Array2<f64>,
    pub total_gold: Array2<f64>,
    pub xp: Array2<f64>,
    pub max_current_gold: Array2<f64>,
    pub max_total_gold: Array2<f64>,
    pub max_xp: Array2<f64>,
    pub kills: Array2<f64>,
    pub buildings: Array3<f64>,
    pub monsters: Array3<f64>,
    pub num_frames: usize,
}

impl FrameAggregates {
    pub fn from_timeline(timeline: &TimelineRecord) -> Result<Self> {
        let current = participant_matrix(timeline, Metric::CurrentGold)?;
        let total = participant_matrix(timeline, Metric::TotalGold)?;
        let xp = participant_matrix(timeline, Metric::Xp)?;

        Ok(FrameAggregates {
            current_gold: team_series(&current, Reduction::Sum),
            total_gold: team_series(&total, Reduction::Sum),
            xp: team_series(&xp, Reduction::Sum),
            max_current_gold: team_series(&current, Reduction::Max),
            max_total_gold: team_series(&total, Reduction::Max),
            max_xp: team_series(&xp, Reduction::Max),
            kills: kills_by_frame(timeline)?,
            buildings: buildings_by_frame(timeline)?,
            monsters: monsters_by_frame(timeline)?,
            num_frames: timeline.frames.len(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Frame where participant `p` has `p * scale` of every metric
    pub(crate) fn make_frame(scale: i64, events: Vec<Event>) -> Frame {
        let participant_frames: BTreeMap<String, ParticipantFrame> = (1..=NUM_PARTICIPANTS as i64)
            .map(|p| {
                (
                    p.to_string(),
                    ParticipantFrame {
                        current_gold: p * scale,
                        total_gold: 2 * p * scale,
                        xp: 3 * p * scale,
                    },
                )
            })
            .collect();
        Frame {
            timestamp: 0,
            participant_frames,
            events,
        }
    }

    pub(crate) fn make_timeline(frames: Vec<Frame>) -> TimelineRecord {
        TimelineRecord {
            frames,
        }
    }

    fn tower(killer_id: i64, tier: &str) -> Event {
        Event::BuildingKill {
            killer_id,
            building_type: Some("TOWER_BUILDING".to_string()),
            tower_type: Some(tier.to_string()),
        }
    }

    fn monster(killer_id: i64, monster_type: &str, sub_type: Option<&str>) -> Event {
        Event::EliteMonsterKill {
            killer_id,
            monster_type: monster_type.to_string(),
            monster_sub_type: sub_type.map(str::to_string),
        }
    }

    #[test]
    fn test_team_sum_and_max() {
        let timeline = make_timeline(vec![make_frame(1, vec![]), make_frame(10, vec![])]);

        let sums = aggregate_metric(&timeline, Metric::CurrentGold, Reduction::Sum).unwrap();
        assert_eq!(sums.dim(), (2, 3));
        // 1+2+3+4+5 = 15, 6+7+8+9+10 = 40
        assert_eq!(sums.row(0).to_vec(), vec![15.0, 40.0, -25.0]);
        assert_eq!(sums.row(1).to_vec(), vec![150.0, 400.0, -250.0]);

        let maxes = aggregate_metric(&timeline, Metric::Xp, Reduction::Max).unwrap();
        assert_eq!(maxes.row(0).to_vec(), vec![15.0, 30.0, -15.0]);
    }

    #[test]
    fn test_diff_column_exact() {
        let timeline = make_timeline(vec![
            make_frame(7, vec![]),
            make_frame(13, vec![]),
            make_frame(1, vec![]),
        ]);
        let aggregates = FrameAggregates::from_timeline(&timeline).unwrap();
        for series in [
            &aggregates.current_gold,
            &aggregates.total_gold,
            &aggregates.xp,
            &aggregates.max_current_gold,
            &aggregates.max_total_gold,
            &aggregates.max_xp,
        ] {
            for row in series.axis_iter(Axis(0)) {
                assert_eq!(row[2], row[0] - row[1]);
            }
        }
    }

    #[test]
    fn test_kills_by_frame() {
        let kills: Vec<Event> = (1..=5)
            .map(|killer_id| Event::ChampionKill { killer_id })
            .collect();
        let timeline = make_timeline(vec![make_frame(1, kills), make_frame(1, vec![])]);

        let by_frame = kills_by_frame(&timeline).unwrap();
        assert_eq!(by_frame.row(0).to_vec(), vec![5.0, 0.0, 5.0]);
        assert_eq!(by_frame.row(1).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_kills_ignore_other_events() {
        let frame = make_frame(
            1,
            vec![
                Event::ChampionKill { killer_id: 8 },
                Event::Other,
                tower(2, "INNER_TURRET"),
                Event::ChampionKill { killer_id: 9 },
            ],
        );
        assert_eq!(kills_in_frame(&frame).unwrap().to_vec(), vec![0.0, 2.0, -2.0]);
    }

    #[test]
    fn test_outer_turret_by_red() {
        let timeline = make_timeline(vec![make_frame(1, vec![tower(7, "OUTER_TURRET")])]);
        let buildings = buildings_by_frame(&timeline).unwrap();

        assert_eq!(buildings.dim(), (1, 3, 5));
        assert_eq!(buildings[[0, 1, 0]], 1.0);
        assert_eq!(buildings[[0, 0, 0]], 0.0);
        assert_eq!(buildings[[0, 2, 0]], -1.0);
    }

    #[test]
    fn test_event_rows_per_frame() {
        let timeline = make_timeline(vec![
            make_frame(
                1,
                vec![
                    tower(1, "OUTER_TURRET"),
                    tower(2, "OUTER_TURRET"),
                    tower(9, "NEXUS_TURRET"),
                    monster(3, "DRAGON", Some("FIRE_DRAGON")),
                ],
            ),
            make_frame(
                1,
                vec![
                    tower(6, "BASE_TURRET"),
                    monster(10, "BARON_NASHOR", None),
                    monster(4, "RIFTHERALD", None),
                ],
            ),
        ]);
        let buildings = buildings_by_frame(&timeline).unwrap();
        let monsters = monsters_by_frame(&timeline).unwrap();

        // No carry-over from frame 0 into frame 1
        assert_eq!(buildings[[1, 0, 0]], 0.0);
        assert_eq!(buildings[[0, 0, 0]], 2.0);
        assert_eq!(buildings[[0, 2, 4]], -1.0);
        assert_eq!(buildings[[1, 2, 2]], -1.0);
        assert_eq!(monsters[[0, 0, MonsterKind::FireDragon.index()]], 1.0);
        assert_eq!(monsters[[1, 1, MonsterKind::Baron.index()]], 1.0);
        assert_eq!(monsters[[1, 2, MonsterKind::RiftHerald.index()]], 1.0);

        for matrix in buildings.axis_iter(Axis(0)).chain(monsters.axis_iter(Axis(0))) {
            let expected = &matrix.row(0) - &matrix.row(1);
            assert_eq!(matrix.row(2), expected);
        }
    }

    #[test]
    fn test_unknown_tower_tier_fails() {
        let timeline = make_timeline(vec![make_frame(1, vec![tower(1, "SIDE_TURRET")])]);
        let err = buildings_by_frame(&timeline).unwrap_err();
        assert!(matches!(err, FeatureError::UnknownCategory { .. }));
    }

    #[test]
    fn test_missing_participant_frame() {
        let mut frame = make_frame(1, vec![]);
        frame.participant_frames.remove("10");
        let timeline = make_timeline(vec![frame]);
        assert!(matches!(
            FrameAggregates::from_timeline(&timeline),
            Err(FeatureError::MissingField { .. })
        ));
    }

    #[test]
    fn test_empty_timeline() {
        let aggregates = FrameAggregates::from_timeline(&make_timeline(vec![])).unwrap();
        assert_eq!(aggregates.num_frames, 0);
        assert_eq!(aggregates.kills.dim(), (0, 3));
        assert_eq!(aggregates.monsters.dim(), (0, 3, 7));
    }
}
