use aarambh_core::progress::ProgressSnapshot;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatTileVm {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectRowVm {
    pub subject: String,
    pub lessons_label: String,
    pub completion_percent: u8,
    pub average_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressVm {
    pub tiles: Vec<StatTileVm>,
    pub subjects: Vec<SubjectRowVm>,
}

#[must_use]
pub fn map_progress(snapshot: &ProgressSnapshot) -> ProgressVm {
    let tiles = vec![
        StatTileVm {
            label: "Overall completion",
            value: format!("{}%", snapshot.completion_percent),
        },
        StatTileVm {
            label: "Lessons completed",
            value: format!("{} / {}", snapshot.completed_lessons, snapshot.total_lessons),
        },
        StatTileVm {
            label: "Average quiz score",
            value: format!("{}%", snapshot.average_score),
        },
        StatTileVm {
            label: "Quiz attempts",
            value: snapshot.quiz_attempts.to_string(),
        },
        StatTileVm {
            label: "Current streak",
            value: match snapshot.current_streak {
                1 => "1 day".to_string(),
                n => format!("{n} days"),
            },
        },
        StatTileVm {
            label: "Points",
            value: snapshot.total_points.to_string(),
        },
        StatTileVm {
            label: "Achievements",
            value: snapshot.achievements.to_string(),
        },
    ];

    let subjects = snapshot
        .subjects
        .iter()
        .map(|s| SubjectRowVm {
            subject: s.subject.clone(),
            lessons_label: format!("{} / {} lessons", s.completed, s.total),
            completion_percent: s.completion_percent,
            average_label: if s.attempts == 0 {
                "No quizzes yet".to_string()
            } else {
                format!("Avg. score {}%", s.average_score)
            },
        })
        .collect();

    ProgressVm { tiles, subjects }
}
