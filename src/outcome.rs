use std::fmt;

/// Raw class label produced by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredictionLabel(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Team1Win,
    Team2Win,
    Draw,
}

impl From<PredictionLabel> for Outcome {
    // Binary models only ever produce 0/1; every other label reads as a draw.
    fn from(label: PredictionLabel) -> Self {
        match label.0 {
            1 => Outcome::Team1Win,
            0 => Outcome::Team2Win,
            _ => Outcome::Draw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeMessage {
    pub outcome: Outcome,
    pub label: PredictionLabel,
    pub text: String,
}

impl fmt::Display for OutcomeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn interpret(label: PredictionLabel, team1: &str, team2: &str) -> OutcomeMessage {
    let outcome = Outcome::from(label);
    let text = match outcome {
        Outcome::Team1Win => format!("{team1} wins"),
        Outcome::Team2Win => format!("{team2} wins"),
        Outcome::Draw => format!("Draw between {team1} and {team2}"),
    };
    OutcomeMessage {
        outcome,
        label,
        text,
    }
}

pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Team1Win => "TEAM 1",
        Outcome::Team2Win => "TEAM 2",
        Outcome::Draw => "DRAW",
    }
}
