use outcome_terminal::outcome::{Outcome, PredictionLabel, interpret, outcome_label};

#[test]
fn label_one_means_team1_wins() {
    let msg = interpret(PredictionLabel(1), "India", "Australia");
    assert_eq!(msg.outcome, Outcome::Team1Win);
    assert_eq!(msg.to_string(), "India wins");
}

#[test]
fn label_zero_means_team2_wins() {
    let msg = interpret(PredictionLabel(0), "India", "Australia");
    assert_eq!(msg.outcome, Outcome::Team2Win);
    assert_eq!(msg.text, "Australia wins");
}

#[test]
fn any_other_label_is_a_draw() {
    for label in [2, -1, 7] {
        let msg = interpret(PredictionLabel(label), "India", "Australia");
        assert_eq!(msg.outcome, Outcome::Draw);
        assert_eq!(msg.text, "Draw between India and Australia");
        assert_eq!(msg.label, PredictionLabel(label));
    }
    assert_eq!(outcome_label(Outcome::Draw), "DRAW");
}
