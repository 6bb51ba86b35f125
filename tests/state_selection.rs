use outcome_terminal::AppContext;
use outcome_terminal::catalog::{CatalogRow, CategoryCatalog};
use outcome_terminal::encoding::{EncodedFeatureRecord, FeatureField};
use outcome_terminal::model::PredictionModel;
use outcome_terminal::outcome::{Outcome, PredictionLabel};
use outcome_terminal::state::{AppState, Focus, Submission};

struct AlwaysDraw;

impl PredictionModel for AlwaysDraw {
    fn predict(&self, _record: &EncodedFeatureRecord) -> PredictionLabel {
        PredictionLabel(2)
    }
}

fn catalog() -> CategoryCatalog {
    CategoryCatalog::from_rows(vec![
        CatalogRow::new("Sunny", "India", "Australia", "Delhi"),
        CatalogRow::new("Rainy", "England", "India", "Mumbai"),
    ])
}

#[test]
fn starts_with_two_different_teams() {
    let state = AppState::from_catalog(&catalog(), 1000);
    let team1 = state.selector(FeatureField::Team1).unwrap().value();
    let team2 = state.selector(FeatureField::Team2).unwrap().value();
    assert_eq!(team1, Some("Australia"));
    assert_eq!(team2, Some("England"));
}

#[test]
fn focus_wraps_in_both_directions() {
    let mut state = AppState::from_catalog(&catalog(), 1000);
    assert_eq!(state.focus, Focus::Weather);
    state.focus_prev();
    assert_eq!(state.focus, Focus::Attendance);
    state.focus_next();
    state.focus_next();
    assert_eq!(state.focus, Focus::Team1);
}

#[test]
fn cycling_a_selector_wraps() {
    let mut state = AppState::from_catalog(&catalog(), 1000);
    state.focus = Focus::Location;
    state.cycle_prev();
    assert_eq!(
        state.selector(FeatureField::Location).unwrap().value(),
        Some("Mumbai")
    );
    state.cycle_next();
    assert_eq!(
        state.selector(FeatureField::Location).unwrap().value(),
        Some("Delhi")
    );
}

#[test]
fn attendance_steps_and_digits() {
    let mut state = AppState::from_catalog(&catalog(), 1000);
    state.push_attendance_digit('5');
    assert!(state.attendance_input.is_empty(), "digits only go to attendance");

    state.focus = Focus::Attendance;
    state.cycle_prev();
    assert_eq!(state.attendance_input, "");
    state.cycle_next();
    state.cycle_next();
    assert_eq!(state.attendance_input, "2000");

    state.push_attendance_digit('7');
    assert_eq!(state.attendance_input, "20007");
    state.pop_attendance_digit();
    state.cycle_prev();
    assert_eq!(state.attendance_input, "1000");

    for _ in 0..20 {
        state.push_attendance_digit('9');
    }
    assert_eq!(state.attendance_input.len(), 9);
}

#[test]
fn submit_records_prediction() {
    let catalog = catalog();
    let mut state = AppState::from_catalog(&catalog, 1000);
    let ctx = AppContext::new(catalog, Box::new(AlwaysDraw)).unwrap_or_else(|err| panic!("{err}"));

    state.submit(&ctx);
    assert_eq!(state.submissions, 1);
    match &state.last_submission {
        Some(Submission::Predicted(msg)) => {
            assert_eq!(msg.outcome, Outcome::Draw);
            assert_eq!(msg.text, "Draw between Australia and England");
        }
        other => panic!("unexpected submission: {other:?}"),
    }
}

#[test]
fn same_team_submission_warns_but_predicts() {
    let catalog = catalog();
    let mut state = AppState::from_catalog(&catalog, 1000);
    let ctx = AppContext::new(catalog, Box::new(AlwaysDraw)).unwrap_or_else(|err| panic!("{err}"));

    state.selector_mut(FeatureField::Team2).unwrap().select_value("Australia");
    state.submit(&ctx);

    assert!(matches!(
        state.last_submission,
        Some(Submission::Predicted(_))
    ));
    assert!(state.logs.iter().any(|line| line.contains("[WARN]")));
}

#[test]
fn stale_selection_is_rejected() {
    let catalog = catalog();
    let mut state = AppState::from_catalog(&catalog, 1000);
    let ctx = AppContext::new(catalog, Box::new(AlwaysDraw)).unwrap_or_else(|err| panic!("{err}"));

    state.selector_mut(FeatureField::Weather).unwrap().options[0] = "Stormy".to_string();
    state.submit(&ctx);

    match &state.last_submission {
        Some(Submission::Rejected(reason)) => assert!(reason.contains("Stormy")),
        other => panic!("unexpected submission: {other:?}"),
    }
}
