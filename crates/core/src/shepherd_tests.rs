use super::*;

#[test]
fn exit_code_round_trips_through_numeric_value() {
    for code in 0..=8 {
        let parsed = ShepherdExitCode::from_code(code).unwrap();
        assert_eq!(parsed.code(), code);
    }
    assert!(ShepherdExitCode::from_code(99).is_none());
}

#[test]
fn blocking_codes_match_spec_table() {
    assert!(ShepherdExitCode::Stuck.blocks_issue());
    assert!(ShepherdExitCode::NoChangesNeeded.blocks_issue());
    assert!(ShepherdExitCode::BudgetExhausted.blocks_issue());
    assert!(!ShepherdExitCode::Success.blocks_issue());
    assert!(!ShepherdExitCode::TransientError.blocks_issue());
}

#[test]
fn milestone_before_started_is_rejected() {
    let mut progress = ShepherdProgress::new("task-1", Some(42));
    let err = progress
        .record_milestone(Milestone::Heartbeat {
            phase: "curator".into(),
            epoch_secs: 1,
        })
        .unwrap_err();
    assert_eq!(err, ProgressError::NotStarted("shepherd:heartbeat"));
}

#[test]
fn nothing_may_follow_a_terminal_milestone() {
    let mut progress = ShepherdProgress::new("task-1", Some(42));
    progress
        .record_milestone(Milestone::Started { epoch_secs: 1 })
        .unwrap();
    progress
        .record_milestone(Milestone::Completed {
            exit_code: 0,
            epoch_secs: 2,
        })
        .unwrap();
    assert_eq!(progress.status, ProgressStatus::Completed);
    assert_eq!(progress.exit_code, Some(0));

    let err = progress
        .record_milestone(Milestone::Heartbeat {
            phase: "merge".into(),
            epoch_secs: 3,
        })
        .unwrap_err();
    assert_eq!(err, ProgressError::AlreadyTerminal);
}

#[test]
fn milestones_serialize_with_internally_tagged_type() {
    let milestone = Milestone::PrCreated {
        pr_number: 7,
        epoch_secs: 100,
    };
    let json = serde_json::to_value(&milestone).unwrap();
    assert_eq!(json["type"], "shepherd:pr_created");
    assert_eq!(json["pr_number"], 7);
}
