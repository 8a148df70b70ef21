use std::sync::Arc;

use super::common::*;
use crate::workflows::assignment::domain::{ApplicationStatus, Team};
use crate::workflows::assignment::{AssignmentService, AssignmentServiceError, GatewayError};

#[test]
fn run_commits_outcomes_and_occupancy() {
    let gateway = MemoryGateway::seeded(
        club_teams(),
        vec![
            applicant("a", 1, &["infra"]).with_additional(&["events"]),
            applicant("b", 2, &["infra", "web"]),
        ],
    );
    let service = service_for(&gateway);

    let report = service.run_at(run_time()).expect("run succeeds");

    assert_eq!(report.summary.assigned, 2);
    assert_eq!(gateway.applicant("a").status, ApplicationStatus::Assigned);
    assert_eq!(
        gateway.applicant("b").assigned_team_id,
        Some(team_id("web"))
    );
    assert_eq!(
        gateway.applicant("b").assignment_reason.as_deref(),
        Some("assigned to Web Platform (web), preference #2; Infrastructure (infra) was full.")
    );
    assert_eq!(gateway.team("infra").occupancy, 1);
    assert_eq!(gateway.team("web").occupancy, 1);
    assert_eq!(gateway.team("events").occupancy, 5);
}

#[test]
fn second_run_finds_nothing_left_to_assign() {
    let gateway = MemoryGateway::seeded(
        club_teams(),
        vec![applicant("a", 1, &["infra"]), applicant("b", 2, &["infra"])],
    );
    let service = service_for(&gateway);

    let first = service.run_at(run_time()).expect("first run");
    let writes_after_first = gateway.outcome_writes().len();
    let second = service.run_at(run_time()).expect("second run");

    assert_eq!(first.summary.total_processed, 2);
    assert!(second.is_empty());
    assert_eq!(gateway.outcome_writes().len(), writes_after_first);
    assert_eq!(gateway.team("infra").occupancy, 1);
}

#[test]
fn deferred_applicants_are_retried_on_the_next_run() {
    let gateway = MemoryGateway::seeded(
        vec![Team::technical("t", "Tooling", 2, 0)],
        vec![applicant("a", 1, &["t"])],
    );
    gateway.fail_occupancy_for("t", 1);
    let service = service_for(&gateway);

    let first = service.run_at(run_time()).expect("first run");
    assert_eq!(first.summary.deferred, 1);
    assert_eq!(gateway.applicant("a").status, ApplicationStatus::Pending);

    let second = service.run_at(run_time()).expect("second run");
    assert_eq!(second.summary.assigned, 1);
    assert_eq!(gateway.team("t").occupancy, 1);
}

#[test]
fn preview_reports_without_writing() {
    let gateway = MemoryGateway::seeded(
        club_teams(),
        vec![applicant("a", 1, &["infra"]).with_additional(&["events"])],
    );
    let service = service_for(&gateway);

    let preview = service.preview().expect("preview succeeds");

    assert_eq!(preview.summary.assigned, 1);
    assert_eq!(preview.summary.additional_enrollments, 1);
    assert!(gateway.outcome_writes().is_empty());
    assert!(gateway.occupancy_writes().is_empty());
    assert!(gateway.enrollments().is_empty());
    assert_eq!(gateway.applicant("a").status, ApplicationStatus::Pending);
}

#[test]
fn unreadable_snapshot_fails_before_processing() {
    let service = AssignmentService::new(Arc::new(UnavailableGateway));

    match service.run() {
        Err(AssignmentServiceError::TeamDirectory(GatewayError::Unavailable(message))) => {
            assert_eq!(message, "database offline")
        }
        other => panic!("expected team directory failure, got {other:?}"),
    }

    assert!(matches!(
        service.preview(),
        Err(AssignmentServiceError::TeamDirectory(_))
    ));
}

#[test]
fn invalid_directory_surfaces_as_service_error() {
    let gateway = MemoryGateway::seeded(
        vec![Team::technical(" ", "Nameless", 1, 0)],
        vec![applicant("a", 1, &["web"])],
    );
    let service = service_for(&gateway);

    match service.run() {
        Err(AssignmentServiceError::Directory(error)) => {
            assert!(error.to_string().contains("Nameless"))
        }
        other => panic!("expected directory error, got {other:?}"),
    }
    assert_eq!(gateway.applicant("a").status, ApplicationStatus::Pending);
}
