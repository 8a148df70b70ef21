//! End-to-end assignment runs through the public service facade and HTTP router.
//!
//! The gateway here is a keyed in-memory store so the scenarios can check what was
//! durably written after each run.

mod common {
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    use chrono::{DateTime, TimeZone, Utc};

    use team_placement::workflows::assignment::{
        AdditionalEnrollment, ApplicantId, ApplicantOutcome, ApplicantRecord, ApplicationStatus,
        GatewayError, PersistenceGateway, Team, TeamId,
    };

    pub(super) fn submitted(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, day, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn cohort_teams() -> Vec<Team> {
        vec![
            Team::technical("frontend", "Frontend", 2, 0),
            Team::technical("backend", "Backend", 1, 0),
            Team::technical("devops", "DevOps", 1, 1),
            Team::constant("mentoring", "Mentoring Circle", 3, 0),
            Team::constant("design-review", "Design Review", 1, 0),
        ]
    }

    #[derive(Default)]
    pub(super) struct StoreGateway {
        teams: Mutex<BTreeMap<TeamId, Team>>,
        applicants: Mutex<BTreeMap<ApplicantId, ApplicantRecord>>,
        enrollments: Mutex<HashSet<AdditionalEnrollment>>,
    }

    impl StoreGateway {
        pub(super) fn new(teams: Vec<Team>, applicants: Vec<ApplicantRecord>) -> Self {
            let gateway = Self::default();
            {
                let mut stored = gateway.teams.lock().expect("teams mutex poisoned");
                for team in teams {
                    stored.insert(team.id.clone(), team);
                }
            }
            {
                let mut stored = gateway.applicants.lock().expect("applicants mutex poisoned");
                for record in applicants {
                    stored.insert(record.id.clone(), record);
                }
            }
            gateway
        }

        pub(super) fn occupancy(&self, id: &str) -> u32 {
            self.teams
                .lock()
                .expect("teams mutex poisoned")
                .get(&TeamId(id.to_string()))
                .map(|team| team.occupancy)
                .expect("team stored")
        }

        pub(super) fn record(&self, id: &str) -> ApplicantRecord {
            self.applicants
                .lock()
                .expect("applicants mutex poisoned")
                .get(&ApplicantId(id.to_string()))
                .cloned()
                .expect("applicant stored")
        }

        pub(super) fn is_enrolled(&self, applicant: &str, team: &str) -> bool {
            self.enrollments
                .lock()
                .expect("enrollments mutex poisoned")
                .contains(&AdditionalEnrollment {
                    applicant_id: ApplicantId(applicant.to_string()),
                    team_id: TeamId(team.to_string()),
                })
        }

        pub(super) fn add_applicant(&self, record: ApplicantRecord) {
            self.applicants
                .lock()
                .expect("applicants mutex poisoned")
                .insert(record.id.clone(), record);
        }
    }

    impl PersistenceGateway for StoreGateway {
        fn load_teams(&self) -> Result<Vec<Team>, GatewayError> {
            Ok(self
                .teams
                .lock()
                .expect("teams mutex poisoned")
                .values()
                .cloned()
                .collect())
        }

        fn load_pending_applicants(&self) -> Result<Vec<ApplicantRecord>, GatewayError> {
            Ok(self
                .applicants
                .lock()
                .expect("applicants mutex poisoned")
                .values()
                .filter(|record| record.status == ApplicationStatus::Pending)
                .cloned()
                .collect())
        }

        fn record_outcome(&self, outcome: &ApplicantOutcome) -> Result<(), GatewayError> {
            let mut applicants = self.applicants.lock().expect("applicants mutex poisoned");
            let record = applicants
                .get_mut(&outcome.applicant_id)
                .ok_or_else(|| GatewayError::NotFound(outcome.applicant_id.to_string()))?;
            record.status = outcome.status;
            record.assigned_team_id = outcome.assigned_team_id.clone();
            record.assignment_reason = Some(outcome.assignment_reason.clone());
            Ok(())
        }

        fn set_occupancy(&self, team_id: &TeamId, occupancy: u32) -> Result<(), GatewayError> {
            let mut teams = self.teams.lock().expect("teams mutex poisoned");
            let team = teams
                .get_mut(team_id)
                .ok_or_else(|| GatewayError::NotFound(team_id.to_string()))?;
            team.occupancy = occupancy;
            Ok(())
        }

        fn enroll_additional(
            &self,
            enrollment: &AdditionalEnrollment,
        ) -> Result<(), GatewayError> {
            let mut enrollments = self.enrollments.lock().expect("enrollments mutex poisoned");
            if !enrollments.insert(enrollment.clone()) {
                return Err(GatewayError::Duplicate(enrollment.team_id.to_string()));
            }
            Ok(())
        }
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use serde_json::Value;
use team_placement::workflows::assignment::{
    assignment_router, ApplicantRecord, ApplicationStatus, AssignmentService, DecisionStatus,
    TeamId,
};
use tower::ServiceExt;

fn cohort() -> Vec<ApplicantRecord> {
    vec![
        ApplicantRecord::pending("ana", submitted(1, 9))
            .with_preferences(&["backend", "frontend"])
            .with_additional(&["mentoring", "design-review"]),
        ApplicantRecord::pending("ben", submitted(1, 10))
            .with_preferences(&["backend", "devops", "frontend"])
            .with_additional(&["design-review"]),
        ApplicantRecord::pending("cai", submitted(1, 11))
            .with_preferences(&["devops", "backend"])
            .with_additional(&["mentoring"]),
        ApplicantRecord::pending("dee", submitted(2, 8))
            .with_preferences(&["frontend"])
            .without_availability(),
        ApplicantRecord::pending("eli", submitted(2, 9)).with_preferences(&["frontend"]),
        ApplicantRecord::pending("fay", submitted(2, 10)).with_preferences(&["frontend"]),
    ]
}

#[test]
fn cohort_run_places_by_arrival_and_preference() {
    let gateway = Arc::new(StoreGateway::new(cohort_teams(), cohort()));
    let service = AssignmentService::new(gateway.clone());

    let report = service.run().expect("run succeeds");

    let placements: Vec<(&str, Option<&str>)> = report
        .decisions
        .iter()
        .map(|decision| {
            (
                decision.applicant_id.0.as_str(),
                decision.assigned_team_id.as_ref().map(|id| id.0.as_str()),
            )
        })
        .collect();
    assert_eq!(
        placements,
        vec![
            ("ana", Some("backend")),
            ("ben", Some("frontend")),
            ("cai", None),
            ("dee", None),
            ("eli", Some("frontend")),
            ("fay", None),
        ]
    );

    assert_eq!(gateway.occupancy("backend"), 1);
    assert_eq!(gateway.occupancy("frontend"), 2);
    assert_eq!(gateway.occupancy("devops"), 1);

    assert!(gateway.is_enrolled("ana", "mentoring"));
    assert!(gateway.is_enrolled("ana", "design-review"));
    assert!(!gateway.is_enrolled("ben", "design-review"));
    assert!(!gateway.is_enrolled("cai", "mentoring"));
    assert_eq!(gateway.occupancy("mentoring"), 1);
    assert_eq!(gateway.occupancy("design-review"), 1);

    let ben = gateway.record("ben");
    assert_eq!(ben.status, ApplicationStatus::Assigned);
    assert_eq!(ben.assigned_team_id, Some(TeamId("frontend".to_string())));
    assert_eq!(
        ben.assignment_reason.as_deref(),
        Some("assigned to Frontend (frontend), preference #3; Backend (backend), DevOps (devops) were full.")
    );

    let dee = gateway.record("dee");
    assert_eq!(dee.status, ApplicationStatus::Waitlisted);
    assert_eq!(
        dee.assignment_reason.as_deref(),
        Some("no time availability provided.")
    );

    assert_eq!(report.summary.assigned, 3);
    assert_eq!(report.summary.waitlisted, 3);
    assert_eq!(report.summary.additional_enrollments, 2);
}

#[test]
fn late_applicants_are_picked_up_by_a_follow_up_run() {
    let gateway = Arc::new(StoreGateway::new(cohort_teams(), cohort()));
    let service = AssignmentService::new(gateway.clone());
    service.run().expect("first run");

    gateway.add_applicant(
        ApplicantRecord::pending("gus", submitted(3, 9)).with_preferences(&["frontend", "backend"]),
    );
    let report = service.run().expect("second run");

    assert_eq!(report.summary.total_processed, 1);
    let decision = report.decision_for("gus").expect("decision for gus");
    assert_eq!(decision.status, DecisionStatus::Waitlisted);
    assert_eq!(
        decision.reasoning,
        "all preferred teams were full (Frontend (frontend), Backend (backend))."
    );
    assert_eq!(gateway.record("ana").status, ApplicationStatus::Assigned);
}

#[tokio::test]
async fn preview_then_run_over_http() {
    let gateway = Arc::new(StoreGateway::new(cohort_teams(), cohort()));
    let router = assignment_router(Arc::new(AssignmentService::new(gateway.clone())));

    let preview = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/assignments/preview")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(gateway.occupancy("frontend"), 0);
    assert_eq!(gateway.record("ana").status, ApplicationStatus::Pending);

    let run = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/assignments/run")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(run.status(), StatusCode::OK);

    let body = axum::body::to_bytes(run.into_body(), 256 * 1024)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(payload["summary"]["total_processed"], 6);
    assert_eq!(payload["capacity_after"][0]["team_id"], "backend");
    assert_eq!(payload["capacity_after"][0]["remaining"], 0);
    assert_eq!(gateway.occupancy("frontend"), 2);
}
