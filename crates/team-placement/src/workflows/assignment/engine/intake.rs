use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::super::domain::{ApplicantId, ApplicantRecord};

/// Pending applicant that passed intake validation, with its timestamp resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueuedApplicant<'a> {
    pub(crate) record: &'a ApplicantRecord,
    pub(crate) submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RejectedApplicant {
    pub(crate) applicant_id: ApplicantId,
    pub(crate) problem: String,
}

/// Split the pool into a first-come-first-served queue and rows that cannot be processed.
///
/// Non-pending applicants are ignored entirely. The queue is ordered by submission time,
/// then applicant id.
pub(crate) fn pending_queue(
    applicants: &[ApplicantRecord],
) -> (Vec<QueuedApplicant<'_>>, Vec<RejectedApplicant>) {
    let mut queue = Vec::new();
    let mut rejected = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for record in applicants.iter().filter(|record| record.is_pending()) {
        let id = record.id.0.trim();
        if id.is_empty() {
            rejected.push(RejectedApplicant {
                applicant_id: record.id.clone(),
                problem: "missing applicant id".to_string(),
            });
            continue;
        }
        if !seen.insert(id) {
            rejected.push(RejectedApplicant {
                applicant_id: record.id.clone(),
                problem: "applicant id appears more than once in the pool".to_string(),
            });
            continue;
        }
        let Some(submitted_at) = record.submitted_at else {
            rejected.push(RejectedApplicant {
                applicant_id: record.id.clone(),
                problem: "missing submission timestamp".to_string(),
            });
            continue;
        };

        queue.push(QueuedApplicant {
            record,
            submitted_at,
        });
    }

    queue.sort_by(|left, right| {
        left.submitted_at
            .cmp(&right.submitted_at)
            .then_with(|| left.record.id.cmp(&right.record.id))
    });

    (queue, rejected)
}
