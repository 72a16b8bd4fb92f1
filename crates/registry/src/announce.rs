//! Course result announcement - the dispatcher's caller
//!
//! Looks up a course's students, mails each their result and shapes the
//! per-student outcomes into a response.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument};

use contracts::{Course, DispatchSummary, Notifier, Outcome, RecordId, ResultNotice};
use dispatcher::{CancellationToken, Dispatcher};

use crate::error::Result;
use crate::store::RecordStore;

/// Outcome for one student
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementEntry {
    pub student_id: RecordId,
    pub email: String,
    pub outcome: Outcome,
}

/// Response for a course announcement
#[derive(Debug, Clone, Serialize)]
pub struct Announcement {
    pub course: Course,
    /// Ordered by student id
    pub results: Vec<AnnouncementEntry>,
    pub summary: DispatchSummary,
    /// Dispatch wall time
    pub elapsed: Duration,
}

/// Mail results to every student of `course_id`
///
/// Per-student failures end up in the entries; only lookup or configuration
/// problems fail the call. Firing `cancel` stops the dispatch early.
#[instrument(
    name = "announce_course_results",
    skip(store, dispatcher, notifier, cancel)
)]
pub async fn announce_course_results<N>(
    store: &RecordStore,
    course_id: RecordId,
    dispatcher: &Dispatcher,
    notifier: Arc<N>,
    cancel: &CancellationToken,
) -> Result<Announcement>
where
    N: Notifier<ResultNotice> + Sync + 'static,
{
    let course = store.get_course(course_id)?;
    let students = store.course_students(course_id)?;

    info!(course = %course, students = students.len(), "Announcing results");

    let notices: Vec<ResultNotice> = students
        .into_iter()
        .map(|s| ResultNotice::new(s, course.clone()))
        .collect();
    let notices: Arc<[ResultNotice]> = notices.into();

    let report = dispatcher
        .send_with_cancel(Arc::clone(&notices), notifier, cancel)
        .await?;

    let results = notices
        .iter()
        .zip(report.outcomes)
        .map(|(notice, outcome)| AnnouncementEntry {
            student_id: notice.student.id,
            email: notice.student.email.clone(),
            outcome,
        })
        .collect();

    Ok(Announcement {
        course,
        results,
        summary: report.summary,
        elapsed: report.elapsed,
    })
}
