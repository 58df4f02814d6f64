//! Aggregate counters for the dashboards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{SessionRequest, SessionStatus};

/// Per-status counts over a set of session requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub upcoming: usize,
}

impl SessionStats {
    /// Single pass over `sessions`. `upcoming` uses the same predicate as
    /// [`SessionRequest::is_upcoming`].
    pub fn compute<'a, I>(sessions: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a SessionRequest>,
    {
        sessions.into_iter().fold(Self::default(), |mut stats, session| {
            stats.total += 1;
            match session.status {
                SessionStatus::Pending => stats.pending += 1,
                SessionStatus::Approved => stats.approved += 1,
                SessionStatus::Rejected => stats.rejected += 1,
            }
            if session.is_upcoming(today) {
                stats.upcoming += 1;
            }
            stats
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
}

/// Response body of `GET /api/stats`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub sessions: SessionStats,
    pub users: UserStats,
}
