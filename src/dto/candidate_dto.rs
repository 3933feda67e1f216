use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::candidate::{Candidate, Grade, StageResult};

/// Search and filters of the candidate list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CandidateListQuery {
    /// Substring of username, phone, email or bachelor school.
    pub q: Option<String>,
    pub city: Option<String>,
    pub first_result: Option<StageResult>,
    pub second_result: Option<StageResult>,
    pub hr_result: Option<StageResult>,
    pub first_interviewer: Option<String>,
    pub second_interviewer: Option<String>,
    pub hr_interviewer: Option<String>,
}

impl CandidateListQuery {
    /// Trimmed search text, if any.
    pub fn search_text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn matches(&self, c: &Candidate) -> bool {
        let f = &c.fields;
        if let Some(q) = self.search_text() {
            let needle = q.to_lowercase();
            let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
            let hit = contains(&f.username)
                || contains(&f.phone)
                || f.email.as_deref().is_some_and(|e| contains(e))
                || contains(&f.bachelor_school);
            if !hit {
                return false;
            }
        }

        let exact = |filter: &Option<String>, value: &str| filter.as_deref().map_or(true, |x| x == value);
        exact(&self.city, &f.city)
            && exact(&self.first_interviewer, &f.first_interviewer)
            && exact(&self.second_interviewer, &f.second_interviewer)
            && exact(&self.hr_interviewer, &f.hr_interviewer)
            && self.first_result.map_or(true, |r| f.first_result == Some(r))
            && self.second_result.map_or(true, |r| f.second_result == Some(r))
            && self.hr_result.map_or(true, |r| f.hr_result == Some(r))
    }
}

/// Admin list order: HR, second and first stage results by stored value
/// (unset first), then id.
pub fn admin_order(a: &Candidate, b: &Candidate) -> Ordering {
    let key = |c: &Candidate| {
        (
            c.fields.hr_result.map(|r| r.as_str()),
            c.fields.second_result.map(|r| r.as_str()),
            c.fields.first_result.map(|r| r.as_str()),
            c.id,
        )
    };
    key(a).cmp(&key(b))
}

/// One line of the candidate list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateSummary {
    pub id: i64,
    pub username: String,
    pub city: String,
    pub bachelor_school: String,
    pub first_score: Option<Decimal>,
    pub first_result: Option<StageResult>,
    pub first_interviewer: String,
    pub second_result: Option<StageResult>,
    pub second_interviewer: String,
    pub hr_score: Option<Grade>,
    pub hr_result: Option<StageResult>,
    pub last_editor: Option<String>,
}

impl From<&Candidate> for CandidateSummary {
    fn from(c: &Candidate) -> Self {
        Self {
            id: c.id,
            username: c.fields.username.clone(),
            city: c.fields.city.clone(),
            bachelor_school: c.fields.bachelor_school.clone(),
            first_score: c.fields.first_score,
            first_result: c.fields.first_result,
            first_interviewer: c.fields.first_interviewer.clone(),
            second_result: c.fields.second_result,
            second_interviewer: c.fields.second_interviewer.clone(),
            hr_score: c.fields.hr_score,
            hr_result: c.fields.hr_result,
            last_editor: c.last_editor.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormSection {
    pub title: Option<String>,
    pub fields: Vec<FormField>,
}

/// The candidate editor: labeled values grouped by interview stage, plus the
/// audit fields that are shown but never accepted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CandidateForm {
    pub id: i64,
    pub sections: Vec<FormSection>,
    pub read_only: Vec<FormField>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExportRequest {
    /// Selection in export order. Absent or empty exports everything.
    pub candidate_ids: Option<Vec<i64>>,
}
