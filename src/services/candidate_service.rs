use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::database::CandidateRepository;
use crate::dto::candidate_dto::{CandidateForm, CandidateListQuery, FormField, FormSection};
use crate::error::{Error, Result};
use crate::models::candidate::{
    label_for, AuditStamp, Candidate, CandidateFields, FIELDSETS, READ_ONLY_FIELDS,
};
use crate::utils::time::now;

#[derive(Clone)]
pub struct CandidateService {
    repo: Arc<dyn CandidateRepository>,
}

impl CandidateService {
    pub fn new(repo: Arc<dyn CandidateRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_candidate(&self, id: i64) -> Result<Candidate> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", id)))
    }

    /// Creates a candidate from the editor; the acting user becomes creator.
    pub async fn create_candidate(
        &self,
        fields: CandidateFields,
        acting_user: &str,
    ) -> Result<Candidate> {
        fields.validate()?;
        let candidate = self
            .repo
            .insert(&fields, &AuditStamp::by(acting_user, now()))
            .await?;
        info!(id = candidate.id, user = acting_user, "Candidate created");
        Ok(candidate)
    }

    /// Replaces the editable fields and saves. Audit fields follow the save
    /// rules in [`Candidate::stamp_save`].
    pub async fn save_candidate(
        &self,
        id: i64,
        fields: CandidateFields,
        acting_user: &str,
    ) -> Result<Candidate> {
        fields.validate()?;
        let mut candidate = self.get_candidate(id).await?;
        candidate.fields = fields;
        candidate.stamp_save(acting_user, now());
        let saved = self.repo.update(&candidate).await?;
        info!(id = saved.id, user = acting_user, "Candidate saved");
        Ok(saved)
    }

    /// Candidates matching `query`, ordered by HR, second and first stage
    /// results (unset first), then id.
    pub async fn list_candidates(&self, query: &CandidateListQuery) -> Result<Vec<Candidate>> {
        self.repo.search(query).await
    }

    /// Resolves an export selection. Order follows `ids`; ids that do not
    /// exist are skipped. No ids means every candidate in list order.
    pub async fn select_for_export(&self, ids: Option<&[i64]>) -> Result<Vec<Candidate>> {
        match ids {
            Some(ids) if !ids.is_empty() => self.repo.get_many(ids).await,
            _ => self.list_candidates(&CandidateListQuery::default()).await,
        }
    }

    pub async fn candidate_form(&self, id: i64) -> Result<CandidateForm> {
        let candidate = self.get_candidate(id).await?;
        build_form(&candidate)
    }
}

fn form_field(candidate: &Candidate, name: &str) -> Result<FormField> {
    Ok(FormField {
        name: name.to_string(),
        label: label_for(name)?.to_string(),
        value: candidate.display_value(name)?,
    })
}

pub fn build_form(candidate: &Candidate) -> Result<CandidateForm> {
    let sections = FIELDSETS
        .iter()
        .map(|(title, names)| {
            let fields = names
                .iter()
                .map(|name| form_field(candidate, name))
                .collect::<Result<Vec<_>>>()?;
            Ok(FormSection {
                title: title.map(str::to_string),
                fields,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let read_only = READ_ONLY_FIELDS
        .iter()
        .map(|name| form_field(candidate, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(CandidateForm {
        id: candidate.id,
        sections,
        read_only,
        created_date: candidate.created_date,
        modified_date: candidate.modified_date,
    })
}
