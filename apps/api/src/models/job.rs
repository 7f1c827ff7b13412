use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated job posting ready for insert.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
}

/// Field-level merge: `None` (absent or null) keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
}

impl JobPatch {
    /// In-memory counterpart of the COALESCE update in `PgStore`.
    #[cfg(test)]
    pub fn apply(self, job: &mut Job) {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(company) = self.company {
            job.company = company;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(skills) = self.required_skills {
            job.required_skills = skills;
        }
        if let Some(location) = self.location {
            job.location = Some(location);
        }
        if let Some(job_type) = self.job_type {
            job.job_type = Some(job_type);
        }
        if let Some(category) = self.category {
            job.category = Some(category);
        }
        if let Some(language) = self.language {
            job.language = Some(language);
        }
    }
}

/// Query-string filters for the public job listing. All present filters are ANDed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    /// Case-insensitive substring over title, company and description.
    pub search: Option<String>,
}

impl JobFilter {
    /// Drops blank values so `?location=` behaves like no filter at all.
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            location: keep(self.location),
            job_type: keep(self.job_type),
            category: keep(self.category),
            language: keep(self.language),
            search: keep(self.search),
        }
    }

    /// In-memory counterpart of the optional-filter query in `PgStore`.
    #[cfg(test)]
    pub fn matches(&self, job: &Job) -> bool {
        fn eq(filter: &Option<String>, value: &Option<String>) -> bool {
            match filter {
                Some(f) => value.as_deref() == Some(f.as_str()),
                None => true,
            }
        }

        let search_hit = match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                [&job.title, &job.company, &job.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        };

        eq(&self.location, &job.location)
            && eq(&self.job_type, &job.job_type)
            && eq(&self.category, &job.category)
            && eq(&self.language, &job.language)
            && search_hit
    }
}
