//! Search and type filtering over the job list

use crate::models::{Job, JobType};

/// Type predicate for the listing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Match every job type
    #[default]
    All,

    /// Match only the given job type
    Only(JobType),
}

impl From<JobType> for TypeFilter {
    fn from(job_type: JobType) -> Self {
        TypeFilter::Only(job_type)
    }
}

impl TypeFilter {
    /// Parse a UI selection value: `"all"` or a wire-format job type
    pub fn parse(value: &str) -> Option<TypeFilter> {
        if value == "all" {
            return Some(TypeFilter::All);
        }
        serde_json::from_value::<JobType>(serde_json::Value::String(value.to_string()))
            .ok()
            .map(TypeFilter::Only)
    }

    fn matches(&self, job: &Job) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(job_type) => job.job_type == *job_type,
        }
    }
}

/// Filter jobs by case-insensitive title/company search and type.
///
/// The result is a subsequence of `jobs` preserving relative order; empty
/// inputs (`""` and `All`) return the full list.
pub fn filter_jobs(jobs: &[Job], search_term: &str, type_filter: TypeFilter) -> Vec<Job> {
    let term = search_term.to_lowercase();

    jobs.iter()
        .filter(|job| {
            let matches_search = job.title.to_lowercase().contains(&term)
                || job.company.to_lowercase().contains(&term);
            matches_search && type_filter.matches(job)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn job(id: &str, title: &str, company: &str, job_type: JobType) -> Job {
        Job {
            id: id.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: "Remote".to_string(),
            job_type,
            salary: None,
            description: String::new(),
            requirements: Vec::new(),
            posted_date: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            featured: false,
        }
    }

    fn sample() -> Vec<Job> {
        vec![
            job("1", "Backend Engineer", "Acme", JobType::FullTime),
            job("2", "Intern", "Acme", JobType::Internship),
            job("3", "Designer", "Beta Corp", JobType::Contract),
        ]
    }

    #[test]
    fn empty_inputs_return_the_full_list() {
        let jobs = sample();
        assert_eq!(filter_jobs(&jobs, "", TypeFilter::All), jobs);
    }

    #[test]
    fn search_matches_title_or_company_case_insensitively() {
        let jobs = sample();

        let by_title = filter_jobs(&jobs, "backend", TypeFilter::All);
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "1");

        let by_company = filter_jobs(&jobs, "ACME", TypeFilter::All);
        assert_eq!(by_company.len(), 2);
    }

    #[test]
    fn type_filter_conjoins_with_search() {
        let jobs = sample();
        let filtered = filter_jobs(&jobs, "acme", TypeFilter::Only(JobType::Internship));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "2");
    }

    #[test]
    fn result_is_an_order_preserving_subsequence() {
        let jobs = sample();
        let filtered = filter_jobs(&jobs, "e", TypeFilter::All);

        let mut positions = Vec::new();
        for item in &filtered {
            positions.push(jobs.iter().position(|j| j.id == item.id).unwrap());
        }
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        for item in &filtered {
            assert!(
                item.title.to_lowercase().contains('e')
                    || item.company.to_lowercase().contains('e')
            );
        }
    }

    #[test]
    fn no_matches_yields_empty() {
        let jobs = sample();
        assert!(filter_jobs(&jobs, "quantum", TypeFilter::All).is_empty());
    }

    #[test]
    fn parses_ui_selection_values() {
        assert_eq!(TypeFilter::parse("all"), Some(TypeFilter::All));
        assert_eq!(
            TypeFilter::parse("Full-time"),
            Some(TypeFilter::Only(JobType::FullTime))
        );
        assert_eq!(TypeFilter::parse("full time"), None);
    }
}
