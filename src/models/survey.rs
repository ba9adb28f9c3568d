use serde::Deserialize;

pub const CATEGORY: &str = "category";
pub const STATUS: &str = "status";
pub const REPORT: &str = "report";
pub const TOTAL_VOTES: &str = "totalVotes";
pub const CREATION_TIME: &str = "creationTime";
pub const SURVEYOR_EMAIL: &str = "surveyorEmail";

pub const STATUS_PUBLISH: &str = "publish";
pub const STATUS_DRAFT: &str = "draft";

/// Query string of `GET /surveys`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SurveyQuery {
    /// Exact category match
    pub filter: Option<String>,
    /// `asc` sorts by totalVotes ascending, any other value descending
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOrder {
    Ascending,
    Descending,
}

impl VoteOrder {
    pub fn from_query(sort: Option<&str>) -> Option<Self> {
        sort.filter(|s| !s.is_empty()).map(|s| {
            if s == "asc" {
                VoteOrder::Ascending
            } else {
                VoteOrder::Descending
            }
        })
    }
}
