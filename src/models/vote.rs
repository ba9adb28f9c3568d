use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub voter_email: String,
    pub survey_id: String,
    pub choice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_name: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub inserted_id: String,
}
