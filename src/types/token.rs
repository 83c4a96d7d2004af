use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTokenRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Returned by the OIDC callback once the identity token is verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: CallbackUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackUser {
    pub email: String,
    pub name: String,
    pub subject: String,
}
