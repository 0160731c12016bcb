pub(crate) mod authenticated_member;
pub(crate) mod compare_api_version;

use axum::http::StatusCode;

type RejectionType = (StatusCode, String);
