use crate::directory::DirectoryError;
use crate::models::user::ResolvedIdentity;
use crate::resolver::resolve_system_identity;
use crate::state::AppState;

use actix_web::{get, http::StatusCode, web, HttpResponse, ResponseError};

pub const NOT_FOUND_MESSAGE: &str = "시스템 사용자를 찾을 수 없습니다.";

#[derive(Debug, thiserror::Error)]
pub enum SystemUserError {
    #[error("system user not found")]
    NotFound,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

#[derive(Serialize, Debug)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ResponseError for SystemUserError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::NotFound => ErrorBody {
                error: NOT_FOUND_MESSAGE,
                details: None,
            },
            Self::Directory(e) => {
                let message = e.to_string();
                ErrorBody {
                    error: "Internal server error",
                    details: Some(if message.is_empty() {
                        "Unknown error".to_string()
                    } else {
                        message
                    }),
                }
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub user: ResolvedIdentity,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ModelResponse {
    pub model: String,
}

#[get("/user")]
async fn get_user(state: AppState) -> Result<web::Json<UserResponse>, SystemUserError> {
    let identity = resolve_system_identity(&state.config.system, &*state.directory)
        .await
        .inspect_err(|e| log::error!("error resolving system user: {:?}", e))?
        .ok_or(SystemUserError::NotFound)?;

    Ok(web::Json(UserResponse { user: identity }))
}

#[get("/model")]
async fn get_model(state: AppState) -> web::Json<ModelResponse> {
    web::Json(ModelResponse {
        model: state.config.model.clone(),
    })
}

pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(get_user);
    cfg.service(get_model);
}
