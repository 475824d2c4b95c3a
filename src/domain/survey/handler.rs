use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

use super::dto::{
    SubmitResponseRequest, SubmitResponseResult, SurveyCreateRequest, SurveyDetailResponse,
    SurveyPublicResponse, SurveyStatisticsResponse, SurveyUpdateRequest,
};
use super::export;
use super::service::{Actor, SurveyService};

fn actor_from(user: &AuthUser) -> Result<Actor, AppError> {
    Ok(Actor {
        account_id: user.account_id()?,
        role: user.role()?,
    })
}

/// 설문 생성 API
///
/// 질문과 선택지/행/열을 중첩 문서로 한 번에 생성합니다.
/// creator 이상의 역할이 필요합니다.
#[utoipa::path(
    post,
    path = "/api/v1/surveys",
    request_body = SurveyCreateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "설문 생성 성공", body = SuccessSurveyResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 403, description = "권한 없음", body = ErrorResponse)
    ),
    tag = "Survey"
)]
pub async fn create_survey(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SurveyCreateRequest>,
) -> Result<Json<BaseResponse<SurveyDetailResponse>>, AppError> {
    req.validate()?;

    let actor = actor_from(&user)?;
    let result = SurveyService::create_survey(state, actor, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 설문 목록 조회 API
///
/// 역할에 따라 보이는 범위가 다릅니다.
/// admin: 전체 / creator: 본인 작성 / viewer: 배정받았거나 본인 작성.
#[utoipa::path(
    get,
    path = "/api/v1/surveys",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "설문 목록 조회 성공", body = SuccessSurveyListResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse)
    ),
    tag = "Survey"
)]
pub async fn list_surveys(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<SurveyDetailResponse>>>, AppError> {
    let actor = actor_from(&user)?;
    let result = SurveyService::list_surveys(state, actor).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 설문 상세 조회 API
#[utoipa::path(
    get,
    path = "/api/v1/surveys/{survey_id}",
    params(
        ("survey_id" = Uuid, Path, description = "설문 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "설문 조회 성공", body = SuccessSurveyResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 403, description = "권한 없음", body = ErrorResponse),
        (status = 404, description = "설문 없음", body = ErrorResponse)
    ),
    tag = "Survey"
)]
pub async fn get_survey(
    State(state): State<AppState>,
    user: AuthUser,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<BaseResponse<SurveyDetailResponse>>, AppError> {
    let actor = actor_from(&user)?;
    let result = SurveyService::get_survey(state, actor, survey_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 설문 수정 API
///
/// 부분 갱신입니다. 키가 빠진 필드는 변경되지 않고, `questions`가
/// 있으면 id 기준으로 정합 갱신되어 기존 질문/선택지의 응답 이력이
/// 보존됩니다.
#[utoipa::path(
    put,
    path = "/api/v1/surveys/{survey_id}",
    params(
        ("survey_id" = Uuid, Path, description = "설문 ID")
    ),
    request_body = SurveyUpdateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "설문 수정 성공", body = SuccessSurveyResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 403, description = "권한 없음", body = ErrorResponse),
        (status = 404, description = "설문 없음", body = ErrorResponse)
    ),
    tag = "Survey"
)]
pub async fn update_survey(
    State(state): State<AppState>,
    user: AuthUser,
    Path(survey_id): Path<Uuid>,
    Json(req): Json<SurveyUpdateRequest>,
) -> Result<Json<BaseResponse<SurveyDetailResponse>>, AppError> {
    req.validate()?;

    let actor = actor_from(&user)?;
    let result = SurveyService::update_survey(state, actor, survey_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 설문 삭제 API
///
/// 질문/선택지/응답/답변까지 연쇄 삭제합니다.
#[utoipa::path(
    delete,
    path = "/api/v1/surveys/{survey_id}",
    params(
        ("survey_id" = Uuid, Path, description = "설문 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "설문 삭제 성공", body = SuccessEmptyResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 403, description = "권한 없음", body = ErrorResponse),
        (status = 404, description = "설문 없음", body = ErrorResponse)
    ),
    tag = "Survey"
)]
pub async fn delete_survey(
    State(state): State<AppState>,
    user: AuthUser,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    let actor = actor_from(&user)?;
    SurveyService::delete_survey(state, actor, survey_id).await?;

    Ok(Json(BaseResponse::success(())))
}

/// 설문 통계 조회 API
///
/// 질문별 집계 테이블을 반환합니다. 개별 질문의 집계 실패는
/// 빈 데이터로 내려가고 나머지 질문은 정상 집계됩니다.
#[utoipa::path(
    get,
    path = "/api/v1/surveys/{survey_id}/statistics",
    params(
        ("survey_id" = Uuid, Path, description = "설문 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "통계 조회 성공", body = SuccessStatisticsResponse),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 403, description = "권한 없음", body = ErrorResponse),
        (status = 404, description = "설문 없음", body = ErrorResponse)
    ),
    tag = "Statistics"
)]
pub async fn get_statistics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<BaseResponse<SurveyStatisticsResponse>>, AppError> {
    let actor = actor_from(&user)?;
    let result = SurveyService::get_statistics(state, actor, survey_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 설문 통계 xlsx 내보내기 API
///
/// 통계를 차트가 포함된 엑셀 파일로 내려받습니다.
#[utoipa::path(
    get,
    path = "/api/v1/surveys/{survey_id}/export",
    params(
        ("survey_id" = Uuid, Path, description = "설문 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "xlsx 파일", body = Vec<u8>, content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 401, description = "인증 실패", body = ErrorResponse),
        (status = 403, description = "권한 없음", body = ErrorResponse),
        (status = 404, description = "설문 없음", body = ErrorResponse)
    ),
    tag = "Statistics"
)]
pub async fn export_statistics(
    State(state): State<AppState>,
    user: AuthUser,
    Path(survey_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let actor = actor_from(&user)?;
    let stats = SurveyService::get_statistics(state, actor, survey_id).await?;
    let bytes = export::render_workbook(&stats)?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"survey_{}.xlsx\"", survey_id),
        ),
    ];

    Ok((headers, bytes))
}

/// 공개 설문 조회 API (비인증)
///
/// 활성 상태이고 응답 기간 내인 설문만 공개 프로젝션으로 반환합니다.
#[utoipa::path(
    get,
    path = "/api/v1/public/surveys/{survey_id}",
    params(
        ("survey_id" = Uuid, Path, description = "설문 ID")
    ),
    responses(
        (status = 200, description = "설문 조회 성공", body = SuccessPublicSurveyResponse),
        (status = 400, description = "비활성/기간 외 설문", body = ErrorResponse),
        (status = 404, description = "설문 없음", body = ErrorResponse)
    ),
    tag = "Public"
)]
pub async fn get_public_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<Uuid>,
) -> Result<Json<BaseResponse<SurveyPublicResponse>>, AppError> {
    let result = SurveyService::get_public_survey(state, survey_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 공개 응답 제출 API (비인증)
///
/// 응답 기간 내의 활성 설문에만 제출할 수 있습니다. 개별 답변의 검증
/// 실패는 건너뛰고 나머지를 저장하며, 결과에 생성/기대 수를 담습니다.
#[utoipa::path(
    post,
    path = "/api/v1/public/responses",
    request_body = SubmitResponseRequest,
    responses(
        (status = 200, description = "응답 제출 성공", body = SuccessSubmitResponse),
        (status = 400, description = "잘못된 요청 또는 기간 외 설문", body = ErrorResponse),
        (status = 404, description = "설문 없음", body = ErrorResponse)
    ),
    tag = "Public"
)]
pub async fn submit_response(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitResponseRequest>,
) -> Result<Json<BaseResponse<SubmitResponseResult>>, AppError> {
    req.validate()?;

    let ip_address = client_ip(&headers);
    let result = SurveyService::submit_response(state, ip_address, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

/// 프록시 뒤에서도 동작하도록 X-Forwarded-For 첫 항목을 사용합니다.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
