pub mod config;
pub mod domain;
pub mod state;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        domain::survey::handler::create_survey,
        domain::survey::handler::list_surveys,
        domain::survey::handler::get_survey,
        domain::survey::handler::update_survey,
        domain::survey::handler::delete_survey,
        domain::survey::handler::get_statistics,
        domain::survey::handler::export_statistics,
        domain::survey::handler::get_public_survey,
        domain::survey::handler::submit_response,
    ),
    components(
        schemas(
            domain::survey::dto::ChoiceDoc,
            domain::survey::dto::QuestionDoc,
            domain::survey::dto::SurveyCreateRequest,
            domain::survey::dto::SurveyUpdateRequest,
            domain::survey::dto::ChoiceView,
            domain::survey::dto::QuestionView,
            domain::survey::dto::SurveyDetailResponse,
            domain::survey::dto::SurveyPublicResponse,
            domain::survey::dto::SubmitAnswerItem,
            domain::survey::dto::SubmitResponseRequest,
            domain::survey::dto::SubmitResponseResult,
            domain::survey::dto::StatsSurveySummary,
            domain::survey::dto::QuestionStatistics,
            domain::survey::dto::SurveyStatisticsResponse,
            domain::survey::dto::SuccessSurveyResponse,
            domain::survey::dto::SuccessSurveyListResponse,
            domain::survey::dto::SuccessPublicSurveyResponse,
            domain::survey::dto::SuccessSubmitResponse,
            domain::survey::dto::SuccessStatisticsResponse,
            domain::survey::dto::SuccessEmptyResponse,
            domain::survey::entity::question::QuestionType,
            utils::response::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Survey", description = "설문 작성/조회 API"),
        (name = "Statistics", description = "설문 통계 API"),
        (name = "Public", description = "공개 설문/응답 API")
    )
)]
pub struct ApiDoc;

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(|| async { "OK" }))
        .route(
            "/api/v1/surveys",
            post(domain::survey::handler::create_survey).get(domain::survey::handler::list_surveys),
        )
        .route(
            "/api/v1/surveys/:survey_id",
            get(domain::survey::handler::get_survey)
                .put(domain::survey::handler::update_survey)
                .patch(domain::survey::handler::update_survey)
                .delete(domain::survey::handler::delete_survey),
        )
        .route(
            "/api/v1/surveys/:survey_id/statistics",
            get(domain::survey::handler::get_statistics),
        )
        .route(
            "/api/v1/surveys/:survey_id/export",
            get(domain::survey::handler::export_statistics),
        )
        .route(
            "/api/v1/public/surveys/:survey_id",
            get(domain::survey::handler::get_public_survey),
        )
        .route(
            "/api/v1/public/responses",
            post(domain::survey::handler::submit_response),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
