use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::entity::question::QuestionType;
use super::entity::{matrix_column, matrix_row, option};

// ============== 설문 작성/수정 요청 ==============

/// 선택지/행/열 문서 (클라이언트 제출 형식)
///
/// `id`가 기존 엔티티와 일치하면 해당 엔티티를 제자리에서 갱신하고,
/// 없거나 일치하지 않으면 새로 생성합니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceDoc {
    pub id: Option<i64>,

    #[validate(length(min = 1, max = 200, message = "선택지 텍스트는 1~200자여야 합니다."))]
    pub text: String,

    /// 생략 시 제출 목록에서의 0-기반 위치가 순서가 됩니다.
    pub order: Option<i32>,
}

/// 질문 문서 (생성 시 text/questionType 필수, 수정 시 부분 갱신)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDoc {
    pub id: Option<i64>,

    #[validate(length(min = 1, message = "질문 텍스트는 비어 있을 수 없습니다."))]
    pub text: Option<String>,

    pub question_type: Option<QuestionType>,

    pub is_required: Option<bool>,

    pub order: Option<i32>,

    #[validate(nested)]
    pub options: Option<Vec<ChoiceDoc>>,

    #[validate(nested)]
    pub matrix_rows: Option<Vec<ChoiceDoc>>,

    #[validate(nested)]
    pub matrix_columns: Option<Vec<ChoiceDoc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyCreateRequest {
    #[validate(length(min = 1, max = 200, message = "설문 제목은 1~200자여야 합니다."))]
    pub title: String,

    pub description: Option<String>,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    pub is_active: Option<bool>,

    pub assigned_viewers: Option<Vec<i64>>,

    #[validate(nested)]
    pub questions: Option<Vec<QuestionDoc>>,
}

/// 설문 수정 요청
///
/// 모든 필드가 선택적입니다. 키 자체가 빠지면 "변경 없음"이고,
/// `assignedViewers`/`questions`는 빈 배열로 오면 "전부 비움"을 의미합니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyUpdateRequest {
    #[validate(length(min = 1, max = 200, message = "설문 제목은 1~200자여야 합니다."))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    pub is_active: Option<bool>,

    pub assigned_viewers: Option<Vec<i64>>,

    #[validate(nested)]
    pub questions: Option<Vec<QuestionDoc>>,
}

// ============== 설문 조회 응답 ==============

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceView {
    pub id: i64,
    pub text: String,
    pub order: i32,
}

impl From<option::Model> for ChoiceView {
    fn from(m: option::Model) -> Self {
        Self {
            id: m.option_id,
            text: m.text,
            order: m.order,
        }
    }
}

impl From<matrix_row::Model> for ChoiceView {
    fn from(m: matrix_row::Model) -> Self {
        Self {
            id: m.matrix_row_id,
            text: m.text,
            order: m.order,
        }
    }
}

impl From<matrix_column::Model> for ChoiceView {
    fn from(m: matrix_column::Model) -> Self {
        Self {
            id: m.matrix_column_id,
            text: m.text,
            order: m.order,
        }
    }
}

/// 질문 유형별로 직렬화에 노출할 하위 목록을 결정하는 태그 유니언
///
/// 어떤 유형이든 세 배열(options/matrixRows/matrixColumns)은 항상 존재하며,
/// 해당 유형에 의미 없는 배열은 빈 배열로 내려갑니다. 클라이언트가
/// 유형별 null 검사를 하지 않아도 되도록 보장합니다.
#[derive(Debug)]
pub enum QuestionContent {
    Choices(Vec<ChoiceView>),
    Matrix {
        rows: Vec<ChoiceView>,
        columns: Vec<ChoiceView>,
    },
    Unsupported,
}

impl QuestionContent {
    /// 질문 유형에 따라 의미 있는 하위 목록만 선택합니다.
    pub fn classify(
        question_type: QuestionType,
        options: Vec<ChoiceView>,
        rows: Vec<ChoiceView>,
        columns: Vec<ChoiceView>,
    ) -> Self {
        match question_type {
            QuestionType::Single | QuestionType::Multiple => QuestionContent::Choices(options),
            QuestionType::Matrix => QuestionContent::Matrix { rows, columns },
            QuestionType::MatrixMul | QuestionType::Open => QuestionContent::Unsupported,
        }
    }

    /// (options, matrixRows, matrixColumns) 세 배열로 전개합니다.
    pub fn into_parts(self) -> (Vec<ChoiceView>, Vec<ChoiceView>, Vec<ChoiceView>) {
        match self {
            QuestionContent::Choices(options) => (options, Vec::new(), Vec::new()),
            QuestionContent::Matrix { rows, columns } => (Vec::new(), rows, columns),
            QuestionContent::Unsupported => (Vec::new(), Vec::new(), Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: i64,
    pub text: String,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub order: i32,
    pub options: Vec<ChoiceView>,
    pub matrix_rows: Vec<ChoiceView>,
    pub matrix_columns: Vec<ChoiceView>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub creator: i64,
    pub creator_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_open: bool,
    pub total_responses: u64,
    pub assigned_viewers: Vec<i64>,
    pub questions: Vec<QuestionView>,
}

/// 공개 설문 응답 (작성자/열람 배정 정보 제외)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyPublicResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_open: bool,
    pub questions: Vec<QuestionView>,
}

// ============== 응답 제출 ==============

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerItem {
    pub question: i64,
    pub selected_option: Option<i64>,
    pub matrix_row: Option<i64>,
    pub matrix_column: Option<i64>,
    pub text_answer: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    pub survey: Uuid,

    #[validate(length(max = 200, message = "응답자 이름은 200자를 초과할 수 없습니다."))]
    pub respondent_name: Option<String>,

    #[validate(email(message = "유효한 이메일 형식이 아닙니다."))]
    pub respondent_email: Option<String>,

    #[validate(length(min = 1, message = "최소 1개 이상의 답변이 필요합니다."), nested)]
    pub answers: Vec<SubmitAnswerItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseResult {
    pub response_id: i64,
    pub expected_answers: usize,
    pub created_answers: usize,
}

// ============== 통계 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsSurveySummary {
    pub id: Uuid,
    pub title: String,
    pub total_responses: u64,
}

/// 질문 유형별 집계 테이블
///
/// single/multiple: 선택지 텍스트 → 응답 수
/// matrix: 행 텍스트 → (열 텍스트 → 응답 수)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum QuestionStatData {
    Choice(BTreeMap<String, u64>),
    Matrix(BTreeMap<String, BTreeMap<String, u64>>),
}

impl QuestionStatData {
    pub fn empty() -> Self {
        QuestionStatData::Choice(BTreeMap::new())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStatistics {
    pub id: i64,
    pub text: String,
    pub question_type: QuestionType,
    pub total_answers: u64,
    pub data: QuestionStatData,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStatisticsResponse {
    pub survey: StatsSurveySummary,
    pub questions: Vec<QuestionStatistics>,
}

// ============== Swagger 문서용 성공 응답 ==============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessSurveyResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: SurveyDetailResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessSurveyListResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Vec<SurveyDetailResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPublicSurveyResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: SurveyPublicResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessSubmitResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: SubmitResponseResult,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessStatisticsResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: SurveyStatisticsResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEmptyResponse {
    pub is_success: bool,
    pub code: String,
    pub message: String,
    pub result: Option<()>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(texts: &[&str]) -> Vec<ChoiceView> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| ChoiceView {
                id: i as i64 + 1,
                text: t.to_string(),
                order: i as i32,
            })
            .collect()
    }

    #[test]
    fn should_project_single_question_with_empty_matrix_lists() {
        // Arrange
        let content = QuestionContent::classify(
            QuestionType::Single,
            choices(&["예", "아니오"]),
            choices(&["무시될 행"]),
            choices(&["무시될 열"]),
        );

        // Act
        let (options, rows, columns) = content.into_parts();

        // Assert
        assert_eq!(options.len(), 2);
        assert!(rows.is_empty());
        assert!(columns.is_empty());
    }

    #[test]
    fn should_project_multiple_question_like_single() {
        let content = QuestionContent::classify(
            QuestionType::Multiple,
            choices(&["A", "B", "C"]),
            Vec::new(),
            Vec::new(),
        );

        let (options, rows, columns) = content.into_parts();

        assert_eq!(options.len(), 3);
        assert!(rows.is_empty());
        assert!(columns.is_empty());
    }

    #[test]
    fn should_project_matrix_question_with_empty_options() {
        let content = QuestionContent::classify(
            QuestionType::Matrix,
            choices(&["무시될 선택지"]),
            choices(&["찬성", "반대"]),
            choices(&["낮음", "높음"]),
        );

        let (options, rows, columns) = content.into_parts();

        assert!(options.is_empty());
        assert_eq!(rows.len(), 2);
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn should_project_reserved_types_as_all_empty() {
        for qt in [QuestionType::MatrixMul, QuestionType::Open] {
            let content = QuestionContent::classify(
                qt,
                choices(&["a"]),
                choices(&["b"]),
                choices(&["c"]),
            );

            let (options, rows, columns) = content.into_parts();

            assert!(options.is_empty());
            assert!(rows.is_empty());
            assert!(columns.is_empty());
        }
    }

    #[test]
    fn should_serialize_question_view_with_non_null_arrays() {
        // Arrange: matrix 질문은 options가 빈 배열이어야 함 (null 아님)
        let view = QuestionView {
            id: 1,
            text: "만족도를 평가해주세요".to_string(),
            question_type: QuestionType::Matrix,
            is_required: true,
            order: 0,
            options: Vec::new(),
            matrix_rows: choices(&["품질"]),
            matrix_columns: choices(&["만족", "불만족"]),
        };

        // Act
        let json = serde_json::to_value(&view).unwrap();

        // Assert
        assert!(json["options"].is_array());
        assert_eq!(json["options"].as_array().unwrap().len(), 0);
        assert_eq!(json["questionType"], "matrix");
        assert_eq!(json["matrixRows"].as_array().unwrap().len(), 1);
    }
}
