use std::collections::{HashMap, HashSet};

use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, ExprTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::account::entity::account::{self, Role};
use crate::state::AppState;
use crate::utils::error::AppError;

use super::dto::{
    ChoiceView, QuestionContent, QuestionDoc, QuestionStatData, QuestionStatistics, QuestionView,
    StatsSurveySummary, SubmitResponseRequest, SubmitResponseResult, SurveyCreateRequest,
    SurveyDetailResponse, SurveyPublicResponse, SurveyStatisticsResponse, SurveyUpdateRequest,
};
use super::entity::question::QuestionType;
use super::entity::{
    answer, matrix_column, matrix_row, option, question, response, survey, survey_viewer,
};
use super::reconcile::{self, ChoicePlan, ChoiceState};
use super::statistics;

/// 인증된 요청 주체 (JWT Claims에서 추출)
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub account_id: i64,
    pub role: Role,
}

pub struct SurveyService;

impl SurveyService {
    // ============== 설문 작성 ==============

    /// 설문 생성
    pub async fn create_survey(
        state: AppState,
        actor: Actor,
        req: SurveyCreateRequest,
    ) -> Result<SurveyDetailResponse, AppError> {
        // 1. 권한 확인 (creator 이상)
        if !actor.role.has_at_least(Role::Creator) {
            return Err(AppError::SurveyAccessDenied(
                "설문을 생성할 권한이 없습니다.".to_string(),
            ));
        }

        // 2. 열람 배정 계정 검증 (viewer 역할만 허용)
        let viewer_ids = req.assigned_viewers.clone().unwrap_or_default();
        Self::validate_assigned_viewers(&state.db, &viewer_ids).await?;

        // 3. 트랜잭션 시작
        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let now = Utc::now().naive_utc();
        let survey_id = Uuid::new_v4();

        // 4. 설문 생성 (작성자는 항상 요청 주체, 클라이언트 값 무시)
        let survey_model = survey::ActiveModel {
            survey_id: Set(survey_id),
            title: Set(req.title.clone()),
            description: Set(req.description.clone().unwrap_or_default()),
            creator_id: Set(actor.account_id),
            start_date: Set(req.start_date.naive_utc()),
            end_date: Set(req.end_date.naive_utc()),
            is_active: Set(req.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        survey_model
            .insert(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 5. 열람 배정 저장
        Self::replace_assigned_viewers(&txn, survey_id, &viewer_ids).await?;

        // 6. 질문 생성
        for question_doc in req.questions.unwrap_or_default() {
            Self::create_question(&txn, survey_id, &question_doc, now).await?;
        }

        // 7. 트랜잭션 커밋
        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(survey_id = %survey_id, creator_id = actor.account_id, "설문 생성 완료");

        Self::load_survey_detail_by_id(&state.db, survey_id).await
    }

    /// 설문 수정 (정합 갱신)
    ///
    /// 스칼라 필드는 부분 갱신, assignedViewers는 존재 시 전체 교체,
    /// questions는 존재 시 id 기준 정합 갱신입니다. 키가 빠진 항목은
    /// 변경하지 않습니다.
    pub async fn update_survey(
        state: AppState,
        actor: Actor,
        survey_id: Uuid,
        req: SurveyUpdateRequest,
    ) -> Result<SurveyDetailResponse, AppError> {
        // 1. 설문 조회 및 수정 권한 확인
        let survey_model = Self::find_survey(&state.db, survey_id).await?;
        Self::ensure_can_modify(&actor, &survey_model)?;

        // 2. 열람 배정 검증 (전체 실패: 하나라도 viewer가 아니면 아무것도 쓰지 않음)
        if let Some(viewer_ids) = &req.assigned_viewers {
            Self::validate_assigned_viewers(&state.db, viewer_ids).await?;
        }

        // 3. 트랜잭션 시작
        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let now = Utc::now().naive_utc();

        // 4. 스칼라 필드 부분 갱신
        let mut active: survey::ActiveModel = survey_model.clone().into();
        if let Some(title) = req.title {
            active.title = Set(title);
        }
        if let Some(description) = req.description {
            active.description = Set(description);
        }
        if let Some(start_date) = req.start_date {
            active.start_date = Set(start_date.naive_utc());
        }
        if let Some(end_date) = req.end_date {
            active.end_date = Set(end_date.naive_utc());
        }
        if let Some(is_active) = req.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(now);
        active
            .update(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 5. 열람 배정 교체 (키가 있을 때만, 빈 배열이면 전부 해제)
        if let Some(viewer_ids) = &req.assigned_viewers {
            survey_viewer::Entity::delete_many()
                .filter(survey_viewer::Column::SurveyId.eq(survey_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            Self::replace_assigned_viewers(&txn, survey_id, viewer_ids).await?;
        }

        // 6. 질문 정합 갱신 (키가 있을 때만)
        if let Some(question_docs) = &req.questions {
            Self::reconcile_questions(&txn, survey_id, question_docs, now).await?;
        }

        // 7. 트랜잭션 커밋
        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(survey_id = %survey_id, "설문 수정 완료");

        Self::load_survey_detail_by_id(&state.db, survey_id).await
    }

    /// 설문 삭제 (질문/선택지/응답/답변 연쇄 삭제)
    pub async fn delete_survey(
        state: AppState,
        actor: Actor,
        survey_id: Uuid,
    ) -> Result<(), AppError> {
        let survey_model = Self::find_survey(&state.db, survey_id).await?;
        Self::ensure_can_modify(&actor, &survey_model)?;

        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let question_ids: Vec<i64> = question::Entity::find()
            .filter(question::Column::SurveyId.eq(survey_id))
            .all(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .iter()
            .map(|q| q.question_id)
            .collect();

        if !question_ids.is_empty() {
            answer::Entity::delete_many()
                .filter(answer::Column::QuestionId.is_in(question_ids.clone()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            option::Entity::delete_many()
                .filter(option::Column::QuestionId.is_in(question_ids.clone()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            matrix_row::Entity::delete_many()
                .filter(matrix_row::Column::QuestionId.is_in(question_ids.clone()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            matrix_column::Entity::delete_many()
                .filter(matrix_column::Column::QuestionId.is_in(question_ids.clone()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        question::Entity::delete_many()
            .filter(question::Column::SurveyId.eq(survey_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        response::Entity::delete_many()
            .filter(response::Column::SurveyId.eq(survey_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        survey_viewer::Entity::delete_many()
            .filter(survey_viewer::Column::SurveyId.eq(survey_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        survey::Entity::delete_by_id(survey_id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(survey_id = %survey_id, "설문 삭제 완료");
        Ok(())
    }

    // ============== 질문 정합 갱신 ==============

    /// 설문 단위 질문 목록 정합 갱신
    ///
    /// id가 일치하는 질문은 부분 갱신(하위 목록 포함), 일치하지 않으면 생성,
    /// 제출되지 않은 기존 질문은 하위 선택지/답변까지 연쇄 삭제합니다.
    async fn reconcile_questions(
        txn: &DatabaseTransaction,
        survey_id: Uuid,
        submitted: &[QuestionDoc],
        now: NaiveDateTime,
    ) -> Result<(), AppError> {
        let existing = question::Entity::find()
            .filter(question::Column::SurveyId.eq(survey_id))
            .all(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        let existing_by_id: HashMap<i64, question::Model> = existing
            .iter()
            .map(|q| (q.question_id, q.clone()))
            .collect();
        let existing_ids: Vec<i64> = existing.iter().map(|q| q.question_id).collect();

        let plan = reconcile::plan_questions(&existing_ids, submitted);

        for (question_id, doc) in &plan.updates {
            // plan이 기존 id만 updates로 분류하므로 조회는 항상 성공
            let model = existing_by_id
                .get(question_id)
                .ok_or_else(|| AppError::InternalError("질문 정합 계획이 유효하지 않습니다.".to_string()))?;
            Self::update_question(txn, model, doc).await?;
        }

        for doc in &plan.creates {
            Self::create_question(txn, survey_id, doc, now).await?;
        }

        for question_id in &plan.delete_ids {
            Self::delete_question_cascade(txn, *question_id).await?;
        }

        Ok(())
    }

    /// 질문 생성
    ///
    /// 세 가지 하위 목록(options/matrixRows/matrixColumns)은 제출된 것만
    /// 각각 독립적으로 생성합니다. question_type으로 게이트하지 않습니다.
    async fn create_question(
        txn: &DatabaseTransaction,
        survey_id: Uuid,
        doc: &QuestionDoc,
        now: NaiveDateTime,
    ) -> Result<(), AppError> {
        let text = doc.text.clone().ok_or_else(|| {
            AppError::ValidationError("질문 텍스트는 필수입니다.".to_string())
        })?;
        let question_type = doc.question_type.ok_or_else(|| {
            AppError::ValidationError("질문 유형은 필수입니다.".to_string())
        })?;

        let question_model = question::ActiveModel {
            survey_id: Set(survey_id),
            text: Set(text),
            question_type: Set(question_type),
            is_required: Set(doc.is_required.unwrap_or(true)),
            order: Set(doc.order.unwrap_or(0)),
            created_at: Set(now),
            ..Default::default()
        };
        let created = question_model
            .insert(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if let Some(docs) = &doc.options {
            Self::reconcile_options(txn, created.question_id, docs).await?;
        }
        if let Some(docs) = &doc.matrix_rows {
            Self::reconcile_matrix_rows(txn, created.question_id, docs).await?;
        }
        if let Some(docs) = &doc.matrix_columns {
            Self::reconcile_matrix_columns(txn, created.question_id, docs).await?;
        }

        Ok(())
    }

    /// 질문 부분 갱신 + 하위 목록 정합 갱신
    async fn update_question(
        txn: &DatabaseTransaction,
        model: &question::Model,
        doc: &QuestionDoc,
    ) -> Result<(), AppError> {
        let mut active: question::ActiveModel = model.clone().into();
        if let Some(text) = &doc.text {
            active.text = Set(text.clone());
        }
        if let Some(question_type) = doc.question_type {
            active.question_type = Set(question_type);
        }
        if let Some(is_required) = doc.is_required {
            active.is_required = Set(is_required);
        }
        if let Some(order) = doc.order {
            active.order = Set(order);
        }
        active
            .update(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 키가 있는 하위 목록만 정합 갱신 (빈 배열 = 전부 삭제, 키 부재 = 유지)
        if let Some(docs) = &doc.options {
            Self::reconcile_options(txn, model.question_id, docs).await?;
        }
        if let Some(docs) = &doc.matrix_rows {
            Self::reconcile_matrix_rows(txn, model.question_id, docs).await?;
        }
        if let Some(docs) = &doc.matrix_columns {
            Self::reconcile_matrix_columns(txn, model.question_id, docs).await?;
        }

        Ok(())
    }

    /// 질문 연쇄 삭제 (답변 → 선택지/행/열 → 질문 순서)
    async fn delete_question_cascade(
        txn: &DatabaseTransaction,
        question_id: i64,
    ) -> Result<(), AppError> {
        answer::Entity::delete_many()
            .filter(answer::Column::QuestionId.eq(question_id))
            .exec(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        option::Entity::delete_many()
            .filter(option::Column::QuestionId.eq(question_id))
            .exec(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        matrix_row::Entity::delete_many()
            .filter(matrix_row::Column::QuestionId.eq(question_id))
            .exec(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        matrix_column::Entity::delete_many()
            .filter(matrix_column::Column::QuestionId.eq(question_id))
            .exec(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        question::Entity::delete_by_id(question_id)
            .exec(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        Ok(())
    }

    // ============== 선택지/행/열 정합 갱신 ==============

    /// 선택지(options) 정합 갱신
    ///
    /// 삭제되는 선택지를 참조하는 Answer는 의미를 잃으므로 함께 삭제합니다.
    /// 갱신되는 선택지는 id가 유지되어 Answer 참조가 보존됩니다.
    async fn reconcile_options(
        txn: &DatabaseTransaction,
        question_id: i64,
        submitted: &[super::dto::ChoiceDoc],
    ) -> Result<(), AppError> {
        let existing: Vec<ChoiceState> = option::Entity::find()
            .filter(option::Column::QuestionId.eq(question_id))
            .all(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .into_iter()
            .map(|m| ChoiceState {
                id: m.option_id,
                text: m.text,
                order: m.order,
            })
            .collect();

        let plan = reconcile::plan_choices(&existing, submitted);
        Self::log_choice_plan(question_id, "options", &plan);

        for update in &plan.updates {
            let active = option::ActiveModel {
                option_id: Set(update.id),
                text: Set(update.text.clone()),
                order: Set(update.order),
                ..Default::default()
            };
            active
                .update(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        for create in &plan.creates {
            let active = option::ActiveModel {
                question_id: Set(question_id),
                text: Set(create.text.clone()),
                order: Set(create.order),
                ..Default::default()
            };
            active
                .insert(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        if !plan.delete_ids.is_empty() {
            answer::Entity::delete_many()
                .filter(answer::Column::SelectedOptionId.is_in(plan.delete_ids.clone()))
                .exec(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            option::Entity::delete_many()
                .filter(option::Column::OptionId.is_in(plan.delete_ids.clone()))
                .exec(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        Ok(())
    }

    /// 매트릭스 행 정합 갱신
    async fn reconcile_matrix_rows(
        txn: &DatabaseTransaction,
        question_id: i64,
        submitted: &[super::dto::ChoiceDoc],
    ) -> Result<(), AppError> {
        let existing: Vec<ChoiceState> = matrix_row::Entity::find()
            .filter(matrix_row::Column::QuestionId.eq(question_id))
            .all(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .into_iter()
            .map(|m| ChoiceState {
                id: m.matrix_row_id,
                text: m.text,
                order: m.order,
            })
            .collect();

        let plan = reconcile::plan_choices(&existing, submitted);
        Self::log_choice_plan(question_id, "matrix_rows", &plan);

        for update in &plan.updates {
            let active = matrix_row::ActiveModel {
                matrix_row_id: Set(update.id),
                text: Set(update.text.clone()),
                order: Set(update.order),
                ..Default::default()
            };
            active
                .update(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        for create in &plan.creates {
            let active = matrix_row::ActiveModel {
                question_id: Set(question_id),
                text: Set(create.text.clone()),
                order: Set(create.order),
                ..Default::default()
            };
            active
                .insert(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        if !plan.delete_ids.is_empty() {
            answer::Entity::delete_many()
                .filter(answer::Column::MatrixRowId.is_in(plan.delete_ids.clone()))
                .exec(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            matrix_row::Entity::delete_many()
                .filter(matrix_row::Column::MatrixRowId.is_in(plan.delete_ids.clone()))
                .exec(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        Ok(())
    }

    /// 매트릭스 열 정합 갱신
    async fn reconcile_matrix_columns(
        txn: &DatabaseTransaction,
        question_id: i64,
        submitted: &[super::dto::ChoiceDoc],
    ) -> Result<(), AppError> {
        let existing: Vec<ChoiceState> = matrix_column::Entity::find()
            .filter(matrix_column::Column::QuestionId.eq(question_id))
            .all(txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .into_iter()
            .map(|m| ChoiceState {
                id: m.matrix_column_id,
                text: m.text,
                order: m.order,
            })
            .collect();

        let plan = reconcile::plan_choices(&existing, submitted);
        Self::log_choice_plan(question_id, "matrix_columns", &plan);

        for update in &plan.updates {
            let active = matrix_column::ActiveModel {
                matrix_column_id: Set(update.id),
                text: Set(update.text.clone()),
                order: Set(update.order),
                ..Default::default()
            };
            active
                .update(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        for create in &plan.creates {
            let active = matrix_column::ActiveModel {
                question_id: Set(question_id),
                text: Set(create.text.clone()),
                order: Set(create.order),
                ..Default::default()
            };
            active
                .insert(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        if !plan.delete_ids.is_empty() {
            answer::Entity::delete_many()
                .filter(answer::Column::MatrixColumnId.is_in(plan.delete_ids.clone()))
                .exec(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            matrix_column::Entity::delete_many()
                .filter(matrix_column::Column::MatrixColumnId.is_in(plan.delete_ids.clone()))
                .exec(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        Ok(())
    }

    fn log_choice_plan(question_id: i64, kind: &str, plan: &ChoicePlan) {
        info!(
            question_id = question_id,
            kind = kind,
            updates = plan.updates.len(),
            creates = plan.creates.len(),
            deletes = plan.delete_ids.len(),
            "선택지 정합 계획"
        );
    }

    // ============== 설문 조회 ==============

    /// 역할별 설문 목록 조회
    ///
    /// admin: 전체 / creator: 자신이 만든 설문 / viewer: 배정받았거나 만든 설문
    pub async fn list_surveys(
        state: AppState,
        actor: Actor,
    ) -> Result<Vec<SurveyDetailResponse>, AppError> {
        let surveys = match actor.role {
            Role::Admin => survey::Entity::find()
                .order_by_desc(survey::Column::CreatedAt)
                .all(&state.db)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?,
            Role::Creator => survey::Entity::find()
                .filter(survey::Column::CreatorId.eq(actor.account_id))
                .order_by_desc(survey::Column::CreatedAt)
                .all(&state.db)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?,
            Role::Viewer => {
                let assigned_ids: Vec<Uuid> = survey_viewer::Entity::find()
                    .filter(survey_viewer::Column::AccountId.eq(actor.account_id))
                    .all(&state.db)
                    .await
                    .map_err(|e| AppError::InternalError(e.to_string()))?
                    .iter()
                    .map(|v| v.survey_id)
                    .collect();
                survey::Entity::find()
                    .filter(
                        survey::Column::CreatorId
                            .eq(actor.account_id)
                            .or(survey::Column::SurveyId.is_in(assigned_ids)),
                    )
                    .order_by_desc(survey::Column::CreatedAt)
                    .all(&state.db)
                    .await
                    .map_err(|e| AppError::InternalError(e.to_string()))?
            }
        };

        let mut result = Vec::with_capacity(surveys.len());
        for survey_model in surveys {
            result.push(Self::load_survey_detail(&state.db, survey_model).await?);
        }
        Ok(result)
    }

    /// 설문 상세 조회
    pub async fn get_survey(
        state: AppState,
        actor: Actor,
        survey_id: Uuid,
    ) -> Result<SurveyDetailResponse, AppError> {
        let survey_model = Self::find_survey(&state.db, survey_id).await?;

        if !Self::can_view(&state.db, &actor, &survey_model).await? {
            return Err(AppError::SurveyAccessDenied(
                "이 설문을 열람할 권한이 없습니다.".to_string(),
            ));
        }

        Self::load_survey_detail(&state.db, survey_model).await
    }

    /// 공개 설문 조회 (비인증)
    ///
    /// 활성 상태이고 응답 기간 내일 때만 공개 프로젝션을 반환합니다.
    pub async fn get_public_survey(
        state: AppState,
        survey_id: Uuid,
    ) -> Result<SurveyPublicResponse, AppError> {
        let survey_model = Self::find_survey(&state.db, survey_id).await?;

        if !survey_model.is_active {
            return Err(AppError::SurveyNotActive(
                "이 설문은 활성 상태가 아닙니다.".to_string(),
            ));
        }

        let now = Utc::now().naive_utc();
        if !survey_model.is_open_at(now) {
            return Err(AppError::SurveyClosed(format!(
                "이 설문은 현재 응답을 받지 않습니다. 응답 기간: {} ~ {}",
                Self::format_datetime(survey_model.start_date),
                Self::format_datetime(survey_model.end_date),
            )));
        }

        let questions = Self::load_question_views(&state.db, survey_id).await?;

        Ok(SurveyPublicResponse {
            id: survey_model.survey_id,
            title: survey_model.title,
            description: survey_model.description,
            start_date: Self::to_utc(survey_model.start_date),
            end_date: Self::to_utc(survey_model.end_date),
            is_open: true,
            questions,
        })
    }

    // ============== 응답 제출 ==============

    /// 공개 응답 제출 (비인증)
    ///
    /// 개별 답변의 실패는 격리됩니다. 검증에 실패한 답변은 건너뛰고
    /// 나머지를 저장한 뒤, 생성/기대 수를 결과로 보고합니다.
    pub async fn submit_response(
        state: AppState,
        ip_address: Option<String>,
        req: SubmitResponseRequest,
    ) -> Result<SubmitResponseResult, AppError> {
        // 1. 설문 존재/상태/기간 확인
        let survey_model = Self::find_survey(&state.db, req.survey).await?;

        if !survey_model.is_active {
            return Err(AppError::SurveyNotActive(
                "이 설문은 활성 상태가 아닙니다.".to_string(),
            ));
        }

        let now = Utc::now().naive_utc();
        if now < survey_model.start_date {
            return Err(AppError::SurveyClosed(format!(
                "이 설문은 아직 시작되지 않았습니다. 시작: {}",
                Self::format_datetime(survey_model.start_date),
            )));
        }
        if now > survey_model.end_date {
            return Err(AppError::SurveyClosed(format!(
                "이 설문은 이미 마감되었습니다. 마감: {}",
                Self::format_datetime(survey_model.end_date),
            )));
        }

        // 2. 설문의 질문/선택지 참조 테이블 적재 (답변 검증용)
        let question_ids: HashSet<i64> = question::Entity::find()
            .filter(question::Column::SurveyId.eq(req.survey))
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .iter()
            .map(|q| q.question_id)
            .collect();
        let id_list: Vec<i64> = question_ids.iter().copied().collect();

        // 선택지 id → 소속 질문 id
        let option_owner: HashMap<i64, i64> = option::Entity::find()
            .filter(option::Column::QuestionId.is_in(id_list.clone()))
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .iter()
            .map(|o| (o.option_id, o.question_id))
            .collect();
        let row_owner: HashMap<i64, i64> = matrix_row::Entity::find()
            .filter(matrix_row::Column::QuestionId.is_in(id_list.clone()))
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .iter()
            .map(|r| (r.matrix_row_id, r.question_id))
            .collect();
        let column_owner: HashMap<i64, i64> = matrix_column::Entity::find()
            .filter(matrix_column::Column::QuestionId.is_in(id_list))
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .iter()
            .map(|c| (c.matrix_column_id, c.question_id))
            .collect();

        // 3. Response 생성
        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let response_model = response::ActiveModel {
            survey_id: Set(req.survey),
            respondent_name: Set(req.respondent_name.clone().unwrap_or_default()),
            respondent_email: Set(req.respondent_email.clone().unwrap_or_default()),
            submitted_at: Set(now),
            ip_address: Set(ip_address),
            ..Default::default()
        };
        let created_response = response_model
            .insert(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 4. 답변별 생성 (실패는 격리하고 계속 진행)
        let expected = req.answers.len();
        let mut created = 0usize;

        for item in &req.answers {
            if let Err(reason) = Self::validate_answer_refs(
                item,
                &question_ids,
                &option_owner,
                &row_owner,
                &column_owner,
            ) {
                warn!(
                    response_id = created_response.response_id,
                    question_id = item.question,
                    reason = %reason,
                    "답변 생성 건너뜀"
                );
                continue;
            }

            let answer_model = answer::ActiveModel {
                response_id: Set(created_response.response_id),
                question_id: Set(item.question),
                selected_option_id: Set(item.selected_option),
                matrix_row_id: Set(item.matrix_row),
                matrix_column_id: Set(item.matrix_column),
                text_answer: Set(item.text_answer.clone().unwrap_or_default()),
                ..Default::default()
            };
            // 저장 실패도 검증 실패처럼 격리. MySQL은 문장 실패가 트랜잭션을
            // 중단시키지 않으므로 나머지 답변과 Response는 그대로 커밋됨
            match answer_model.insert(&txn).await {
                Ok(_) => created += 1,
                Err(e) => {
                    warn!(
                        response_id = created_response.response_id,
                        question_id = item.question,
                        error = %e,
                        "답변 저장 실패"
                    );
                }
            }
        }

        // 5. 부분 실패여도 Response는 저장 (best effort)
        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if created != expected {
            warn!(
                response_id = created_response.response_id,
                expected = expected,
                created = created,
                "일부 답변이 저장되지 않았습니다"
            );
        } else {
            info!(
                response_id = created_response.response_id,
                created = created,
                "응답 저장 완료"
            );
        }

        Ok(SubmitResponseResult {
            response_id: created_response.response_id,
            expected_answers: expected,
            created_answers: created,
        })
    }

    /// 답변이 참조하는 질문/선택지의 유효성 검사
    fn validate_answer_refs(
        item: &super::dto::SubmitAnswerItem,
        question_ids: &HashSet<i64>,
        option_owner: &HashMap<i64, i64>,
        row_owner: &HashMap<i64, i64>,
        column_owner: &HashMap<i64, i64>,
    ) -> Result<(), String> {
        if !question_ids.contains(&item.question) {
            return Err(format!("설문에 속하지 않는 질문입니다: {}", item.question));
        }
        if let Some(option_id) = item.selected_option {
            if option_owner.get(&option_id) != Some(&item.question) {
                return Err(format!("질문에 속하지 않는 선택지입니다: {}", option_id));
            }
        }
        if let Some(row_id) = item.matrix_row {
            if row_owner.get(&row_id) != Some(&item.question) {
                return Err(format!("질문에 속하지 않는 행입니다: {}", row_id));
            }
        }
        if let Some(column_id) = item.matrix_column {
            if column_owner.get(&column_id) != Some(&item.question) {
                return Err(format!("질문에 속하지 않는 열입니다: {}", column_id));
            }
        }
        Ok(())
    }

    // ============== 통계 ==============

    /// 설문 통계 집계
    ///
    /// 질문 하나의 집계 실패는 격리되어 해당 질문만 빈 데이터로 내려가고,
    /// 나머지 질문의 집계는 계속됩니다.
    pub async fn get_statistics(
        state: AppState,
        actor: Actor,
        survey_id: Uuid,
    ) -> Result<SurveyStatisticsResponse, AppError> {
        let survey_model = Self::find_survey(&state.db, survey_id).await?;

        if !Self::can_view_statistics(&state.db, &actor, &survey_model).await? {
            return Err(AppError::SurveyAccessDenied(
                "이 설문의 통계를 열람할 권한이 없습니다.".to_string(),
            ));
        }

        let total_responses = response::Entity::find()
            .filter(response::Column::SurveyId.eq(survey_id))
            .count(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let questions = question::Entity::find()
            .filter(question::Column::SurveyId.eq(survey_id))
            .order_by_asc(question::Column::Order)
            .order_by_asc(question::Column::CreatedAt)
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let mut question_stats = Vec::with_capacity(questions.len());
        for question_model in &questions {
            let (data, total_answers) =
                match Self::compute_question_statistics(&state.db, question_model).await {
                    Ok(result) => result,
                    Err(e) => {
                        // 질문 단위 실패 격리: 빈 데이터로 대체하고 계속
                        warn!(
                            question_id = question_model.question_id,
                            error = %e.message(),
                            "질문 통계 집계 실패"
                        );
                        (QuestionStatData::empty(), 0)
                    }
                };

            question_stats.push(QuestionStatistics {
                id: question_model.question_id,
                text: question_model.text.clone(),
                question_type: question_model.question_type,
                total_answers,
                data,
            });
        }

        Ok(SurveyStatisticsResponse {
            survey: StatsSurveySummary {
                id: survey_model.survey_id,
                title: survey_model.title,
                total_responses,
            },
            questions: question_stats,
        })
    }

    /// 질문 하나의 집계 테이블과 총 답변 수 계산
    async fn compute_question_statistics(
        db: &impl ConnectionTrait,
        question_model: &question::Model,
    ) -> Result<(QuestionStatData, u64), AppError> {
        let answers = answer::Entity::find()
            .filter(answer::Column::QuestionId.eq(question_model.question_id))
            .all(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        match question_model.question_type {
            QuestionType::Single => {
                let option_text = Self::load_option_texts(db, question_model.question_id).await?;
                let counts = statistics::count_by_choice(&answers, &option_text);
                // 단일 선택: 선택 수 합계가 곧 답변 수
                let total = counts.values().sum();
                Ok((QuestionStatData::Choice(counts), total))
            }
            QuestionType::Multiple => {
                let option_text = Self::load_option_texts(db, question_model.question_id).await?;
                let counts = statistics::count_by_choice(&answers, &option_text);
                // 복수 선택: 한 응답자가 여러 개를 고르므로 응답자 수를 총계로
                let total = statistics::distinct_response_total(&answers);
                Ok((QuestionStatData::Choice(counts), total))
            }
            QuestionType::Matrix => {
                let row_text: HashMap<i64, String> = matrix_row::Entity::find()
                    .filter(matrix_row::Column::QuestionId.eq(question_model.question_id))
                    .all(db)
                    .await
                    .map_err(|e| AppError::InternalError(e.to_string()))?
                    .into_iter()
                    .map(|r| (r.matrix_row_id, r.text))
                    .collect();
                let column_text: HashMap<i64, String> = matrix_column::Entity::find()
                    .filter(matrix_column::Column::QuestionId.eq(question_model.question_id))
                    .all(db)
                    .await
                    .map_err(|e| AppError::InternalError(e.to_string()))?
                    .into_iter()
                    .map(|c| (c.matrix_column_id, c.text))
                    .collect();
                let counts = statistics::count_matrix(&answers, &row_text, &column_text);
                let total = statistics::distinct_response_total(&answers);
                Ok((QuestionStatData::Matrix(counts), total))
            }
            // 예약 유형은 집계하지 않음
            QuestionType::MatrixMul | QuestionType::Open => Ok((QuestionStatData::empty(), 0)),
        }
    }

    async fn load_option_texts(
        db: &impl ConnectionTrait,
        question_id: i64,
    ) -> Result<HashMap<i64, String>, AppError> {
        Ok(option::Entity::find()
            .filter(option::Column::QuestionId.eq(question_id))
            .all(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .into_iter()
            .map(|o| (o.option_id, o.text))
            .collect())
    }

    // ============== 권한/조회 헬퍼 ==============

    async fn find_survey(
        db: &impl ConnectionTrait,
        survey_id: Uuid,
    ) -> Result<survey::Model, AppError> {
        survey::Entity::find_by_id(survey_id)
            .one(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::SurveyNotFound("존재하지 않는 설문입니다.".to_string()))
    }

    /// 수정/삭제 권한: admin 또는 설문 작성자 본인
    fn ensure_can_modify(actor: &Actor, survey_model: &survey::Model) -> Result<(), AppError> {
        if actor.role.has_at_least(Role::Admin) || survey_model.creator_id == actor.account_id {
            Ok(())
        } else {
            Err(AppError::SurveyAccessDenied(
                "이 설문을 수정할 권한이 없습니다.".to_string(),
            ))
        }
    }

    /// 열람 권한: admin, 작성자 본인, 또는 배정된 열람자
    async fn can_view(
        db: &impl ConnectionTrait,
        actor: &Actor,
        survey_model: &survey::Model,
    ) -> Result<bool, AppError> {
        if actor.role.has_at_least(Role::Admin) || survey_model.creator_id == actor.account_id {
            return Ok(true);
        }
        Self::is_assigned_viewer(db, survey_model.survey_id, actor.account_id).await
    }

    /// 통계 열람 권한: admin, 작성자 본인, 또는 viewer 역할로 배정된 계정
    async fn can_view_statistics(
        db: &impl ConnectionTrait,
        actor: &Actor,
        survey_model: &survey::Model,
    ) -> Result<bool, AppError> {
        if actor.role.has_at_least(Role::Admin) || survey_model.creator_id == actor.account_id {
            return Ok(true);
        }
        if actor.role != Role::Viewer {
            return Ok(false);
        }
        Self::is_assigned_viewer(db, survey_model.survey_id, actor.account_id).await
    }

    async fn is_assigned_viewer(
        db: &impl ConnectionTrait,
        survey_id: Uuid,
        account_id: i64,
    ) -> Result<bool, AppError> {
        let assigned = survey_viewer::Entity::find()
            .filter(survey_viewer::Column::SurveyId.eq(survey_id))
            .filter(survey_viewer::Column::AccountId.eq(account_id))
            .one(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        Ok(assigned.is_some())
    }

    /// 열람 배정 대상이 전원 viewer 역할인지 검증합니다.
    ///
    /// 하나라도 아니면 해당 username 목록을 담아 전체 요청을 거부합니다.
    async fn validate_assigned_viewers(
        db: &impl ConnectionTrait,
        viewer_ids: &[i64],
    ) -> Result<(), AppError> {
        if viewer_ids.is_empty() {
            return Ok(());
        }

        let accounts = account::Entity::find()
            .filter(account::Column::AccountId.is_in(viewer_ids.to_vec()))
            .all(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let found_ids: HashSet<i64> = accounts.iter().map(|a| a.account_id).collect();
        let missing: Vec<String> = viewer_ids
            .iter()
            .filter(|id| !found_ids.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::ValidationError(format!(
                "존재하지 않는 계정이 포함되어 있습니다: {}",
                missing.join(", ")
            )));
        }

        let invalid: Vec<String> = accounts
            .iter()
            .filter(|a| a.role != Role::Viewer)
            .map(|a| a.username.clone())
            .collect();
        if !invalid.is_empty() {
            return Err(AppError::ViewerRoleInvalid(format!(
                "다음 사용자는 열람자(viewer)가 아닙니다: {}",
                invalid.join(", ")
            )));
        }

        Ok(())
    }

    async fn replace_assigned_viewers(
        txn: &DatabaseTransaction,
        survey_id: Uuid,
        viewer_ids: &[i64],
    ) -> Result<(), AppError> {
        for account_id in viewer_ids {
            let viewer_model = survey_viewer::ActiveModel {
                survey_id: Set(survey_id),
                account_id: Set(*account_id),
                ..Default::default()
            };
            viewer_model
                .insert(txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }
        Ok(())
    }

    // ============== 직렬화 헬퍼 ==============

    async fn load_survey_detail_by_id(
        db: &impl ConnectionTrait,
        survey_id: Uuid,
    ) -> Result<SurveyDetailResponse, AppError> {
        let survey_model = Self::find_survey(db, survey_id).await?;
        Self::load_survey_detail(db, survey_model).await
    }

    /// 설문 상세 응답 조립 (작성자명/응답 수/개방 여부 계산 포함)
    async fn load_survey_detail(
        db: &impl ConnectionTrait,
        survey_model: survey::Model,
    ) -> Result<SurveyDetailResponse, AppError> {
        let creator = account::Entity::find_by_id(survey_model.creator_id)
            .one(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| {
                AppError::InternalError("설문 작성자 계정을 찾을 수 없습니다.".to_string())
            })?;

        let total_responses = response::Entity::find()
            .filter(response::Column::SurveyId.eq(survey_model.survey_id))
            .count(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let assigned_viewers: Vec<i64> = survey_viewer::Entity::find()
            .filter(survey_viewer::Column::SurveyId.eq(survey_model.survey_id))
            .all(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .iter()
            .map(|v| v.account_id)
            .collect();

        let questions = Self::load_question_views(db, survey_model.survey_id).await?;

        let is_open = survey_model.is_open();

        Ok(SurveyDetailResponse {
            id: survey_model.survey_id,
            title: survey_model.title,
            description: survey_model.description,
            creator: survey_model.creator_id,
            creator_name: creator.username,
            start_date: Self::to_utc(survey_model.start_date),
            end_date: Self::to_utc(survey_model.end_date),
            is_active: survey_model.is_active,
            created_at: Self::to_utc(survey_model.created_at),
            updated_at: Self::to_utc(survey_model.updated_at),
            is_open,
            total_responses,
            assigned_viewers,
            questions,
        })
    }

    /// 질문 목록을 표시 순서대로 조회해 유형별 프로젝션을 적용합니다.
    async fn load_question_views(
        db: &impl ConnectionTrait,
        survey_id: Uuid,
    ) -> Result<Vec<QuestionView>, AppError> {
        let questions = question::Entity::find()
            .filter(question::Column::SurveyId.eq(survey_id))
            .order_by_asc(question::Column::Order)
            .order_by_asc(question::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let mut views = Vec::with_capacity(questions.len());
        for question_model in questions {
            let options: Vec<ChoiceView> = option::Entity::find()
                .filter(option::Column::QuestionId.eq(question_model.question_id))
                .order_by_asc(option::Column::Order)
                .all(db)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?
                .into_iter()
                .map(ChoiceView::from)
                .collect();
            let rows: Vec<ChoiceView> = matrix_row::Entity::find()
                .filter(matrix_row::Column::QuestionId.eq(question_model.question_id))
                .order_by_asc(matrix_row::Column::Order)
                .all(db)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?
                .into_iter()
                .map(ChoiceView::from)
                .collect();
            let columns: Vec<ChoiceView> = matrix_column::Entity::find()
                .filter(matrix_column::Column::QuestionId.eq(question_model.question_id))
                .order_by_asc(matrix_column::Column::Order)
                .all(db)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?
                .into_iter()
                .map(ChoiceView::from)
                .collect();

            let content = QuestionContent::classify(
                question_model.question_type,
                options,
                rows,
                columns,
            );
            let (options, matrix_rows, matrix_columns) = content.into_parts();

            views.push(QuestionView {
                id: question_model.question_id,
                text: question_model.text,
                question_type: question_model.question_type,
                is_required: question_model.is_required,
                order: question_model.order,
                options,
                matrix_rows,
                matrix_columns,
            });
        }

        Ok(views)
    }

    fn to_utc(naive: NaiveDateTime) -> chrono::DateTime<Utc> {
        chrono::DateTime::from_naive_utc_and_offset(naive, Utc)
    }

    fn format_datetime(naive: NaiveDateTime) -> String {
        format!("{} UTC", naive.format("%Y-%m-%d %H:%M"))
    }
}
