use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 질문 유형
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "QuestionType")]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 단일 선택
    #[sea_orm(string_value = "single")]
    Single,
    /// 복수 선택
    #[sea_orm(string_value = "multiple")]
    Multiple,
    /// 행×열 매트릭스 (행마다 단일 선택)
    #[sea_orm(string_value = "matrix")]
    Matrix,
    /// 예약됨 (미구현)
    #[sea_orm(string_value = "matrix_mul")]
    MatrixMul,
    /// 예약됨 (미구현)
    #[sea_orm(string_value = "open")]
    Open,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub question_id: i64,
    pub survey_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub order: i32,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::survey::Entity",
        from = "Column::SurveyId",
        to = "super::survey::Column::SurveyId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Survey,
    #[sea_orm(has_many = "super::option::Entity")]
    Option,
    #[sea_orm(has_many = "super::matrix_row::Entity")]
    MatrixRow,
    #[sea_orm(has_many = "super::matrix_column::Entity")]
    MatrixColumn,
    #[sea_orm(has_many = "super::answer::Entity")]
    Answer,
}

impl Related<super::survey::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Survey.def()
    }
}

impl Related<super::option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Option.def()
    }
}

impl Related<super::matrix_row::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatrixRow.def()
    }
}

impl Related<super::matrix_column::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatrixColumn.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
