use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 개별 질문에 대한 답변
///
/// 질문 유형에 따라 내용 모드가 다릅니다.
/// - single/multiple: selected_option_id
/// - matrix: matrix_row_id + matrix_column_id
/// - text_answer는 예약 필드 (현재 질문 유형에서는 사용하지 않음)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub answer_id: i64,
    pub response_id: i64,
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub matrix_row_id: Option<i64>,
    pub matrix_column_id: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub text_answer: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::response::Entity",
        from = "Column::ResponseId",
        to = "super::response::Column::ResponseId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Response,
    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::QuestionId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Question,
    #[sea_orm(
        belongs_to = "super::option::Entity",
        from = "Column::SelectedOptionId",
        to = "super::option::Column::OptionId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    SelectedOption,
    #[sea_orm(
        belongs_to = "super::matrix_row::Entity",
        from = "Column::MatrixRowId",
        to = "super::matrix_row::Column::MatrixRowId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    MatrixRow,
    #[sea_orm(
        belongs_to = "super::matrix_column::Entity",
        from = "Column::MatrixColumnId",
        to = "super::matrix_column::Column::MatrixColumnId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    MatrixColumn,
}

impl Related<super::response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Response.def()
    }
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SelectedOption.def()
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

impl ActiveModelBehavior for ActiveModel {}
