use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// matrix 질문의 행
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matrix_rows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub matrix_row_id: i64,
    pub question_id: i64,
    pub text: String,
    pub order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::QuestionId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Question,
    #[sea_orm(has_many = "super::answer::Entity")]
    Answer,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
