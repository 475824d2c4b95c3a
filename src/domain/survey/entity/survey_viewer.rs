use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 설문 ↔ 계정 열람 배정 (assigned viewers) 조인 테이블
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "survey_viewers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub survey_viewer_id: i64,
    pub survey_id: Uuid,
    pub account_id: i64,
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
    #[sea_orm(
        belongs_to = "crate::domain::account::entity::account::Entity",
        from = "Column::AccountId",
        to = "crate::domain::account::entity::account::Column::AccountId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Account,
}

impl Related<super::survey::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Survey.def()
    }
}

impl Related<crate::domain::account::entity::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
