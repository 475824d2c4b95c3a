use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "surveys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub survey_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub creator_id: i64,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    /// 설문이 주어진 시각에 응답을 받을 수 있는 상태인지 계산합니다.
    ///
    /// 저장된 상태 전이 없이 (is_active, start_date, end_date)에서 매번 재계산합니다.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }

    /// 현재 시각 기준 개방 여부
    pub fn is_open(&self) -> bool {
        self.is_open_at(chrono::Utc::now().naive_utc())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::account::entity::account::Entity",
        from = "Column::CreatorId",
        to = "crate::domain::account::entity::account::Column::AccountId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Creator,
    #[sea_orm(has_many = "super::question::Entity")]
    Question,
    #[sea_orm(has_many = "super::response::Entity")]
    Response,
    #[sea_orm(has_many = "super::survey_viewer::Entity")]
    SurveyViewer,
}

impl Related<crate::domain::account::entity::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Response.def()
    }
}

impl Related<super::survey_viewer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveyViewer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn survey(is_active: bool, start: NaiveDateTime, end: NaiveDateTime) -> Model {
        let created = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Model {
            survey_id: Uuid::new_v4(),
            title: "만족도 조사".to_string(),
            description: String::new(),
            creator_id: 1,
            start_date: start,
            end_date: end,
            is_active,
            created_at: created,
            updated_at: created,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn should_be_open_inside_window_when_active() {
        let s = survey(true, at(2024, 3, 1), at(2024, 3, 31));
        assert!(s.is_open_at(at(2024, 3, 15)));
    }

    #[test]
    fn should_be_closed_before_start_date() {
        let s = survey(true, at(2024, 3, 1), at(2024, 3, 31));
        assert!(!s.is_open_at(at(2024, 2, 28)));
    }

    #[test]
    fn should_be_closed_after_end_date() {
        let s = survey(true, at(2024, 3, 1), at(2024, 3, 31));
        assert!(!s.is_open_at(at(2024, 4, 1)));
    }

    #[test]
    fn should_be_closed_when_inactive_even_inside_window() {
        let s = survey(false, at(2024, 3, 1), at(2024, 3, 31));
        assert!(!s.is_open_at(at(2024, 3, 15)));
    }

    #[test]
    fn should_treat_window_bounds_as_inclusive() {
        let s = survey(true, at(2024, 3, 1), at(2024, 3, 31));
        assert!(s.is_open_at(at(2024, 3, 1)));
        assert!(s.is_open_at(at(2024, 3, 31)));
    }
}
