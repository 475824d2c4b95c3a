use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 계정 역할
///
/// Admin > Creator > Viewer 순서의 단일 권한 등급입니다.
/// "최소 R 이상" 검사는 `has_at_least`로 수행합니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "Role")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 설문 열람만 가능 (응답 통계 열람 대상자)
    #[sea_orm(string_value = "VIEWER")]
    Viewer,
    /// 설문 생성 및 자신의 설문 관리
    #[sea_orm(string_value = "CREATOR")]
    Creator,
    /// 전체 설문 관리
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

impl Role {
    fn rank(&self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Creator => 1,
            Role::Admin => 2,
        }
    }

    /// 최소 `required` 등급 이상의 권한인지 검사합니다.
    pub fn has_at_least(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "creator" => Ok(Role::Creator),
            "viewer" => Ok(Role::Viewer),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub account_id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::domain::survey::entity::survey::Entity")]
    Survey,
    #[sea_orm(has_many = "crate::domain::survey::entity::survey_viewer::Entity")]
    SurveyViewer,
}

impl Related<crate::domain::survey::entity::survey::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Survey.def()
    }
}

impl Related<crate::domain::survey::entity::survey_viewer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveyViewer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_rank_admin_above_creator_above_viewer() {
        assert!(Role::Admin.has_at_least(Role::Creator));
        assert!(Role::Admin.has_at_least(Role::Viewer));
        assert!(Role::Creator.has_at_least(Role::Viewer));
        assert!(!Role::Viewer.has_at_least(Role::Creator));
        assert!(!Role::Creator.has_at_least(Role::Admin));
    }

    #[test]
    fn should_have_reflexive_rank() {
        assert!(Role::Viewer.has_at_least(Role::Viewer));
        assert!(Role::Creator.has_at_least(Role::Creator));
        assert!(Role::Admin.has_at_least(Role::Admin));
    }

    #[test]
    fn should_parse_role_from_claims_string() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("CREATOR".parse::<Role>(), Ok(Role::Creator));
        assert_eq!("viewer".parse::<Role>(), Ok(Role::Viewer));
        assert!("manager".parse::<Role>().is_err());
    }
}
