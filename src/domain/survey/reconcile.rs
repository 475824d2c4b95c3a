//! 설문 문서 정합(reconciliation) 계획 수립
//!
//! 클라이언트가 제출한 중첩 문서(설문 → 질문 → 선택지/행/열)를 저장된 상태와
//! 비교해 생성/갱신/삭제를 분류합니다. 통계(Answer)가 매달려 있는 엔티티를
//! 전부 지우고 다시 만들면 응답 이력이 함께 사라지므로, id가 일치하는
//! 엔티티는 반드시 제자리에서 갱신합니다.
//!
//! 계획 수립은 순수 함수이고, 실제 쓰기는 service가 트랜잭션 안에서 수행합니다.

use std::collections::{HashMap, HashSet};

use super::dto::{ChoiceDoc, QuestionDoc};

/// 저장된 선택지/행/열의 현재 상태
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceState {
    pub id: i64,
    pub text: String,
    pub order: i32,
}

/// 기존 엔티티 제자리 갱신 (id와 연결된 Answer 보존)
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceUpdate {
    pub id: i64,
    pub text: String,
    pub order: i32,
}

/// 신규 엔티티 생성
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceCreate {
    pub text: String,
    pub order: i32,
}

/// 한 종류의 선택지 목록에 대한 정합 계획
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChoicePlan {
    pub updates: Vec<ChoiceUpdate>,
    pub creates: Vec<ChoiceCreate>,
    /// 제출 목록에 더 이상 없는 기존 id. 삭제 시 해당 id를 참조하는
    /// Answer도 함께 삭제되어야 합니다.
    pub delete_ids: Vec<i64>,
}

/// 선택지 목록의 keyed-merge 계획을 수립합니다.
///
/// - 제출 문서의 id가 기존 엔티티와 일치 → 갱신
/// - id가 없거나 일치하지 않음 → 생성 (order 생략 시 제출 위치가 order)
/// - 제출 목록에 없는 기존 id → 삭제
///
/// 제출 목록 자체가 없는 경우(키 부재)는 호출부에서 "변경 없음"으로
/// 처리하므로 이 함수에 오지 않습니다. 빈 목록은 전체 삭제를 의미합니다.
pub fn plan_choices(existing: &[ChoiceState], submitted: &[ChoiceDoc]) -> ChoicePlan {
    let existing_by_id: HashMap<i64, &ChoiceState> =
        existing.iter().map(|c| (c.id, c)).collect();
    let mut visited: HashSet<i64> = HashSet::new();
    let mut plan = ChoicePlan::default();

    for (idx, doc) in submitted.iter().enumerate() {
        let order = doc.order.unwrap_or(idx as i32);

        match doc.id.filter(|id| existing_by_id.contains_key(id)) {
            Some(id) => {
                visited.insert(id);
                plan.updates.push(ChoiceUpdate {
                    id,
                    text: doc.text.clone(),
                    order,
                });
            }
            None => {
                plan.creates.push(ChoiceCreate {
                    text: doc.text.clone(),
                    order,
                });
            }
        }
    }

    plan.delete_ids = existing
        .iter()
        .filter(|c| !visited.contains(&c.id))
        .map(|c| c.id)
        .collect();

    plan
}

/// 설문 단위 질문 목록에 대한 정합 계획
#[derive(Debug, Default)]
pub struct QuestionPlan {
    /// (기존 question_id, 부분 갱신 문서)
    pub updates: Vec<(i64, QuestionDoc)>,
    pub creates: Vec<QuestionDoc>,
    /// 하위 선택지/행/열과 Answer까지 연쇄 삭제 대상
    pub delete_ids: Vec<i64>,
}

/// 질문 목록의 keyed-merge 계획을 수립합니다. 분류 규칙은 `plan_choices`와
/// 동일하며, 중첩 선택지의 처리는 갱신/생성 적용 시점에 이루어집니다.
pub fn plan_questions(existing_ids: &[i64], submitted: &[QuestionDoc]) -> QuestionPlan {
    let existing: HashSet<i64> = existing_ids.iter().copied().collect();
    let mut visited: HashSet<i64> = HashSet::new();
    let mut plan = QuestionPlan::default();

    for doc in submitted {
        match doc.id.filter(|id| existing.contains(id)) {
            Some(id) => {
                visited.insert(id);
                plan.updates.push((id, doc.clone()));
            }
            None => {
                plan.creates.push(doc.clone());
            }
        }
    }

    plan.delete_ids = existing_ids
        .iter()
        .filter(|id| !visited.contains(id))
        .copied()
        .collect();

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: i64, text: &str, order: i32) -> ChoiceState {
        ChoiceState {
            id,
            text: text.to_string(),
            order,
        }
    }

    fn doc(id: Option<i64>, text: &str, order: Option<i32>) -> ChoiceDoc {
        ChoiceDoc {
            id,
            text: text.to_string(),
            order,
        }
    }

    fn question_doc(id: Option<i64>) -> QuestionDoc {
        QuestionDoc {
            id,
            text: Some("질문".to_string()),
            question_type: None,
            is_required: None,
            order: None,
            options: None,
            matrix_rows: None,
            matrix_columns: None,
        }
    }

    // ===== 선택지 정합 계획 =====

    #[test]
    fn should_update_choice_in_place_when_id_matches() {
        // Arrange
        let existing = vec![state(10, "예", 0)];
        let submitted = vec![doc(Some(10), "예 (수정)", Some(3))];

        // Act
        let plan = plan_choices(&existing, &submitted);

        // Assert: 기존 id 유지 → 연결된 Answer 보존
        assert_eq!(
            plan.updates,
            vec![ChoiceUpdate {
                id: 10,
                text: "예 (수정)".to_string(),
                order: 3
            }]
        );
        assert!(plan.creates.is_empty());
        assert!(plan.delete_ids.is_empty());
    }

    #[test]
    fn should_create_choice_without_id() {
        let existing = vec![state(10, "예", 0)];
        let submitted = vec![doc(Some(10), "예", None), doc(None, "아니오", None)];

        let plan = plan_choices(&existing, &submitted);

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(
            plan.creates,
            vec![ChoiceCreate {
                text: "아니오".to_string(),
                order: 1
            }]
        );
    }

    #[test]
    fn should_create_choice_when_id_does_not_resolve() {
        // Arrange: 존재하지 않는 id는 신규 생성으로 분류
        let existing = vec![state(10, "예", 0)];
        let submitted = vec![doc(Some(999), "새 항목", None)];

        // Act
        let plan = plan_choices(&existing, &submitted);

        // Assert
        assert!(plan.updates.is_empty());
        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.delete_ids, vec![10]);
    }

    #[test]
    fn should_delete_choices_missing_from_submission() {
        let existing = vec![state(1, "A", 0), state(2, "B", 1), state(3, "C", 2)];
        let submitted = vec![doc(Some(2), "B", None)];

        let plan = plan_choices(&existing, &submitted);

        assert_eq!(plan.delete_ids, vec![1, 3]);
    }

    #[test]
    fn should_delete_everything_for_empty_submission() {
        // 빈 목록은 "전부 비움" (키 부재와 구분됨)
        let existing = vec![state(1, "A", 0), state(2, "B", 1)];

        let plan = plan_choices(&existing, &[]);

        assert!(plan.updates.is_empty());
        assert!(plan.creates.is_empty());
        assert_eq!(plan.delete_ids, vec![1, 2]);
    }

    #[test]
    fn should_default_order_to_submission_position() {
        let submitted = vec![
            doc(None, "첫째", None),
            doc(None, "둘째", None),
            doc(None, "셋째", Some(99)),
        ];

        let plan = plan_choices(&[], &submitted);

        let orders: Vec<i32> = plan.creates.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 99]);
    }

    #[test]
    fn should_be_idempotent_for_unchanged_submission() {
        // Arrange: 현재 상태를 그대로 다시 제출
        let existing = vec![state(1, "예", 0), state(2, "아니오", 1)];
        let submitted = vec![
            doc(Some(1), "예", Some(0)),
            doc(Some(2), "아니오", Some(1)),
        ];

        // Act
        let plan = plan_choices(&existing, &submitted);

        // Assert: 생성/삭제 없음
        assert!(plan.creates.is_empty());
        assert!(plan.delete_ids.is_empty());
        assert_eq!(plan.updates.len(), 2);
    }

    #[test]
    fn should_retain_yes_delete_zero_create_maybe() {
        // Arrange: ["Yes"(id 1), "Zero"(id 2)] 상태에서
        // [{id: 1, text: "Yes"}, {text: "Maybe"}] 제출
        let existing = vec![state(1, "Yes", 0), state(2, "Zero", 1)];
        let submitted = vec![doc(Some(1), "Yes", None), doc(None, "Maybe", None)];

        // Act
        let plan = plan_choices(&existing, &submitted);

        // Assert: Yes 유지(동일 id), Zero 삭제, Maybe는 order 1로 생성
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].id, 1);
        assert_eq!(plan.updates[0].text, "Yes");
        assert_eq!(plan.delete_ids, vec![2]);
        assert_eq!(
            plan.creates,
            vec![ChoiceCreate {
                text: "Maybe".to_string(),
                order: 1
            }]
        );
    }

    // ===== 질문 정합 계획 =====

    #[test]
    fn should_classify_questions_by_identity() {
        let existing = vec![11, 12, 13];
        let submitted = vec![
            question_doc(Some(12)),
            question_doc(None),
            question_doc(Some(999)),
        ];

        let plan = plan_questions(&existing, &submitted);

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].0, 12);
        assert_eq!(plan.creates.len(), 2);
        assert_eq!(plan.delete_ids, vec![11, 13]);
    }

    #[test]
    fn should_delete_all_questions_for_empty_list() {
        let plan = plan_questions(&[1, 2], &[]);

        assert!(plan.updates.is_empty());
        assert!(plan.creates.is_empty());
        assert_eq!(plan.delete_ids, vec![1, 2]);
    }

    #[test]
    fn should_not_delete_anything_when_all_ids_resubmitted() {
        let plan = plan_questions(&[1, 2], &[question_doc(Some(1)), question_doc(Some(2))]);

        assert!(plan.delete_ids.is_empty());
        assert!(plan.creates.is_empty());
        assert_eq!(plan.updates.len(), 2);
    }
}
