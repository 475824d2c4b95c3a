//! 답변 집계 엔진
//!
//! 저장된 Answer 행을 질문 유형별 count 테이블로 요약합니다.
//! 여기의 함수들은 조회된 행에 대한 순수 계산이며, DB 조회와 질문 단위
//! 실패 격리는 service가 담당합니다.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::entity::answer;

/// 선택지별 답변 수 집계 (single/multiple 공용)
///
/// selected_option_id가 없는 행, 또는 더 이상 존재하지 않는 선택지를
/// 가리키는 행은 집계에서 제외합니다.
pub fn count_by_choice(
    answers: &[answer::Model],
    option_text: &HashMap<i64, String>,
) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for answer in answers {
        let Some(option_id) = answer.selected_option_id else {
            continue;
        };
        let Some(text) = option_text.get(&option_id) else {
            continue;
        };
        *counts.entry(text.clone()).or_insert(0) += 1;
    }

    counts
}

/// 행 텍스트 → (열 텍스트 → 답변 수) 2단계 집계 (matrix 전용)
///
/// 행과 열이 모두 지정된 답변만 집계합니다.
pub fn count_matrix(
    answers: &[answer::Model],
    row_text: &HashMap<i64, String>,
    column_text: &HashMap<i64, String>,
) -> BTreeMap<String, BTreeMap<String, u64>> {
    let mut counts: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    for answer in answers {
        let (Some(row_id), Some(column_id)) = (answer.matrix_row_id, answer.matrix_column_id)
        else {
            continue;
        };
        let (Some(row), Some(column)) = (row_text.get(&row_id), column_text.get(&column_id))
        else {
            continue;
        };
        *counts
            .entry(row.clone())
            .or_default()
            .entry(column.clone())
            .or_insert(0) += 1;
    }

    counts
}

/// 해당 질문에 답한 서로 다른 Response 수
///
/// multiple 질문은 한 응답자가 여러 선택지를 고를 수 있으므로
/// (Answer 행이 여러 개) 선택 수 합계가 아니라 이 값을 총계로 씁니다.
pub fn distinct_response_total(answers: &[answer::Model]) -> u64 {
    answers
        .iter()
        .map(|a| a.response_id)
        .collect::<HashSet<_>>()
        .len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(
        response_id: i64,
        option: Option<i64>,
        row: Option<i64>,
        column: Option<i64>,
    ) -> answer::Model {
        answer::Model {
            answer_id: 0,
            response_id,
            question_id: 1,
            selected_option_id: option,
            matrix_row_id: row,
            matrix_column_id: column,
            text_answer: String::new(),
        }
    }

    fn texts(pairs: &[(i64, &str)]) -> HashMap<i64, String> {
        pairs.iter().map(|(id, t)| (*id, t.to_string())).collect()
    }

    #[test]
    fn should_count_single_choice_answers_per_option() {
        // Arrange
        let options = texts(&[(1, "예"), (2, "아니오")]);
        let answers = vec![
            answer(100, Some(1), None, None),
            answer(101, Some(1), None, None),
            answer(102, Some(2), None, None),
        ];

        // Act
        let counts = count_by_choice(&answers, &options);

        // Assert
        assert_eq!(counts.get("예"), Some(&2));
        assert_eq!(counts.get("아니오"), Some(&1));
    }

    #[test]
    fn should_skip_answers_without_selection() {
        let options = texts(&[(1, "예")]);
        let answers = vec![
            answer(100, Some(1), None, None),
            answer(101, None, None, None),
        ];

        let counts = count_by_choice(&answers, &options);

        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("예"), Some(&1));
    }

    #[test]
    fn should_skip_answers_referencing_unknown_option() {
        let options = texts(&[(1, "예")]);
        let answers = vec![answer(100, Some(99), None, None)];

        let counts = count_by_choice(&answers, &options);

        assert!(counts.is_empty());
    }

    #[test]
    fn should_count_matrix_answers_per_row_and_column() {
        // Arrange: 행 ["찬성","반대"] × 열 ["낮음","높음"],
        // (찬성,낮음)×2, (찬성,높음)×1
        let rows = texts(&[(1, "찬성"), (2, "반대")]);
        let columns = texts(&[(10, "낮음"), (11, "높음")]);
        let answers = vec![
            answer(100, None, Some(1), Some(10)),
            answer(101, None, Some(1), Some(10)),
            answer(102, None, Some(1), Some(11)),
        ];

        // Act
        let counts = count_matrix(&answers, &rows, &columns);

        // Assert
        assert_eq!(counts["찬성"]["낮음"], 2);
        assert_eq!(counts["찬성"]["높음"], 1);
        assert!(!counts.contains_key("반대"));
        assert_eq!(distinct_response_total(&answers), 3);
    }

    #[test]
    fn should_skip_matrix_answers_missing_row_or_column() {
        let rows = texts(&[(1, "찬성")]);
        let columns = texts(&[(10, "낮음")]);
        let answers = vec![
            answer(100, None, Some(1), None),
            answer(101, None, None, Some(10)),
            answer(102, None, Some(1), Some(10)),
        ];

        let counts = count_matrix(&answers, &rows, &columns);

        assert_eq!(counts.len(), 1);
        assert_eq!(counts["찬성"]["낮음"], 1);
    }

    #[test]
    fn should_count_distinct_responses_for_multiple_choice_total() {
        // 한 응답자(response 100)가 선택지 두 개를 고른 경우 총계는 2가 아닌 1+1
        let answers = vec![
            answer(100, Some(1), None, None),
            answer(100, Some(2), None, None),
            answer(101, Some(1), None, None),
        ];

        assert_eq!(distinct_response_total(&answers), 2);
    }

    #[test]
    fn should_return_zero_total_for_no_answers() {
        assert_eq!(distinct_response_total(&[]), 0);
    }
}
