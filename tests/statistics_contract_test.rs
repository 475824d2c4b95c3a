//! 통계 응답 직렬화 계약 테스트
//!
//! 통계 응답이 질문 유형별로 기대하는 JSON 형태(선택지 맵 / 행×열 중첩 맵)로
//! 직렬화되는지, xlsx 내보내기가 유효한 파일을 만드는지 검증합니다.

use std::collections::BTreeMap;

use serde_json::json;
use uuid::Uuid;

use survey_server::domain::survey::dto::{
    QuestionStatData, QuestionStatistics, StatsSurveySummary, SurveyStatisticsResponse,
};
use survey_server::domain::survey::entity::question::QuestionType;
use survey_server::domain::survey::export;

fn sample_statistics() -> SurveyStatisticsResponse {
    let mut choice = BTreeMap::new();
    choice.insert("예".to_string(), 3u64);
    choice.insert("아니오".to_string(), 1u64);

    let mut matrix = BTreeMap::new();
    let mut approve = BTreeMap::new();
    approve.insert("낮음".to_string(), 2u64);
    approve.insert("높음".to_string(), 1u64);
    matrix.insert("찬성".to_string(), approve);

    SurveyStatisticsResponse {
        survey: StatsSurveySummary {
            id: Uuid::nil(),
            title: "고객 만족도 조사".to_string(),
            total_responses: 4,
        },
        questions: vec![
            QuestionStatistics {
                id: 1,
                text: "서비스에 만족하십니까?".to_string(),
                question_type: QuestionType::Single,
                total_answers: 4,
                data: QuestionStatData::Choice(choice),
            },
            QuestionStatistics {
                id: 2,
                text: "항목별 평가".to_string(),
                question_type: QuestionType::Matrix,
                total_answers: 3,
                data: QuestionStatData::Matrix(matrix),
            },
        ],
    }
}

#[test]
fn should_serialize_choice_data_as_flat_map() {
    // Act
    let value = serde_json::to_value(sample_statistics()).unwrap();

    // Assert: single 질문은 "선택지 → 수" 평면 맵
    assert_eq!(value["questions"][0]["data"], json!({ "예": 3, "아니오": 1 }));
    assert_eq!(value["questions"][0]["totalAnswers"], 4);
    assert_eq!(value["questions"][0]["questionType"], "single");
}

#[test]
fn should_serialize_matrix_data_as_nested_map() {
    let value = serde_json::to_value(sample_statistics()).unwrap();

    // matrix 질문은 "행 → (열 → 수)" 중첩 맵
    assert_eq!(
        value["questions"][1]["data"],
        json!({ "찬성": { "낮음": 2, "높음": 1 } })
    );
    assert_eq!(value["questions"][1]["questionType"], "matrix");
}

#[test]
fn should_use_camel_case_keys_in_summary() {
    let value = serde_json::to_value(sample_statistics()).unwrap();

    assert!(value["survey"]["totalResponses"].is_number());
    assert!(value["survey"].get("total_responses").is_none());
}

#[test]
fn should_export_statistics_to_valid_xlsx() {
    // Act
    let bytes = export::render_workbook(&sample_statistics()).unwrap();

    // Assert: xlsx는 zip 컨테이너이므로 PK 시그니처로 시작
    assert!(bytes.len() > 100);
    assert_eq!(&bytes[..2], b"PK");
}
