//! 설문 요청 DTO 검증 테스트
//!
//! 설문 생성/수정/응답 제출 요청의 역직렬화와 validator 규칙을 검증합니다.
//! DB 연결 없이 DTO 계약만 확인합니다.

use serde_json::json;
use validator::Validate;

use survey_server::domain::survey::dto::{
    SubmitAnswerItem, SubmitResponseRequest, SurveyCreateRequest, SurveyUpdateRequest,
};

#[test]
fn should_accept_valid_create_request() {
    // Arrange
    let body = json!({
        "title": "고객 만족도 조사",
        "description": "분기별 정기 조사",
        "startDate": "2026-01-01T00:00:00Z",
        "endDate": "2026-01-31T23:59:59Z",
        "questions": [
            {
                "text": "서비스에 만족하십니까?",
                "questionType": "single",
                "options": [
                    { "text": "예" },
                    { "text": "아니오" }
                ]
            }
        ]
    });

    // Act
    let req: SurveyCreateRequest = serde_json::from_value(body).unwrap();

    // Assert
    assert!(req.validate().is_ok());
    assert_eq!(req.title, "고객 만족도 조사");
    let questions = req.questions.unwrap();
    assert_eq!(questions[0].options.as_ref().unwrap().len(), 2);
}

#[test]
fn should_reject_empty_title() {
    let body = json!({
        "title": "",
        "startDate": "2026-01-01T00:00:00Z",
        "endDate": "2026-01-31T23:59:59Z"
    });

    let req: SurveyCreateRequest = serde_json::from_value(body).unwrap();

    assert!(req.validate().is_err());
}

#[test]
fn should_reject_choice_text_over_200_chars() {
    let body = json!({
        "title": "설문",
        "startDate": "2026-01-01T00:00:00Z",
        "endDate": "2026-01-31T23:59:59Z",
        "questions": [
            {
                "text": "질문",
                "questionType": "single",
                "options": [ { "text": "가".repeat(201) } ]
            }
        ]
    });

    let req: SurveyCreateRequest = serde_json::from_value(body).unwrap();

    // 중첩 목록(options)까지 검증이 전파되어야 함
    assert!(req.validate().is_err());
}

#[test]
fn should_distinguish_missing_key_from_empty_list_on_update() {
    // Arrange: questions 키 자체가 없는 요청과 빈 배열인 요청
    let without_key: SurveyUpdateRequest = serde_json::from_value(json!({
        "title": "수정된 제목"
    }))
    .unwrap();
    let with_empty: SurveyUpdateRequest = serde_json::from_value(json!({
        "questions": []
    }))
    .unwrap();

    // Assert: 키 부재는 "변경 없음", 빈 배열은 "전부 삭제"로 구분 가능해야 함
    assert!(without_key.questions.is_none());
    assert_eq!(with_empty.questions.map(|q| q.is_empty()), Some(true));
}

#[test]
fn should_parse_question_ids_for_in_place_update() {
    let req: SurveyUpdateRequest = serde_json::from_value(json!({
        "questions": [
            { "id": 42, "text": "수정된 질문" },
            { "text": "새 질문", "questionType": "multiple" }
        ]
    }))
    .unwrap();

    let questions = req.questions.unwrap();
    assert_eq!(questions[0].id, Some(42));
    assert_eq!(questions[1].id, None);
}

#[test]
fn should_reject_submission_without_answers() {
    let body = json!({
        "survey": "2b0c8ac2-62f3-4af0-9a42-51e2b7a2a6a0",
        "answers": []
    });

    let req: SubmitResponseRequest = serde_json::from_value(body).unwrap();

    assert!(req.validate().is_err());
}

#[test]
fn should_reject_invalid_respondent_email() {
    let body = json!({
        "survey": "2b0c8ac2-62f3-4af0-9a42-51e2b7a2a6a0",
        "respondentEmail": "이메일아님",
        "answers": [ { "question": 1, "selectedOption": 2 } ]
    });

    let req: SubmitResponseRequest = serde_json::from_value(body).unwrap();

    assert!(req.validate().is_err());
}

#[test]
fn should_serialize_answer_item_with_camel_case_keys() {
    // 답변 항목은 검증 실패 파라미터와 에코 응답에 그대로 실리므로
    // 역직렬화와 동일한 camelCase 키로 직렬화되어야 함
    let item = SubmitAnswerItem {
        question: 1,
        selected_option: Some(10),
        matrix_row: None,
        matrix_column: None,
        text_answer: None,
    };

    let value = serde_json::to_value(&item).unwrap();

    assert_eq!(value["question"], 1);
    assert_eq!(value["selectedOption"], 10);
    assert!(value.get("selected_option").is_none());
}

#[test]
fn should_accept_matrix_answer_item() {
    let body = json!({
        "survey": "2b0c8ac2-62f3-4af0-9a42-51e2b7a2a6a0",
        "respondentName": "홍길동",
        "respondentEmail": "hong@example.com",
        "answers": [
            { "question": 1, "matrixRow": 10, "matrixColumn": 20 }
        ]
    });

    let req: SubmitResponseRequest = serde_json::from_value(body).unwrap();

    assert!(req.validate().is_ok());
    assert_eq!(req.answers[0].matrix_row, Some(10));
    assert_eq!(req.answers[0].matrix_column, Some(20));
    assert_eq!(req.answers[0].selected_option, None);
}
