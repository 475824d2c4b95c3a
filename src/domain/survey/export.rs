//! 설문 통계 xlsx 내보내기
//!
//! 집계 결과를 요약 시트 + 질문별 시트로 렌더링합니다. 선택형 질문에는
//! 파이/막대 차트, 매트릭스 질문에는 그룹 막대 차트를 함께 그립니다.

use std::collections::BTreeSet;

use rust_xlsxwriter::{Chart, ChartType, Color, Format, Workbook, Worksheet, XlsxError};

use super::dto::{QuestionStatData, QuestionStatistics, SurveyStatisticsResponse};
use crate::utils::error::AppError;

const HEADER_COLOR: u32 = 0x366092;

/// 통계 응답을 xlsx 바이트로 렌더링합니다.
pub fn render_workbook(stats: &SurveyStatisticsResponse) -> Result<Vec<u8>, AppError> {
    build_workbook(stats)
        .and_then(|mut wb| wb.save_to_buffer())
        .map_err(|e| AppError::InternalError(format!("xlsx 생성 실패: {}", e)))
}

fn build_workbook(stats: &SurveyStatisticsResponse) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();

    write_summary_sheet(&mut workbook, stats)?;

    for (idx, question) in stats.questions.iter().enumerate() {
        let sheet_name = format!("질문 {}", idx + 1);
        write_question_sheet(&mut workbook, &sheet_name, &stats.survey.title, question)?;
    }

    Ok(workbook)
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_COLOR))
        .set_font_color(Color::White)
}

fn title_format() -> Format {
    Format::new().set_bold().set_font_size(14)
}

fn percent_format() -> Format {
    Format::new().set_num_format("0.0%")
}

fn write_summary_sheet(
    workbook: &mut Workbook,
    stats: &SurveyStatisticsResponse,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("요약")?;

    let title = title_format();
    let header = header_format();

    sheet.write_string_with_format(0, 0, &stats.survey.title, &title)?;
    sheet.write_string(1, 0, "총 응답 수")?;
    sheet.write_number(1, 1, stats.survey.total_responses as f64)?;

    sheet.write_string_with_format(3, 0, "질문", &header)?;
    sheet.write_string_with_format(3, 1, "유형", &header)?;
    sheet.write_string_with_format(3, 2, "답변 수", &header)?;

    for (idx, question) in stats.questions.iter().enumerate() {
        let row = 4 + idx as u32;
        sheet.write_string(row, 0, &question.text)?;
        sheet.write_string(row, 1, &format!("{:?}", question.question_type).to_lowercase())?;
        sheet.write_number(row, 2, question.total_answers as f64)?;
    }

    sheet.set_freeze_panes(4, 0)?;
    sheet.set_column_width(0, 50)?;
    sheet.set_column_width(1, 14)?;
    Ok(())
}

fn write_question_sheet(
    workbook: &mut Workbook,
    sheet_name: &str,
    survey_title: &str,
    question: &QuestionStatistics,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    let title = title_format();
    sheet.write_string_with_format(0, 0, survey_title, &title)?;
    sheet.write_string(1, 0, &question.text)?;
    sheet.write_string(2, 0, "답변 수")?;
    sheet.write_number(2, 1, question.total_answers as f64)?;

    match &question.data {
        QuestionStatData::Choice(counts) => {
            write_choice_table(sheet, sheet_name, question.total_answers, counts)?;
        }
        QuestionStatData::Matrix(grid) => {
            write_matrix_grid(sheet, sheet_name, grid)?;
        }
    }

    sheet.set_freeze_panes(5, 0)?;
    sheet.set_column_width(0, 40)?;
    Ok(())
}

/// 선택지/응답 수/비율 표와 파이·막대 차트
fn write_choice_table(
    sheet: &mut Worksheet,
    sheet_name: &str,
    total_answers: u64,
    counts: &std::collections::BTreeMap<String, u64>,
) -> Result<(), XlsxError> {
    let header = header_format();
    let percent = percent_format();

    let table_start: u32 = 4;
    sheet.write_string_with_format(table_start, 0, "선택지", &header)?;
    sheet.write_string_with_format(table_start, 1, "응답 수", &header)?;
    sheet.write_string_with_format(table_start, 2, "비율", &header)?;

    for (idx, (text, count)) in counts.iter().enumerate() {
        let row = table_start + 1 + idx as u32;
        sheet.write_string(row, 0, text)?;
        sheet.write_number(row, 1, *count as f64)?;
        let ratio = if total_answers > 0 {
            *count as f64 / total_answers as f64
        } else {
            0.0
        };
        sheet.write_number_with_format(row, 2, ratio, &percent)?;
    }

    if counts.is_empty() {
        return Ok(());
    }

    let first_row = table_start + 1;
    let last_row = table_start + counts.len() as u32;

    let mut pie = Chart::new(ChartType::Pie);
    pie.add_series()
        .set_categories((sheet_name, first_row, 0, last_row, 0))
        .set_values((sheet_name, first_row, 1, last_row, 1));
    sheet.insert_chart(table_start, 4, &pie)?;

    let mut bar = Chart::new(ChartType::Column);
    bar.add_series()
        .set_categories((sheet_name, first_row, 0, last_row, 0))
        .set_values((sheet_name, first_row, 1, last_row, 1));
    sheet.insert_chart(table_start + 16, 4, &bar)?;

    Ok(())
}

/// 행 × 열 격자 표와 그룹 막대 차트 (행마다 시리즈 하나)
fn write_matrix_grid(
    sheet: &mut Worksheet,
    sheet_name: &str,
    grid: &std::collections::BTreeMap<String, std::collections::BTreeMap<String, u64>>,
) -> Result<(), XlsxError> {
    let header = header_format();

    // 열 레이블의 합집합 (행마다 집계된 열이 다를 수 있음)
    let columns: BTreeSet<&String> = grid.values().flat_map(|cols| cols.keys()).collect();
    let columns: Vec<&String> = columns.into_iter().collect();

    let table_start: u32 = 4;
    sheet.write_string_with_format(table_start, 0, "", &header)?;
    for (idx, column) in columns.iter().enumerate() {
        sheet.write_string_with_format(table_start, 1 + idx as u16, column.as_str(), &header)?;
    }

    for (row_idx, (row_label, cols)) in grid.iter().enumerate() {
        let row = table_start + 1 + row_idx as u32;
        sheet.write_string_with_format(row, 0, row_label, &header)?;
        for (col_idx, column) in columns.iter().enumerate() {
            let count = cols.get(*column).copied().unwrap_or(0);
            sheet.write_number(row, 1 + col_idx as u16, count as f64)?;
        }
    }

    if grid.is_empty() || columns.is_empty() {
        return Ok(());
    }

    let last_col = columns.len() as u16;
    let mut chart = Chart::new(ChartType::Column);
    for (row_idx, row_label) in grid.keys().enumerate() {
        let row = table_start + 1 + row_idx as u32;
        chart
            .add_series()
            .set_name(row_label.as_str())
            .set_categories((sheet_name, table_start, 1, table_start, last_col))
            .set_values((sheet_name, row, 1, row, last_col));
    }
    sheet.insert_chart(table_start + grid.len() as u32 + 3, 0, &chart)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::survey::dto::StatsSurveySummary;
    use crate::domain::survey::entity::question::QuestionType;
    use uuid::Uuid;

    fn sample_stats() -> SurveyStatisticsResponse {
        let mut choice = BTreeMap::new();
        choice.insert("예".to_string(), 3u64);
        choice.insert("아니오".to_string(), 1u64);

        let mut matrix = BTreeMap::new();
        let mut inner = BTreeMap::new();
        inner.insert("낮음".to_string(), 2u64);
        inner.insert("높음".to_string(), 1u64);
        matrix.insert("찬성".to_string(), inner);

        SurveyStatisticsResponse {
            survey: StatsSurveySummary {
                id: Uuid::new_v4(),
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
    fn should_render_workbook_bytes() {
        // Act
        let bytes = render_workbook(&sample_stats()).unwrap();

        // Assert: xlsx는 zip 컨테이너 (PK 시그니처)
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn should_render_empty_survey_without_questions() {
        let stats = SurveyStatisticsResponse {
            survey: StatsSurveySummary {
                id: Uuid::new_v4(),
                title: "빈 설문".to_string(),
                total_responses: 0,
            },
            questions: Vec::new(),
        };

        let bytes = render_workbook(&stats).unwrap();

        assert!(!bytes.is_empty());
    }

    #[test]
    fn should_render_question_with_no_answers() {
        // 집계가 빈 질문도 표 헤더만 있는 시트로 렌더링됨
        let stats = SurveyStatisticsResponse {
            survey: StatsSurveySummary {
                id: Uuid::new_v4(),
                title: "설문".to_string(),
                total_responses: 0,
            },
            questions: vec![QuestionStatistics {
                id: 1,
                text: "답변 없는 질문".to_string(),
                question_type: QuestionType::Single,
                total_answers: 0,
                data: QuestionStatData::empty(),
            }],
        };

        let bytes = render_workbook(&stats).unwrap();

        assert!(!bytes.is_empty());
    }
}
