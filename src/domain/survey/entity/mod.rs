pub mod answer;
pub mod matrix_column;
pub mod matrix_row;
pub mod option;
pub mod question;
pub mod response;
pub mod survey;
pub mod survey_viewer;
