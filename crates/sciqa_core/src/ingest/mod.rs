pub mod question_csv;

pub use question_csv::{load_question_bank, load_question_bank_csv, QuestionBank};
