use serde_json::Value;

// Column positions in a dataset row. 0, 5 and 6 are not read.
const COL_LANGUAGE: usize = 1;
const COL_CATEGORY: usize = 2;
const COL_SUB_CATEGORY: usize = 3;
const COL_INSTRUCTION: usize = 4;
const COL_VIDEO: usize = 7;

/// One procedure row from the dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub language: String,
    pub category: String,
    pub sub_category: String,
    pub instruction_html: String,
    pub video_url: Option<String>,
}

impl Record {
    pub fn new(language: &str, category: &str, sub_category: &str, instruction_html: &str) -> Self {
        Self {
            language: language.to_string(),
            category: category.to_string(),
            sub_category: sub_category.to_string(),
            instruction_html: instruction_html.to_string(),
            video_url: None,
        }
    }

    pub fn with_video(mut self, url: &str) -> Self {
        self.video_url = Some(url.to_string()).filter(|u| !u.is_empty());
        self
    }

    /// Build a record from a positional JSON row. Short rows are padded
    /// with empty cells.
    pub fn from_row(row: &[Value]) -> Self {
        let video = cell(row, COL_VIDEO);
        Self {
            language: cell(row, COL_LANGUAGE),
            category: cell(row, COL_CATEGORY),
            sub_category: cell(row, COL_SUB_CATEGORY),
            instruction_html: cell(row, COL_INSTRUCTION),
            video_url: if video.trim().is_empty() { None } else { Some(video) },
        }
    }

    pub fn matches_language(&self, lang: &str) -> bool {
        self.language == lang
    }

    pub fn matches(&self, lang: &str, category: &str) -> bool {
        self.language == lang && self.category == category
    }
}

fn cell(row: &[Value], idx: usize) -> String {
    match row.get(idx) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}
