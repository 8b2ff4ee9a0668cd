//! Questions with optional answers, nested to any depth.
//!
//! The input is a string, a question mapping or a list of either. A mapping
//! accepts the long keys and their abbreviations:
//!
//! | long           | short |
//! |----------------|-------|
//! | `question`     | `q`   |
//! | `answer`       | `a`   |
//! | `heading`      | `h`   |
//! | `subQuestions` | `s`   |
//!
//! `questions` is a further alias of `subQuestions`. Questions and answers
//! are numbered in document order; every question and every answer is one
//! step.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::{tex, FieldSpec, MasterIcon, MasterSpec};
use crate::core::text::html_to_plain_text;
use crate::core::DataCutter;
use crate::domain::StepCollector;
use crate::error::{format_raw, FieldContractError, Result, StructuralError};

/// List elements are not allowed in questions and headings.
static LIST_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?(ul|ol|li)[^>]*?>").unwrap());

const FIELDS: &[FieldSpec] = &[FieldSpec::new(
    "questions",
    "A list of mappings with the keys `question` and `answer`.",
)
.required()
.markup()
.inline_markup()];

/// A question with sub questions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub level: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_no: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_no: Option<usize>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_questions: Vec<Question>,
}

#[derive(Debug, Default)]
struct Counter {
    question: usize,
    answer: usize,
}

impl Question {
    /// Parse a question specification into a numbered list of questions.
    pub fn parse(raw: &Value) -> Result<Vec<Question>> {
        let mut counter = Counter::default();
        Self::parse_multiple(raw, &mut counter, 0)
    }

    fn parse_multiple(raw: &Value, counter: &mut Counter, level: usize) -> Result<Vec<Question>> {
        match raw {
            Value::Sequence(items) => items
                .iter()
                .map(|item| Self::parse_single(item, counter, level))
                .collect(),
            other => Ok(vec![Self::parse_single(other, counter, level)?]),
        }
    }

    fn parse_single(raw: &Value, counter: &mut Counter, level: usize) -> Result<Question> {
        let mut question = Question::default();
        let mut sub_questions = None;

        match raw {
            Value::String(text) => question.question = Some(text.clone()),
            Value::Mapping(_) => {
                let mut data = DataCutter::new("question", raw)?;
                question.question = alias(data.cut_string("q")?, data.cut_string("question")?);
                question.answer = alias(data.cut_string("a")?, data.cut_string("answer")?);
                question.heading = alias(data.cut_string("h")?, data.cut_string("heading")?);
                sub_questions = data
                    .cut("questions")
                    .or_else(|| data.cut("subQuestions"))
                    .or_else(|| data.cut("s"));
                data.check_empty()?;
            }
            other => {
                return Err(StructuralError::NotAMapping {
                    context: "question".to_string(),
                    raw: format_raw(other),
                }
                .into())
            }
        }

        if question.question.is_some() {
            counter.question += 1;
            question.question_no = Some(counter.question);
            question.level = level + 1;
        } else {
            // Only a heading
            question.level = level;
        }
        if question.answer.is_some() {
            counter.answer += 1;
            question.answer_no = Some(counter.answer);
        }

        if let Some(raw) = sub_questions {
            question.sub_questions = Self::parse_multiple(&raw, counter, question.level)?;
        }
        Ok(question)
    }

    /// Heading and question without the answer.
    pub fn question_text(&self) -> String {
        let mut output = String::new();
        if let Some(heading) = &self.heading {
            output.push_str(heading);
        }
        if let Some(question) = &self.question {
            output.push_str(question);
        }
        output
    }

    fn strip_lists(&mut self) {
        for text in [&mut self.heading, &mut self.question].into_iter().flatten() {
            *text = LIST_TAG_REGEX.replace_all(text, "").trim().to_string();
        }
        for sub in &mut self.sub_questions {
            sub.strip_lists();
        }
    }

    /// `q1`, `a1`, `q2`, ... in the order questions and answers appear.
    fn collect_sequence(&self, sequence: &mut Vec<String>) {
        if let Some(no) = self.question_no {
            sequence.push(format!("q{}", no));
        }
        if let Some(no) = self.answer_no {
            sequence.push(format!("a{}", no));
        }
        for sub in &self.sub_questions {
            sub.collect_sequence(sequence);
        }
    }

    fn collect_plain_text(&self, texts: &mut Vec<String>) {
        let text = html_to_plain_text(&self.question_text());
        if !text.is_empty() {
            texts.push(text);
        }
        for sub in &self.sub_questions {
            sub.collect_plain_text(texts);
        }
    }

    fn format_tex(&self) -> String {
        let mut markup = vec!["\\item".to_string()];
        if let Some(heading) = &self.heading {
            markup.push(tex::cmd("textbf", &tex::from_html(heading)));
        }
        if let Some(question) = &self.question {
            markup.push(tex::from_html(question));
        }
        if let Some(answer) = &self.answer {
            markup.push(tex::cmd("textit", &tex::from_html(answer)));
        }
        if !self.sub_questions.is_empty() {
            markup.push(format_tex_questions(&self.sub_questions));
        }
        markup.join("\n\n") + "\n"
    }
}

/// The long key wins over its abbreviation.
fn alias(short: Option<String>, long: Option<String>) -> Option<String> {
    long.or(short)
}

fn format_tex_questions(questions: &[Question]) -> String {
    let items: Vec<String> = questions.iter().map(Question::format_tex).collect();
    tex::environment("enumerate", &items.join("\n"))
}

fn questions(fields: &Mapping) -> Result<Vec<Question>> {
    let Some(raw) = fields.get("questions") else {
        return Ok(Vec::new());
    };
    serde_yaml::from_value(raw.clone()).map_err(|err| {
        FieldContractError::Input {
            master: "question".to_string(),
            message: err.to_string(),
            raw: format_raw(raw),
        }
        .into()
    })
}

pub struct QuestionMaster;

impl MasterSpec for QuestionMaster {
    fn name(&self) -> &'static str {
        "question"
    }

    fn display_name(&self) -> &'static str {
        "Frage"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("master-question", "yellow").large().symbol("❔")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn normalize_fields_input(&self, raw: Value) -> Result<Value> {
        let questions = Question::parse(&raw)?;
        let mut fields = Mapping::new();
        fields.insert(Value::from("questions"), serde_yaml::to_value(questions)?);
        Ok(Value::Mapping(fields))
    }

    fn collect_fields_on_instantiation(&self, mut fields: Mapping) -> Result<Mapping> {
        let mut questions = questions(&fields)?;
        for question in &mut questions {
            question.strip_lists();
        }
        fields.insert(Value::from("questions"), serde_yaml::to_value(questions)?);
        Ok(fields)
    }

    fn collect_steps_on_instantiation(&self, fields: &Mapping, steps: &mut StepCollector) {
        let Ok(questions) = questions(fields) else {
            return;
        };
        let mut sequence = Vec::new();
        for question in questions {
            question.collect_sequence(&mut sequence);
        }
        for item in sequence {
            let (kind, no) = item.split_at(1);
            match kind {
                "q" => steps.add(format!("Frage {}", no)),
                _ => steps.add(format!("Antwort {}", no)),
            }
        }
    }

    fn derive_plain_text_from_fields(&self, fields: &Mapping) -> Option<String> {
        let mut texts = Vec::new();
        for question in questions(fields).ok()? {
            question.collect_plain_text(&mut texts);
        }
        (!texts.is_empty()).then(|| texts.join(" | "))
    }

    fn generate_markup(&self, fields: &Mapping) -> Option<String> {
        let questions = questions(fields).ok()?;
        (!questions.is_empty()).then(|| format_tex_questions(&questions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MarkdownConverter;
    use crate::error::Error;
    use crate::masters::registry;

    fn parse(yaml: &str) -> Vec<Question> {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        Question::parse(&raw).unwrap()
    }

    #[test]
    fn test_single_string() {
        let questions = parse("Why?");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question.as_deref(), Some("Why?"));
        assert_eq!(questions[0].question_no, Some(1));
        assert_eq!(questions[0].level, 1);
    }

    #[test]
    fn test_aliases_and_numbering() {
        let questions = parse(
            "
- q: One
  a: Answer one
- heading: Section
  s:
    - q: Two
    - question: Three
      answer: Answer two
",
        );
        assert_eq!(questions[0].answer_no, Some(1));
        assert_eq!(questions[1].question, None);
        assert_eq!(questions[1].level, 0);

        let sub = &questions[1].sub_questions;
        assert_eq!(sub[0].question_no, Some(2));
        assert_eq!(sub[0].level, 1);
        assert_eq!(sub[1].question_no, Some(3));
        assert_eq!(sub[1].answer_no, Some(2));
    }

    #[test]
    fn test_nested_levels() {
        let questions = parse("{ q: A, s: [{ q: B, s: [C] }] }");
        assert_eq!(questions[0].level, 1);
        assert_eq!(questions[0].sub_questions[0].level, 2);
        assert_eq!(questions[0].sub_questions[0].sub_questions[0].level, 3);
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let raw: Value = serde_yaml::from_str("{ q: A, answr: B }").unwrap();
        let err = Question::parse(&raw).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::UnknownProperty { .. })
        ));
        assert!(err.to_string().contains("“answr”"));
    }

    #[test]
    fn test_steps_follow_document_order() {
        let raw: Value = serde_yaml::from_str("[{ q: One, a: Yes }, { q: Two }]").unwrap();
        let master = registry().get("question").unwrap();
        let fields = master
            .initialize_fields(Some(raw), &MarkdownConverter::new())
            .unwrap()
            .fields;

        let mut steps = StepCollector::new();
        master.collect_steps_on_instantiation(&fields, &mut steps);
        let titles: Vec<_> = steps.steps().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Frage 1", "Antwort 1", "Frage 2"]);
    }

    #[test]
    fn test_lists_are_removed_from_questions() {
        let raw: Value = serde_yaml::from_str("'1. Akt'").unwrap();
        let fields = registry()
            .get("question")
            .unwrap()
            .initialize_fields(Some(raw), &MarkdownConverter::new())
            .unwrap()
            .fields;
        assert_eq!(questions(&fields).unwrap()[0].question.as_deref(), Some("Akt"));
    }

    #[test]
    fn test_tex_markup() {
        let raw: Value = serde_yaml::from_str("{ q: Why, a: Because }").unwrap();
        let fields = registry()
            .get("question")
            .unwrap()
            .initialize_fields(Some(raw), &MarkdownConverter::new())
            .unwrap()
            .fields;
        assert_eq!(
            QuestionMaster.generate_markup(&fields).unwrap(),
            "\\begin{enumerate}\n\\item\n\nWhy\n\n\\textit{Because}\n\\end{enumerate}"
        );
    }

    #[test]
    fn test_broken_questions_are_an_error() {
        let mut fields = Mapping::new();
        fields.insert(Value::from("questions"), Value::from("kaputt"));

        let err = QuestionMaster
            .collect_fields_on_instantiation(fields.clone())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FieldContract(FieldContractError::Input { ref master, .. }) if master == "question"
        ));
        assert!(questions(&fields).is_err());
    }
}
