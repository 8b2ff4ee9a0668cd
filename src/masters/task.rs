use serde_yaml::Mapping;

use super::{str_field, tex, FieldSpec, FieldType, MasterIcon, MasterSpec};

const FIELDS: &[FieldSpec] = &[FieldSpec::new("markup", "The task in HTML or Markdown.")
    .types(&[FieldType::String])
    .required()
    .markup()
    .inline_markup()];

/// A task for the students
pub struct TaskMaster;

impl MasterSpec for TaskMaster {
    fn name(&self) -> &'static str {
        "task"
    }

    fn display_name(&self) -> &'static str {
        "Arbeitsauftrag"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("task", "yellow-dark").symbol("☐")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("markup")
    }

    fn generate_markup(&self, fields: &Mapping) -> Option<String> {
        let markup = str_field(fields, "markup")?;
        Some(format!("{}\n\n{}", tex::cmd("textbf", "Arbeitsauftrag"), tex::from_html(markup)))
    }
}
