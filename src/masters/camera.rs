use serde_yaml::Mapping;

use super::{FieldSpec, MasterIcon, MasterSpec};

/// Live picture of a document camera
pub struct CameraMaster;

impl MasterSpec for CameraMaster {
    fn name(&self) -> &'static str {
        "camera"
    }

    fn display_name(&self) -> &'static str {
        "Dokumentenkamera"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("document-camera", "red").symbol("📷")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        &[]
    }

    fn derive_plain_text_from_fields(&self, _fields: &Mapping) -> Option<String> {
        None
    }
}
