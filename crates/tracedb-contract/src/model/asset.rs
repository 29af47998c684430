use crate::model::Part;
use serde::{Deserialize, Serialize};
use tracedb_core::prelude::*;

///
/// Asset
///
/// An assembled product embedding snapshots of its four component parts.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Asset {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "MadeBy", default)]
    pub made_by: String,

    #[serde(rename = "MadeIn", default)]
    pub made_in: String,

    #[serde(rename = "SerialNumber", default)]
    pub serial_number: String,

    #[serde(rename = "SecurityChip", default)]
    pub security_chip: Part,

    #[serde(rename = "NetworkChip", default)]
    pub network_chip: Part,

    #[serde(rename = "CMOSChip", default)]
    pub cmos_chip: Part,

    #[serde(rename = "VideoCodecChip", default)]
    pub video_codec_chip: Part,

    #[serde(rename = "ProductionDate", default)]
    pub production_date: String,
}

impl Asset {
    /// Component slots paired with their wire names.
    #[must_use]
    pub fn components(&self) -> [(&'static str, &Part); 4] {
        [
            ("SecurityChip", &self.security_chip),
            ("NetworkChip", &self.network_chip),
            ("CMOSChip", &self.cmos_chip),
            ("VideoCodecChip", &self.video_codec_chip),
        ]
    }

    #[must_use]
    pub fn components_mut(&mut self) -> [(&'static str, &mut Part); 4] {
        [
            ("SecurityChip", &mut self.security_chip),
            ("NetworkChip", &mut self.network_chip),
            ("CMOSChip", &mut self.cmos_chip),
            ("VideoCodecChip", &mut self.video_codec_chip),
        ]
    }
}

impl Record for Asset {
    const KIND: &'static str = "asset";
    const INDEX: IndexDescriptor = IndexDescriptor::new("assets-by-maker", &["MadeBy", "ID"]);

    fn primary_key(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<&str> {
        vec![self.made_by.as_str(), self.id.as_str()]
    }

    fn validate(&self) -> Result<(), RecordError> {
        require_field(Self::KIND, "MadeBy", &self.made_by)?;
        require_field(Self::KIND, "SerialNumber", &self.serial_number)?;

        for (slot, part) in self.components() {
            if part.pid.trim().is_empty() {
                return Err(RecordError::MissingField {
                    kind: Self::KIND,
                    field: slot,
                });
            }
        }

        Ok(())
    }

    fn tombstone(primary_key: &str) -> Self {
        Self {
            id: primary_key.to_string(),
            ..Self::default()
        }
    }
}
