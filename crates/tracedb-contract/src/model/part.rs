use serde::{Deserialize, Serialize};
use tracedb_core::prelude::*;

///
/// Part
///
/// A component tracked from its manufacturer to the organization that
/// currently holds it.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Part {
    #[serde(rename = "PID")]
    pub pid: String,

    #[serde(rename = "Manufacturer", default)]
    pub manufacturer: String,

    #[serde(rename = "ManufactureLocation", default)]
    pub manufacture_location: String,

    #[serde(rename = "PartName", default)]
    pub part_name: String,

    #[serde(rename = "PartNumber", default)]
    pub part_number: String,

    /// Current holder.
    #[serde(rename = "Organization", default)]
    pub organization: String,

    #[serde(rename = "ManufactureDate", default)]
    pub manufacture_date: String,

    #[serde(rename = "TransferDate", default)]
    pub transfer_date: String,
}

impl Record for Part {
    const KIND: &'static str = "part";
    const INDEX: IndexDescriptor = IndexDescriptor::new("parts-by-org", &["Organization", "PID"]);

    fn primary_key(&self) -> &str {
        &self.pid
    }

    fn index_values(&self) -> Vec<&str> {
        vec![self.organization.as_str(), self.pid.as_str()]
    }

    fn validate(&self) -> Result<(), RecordError> {
        require_field(Self::KIND, "Organization", &self.organization)?;
        require_field(Self::KIND, "Manufacturer", &self.manufacturer)
    }

    fn tombstone(primary_key: &str) -> Self {
        Self {
            pid: primary_key.to_string(),
            ..Self::default()
        }
    }
}

impl Transferable for Part {
    fn owner(&self) -> &str {
        &self.organization
    }

    fn transfer_to(&mut self, new_owner: &str, transfer_date: &str) {
        self.organization = new_owner.to_string();
        self.transfer_date = transfer_date.to_string();
    }
}
