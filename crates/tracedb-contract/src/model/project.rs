use serde::{Deserialize, Serialize};
use tracedb_core::prelude::*;

///
/// Project
///
/// A development project with its production lineage and an owning party.
/// Indexed by origin: any change to manufacturer, location, part, batch,
/// serial or date moves its index entry.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Project {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Manufacturer", default)]
    pub manufacturer: String,

    #[serde(rename = "ManufactureLocation", default)]
    pub manufacture_location: String,

    #[serde(rename = "PartName", default)]
    pub part_name: String,

    #[serde(rename = "BatchNumber", default)]
    pub batch_number: String,

    #[serde(rename = "SerialNumber", default)]
    pub serial_number: String,

    #[serde(rename = "ManufactureDate", default)]
    pub manufacture_date: String,

    #[serde(rename = "Item", default)]
    pub item: String,

    #[serde(rename = "Category", default)]
    pub category: String,

    #[serde(rename = "Describes", default)]
    pub describes: String,

    #[serde(rename = "Developer", default)]
    pub developer: String,

    #[serde(rename = "Organization", default)]
    pub organization: String,

    #[serde(default)]
    pub owner: String,

    #[serde(rename = "TransferDate", default)]
    pub transfer_date: String,
}

impl Record for Project {
    const KIND: &'static str = "project";
    const INDEX: IndexDescriptor = IndexDescriptor::new(
        "projects-by-origin",
        &[
            "Manufacturer",
            "ManufactureLocation",
            "PartName",
            "BatchNumber",
            "SerialNumber",
            "ManufactureDate",
            "ID",
        ],
    );

    fn primary_key(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<&str> {
        vec![
            self.manufacturer.as_str(),
            self.manufacture_location.as_str(),
            self.part_name.as_str(),
            self.batch_number.as_str(),
            self.serial_number.as_str(),
            self.manufacture_date.as_str(),
            self.id.as_str(),
        ]
    }

    fn validate(&self) -> Result<(), RecordError> {
        require_field(Self::KIND, "Organization", &self.organization)
    }

    fn tombstone(primary_key: &str) -> Self {
        Self {
            id: primary_key.to_string(),
            ..Self::default()
        }
    }
}

impl Transferable for Project {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn transfer_to(&mut self, new_owner: &str, transfer_date: &str) {
        self.owner = new_owner.to_string();
        self.transfer_date = transfer_date.to_string();
    }
}
