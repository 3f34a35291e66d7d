//! Field extraction: one `INDI` record to one output row.
//!
//! Every field has a single resolver that returns `""` when any link in its chain is missing.

use crate::lineage::Lineage;
use crate::person::Person;

/// Column names, in output order.
pub const HEADER: [&str; 8] = [
    "Index",
    "GEDid",
    "Name",
    "Gender",
    "Father_name",
    "Mother_name",
    "Birth Year",
    "Birth Place",
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputRow {
    pub index: u64,
    pub id: String,
    pub name: String,
    pub gender: String,
    pub father_name: String,
    pub mother_name: String,
    pub birth_year: String,
    pub birth_place: String,
}

impl OutputRow {
    /// Write this row as one CSV record.
    pub fn write_to<W: std::io::Write>(&self, w: &mut csv::Writer<W>) -> csv::Result<()> {
        let index = self.index.to_string();
        w.write_record([
            index.as_str(),
            self.id.as_str(),
            self.name.as_str(),
            self.gender.as_str(),
            self.father_name.as_str(),
            self.mother_name.as_str(),
            self.birth_year.as_str(),
            self.birth_place.as_str(),
        ])
    }
}

pub fn extract_row(index: u64, person: &Person<'_>, lineage: &Lineage) -> OutputRow {
    OutputRow {
        index,
        id: person.id().to_string(),
        name: person.name().unwrap_or_default(),
        gender: person.sex().unwrap_or("").to_string(),
        father_name: lineage.father_name(person).unwrap_or("").to_string(),
        mother_name: lineage.mother_name(person).unwrap_or("").to_string(),
        birth_year: birth_year(person),
        birth_place: birth_place(person),
    }
}

/// Last whitespace-separated token of the birth date text.
///
/// Assumes the year is the trailing token, so `ABT 1900` gives `1900` but dates with a
/// trailing qualifier or a year-first layout come out wrong.
pub fn birth_year(person: &Person<'_>) -> String {
    person
        .birth()
        .and_then(|b| b.sub_tag_value("DATE"))
        .and_then(|d| d.split_whitespace().last())
        .unwrap_or("")
        .to_string()
}

pub fn birth_place(person: &Person<'_>) -> String {
    person
        .birth()
        .and_then(|b| b.sub_tag_value("PLAC"))
        .unwrap_or("")
        .to_string()
}
