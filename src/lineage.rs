//! Parent lookups for one GEDCOM member.
//!
//! Built from a first streaming pass over the member, so a person's parents resolve whether
//! their records appear before or after the person. Only names and family links are kept,
//! never whole records.

use crate::gedcom::{Record, RecordReader};
use crate::person::Person;
use ahash::AHashMap;
use anyhow::Result;
use std::io::BufRead;

#[derive(Clone, Debug, Default)]
struct Parents {
    husband: Option<String>,
    wife: Option<String>,
}

#[derive(Debug, Default)]
pub struct Lineage {
    names: AHashMap<String, String>,
    families: AHashMap<String, Parents>,
}

impl Lineage {
    /// Consume every level-0 record of `reader`, keeping individual names and family links.
    pub fn build<R: BufRead>(reader: RecordReader<R>) -> Result<Self> {
        let mut lineage = Self::default();
        for rec in reader.records() {
            lineage.insert(&rec?);
        }
        tracing::debug!(
            "lineage index: {} individuals, {} families",
            lineage.names.len(),
            lineage.families.len()
        );
        Ok(lineage)
    }

    /// Register one level-0 record. Records other than `INDI`/`FAM`, and records without an
    /// identifier, are ignored. The first definition of an identifier wins.
    pub fn insert(&mut self, rec: &Record) {
        let id = match rec.xref.as_deref() {
            Some(id) => id,
            None => return,
        };
        match rec.tag.as_str() {
            "INDI" => {
                if let Some(name) = Person::new(rec).name() {
                    self.names.entry(id.to_string()).or_insert(name);
                }
            }
            "FAM" => {
                let pointer = |tag: &str| rec.sub_tag(tag).and_then(Record::pointer).map(str::to_string);
                self.families
                    .entry(id.to_string())
                    .or_insert(Parents { husband: pointer("HUSB"), wife: pointer("WIFE") });
            }
            _ => {}
        }
    }

    pub fn father_name(&self, person: &Person<'_>) -> Option<&str> {
        let fam = self.families.get(person.family_as_child()?)?;
        self.name_of(fam.husband.as_deref()?)
    }

    pub fn mother_name(&self, person: &Person<'_>) -> Option<&str> {
        let fam = self.families.get(person.family_as_child()?)?;
        self.name_of(fam.wife.as_deref()?)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}
