//! Read-only view of an `INDI` record and GEDCOM personal-name formatting.

use crate::gedcom::Record;

#[derive(Clone, Copy, Debug)]
pub struct Person<'a> {
    rec: &'a Record,
}

impl<'a> Person<'a> {
    pub fn new(rec: &'a Record) -> Self {
        Self { rec }
    }

    pub fn id(&self) -> &'a str {
        self.rec.xref_id()
    }

    /// Formatted name of the first `NAME` sub-record; `None` when there is no `NAME`.
    pub fn name(&self) -> Option<String> {
        let name = self.rec.sub_tag("NAME")?;
        if !name.value.trim().is_empty() {
            return Some(format_name(&name.value));
        }
        // Name given only through its parts.
        let parts = ["GIVN", "SURN", "NSFX"].map(|t| name.sub_tag_value(t).unwrap_or(""));
        Some(join_parts(&parts))
    }

    pub fn sex(&self) -> Option<&'a str> {
        self.rec.sub_tag_value("SEX")
    }

    pub fn birth(&self) -> Option<&'a Record> {
        self.rec.sub_tag("BIRT")
    }

    /// Family this person belongs to as a child (first `FAMC`).
    pub fn family_as_child(&self) -> Option<&'a str> {
        self.rec.sub_tag("FAMC").and_then(Record::pointer)
    }
}

/// Format a `NAME` value (`given /surname/ suffix`) as `given surname suffix`.
pub fn format_name(value: &str) -> String {
    let (given, rest) = match value.split_once('/') {
        Some(split) => split,
        None => return join_parts(&[value]),
    };
    let (surname, suffix) = rest.split_once('/').unwrap_or((rest, ""));
    join_parts(&[given, surname, suffix])
}

fn join_parts(parts: &[&str]) -> String {
    let mut out = String::new();
    for word in parts.iter().flat_map(|p| p.split_whitespace()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
