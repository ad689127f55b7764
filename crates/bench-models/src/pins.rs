//! MOSFET pin roles and the naming synonyms seen across model libraries.
//!
//! Vendor subcircuits disagree on pin spelling (`D` vs `DRAIN`); the trace
//! resolver walks these synonym lists in order when hunting for a trace.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRole {
    Drain,
    Gate,
    Source,
    Bulk,
}

const DRAIN_SYNONYMS: &[&str] = &["D", "DRAIN"];
const GATE_SYNONYMS: &[&str] = &["G", "GATE"];
const SOURCE_SYNONYMS: &[&str] = &["S", "SOURCE"];
const BULK_SYNONYMS: &[&str] = &["B", "BULK", "SUB"];

/// Synonym spellings for `role`, most common first.
pub fn synonyms_for(role: PinRole) -> &'static [&'static str] {
    match role {
        PinRole::Drain => DRAIN_SYNONYMS,
        PinRole::Gate => GATE_SYNONYMS,
        PinRole::Source => SOURCE_SYNONYMS,
        PinRole::Bulk => BULK_SYNONYMS,
    }
}

/// Classify a declared pin name, case-insensitively.
pub fn role_of(pin: &str) -> Option<PinRole> {
    for role in [PinRole::Drain, PinRole::Gate, PinRole::Source, PinRole::Bulk] {
        if synonyms_for(role)
            .iter()
            .any(|syn| syn.eq_ignore_ascii_case(pin))
        {
            return Some(role);
        }
    }
    None
}
