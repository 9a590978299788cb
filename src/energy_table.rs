use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Banner and header lines emitted by the upstream energy-calculation tool.
/// Anything starting with one of these is dropped before record matching.
pub const NOISE_PREFIXES: &[&str] = &["#", "//", "----", "====", "Residue", "RANK", "Total"];

lazy_static! {
    /// One data record: an identifier token followed by a signed decimal.
    static ref RECORD_RE: Regex =
        Regex::new(r"^([A-Za-z0-9_]+)\s+([+-]?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)\s*$")
            .expect("Invalid record regex");
    static ref DIGIT_RUN_RE: Regex = Regex::new(r"\d+").expect("Invalid digit-run regex");
}

/// Residue label used when an identifier carries no digits at all.
pub const UNKNOWN_RESIDUE: &str = "UNK";

/// Mutant letter used when an identifier has no trailing uppercase letter.
pub const UNKNOWN_MUTANT: char = '?';

/// One parsed line of an energy table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    /// Residue number as text, or [`UNKNOWN_RESIDUE`].
    pub residue: String,
    /// Single uppercase mutant letter, or [`UNKNOWN_MUTANT`].
    pub mutant: char,
    pub energy: f64,
}

/// All usable records of one energy-table document, in file order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Table identity, typically the source filename minus its extension.
    pub key: String,
    pub entries: Vec<EnergyRecord>,
}

impl ParsedTable {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_noise_line(line: &str) -> bool {
    line.is_empty() || NOISE_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Residue number of an identifier: its first contiguous digit run.
///
/// Identifiers embedding more than one number keep the first run; upstream
/// naming has not needed anything stricter.
fn residue_of(identifier: &str) -> String {
    DIGIT_RUN_RE
        .find(identifier)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_RESIDUE.to_string())
}

/// Mutant letter of an identifier: its trailing uppercase ASCII letter.
fn mutant_of(identifier: &str) -> char {
    identifier
        .chars()
        .next_back()
        .filter(|c| c.is_ascii_uppercase())
        .unwrap_or(UNKNOWN_MUTANT)
}

/// Parse one raw energy-table document.
///
/// Lenient by contract: blank lines, banner lines and anything not matching
/// the `<identifier> <number>` shape are skipped silently. A wholly empty or
/// noise-only document yields a table with zero entries, which callers treat
/// as "no usable data", not a failure.
pub fn parse(content: &str, table_key: &str) -> ParsedTable {
    let mut entries = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if is_noise_line(line) {
            continue;
        }
        let Some(caps) = RECORD_RE.captures(line) else {
            continue;
        };
        let identifier = &caps[1];
        let Ok(energy) = caps[2].parse::<f64>() else {
            continue;
        };
        entries.push(EnergyRecord {
            residue: residue_of(identifier),
            mutant: mutant_of(identifier),
            energy,
        });
    }
    ParsedTable {
        key: table_key.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# interaction energies, one line per mutant
Residue breakdown follows
PROC_60_E2A   -3.45
PROC_60_E2W    1.20

PROC_61_K2A   -0.75
this line is trailing commentary
";

    #[test]
    fn parses_records_and_skips_noise() {
        let table = parse(SAMPLE, "inter_ener_glu60c");
        assert_eq!(table.key, "inter_ener_glu60c");
        assert_eq!(table.entries.len(), 3);
        assert_eq!(table.entries[0].residue, "60");
        assert_eq!(table.entries[0].mutant, 'A');
        assert_eq!(table.entries[0].energy, -3.45);
        assert_eq!(table.entries[1].mutant, 'W');
        assert_eq!(table.entries[2].residue, "61");
    }

    #[test]
    fn empty_and_noise_only_documents_yield_zero_entries() {
        assert!(parse("", "t").is_empty());
        assert!(parse("# banner\n---- rule\n\n", "t").is_empty());
    }

    #[test]
    fn identifier_without_digits_falls_back_to_unk() {
        let table = parse("WILDTYPE_A -1.0", "t");
        assert_eq!(table.entries[0].residue, UNKNOWN_RESIDUE);
        assert_eq!(table.entries[0].mutant, 'A');
    }

    #[test]
    fn identifier_without_trailing_uppercase_falls_back_to_question_mark() {
        let table = parse("res_60 2.5", "t");
        assert_eq!(table.entries[0].residue, "60");
        assert_eq!(table.entries[0].mutant, UNKNOWN_MUTANT);
    }

    #[test]
    fn first_digit_run_wins_for_multi_number_identifiers() {
        let table = parse("seg12_res60_W -0.1", "t");
        assert_eq!(table.entries[0].residue, "12");
    }

    #[test]
    fn scientific_notation_energies_parse() {
        let table = parse("PROC_7_G2A 1.5e-2", "t");
        assert_eq!(table.entries[0].energy, 0.015);
    }

    #[test]
    fn discard_rule_is_idempotent() {
        let table = parse(SAMPLE, "t");
        let refiltered: String = SAMPLE
            .lines()
            .map(str::trim)
            .filter(|l| !is_noise_line(l) && RECORD_RE.is_match(l))
            .collect::<Vec<_>>()
            .join("\n");
        let again = parse(&refiltered, "t");
        assert_eq!(table.entries, again.entries);
    }
}
