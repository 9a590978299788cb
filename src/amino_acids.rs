use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the versioned amino-acid code table shipped with the binary.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AminoAcid {
    pub aa: char,
    pub tla: String,
    pub name: String,
}

/// The fixed 20-entry three-letter/one-letter amino-acid code table.
///
/// The structure-file and table-key grammars both lean on this table, so it is
/// declared as data (`assets/amino_acids.json`) rather than as inline match
/// arms, and tests exercise it directly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AminoAcids {
    pub aas: HashMap<char, AminoAcid>,
}

impl AminoAcids {
    pub fn load() -> Self {
        let mut ret = Self::default();
        let data = include_str!("../assets/amino_acids.json");
        let res: serde_json::Value = serde_json::from_str(data).expect("Can not parse JSON");
        let arr = res.as_array().expect("JSON is not an array");
        for row in arr {
            let aa: AminoAcid = match serde_json::from_str(&row.to_string()) {
                Ok(aa) => aa,
                Err(e) => {
                    eprintln!("Bad amino acid entry: {}: {e}", row);
                    continue;
                }
            };
            ret.aas.insert(aa.aa, aa);
        }
        ret
    }

    pub fn get(&self, letter: char) -> Option<&AminoAcid> {
        self.aas.get(&letter.to_ascii_uppercase())
    }

    /// Three-letter code ("GLU", case-insensitive) to one-letter code ('E').
    pub fn one_letter(&self, tla: &str) -> Option<char> {
        let tla = tla.to_ascii_uppercase();
        self.aas.values().find(|aa| aa.tla == tla).map(|aa| aa.aa)
    }

    /// One-letter code to three-letter code.
    pub fn three_letter(&self, letter: char) -> Option<&str> {
        self.get(letter).map(|aa| aa.tla.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_twenty() {
        let aas = AminoAcids::load();
        assert_eq!(aas.aas.len(), 20);
    }

    #[test]
    fn three_to_one_is_case_insensitive() {
        let aas = AminoAcids::load();
        assert_eq!(aas.one_letter("GLU"), Some('E'));
        assert_eq!(aas.one_letter("glu"), Some('E'));
        assert_eq!(aas.one_letter("Trp"), Some('W'));
        assert_eq!(aas.one_letter("XYZ"), None);
    }

    #[test]
    fn one_to_three_round_trips() {
        let aas = AminoAcids::load();
        for aa in aas.aas.values() {
            assert_eq!(aas.one_letter(&aa.tla), Some(aa.aa));
        }
        assert_eq!(aas.three_letter('e'), Some("GLU"));
    }
}
