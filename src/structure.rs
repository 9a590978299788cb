use serde::{Deserialize, Serialize};

/// One ATOM/HETATM record of a loaded structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub serial: u32,
    pub name: String,
    pub res_name: String,
    /// Chain identifier, possibly empty in pipeline-generated files.
    pub chain_id: String,
    pub res_seq: i32,
    pub pos: [f64; 3],
    /// Secondary segment identifier, the normalization source for an empty
    /// chain identifier.
    pub seg_id: String,
}

/// One residue as seen by the locator: where it is and how complete it is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueView {
    pub chain: String,
    pub number: i32,
    pub name: String,
    pub atom_count: usize,
}

/// A structure loaded from raw PDB text, kept as a flat atom list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
    pub atoms: Vec<Atom>,
}

/// Trimmed fixed-column field, 1-based inclusive columns as in the PDB spec.
fn field(line: &str, from: usize, to: usize) -> &str {
    let bytes = line.as_bytes();
    let from = from - 1;
    let to = to.min(bytes.len());
    if from >= to {
        return "";
    }
    std::str::from_utf8(&bytes[from..to])
        .unwrap_or("")
        .trim()
}

fn parse_atom_line(line: &str) -> Option<Atom> {
    let record = field(line, 1, 6);
    if record != "ATOM" && record != "HETATM" {
        return None;
    }
    Some(Atom {
        serial: field(line, 7, 11).parse().ok()?,
        name: field(line, 13, 16).to_string(),
        res_name: field(line, 18, 20).to_string(),
        chain_id: field(line, 22, 22).to_string(),
        res_seq: field(line, 23, 26).parse().ok()?,
        pos: [
            field(line, 31, 38).parse().ok()?,
            field(line, 39, 46).parse().ok()?,
            field(line, 47, 54).parse().ok()?,
        ],
        seg_id: field(line, 73, 76).to_string(),
    })
}

impl Structure {
    /// Parse raw PDB text. Records other than ATOM/HETATM and malformed
    /// coordinate lines are skipped; a document with no usable atom record at
    /// all is an error, since nothing downstream can work with it.
    pub fn from_pdb_text(name: &str, text: &str) -> Result<Self, String> {
        let atoms: Vec<Atom> = text.lines().filter_map(parse_atom_line).collect();
        if atoms.is_empty() {
            return Err(format!("No atom records in structure '{name}'"));
        }
        Ok(Self {
            name: name.to_string(),
            atoms,
        })
    }

    /// Recover missing chain identifiers from segment identifiers.
    ///
    /// Pipeline-generated files sometimes leave the chain column blank and
    /// carry the chain name in the segment field instead. Absent chain
    /// identifiers break both color-by-chain styling and the processed-chain
    /// tie-break, so this runs before either. Returns how many atoms were
    /// updated.
    pub fn normalize_chain_ids(&mut self) -> usize {
        let mut updated = 0;
        for atom in &mut self.atoms {
            if atom.chain_id.is_empty() && !atom.seg_id.is_empty() {
                atom.chain_id = atom.seg_id.trim().to_string();
                updated += 1;
            }
        }
        updated
    }

    /// Enumerate residues in atom order, grouping consecutive atoms that
    /// share chain, number and name.
    pub fn residues(&self) -> Vec<ResidueView> {
        let mut ret: Vec<ResidueView> = Vec::new();
        for atom in &self.atoms {
            match ret.last_mut() {
                Some(last)
                    if last.chain == atom.chain_id
                        && last.number == atom.res_seq
                        && last.name == atom.res_name =>
                {
                    last.atom_count += 1;
                }
                _ => ret.push(ResidueView {
                    chain: atom.chain_id.clone(),
                    number: atom.res_seq,
                    name: atom.res_name.clone(),
                    atom_count: 1,
                }),
            }
        }
        ret
    }

    /// Distinct chain identifiers in first-seen order.
    pub fn chains(&self) -> Vec<String> {
        let mut ret: Vec<String> = Vec::new();
        for atom in &self.atoms {
            if !ret.contains(&atom.chain_id) {
                ret.push(atom.chain_id.clone());
            }
        }
        ret
    }
}


#[cfg(test)]
mod tests {
    use super::test_pdb::atom_line;
    use super::*;

    fn fixture(lines: &[String]) -> String {
        lines.join("\n")
    }

    #[test]
    fn parses_atom_records_and_skips_everything_else() {
        let text = fixture(&[
            "HEADER    TEST".to_string(),
            atom_line(1, "N", "GLU", "A", 60, ""),
            atom_line(2, "CA", "GLU", "A", 60, ""),
            "TER".to_string(),
            "ATOM  broken line".to_string(),
        ]);
        let s = Structure::from_pdb_text("t", &text).unwrap();
        assert_eq!(s.atoms.len(), 2);
        assert_eq!(s.atoms[0].res_name, "GLU");
        assert_eq!(s.atoms[0].chain_id, "A");
        assert_eq!(s.atoms[0].res_seq, 60);
    }

    #[test]
    fn atomless_text_is_an_error() {
        assert!(Structure::from_pdb_text("t", "HEADER only\n").is_err());
    }

    #[test]
    fn normalizes_empty_chain_ids_from_seg_ids() {
        let text = fixture(&[
            atom_line(1, "CA", "ALA", " ", 1, "PROC"),
            atom_line(2, "CA", "ALA", "B", 2, "XXXX"),
        ]);
        let mut s = Structure::from_pdb_text("t", &text).unwrap();
        assert_eq!(s.normalize_chain_ids(), 1);
        assert_eq!(s.atoms[0].chain_id, "PROC");
        // A present chain id is never overwritten.
        assert_eq!(s.atoms[1].chain_id, "B");
    }

    #[test]
    fn residues_group_consecutive_atoms() {
        let text = fixture(&[
            atom_line(1, "N", "GLU", "A", 60, ""),
            atom_line(2, "CA", "GLU", "A", 60, ""),
            atom_line(3, "N", "ALA", "A", 61, ""),
            atom_line(4, "CA", "ALA", "B", 61, ""),
        ]);
        let s = Structure::from_pdb_text("t", &text).unwrap();
        let residues = s.residues();
        assert_eq!(residues.len(), 3);
        assert_eq!(residues[0].atom_count, 2);
        assert_eq!(residues[1].number, 61);
        assert_eq!(residues[2].chain, "B");
        assert_eq!(s.chains(), vec!["A", "B"]);
    }
}
