use crate::structure::{ResidueView, Structure};
use std::fmt;

/// Reserved chain label the upstream pipeline gives the primary processed
/// (ligand) chain. Candidates on this chain win the locator tie-break.
pub const PROCESSED_CHAIN: &str = "PROC";

/// The residue chosen for highlighting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedResidue {
    pub chain: String,
    pub number: i32,
    pub name: String,
    pub atom_count: usize,
}

/// No residue in the structure matched any tier of hints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocateMiss {
    pub structure: String,
    pub filename_residue_hint: Option<i32>,
    pub mutant_name_hint: Option<String>,
    pub clicked_residue: i32,
}

impl fmt::Display for LocateMiss {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hint = match self.filename_residue_hint {
            Some(n) => n.to_string(),
            None => "none".to_string(),
        };
        let name = self.mutant_name_hint.as_deref().unwrap_or("none");
        write!(
            f,
            "No residue found in '{}' (filename residue {hint}, mutant name {name}, clicked residue {})",
            self.structure, self.clicked_residue
        )
    }
}

/// Among candidates passing one tier, prefer the processed chain; otherwise
/// take the residue with the most atoms, a proxy for "least truncated".
/// Equally complete candidates keep enumeration order (first wins).
fn pick(candidates: Vec<ResidueView>) -> Option<ResidueView> {
    let preferred: Vec<&ResidueView> = candidates
        .iter()
        .filter(|r| r.chain == PROCESSED_CHAIN)
        .collect();
    if let Some(best) = preferred.first() {
        return Some((*best).clone());
    }
    candidates
        .iter()
        .fold(None::<&ResidueView>, |best, r| match best {
            Some(b) if b.atom_count >= r.atom_count => Some(b),
            _ => Some(r),
        })
        .cloned()
}

/// Find the residue to highlight, by tiered fallback.
///
/// Structure generation can renumber or duplicate chains, so the residue
/// number derived from the resolved filename is only a hint. Tiers: the
/// filename-derived number, then the mutant residue name, then the number of
/// the clicked heatmap row. A structure where no tier matches is a miss the
/// caller must surface; guessing is worse than warning.
pub fn locate(
    structure: &Structure,
    filename_residue_hint: Option<i32>,
    mutant_name_hint: Option<&str>,
    clicked_residue: i32,
) -> Result<LocatedResidue, LocateMiss> {
    let residues = structure.residues();

    let mut tiers: Vec<Box<dyn Fn(&ResidueView) -> bool>> = Vec::new();
    if let Some(number) = filename_residue_hint {
        tiers.push(Box::new(move |r: &ResidueView| r.number == number));
    }
    if let Some(name) = mutant_name_hint {
        let name = name.to_ascii_uppercase();
        tiers.push(Box::new(move |r: &ResidueView| r.name == name));
    }
    tiers.push(Box::new(move |r: &ResidueView| r.number == clicked_residue));

    for tier in &tiers {
        let candidates: Vec<ResidueView> =
            residues.iter().filter(|r| tier(r)).cloned().collect();
        if let Some(chosen) = pick(candidates) {
            return Ok(LocatedResidue {
                chain: chosen.chain,
                number: chosen.number,
                name: chosen.name,
                atom_count: chosen.atom_count,
            });
        }
    }

    Err(LocateMiss {
        structure: structure.name.clone(),
        filename_residue_hint,
        mutant_name_hint: mutant_name_hint.map(|s| s.to_string()),
        clicked_residue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::test_pdb::atom_line;

    fn structure(lines: &[String]) -> Structure {
        Structure::from_pdb_text("fixture", &lines.join("\n")).unwrap()
    }

    fn residue(serials: std::ops::Range<u32>, name: &str, chain: &str, number: i32) -> Vec<String> {
        serials
            .map(|serial| atom_line(serial, "CA", name, chain, number, ""))
            .collect()
    }

    #[test]
    fn exact_filename_number_wins_tier_one() {
        let mut lines = residue(1..3, "ALA", "A", 60);
        lines.extend(residue(3..5, "TRP", "A", 61));
        let s = structure(&lines);
        let found = locate(&s, Some(61), Some("ALA"), 60).unwrap();
        assert_eq!(found.number, 61);
        assert_eq!(found.name, "TRP");
    }

    #[test]
    fn name_hint_is_the_second_tier() {
        let s = structure(&residue(1..4, "TRP", "A", 207));
        let found = locate(&s, Some(61), Some("TRP"), 60).unwrap();
        assert_eq!(found.number, 207);
    }

    #[test]
    fn clicked_number_is_the_final_fallback() {
        let s = structure(&residue(1..4, "GLY", "A", 60));
        let found = locate(&s, None, None, 60).unwrap();
        assert_eq!(found.number, 60);
        assert_eq!(found.name, "GLY");
    }

    #[test]
    fn processed_chain_beats_higher_atom_count() {
        // The processed chain arrives as a segment id and only becomes a
        // chain id through normalization, as in pipeline output.
        let mut lines = residue(1..9, "ALA", "B", 60); // 8 atoms
        lines.extend((9..12).map(|serial| atom_line(serial, "CA", "ALA", " ", 60, PROCESSED_CHAIN)));
        let mut s = structure(&lines);
        assert_eq!(s.normalize_chain_ids(), 3);
        let found = locate(&s, Some(60), None, 60).unwrap();
        assert_eq!(found.chain, PROCESSED_CHAIN);
        assert_eq!(found.atom_count, 3);
    }

    #[test]
    fn without_processed_chain_the_most_complete_residue_wins() {
        let mut lines = residue(1..3, "ALA", "A", 60);
        lines.extend(residue(3..10, "ALA", "B", 60));
        let s = structure(&lines);
        let found = locate(&s, Some(60), None, 60).unwrap();
        assert_eq!(found.chain, "B");
        assert_eq!(found.atom_count, 7);
    }

    #[test]
    fn miss_reports_every_attempted_hint() {
        let s = structure(&residue(1..3, "ALA", "A", 5));
        let err = locate(&s, Some(61), Some("TRP"), 60).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("61"));
        assert!(text.contains("TRP"));
        assert!(text.contains("60"));
    }
}
