use crate::result_files::{decode_structure_name, decode_table_key, ResultFileSet};
use crate::AMINO_ACIDS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which heatmap the user clicked: one table's view or the combined view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionContext {
    Combined,
    Table(String),
}

/// Nothing among the known structure files encodes the requested mutation.
///
/// Callers surface this as a warning naming the residue and mutant; a miss is
/// never silently dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveMiss {
    pub residue: u32,
    pub mutant: char,
}

impl fmt::Display for ResolveMiss {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "No structure file found for residue {} mutant {}",
            self.residue,
            self.mutant.to_ascii_uppercase()
        )
    }
}

/// Wild-type one-letter code encoded in a specific table's key, if any.
fn wild_letter_of_context(context: &SelectionContext) -> Option<char> {
    let SelectionContext::Table(key) = context else {
        return None;
    };
    let info = decode_table_key(key)?;
    AMINO_ACIDS
        .one_letter(&info.wild_tla)
        .map(|c| c.to_ascii_lowercase())
}

/// Map a clicked heatmap cell to the structure file that realizes it.
///
/// Two tiers. Strict: the selected table's key decodes to a wild-type letter
/// and some file encodes exactly (residue, wild, mutant). Relaxed: any wild
/// letter with the right residue and mutant; the only tier for the combined
/// view, where no single wild type applies. Several relaxed candidates should
/// not occur under correct upstream naming, but nothing prevents it, so the
/// first in file-list order wins.
pub fn resolve(
    residue: u32,
    mutant: char,
    context: &SelectionContext,
    files: &ResultFileSet,
) -> Result<String, ResolveMiss> {
    let mutant = mutant.to_ascii_lowercase();
    let candidates: Vec<(&String, crate::result_files::StructureName)> = files
        .structure_files()
        .into_iter()
        .filter_map(|f| decode_structure_name(f).map(|d| (f, d)))
        .filter(|(_, d)| d.residue == residue && d.mutant == mutant)
        .collect();

    if let Some(wild) = wild_letter_of_context(context) {
        if let Some((file, _)) = candidates.iter().find(|(_, d)| d.wild == wild) {
            return Ok((*file).clone());
        }
    }

    candidates
        .first()
        .map(|(file, _)| (*file).clone())
        .ok_or(ResolveMiss { residue, mutant })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> ResultFileSet {
        ResultFileSet::new(names.iter().map(|s| s.to_string()).collect())
    }

    fn glu60() -> SelectionContext {
        SelectionContext::Table("inter_ener_glu60c".to_string())
    }

    #[test]
    fn strict_tier_prefers_the_decoded_wild_type() {
        let set = files(&["joined_proc_60_d2a.pdb", "joined_proc_60_e2a.pdb"]);
        let resolved = resolve(60, 'a', &glu60(), &set).unwrap();
        assert_eq!(resolved, "joined_proc_60_e2a.pdb");
    }

    #[test]
    fn relaxed_tier_ignores_the_wild_type_when_strict_misses() {
        let set = files(&["joined_proc_60_d2a.pdb"]);
        let resolved = resolve(60, 'a', &glu60(), &set).unwrap();
        assert_eq!(resolved, "joined_proc_60_d2a.pdb");
    }

    #[test]
    fn combined_context_is_relaxed_only() {
        let set = files(&["joined_proc_60_d2a.pdb", "joined_proc_60_e2a.pdb"]);
        let resolved = resolve(60, 'a', &SelectionContext::Combined, &set).unwrap();
        assert_eq!(resolved, "joined_proc_60_d2a.pdb");
    }

    #[test]
    fn undecodable_table_key_degrades_to_relaxed() {
        let context = SelectionContext::Table("combined_notes".to_string());
        let set = files(&["joined_proc_60_d2a.pdb"]);
        assert!(resolve(60, 'a', &context, &set).is_ok());
    }

    #[test]
    fn miss_names_residue_and_mutant() {
        let set = files(&["joined_proc_60_e2a.pdb"]);
        let err = resolve(61, 'w', &glu60(), &set).unwrap_err();
        assert_eq!(err, ResolveMiss { residue: 61, mutant: 'w' });
        assert!(err.to_string().contains("61"));
        assert!(err.to_string().contains('W'));
    }

    #[test]
    fn non_grammar_files_are_never_candidates() {
        let set = files(&["random.pdb", "inter_ener_glu60c.ene"]);
        assert!(resolve(60, 'a', &glu60(), &set).is_err());
    }
}
