use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Suffix marking a structure result file.
pub const STRUCTURE_SUFFIX: &str = ".pdb";
/// Suffix marking an energy-table result file.
pub const TABLE_SUFFIX: &str = ".ene";

lazy_static! {
    /// Structure filename grammar: `<prefix>_<residue>_<wild>2<mutant>.pdb`,
    /// case-insensitive. Anything else is a non-match, never a parse error.
    static ref STRUCTURE_NAME_RE: Regex =
        Regex::new(r"(?i)^.+_(\d+)_([a-z])2([a-z])\.pdb$").expect("Invalid structure-name regex");

    /// Table key grammar: `<prefix>_<wild three-letter><residue><chain>`,
    /// matched against the filename minus extension, case-insensitive.
    static ref TABLE_KEY_RE: Regex =
        Regex::new(r"(?i)^.*_([a-z]{3})(\d+)([a-z])$").expect("Invalid table-key regex");
}

/// What a structure filename encodes about its mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureName {
    pub residue: u32,
    /// Wild-type one-letter code, lowercased.
    pub wild: char,
    /// Mutant one-letter code, lowercased.
    pub mutant: char,
}

/// What a specific table key encodes about its wild-type residue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableKeyInfo {
    /// Wild-type three-letter code, uppercased.
    pub wild_tla: String,
    pub residue: u32,
    /// Chain letter, uppercased.
    pub chain: char,
}

/// Decode a structure filename, or None when it does not follow the grammar.
pub fn decode_structure_name(filename: &str) -> Option<StructureName> {
    let caps = STRUCTURE_NAME_RE.captures(filename)?;
    Some(StructureName {
        residue: caps[1].parse().ok()?,
        wild: caps[2].chars().next()?.to_ascii_lowercase(),
        mutant: caps[3].chars().next()?.to_ascii_lowercase(),
    })
}

/// Decode a table key, or None when the key does not carry the encoding.
pub fn decode_table_key(key: &str) -> Option<TableKeyInfo> {
    let caps = TABLE_KEY_RE.captures(key)?;
    Some(TableKeyInfo {
        wild_tla: caps[1].to_ascii_uppercase(),
        residue: caps[2].parse().ok()?,
        chain: caps[3].chars().next()?.to_ascii_uppercase(),
    })
}

/// Table identity of a result filename: the name minus its extension.
pub fn table_key_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(dot) => filename[..dot].to_string(),
        None => filename.to_string(),
    }
}

/// The ordered result filenames known for the current session, from a job
/// completion listing or from archive contents. Replaced wholesale on
/// session reset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFileSet {
    files: Vec<String>,
}

impl ResultFileSet {
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn structure_files(&self) -> Vec<&String> {
        self.files
            .iter()
            .filter(|f| f.to_ascii_lowercase().ends_with(STRUCTURE_SUFFIX))
            .collect()
    }

    pub fn table_files(&self) -> Vec<&String> {
        self.files
            .iter()
            .filter(|f| f.to_ascii_lowercase().ends_with(TABLE_SUFFIX))
            .collect()
    }
}
