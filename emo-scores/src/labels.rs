//! Emotion label normalization
//!
//! Game clients have submitted the same emotion under several spellings over
//! time ("sad", "Sadness", "surprised"). Every raw token is folded onto the
//! configured canonical label set before it is counted; tokens that match
//! nothing are reported as `None` and the caller drops the record.

use emo_common::config::LabelConfig;
use emo_common::Result;
use std::collections::HashMap;

/// Index of a label in the canonical set
///
/// The index is the confusion matrix row/column for the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalLabel(usize);

impl CanonicalLabel {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Case-insensitive lookup from raw tokens to canonical labels
#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    names: Vec<String>,
    lookup: HashMap<String, CanonicalLabel>,
}

impl LabelNormalizer {
    /// Build from a label table, rejecting tables that fail validation
    pub fn from_config(config: &LabelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &LabelConfig) -> Self {
        let names: Vec<String> = config.canonical.iter().map(|s| s.trim().to_string()).collect();

        let index_of: HashMap<String, CanonicalLabel> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_lowercase(), CanonicalLabel(i)))
            .collect();

        let mut lookup = HashMap::with_capacity(index_of.len() + config.synonyms.len());
        for (alias, target) in &config.synonyms {
            if let Some(label) = index_of.get(&target.trim().to_lowercase()) {
                lookup.insert(alias.trim().to_lowercase(), *label);
            }
        }
        // A canonical spelling always means itself, even if a synonym says otherwise
        lookup.extend(index_of);

        Self { names, lookup }
    }

    /// Map a raw token to its canonical label
    pub fn normalize(&self, token: &str) -> Option<CanonicalLabel> {
        self.lookup.get(&token.trim().to_lowercase()).copied()
    }

    /// Number of canonical labels (matrix dimension)
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, label: CanonicalLabel) -> &str {
        &self.names[label.0]
    }

    /// Canonical names in matrix order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self::build(&LabelConfig::default())
    }
}
