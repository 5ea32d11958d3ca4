use crate::config::ConcessionPolicy;
use crate::types::{Concession, Priority};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConcessionEntry / SelectedConcession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcessionEntry {
    /// How the concession will be applied. Stored verbatim.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

impl ConcessionEntry {
    pub fn is_described(&self) -> bool {
        !self.description.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedConcession {
    pub concession: Concession,
    #[serde(flatten)]
    pub entry: ConcessionEntry,
}

// ---------------------------------------------------------------------------
// CountAdvisory
// ---------------------------------------------------------------------------

/// Non-blocking hint that the selection is outside the recommended band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CountAdvisory {
    TooFew { selected: usize, min: usize },
    TooMany { selected: usize, max: usize },
}

impl CountAdvisory {
    pub fn message(&self) -> String {
        match self {
            CountAdvisory::TooFew { selected, min } => format!(
                "Você selecionou {selected} moeda(s) de troca; recomendamos pelo menos {min}."
            ),
            CountAdvisory::TooMany { selected, max } => format!(
                "Você selecionou {selected} moedas de troca; recomendamos no máximo {max} para não diluir o valor."
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// ConcessionRegistry
// ---------------------------------------------------------------------------

/// Selected concessions in selection order. Presence means selected;
/// deselecting deletes the entry and whatever was typed into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcessionRegistry {
    #[serde(default)]
    selected: Vec<SelectedConcession>,
}

impl ConcessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_selection(&mut self, concession: Concession, selected: bool) {
        let present = self.position(concession);
        match (selected, present) {
            (true, None) => self.selected.push(SelectedConcession {
                concession,
                entry: ConcessionEntry::default(),
            }),
            (false, Some(i)) => {
                self.selected.remove(i);
            }
            _ => {}
        }
    }

    /// Returns false (and changes nothing) when `concession` is not selected.
    pub fn set_description(&mut self, concession: Concession, text: impl Into<String>) -> bool {
        match self.entry_mut(concession) {
            Some(entry) => {
                entry.description = text.into();
                true
            }
            None => false,
        }
    }

    /// Returns false (and changes nothing) when `concession` is not selected.
    pub fn set_priority(&mut self, concession: Concession, priority: Priority) -> bool {
        match self.entry_mut(concession) {
            Some(entry) => {
                entry.priority = priority;
                true
            }
            None => false,
        }
    }

    pub fn is_selected(&self, concession: Concession) -> bool {
        self.position(concession).is_some()
    }

    pub fn entry(&self, concession: Concession) -> Option<&ConcessionEntry> {
        self.selected
            .iter()
            .find(|s| s.concession == concession)
            .map(|s| &s.entry)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected concessions that already carry a description.
    pub fn described_count(&self) -> usize {
        self.selected.iter().filter(|s| s.entry.is_described()).count()
    }

    /// Selection order, no sorting.
    pub fn iter(&self) -> impl Iterator<Item = &SelectedConcession> {
        self.selected.iter()
    }

    /// Sorted by priority; equal priorities keep selection order.
    pub fn ordered_view(&self) -> Vec<&SelectedConcession> {
        let mut view: Vec<&SelectedConcession> = self.selected.iter().collect();
        view.sort_by_key(|s| s.entry.priority);
        view
    }

    pub fn advisory(&self, policy: &ConcessionPolicy) -> Option<CountAdvisory> {
        let selected = self.len();
        if selected < policy.recommended_min {
            Some(CountAdvisory::TooFew {
                selected,
                min: policy.recommended_min,
            })
        } else if selected > policy.recommended_max {
            Some(CountAdvisory::TooMany {
                selected,
                max: policy.recommended_max,
            })
        } else {
            None
        }
    }

    fn position(&self, concession: Concession) -> Option<usize> {
        self.selected.iter().position(|s| s.concession == concession)
    }

    fn entry_mut(&mut self, concession: Concession) -> Option<&mut ConcessionEntry> {
        self.selected
            .iter_mut()
            .find(|s| s.concession == concession)
            .map(|s| &mut s.entry)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
