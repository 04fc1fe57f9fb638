//! A milonga program: set metadata, its tanda records, and the slot timeline.
//!
//! Tandas live in one flat list. A tanda with `position: Some(i)` sits in
//! slot `i` of the timeline; `None` means it waits in the library. Removing a
//! tanda from the timeline only clears its position. Deleting is separate.
//!
//! Invariants upheld by every mutating method:
//! - at most one tanda per position;
//! - `slot_count` stays within [`MIN_SLOTS`]..=[`MAX_SLOTS`].

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProgramError;
use crate::types::{
    clamp_energy, MilongaSet, NewTanda, SetId, Tanda, TandaId, TandaMode, TandaType,
    DEFAULT_SLOTS, MAX_SLOTS, MIN_SLOTS, TRACK_COUNTS,
};

/// Current on-disk schema version of a plan document.
pub const PLAN_VERSION: u32 = 1;

fn default_slot_count() -> usize {
    DEFAULT_SLOTS
}

/// One evening's program, as stored in a plan file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub version: u32,
    pub set: MilongaSet,
    #[serde(default = "default_slot_count")]
    pub slot_count: usize,
    #[serde(default)]
    pub tandas: Vec<Tanda>,
}

/// Clamp a requested slot count into the allowed range.
pub fn clamp_slot_count(n: usize) -> usize {
    n.clamp(MIN_SLOTS, MAX_SLOTS)
}

impl Program {
    /// An empty program with a fresh set id.
    pub fn new(
        name: impl Into<String>,
        venue: Option<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        slot_count: usize,
    ) -> Self {
        Program {
            version: PLAN_VERSION,
            set: MilongaSet {
                id: SetId::generate(),
                name: name.into(),
                venue,
                date,
                start_time,
                created_at: Utc::now(),
            },
            slot_count: clamp_slot_count(slot_count),
            tandas: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Fixed-length timeline. Tandas positioned past `slot_count` are hidden.
    pub fn slots(&self) -> Vec<Option<&Tanda>> {
        let mut slots: Vec<Option<&Tanda>> = vec![None; self.slot_count];
        for tanda in &self.tandas {
            if let Some(pos) = tanda.position {
                if pos < self.slot_count {
                    slots[pos] = Some(tanda);
                }
            }
        }
        slots
    }

    /// Unplaced tandas, creation order.
    pub fn library(&self) -> Vec<&Tanda> {
        self.tandas.iter().filter(|t| t.position.is_none()).collect()
    }

    /// Library narrowed to `tanda_type` and/or a case-insensitive `search`
    /// over the orchestra name (via `name_of`) and singer.
    pub fn library_filtered<F>(
        &self,
        tanda_type: Option<TandaType>,
        search: Option<&str>,
        name_of: F,
    ) -> Vec<&Tanda>
    where
        F: Fn(&Tanda) -> String,
    {
        let needle = search.map(str::to_lowercase);
        self.library()
            .into_iter()
            .filter(|t| tanda_type.map_or(true, |ty| t.tanda_type == ty))
            .filter(|t| match &needle {
                None => true,
                Some(n) => {
                    name_of(*t).to_lowercase().contains(n)
                        || t.singer
                            .as_ref()
                            .is_some_and(|s| s.to_lowercase().contains(n))
                }
            })
            .collect()
    }

    pub fn tanda(&self, id: &TandaId) -> Option<&Tanda> {
        self.tandas.iter().find(|t| &t.id == id)
    }

    /// Tanda currently shown in `slot`, if any.
    pub fn at_slot(&self, slot: usize) -> Option<&Tanda> {
        if slot >= self.slot_count {
            return None;
        }
        self.tandas.iter().find(|t| t.position == Some(slot))
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve_id(&self, prefix: &str) -> Result<TandaId, ProgramError> {
        if let Some(exact) = self.tandas.iter().find(|t| t.id.0 == prefix) {
            return Ok(exact.id.clone());
        }
        let matches: Vec<&Tanda> = self
            .tandas
            .iter()
            .filter(|t| t.id.0.starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [] => Err(ProgramError::TandaNotFound(prefix.to_string())),
            [one] => Ok(one.id.clone()),
            many => Err(ProgramError::AmbiguousTanda {
                prefix: prefix.to_string(),
                count: many.len(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create an unplaced tanda in the library and return its id.
    pub fn add_tanda(&mut self, new: NewTanda) -> TandaId {
        let id = TandaId::generate();
        self.tandas.push(new.into_tanda(id.clone()));
        id
    }

    /// Put a library (or timeline) tanda into an empty `slot`.
    pub fn place(&mut self, id: &TandaId, slot: usize) -> Result<(), ProgramError> {
        self.check_slot(slot)?;
        if let Some(occupant) = self.at_slot(slot) {
            if &occupant.id == id {
                return Ok(());
            }
            return Err(ProgramError::SlotOccupied {
                slot,
                occupant: occupant.id.clone(),
            });
        }
        let tanda = self.tanda_mut(id)?;
        tanda.position = Some(slot);
        Ok(())
    }

    /// Return a tanda to the library. Unplacing a library tanda is a no-op.
    pub fn unplace(&mut self, id: &TandaId) -> Result<(), ProgramError> {
        self.tanda_mut(id)?.position = None;
        Ok(())
    }

    /// Clear `slot`, returning its tanda to the library.
    pub fn unplace_slot(&mut self, slot: usize) -> Result<TandaId, ProgramError> {
        self.check_slot(slot)?;
        let id = self
            .at_slot(slot)
            .map(|t| t.id.clone())
            .ok_or(ProgramError::SlotEmpty { slot })?;
        self.unplace(&id)?;
        Ok(id)
    }

    /// Move the tanda in `from` to `to`. An occupied `to` swaps the two.
    pub fn move_slot(&mut self, from: usize, to: usize) -> Result<(), ProgramError> {
        self.check_slot(from)?;
        self.check_slot(to)?;
        if from == to {
            return Ok(());
        }
        let moving = self
            .at_slot(from)
            .map(|t| t.id.clone())
            .ok_or(ProgramError::SlotEmpty { slot: from })?;
        let displaced = self.at_slot(to).map(|t| t.id.clone());

        self.tanda_mut(&moving)?.position = Some(to);
        if let Some(other) = displaced {
            self.tanda_mut(&other)?.position = Some(from);
        }
        Ok(())
    }

    /// Permanently remove a tanda record.
    pub fn delete_tanda(&mut self, id: &TandaId) -> Result<Tanda, ProgramError> {
        let index = self
            .tandas
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| ProgramError::TandaNotFound(id.0.clone()))?;
        Ok(self.tandas.remove(index))
    }

    /// Resize the timeline (clamped). Tandas beyond the new end keep their
    /// position and reappear if the timeline grows again.
    pub fn set_slot_count(&mut self, n: usize) -> usize {
        self.slot_count = clamp_slot_count(n);
        self.slot_count
    }

    /// Bring a document read from disk or an import back within the
    /// timeline invariants: slot count and energies are clamped, while
    /// duplicate positions, bad track counts and undersized mixes are errors.
    pub fn normalize(&mut self) -> Result<(), ProgramError> {
        self.check_positions()?;
        for tanda in &self.tandas {
            if !TRACK_COUNTS.contains(&tanda.track_count) {
                return Err(ProgramError::TrackCount {
                    tanda: tanda.id.clone(),
                    count: tanda.track_count,
                });
            }
            if tanda.mode == TandaMode::Mixed && tanda.mix.len() < 2 {
                return Err(ProgramError::MixTooSmall {
                    tanda: tanda.id.clone(),
                    found: tanda.mix.len(),
                });
            }
        }
        self.slot_count = clamp_slot_count(self.slot_count);
        for tanda in &mut self.tandas {
            tanda.energy = clamp_energy(tanda.energy);
        }
        Ok(())
    }

    /// Reject documents where two tandas claim the same position.
    pub fn check_positions(&self) -> Result<(), ProgramError> {
        let mut taken = std::collections::HashSet::new();
        for pos in self.tandas.iter().filter_map(|t| t.position) {
            if !taken.insert(pos) {
                return Err(ProgramError::DuplicatePosition { slot: pos });
            }
        }
        Ok(())
    }

    fn check_slot(&self, slot: usize) -> Result<(), ProgramError> {
        if slot >= self.slot_count {
            return Err(ProgramError::SlotOutOfRange {
                slot,
                slot_count: self.slot_count,
            });
        }
        Ok(())
    }

    fn tanda_mut(&mut self, id: &TandaId) -> Result<&mut Tanda, ProgramError> {
        self.tandas
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| ProgramError::TandaNotFound(id.0.clone()))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
