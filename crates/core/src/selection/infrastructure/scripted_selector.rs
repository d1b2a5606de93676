use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::selection::domain::region_selector::{RegionSelector, SelectionPurpose};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// One recorded selection request: purpose plus preview dimensions.
pub type SelectionCall = (SelectionPurpose, u32, u32);

/// Non-interactive selector answering from a fixed table.
///
/// Answers are given in preview coordinates, the same as an interactive
/// user would draw them. Every request is recorded so callers can check
/// how often selection was asked for.
pub struct ScriptedRegionSelector {
    answers: HashMap<SelectionPurpose, Vec<Region>>,
    calls: Arc<Mutex<Vec<SelectionCall>>>,
}

impl ScriptedRegionSelector {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_answer(mut self, purpose: SelectionPurpose, regions: Vec<Region>) -> Self {
        self.answers.insert(purpose, regions);
        self
    }

    /// Shared handle to the request log.
    pub fn calls(&self) -> Arc<Mutex<Vec<SelectionCall>>> {
        self.calls.clone()
    }
}

impl Default for ScriptedRegionSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionSelector for ScriptedRegionSelector {
    fn select(
        &mut self,
        preview: &Frame,
        purpose: SelectionPurpose,
    ) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        self.calls
            .lock()
            .map_err(|_| "selection log poisoned")?
            .push((purpose, preview.width(), preview.height()));
        Ok(self.answers.get(&purpose).cloned().unwrap_or_default())
    }
}
