use crate::batch::decode_batch;
use crate::types::{BatchReport, CollectionError, FileInput, ImageRecord, Result, SortState};

/// The ordered, editable set of images being assembled.
///
/// Insertion order is significant: it is the pagination order of the output
/// document. Besides the records themselves the collection tracks two bits
/// of bookkeeping: the sort state (so repeated sorts in the same direction
/// short-circuit) and the select-all toggle (so "select all" applies one
/// uniform target value instead of flipping each record individually).
#[derive(Default)]
pub struct ImageCollection {
    records: Vec<ImageRecord>,
    sort_state: SortState,
    all_selected: bool,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn selected_count(&self) -> usize {
        self.records.iter().filter(|r| r.selected).count()
    }

    pub fn all_selected(&self) -> bool {
        self.all_selected
    }

    pub fn sort_state(&self) -> SortState {
        self.sort_state
    }

    /// Cloned records in pagination order, handed to the assembly pipeline
    pub fn snapshot(&self) -> Vec<ImageRecord> {
        self.records.clone()
    }

    /// Decode `files` and append the surviving records in input order.
    ///
    /// Rejected and undecodable inputs are excluded per file (see
    /// [`BatchReport`]); the collection is only touched once the whole batch
    /// has settled, and appended records land after the existing ones in the
    /// original input order regardless of decode completion timing.
    /// Appending marks the collection unsorted.
    pub async fn add_batch(&mut self, files: Vec<FileInput>) -> Result<BatchReport> {
        let (records, report) = decode_batch(files).await?;
        if !records.is_empty() {
            self.records.extend(records);
            self.sort_state = SortState::Unsorted;
        }
        Ok(report)
    }

    /// Remove exactly one record
    pub fn remove(&mut self, index: usize) -> Result<ImageRecord> {
        if index >= self.records.len() {
            return Err(CollectionError::IndexOutOfBounds(index));
        }
        Ok(self.records.remove(index))
    }

    /// Remove every selected record and reset the select-all toggle
    pub fn remove_selected(&mut self) -> Result<usize> {
        if self.selected_count() == 0 {
            return Err(CollectionError::NoSelection);
        }
        let before = self.records.len();
        self.records.retain(|r| !r.selected);
        self.all_selected = false;
        Ok(before - self.records.len())
    }

    /// Clear the collection and reset sort and selection bookkeeping
    pub fn remove_all(&mut self) {
        self.records.clear();
        self.sort_state = SortState::Ascending;
        self.all_selected = false;
    }

    /// Flip one record's selection flag, returning the new value
    pub fn toggle_select(&mut self, index: usize) -> Result<bool> {
        let record = self
            .records
            .get_mut(index)
            .ok_or(CollectionError::IndexOutOfBounds(index))?;
        record.selected = !record.selected;
        Ok(record.selected)
    }

    /// Apply a single uniform selection value to every record.
    ///
    /// The target is the negation of the tracked toggle, not a per-record
    /// alternation: records selected by hand are folded into the same value
    /// as everything else. Returns the value that was applied.
    pub fn toggle_select_all(&mut self) -> bool {
        self.all_selected = !self.all_selected;
        for record in &mut self.records {
            record.selected = self.all_selected;
        }
        self.all_selected
    }

    /// Advance one record's rotation by a quarter turn
    pub fn rotate(&mut self, index: usize) -> Result<()> {
        let record = self
            .records
            .get_mut(index)
            .ok_or(CollectionError::IndexOutOfBounds(index))?;
        record.rotation = record.rotation.advance();
        Ok(())
    }

    /// Advance every selected record's rotation by a quarter turn
    pub fn rotate_selected(&mut self) -> Result<usize> {
        if self.selected_count() == 0 {
            return Err(CollectionError::NoSelection);
        }
        let mut rotated = 0;
        for record in &mut self.records {
            if record.selected {
                record.rotation = record.rotation.advance();
                rotated += 1;
            }
        }
        Ok(rotated)
    }

    /// Replace the order with a caller-supplied permutation of `0..len`.
    ///
    /// Used by manual drag reordering; marks the collection unsorted.
    pub fn reorder(&mut self, new_order: &[usize]) -> Result<()> {
        if new_order.len() != self.records.len() {
            return Err(CollectionError::InvalidOrder);
        }
        let mut seen = vec![false; new_order.len()];
        for &index in new_order {
            if index >= seen.len() || seen[index] {
                return Err(CollectionError::InvalidOrder);
            }
            seen[index] = true;
        }

        let mut slots: Vec<Option<ImageRecord>> = self.records.drain(..).map(Some).collect();
        for &index in new_order {
            if let Some(record) = slots[index].take() {
                self.records.push(record);
            }
        }
        self.sort_state = SortState::Unsorted;
        Ok(())
    }

    /// Stable sort by case-insensitive name; ties keep their prior relative
    /// order. A no-op when the collection is already sorted in the requested
    /// direction.
    pub fn sort(&mut self, ascending: bool) {
        let target = if ascending {
            SortState::Ascending
        } else {
            SortState::Descending
        };
        if self.sort_state == target {
            return;
        }
        self.records.sort_by(|a, b| {
            let ord = a.name.to_lowercase().cmp(&b.name.to_lowercase());
            if ascending { ord } else { ord.reverse() }
        });
        self.sort_state = target;
    }
}
