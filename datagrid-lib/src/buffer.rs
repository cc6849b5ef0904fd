//! Data buffer
//!
//! Holds the records the grid currently knows about together with their row
//! ids. In local mode that is the whole dataset plus a view (indices into it
//! after filter, search and sort). In remote mode it is the last fetched page.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::error::ConfigError;
use crate::identity::has_explicit_id;
use crate::identity::identify;
use crate::identity::RowId;
use crate::model::Record;
use crate::query::OperationState;

/// One page of the current view, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a> {
    /// Position of `rows[0]` in the full view.
    pub offset: usize,
    pub rows: Vec<(&'a RowId, &'a Record)>,
}

impl PageSlice<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Records, their ids, and the current view over them.
#[derive(Debug, Clone, Default)]
pub struct DataBuffer {
    id_field: Option<String>,
    records: Vec<Record>,
    ids: Vec<RowId>,
    /// Indices into `records`, in display order.
    view: Vec<usize>,
    /// `ids` in view order.
    view_ids: Vec<RowId>,
    total_rows: usize,
    /// Full-view position of `records[0]` (remote pages only).
    remote_offset: usize,
    loaded: bool,
}

impl DataBuffer {
    /// Creates an empty buffer that derives ids from `id_field`.
    pub fn new(id_field: Option<String>) -> Self {
        Self {
            id_field,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Replacement
    // -------------------------------------------------------------------------

    /// Replaces the whole local dataset. The view becomes every record in
    /// load order.
    ///
    /// Fails without touching the buffer if the identity field repeats.
    pub fn load(&mut self, records: Vec<Record>) -> Result<(), ConfigError> {
        let ids = self.identify_all(&records)?;
        log::debug!("loaded {} records", records.len());

        self.total_rows = records.len();
        self.view = (0..records.len()).collect();
        self.view_ids = ids.clone();
        self.records = records;
        self.ids = ids;
        self.remote_offset = 0;
        self.loaded = true;
        Ok(())
    }

    /// Replaces the buffer with one fetched page.
    ///
    /// `offset` is where the page starts in the server-side view and
    /// `total_rows` the server's count for the whole view.
    pub fn replace_remote(&mut self, records: Vec<Record>, total_rows: usize, offset: usize) -> Result<(), ConfigError> {
        let ids = self.identify_all(&records)?;
        log::debug!(
            "replaced remote page: {} rows at offset {} of {}",
            records.len(),
            offset,
            total_rows
        );

        self.view = (0..records.len()).collect();
        self.view_ids = ids.clone();
        self.records = records;
        self.ids = ids;
        self.total_rows = total_rows;
        self.remote_offset = offset;
        self.loaded = true;
        Ok(())
    }

    /// Sets the local view to `indices` (into the loaded records).
    pub fn set_view(&mut self, indices: Vec<usize>) {
        self.view_ids = indices.iter().map(|&i| self.ids[i].clone()).collect();
        self.total_rows = indices.len();
        self.view = indices;
    }

    fn identify_all(&self, records: &[Record]) -> Result<Vec<RowId>, ConfigError> {
        let id_field = self.id_field.as_deref();
        let mut explicit = HashSet::new();
        let mut derived: HashMap<&RowId, usize> = HashMap::new();
        let ids: Vec<RowId> = records.iter().map(|r| identify(r, id_field)).collect();

        for (record, id) in records.iter().zip(&ids) {
            if has_explicit_id(record, id_field) {
                if !explicit.insert(id) {
                    return Err(ConfigError::DuplicateIdentity {
                        field: id_field.unwrap_or_default().to_string(),
                        value: id.to_string(),
                    });
                }
            } else {
                *derived.entry(id).or_default() += 1;
            }
        }

        let collisions = derived.values().filter(|&&n| n > 1).count();
        if collisions > 0 {
            log::debug!("{} derived row ids are shared by identical records", collisions);
        }
        Ok(ids)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns `true` once any data was loaded or fetched.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// All records held, in load order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Row count of the full view. In remote mode this is the server's count.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Ids of the view held locally, in display order.
    ///
    /// In local mode this is the full view; in remote mode the current page.
    pub fn view_ids(&self) -> &[RowId] {
        &self.view_ids
    }

    /// Full-view position of `id`, if it is held.
    pub fn position_of(&self, id: &RowId) -> Option<usize> {
        self.view_ids
            .iter()
            .position(|v| v == id)
            .map(|p| self.remote_offset.saturating_add(p))
    }

    /// Row at full-view position `index`, if it is held.
    pub fn record_at(&self, index: usize) -> Option<(&RowId, &Record)> {
        let local = index.checked_sub(self.remote_offset)?;
        let &i = self.view.get(local)?;
        Some((&self.ids[i], &self.records[i]))
    }

    /// Id at full-view position `index`, if it is held.
    pub fn id_at(&self, index: usize) -> Option<&RowId> {
        self.record_at(index).map(|(id, _)| id)
    }

    /// Rows to display for `state`.
    ///
    /// Local mode slices the view to the current page (or returns it whole
    /// when `paginate` is off). A remote buffer already is the page.
    pub fn page_slice(&self, state: &OperationState, paginate: bool, remote: bool) -> PageSlice<'_> {
        let (offset, range) = if remote {
            (self.remote_offset, 0..self.view.len())
        } else if paginate {
            let start = state.offset().min(self.view.len());
            let end = start.saturating_add(state.page_size()).min(self.view.len());
            (start, start..end)
        } else {
            (0, 0..self.view.len())
        };

        PageSlice {
            offset,
            rows: self.view[range]
                .iter()
                .map(|&i| (&self.ids[i], &self.records[i]))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Action;

    fn people(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::new().set("id", i as i64).set("name", format!("row {}", i)))
            .collect()
    }

    #[test]
    fn test_load_assigns_ids() {
        let mut buffer = DataBuffer::new(Some("id".into()));
        buffer.load(people(3)).unwrap();
        assert!(buffer.is_loaded());
        assert_eq!(buffer.total_rows(), 3);
        assert_eq!(buffer.view_ids(), &[RowId::from("1"), RowId::from("2"), RowId::from("3")]);
    }

    #[test]
    fn test_duplicate_explicit_id_rejects_load() {
        let mut buffer = DataBuffer::new(Some("id".into()));
        buffer.load(people(2)).unwrap();

        let dup = vec![Record::new().set("id", 7), Record::new().set("id", 7)];
        let err = buffer.load(dup).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateIdentity { ref value, .. } if value == "7"));
        assert_eq!(buffer.total_rows(), 2);
    }

    #[test]
    fn test_identical_records_without_id_are_tolerated() {
        let mut buffer = DataBuffer::new(None);
        let same = Record::new().set("name", "x");
        buffer.load(vec![same.clone(), same]).unwrap();
        assert_eq!(buffer.view_ids()[0], buffer.view_ids()[1]);
    }

    #[test]
    fn test_view_and_positions() {
        let mut buffer = DataBuffer::new(Some("id".into()));
        buffer.load(people(5)).unwrap();
        buffer.set_view(vec![4, 2, 0]);

        assert_eq!(buffer.total_rows(), 3);
        assert_eq!(buffer.position_of(&RowId::from("3")), Some(1));
        assert_eq!(buffer.position_of(&RowId::from("2")), None);
        assert_eq!(buffer.id_at(0), Some(&RowId::from("5")));
        assert_eq!(buffer.id_at(3), None);
    }

    #[test]
    fn test_local_page_slice() {
        let mut buffer = DataBuffer::new(Some("id".into()));
        buffer.load(people(5)).unwrap();
        let mut state = OperationState::new(2);
        state.apply(&Action::SetPage(3), Some(5)).unwrap();

        let slice = buffer.page_slice(&state, true, false);
        assert_eq!(slice.offset, 4);
        assert_eq!(slice.len(), 1);
        assert_eq!(slice.rows[0].0, &RowId::from("5"));

        let all = buffer.page_slice(&state, false, false);
        assert_eq!(all.offset, 0);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_remote_page_keeps_offset() {
        let mut buffer = DataBuffer::new(Some("id".into()));
        let page: Vec<Record> = people(6).into_iter().skip(4).collect();
        buffer.replace_remote(page, 6, 4).unwrap();

        assert_eq!(buffer.total_rows(), 6);
        assert_eq!(buffer.position_of(&RowId::from("6")), Some(5));
        assert_eq!(buffer.id_at(4), Some(&RowId::from("5")));
        assert_eq!(buffer.id_at(0), None);

        let slice = buffer.page_slice(&OperationState::new(2), true, true);
        assert_eq!(slice.offset, 4);
        assert_eq!(slice.len(), 2);
    }
}
