//! Access recorder for host tests.
//!
//! Recording is per thread, so tests running in parallel do not see each
//! other's accesses. Nothing is recorded until [`start`] is called.

use expectest::expect;
use expectest::prelude::*;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// One observed volatile access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub access: Access,
    pub address: usize,
    pub value: u64,
}

thread_local! {
    static RECORDS: RefCell<Option<Vec<Record>>> = RefCell::new(None);
}

fn record(access: Access, address: usize, value: u64) {
    RECORDS.with(|records| {
        if let Some(ref mut records) = *records.borrow_mut() {
            records.push(Record {
                access: access,
                address: address,
                value: value,
            });
        }
    });
}

pub(crate) fn record_read(address: usize, value: u64) {
    record(Access::Read, address, value)
}

pub(crate) fn record_write(address: usize, value: u64) {
    record(Access::Write, address, value)
}

/// Begin recording accesses on the current thread, dropping anything
/// recorded so far.
pub fn start() {
    RECORDS.with(|records| *records.borrow_mut() = Some(Vec::new()));
}

/// Number of accesses recorded so far on the current thread.
pub fn recorded() -> usize {
    RECORDS.with(|records| records.borrow().as_ref().map(Vec::len).unwrap_or(0))
}

/// Stop recording and hand back everything seen since [`start`].
pub fn finish() -> VolatileCellReplayer {
    let records = RECORDS.with(|records| records.borrow_mut().take());
    VolatileCellReplayer {
        records: records.unwrap_or_default(),
        cursor: 0,
    }
}

/// A finished recording.
///
/// `expect_*` calls walk the recording in order: each one looks for the
/// next matching access after the previous match, so a chain of them
/// asserts relative ordering without pinning every intermediate access.
pub struct VolatileCellReplayer {
    records: Vec<Record>,
    cursor: usize,
}

impl VolatileCellReplayer {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn writes(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.access == Access::Write)
    }

    /// Values written to `address`, oldest first.
    pub fn writes_to(&self, address: usize) -> Vec<u64> {
        self.writes()
            .filter(|r| r.address == address)
            .map(|r| r.value)
            .collect()
    }

    /// Index of the first access of any kind to `address`.
    pub fn first_access(&self, address: usize) -> Option<usize> {
        self.records.iter().position(|r| r.address == address)
    }

    /// Index of the first write to `address`.
    pub fn first_write(&self, address: usize) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.access == Access::Write && r.address == address)
    }

    /// Index of the last access of any kind to `address`.
    pub fn last_access(&self, address: usize) -> Option<usize> {
        self.records.iter().rposition(|r| r.address == address)
    }

    fn expect_next(&mut self, access: Access, address: usize, value: u64) -> &mut Self {
        let found = self.records[self.cursor..]
            .iter()
            .position(|r| r.access == access && r.address == address && r.value == value);
        expect!(found).to(be_some());
        if let Some(offset) = found {
            self.cursor += offset + 1;
        }
        self
    }

    pub fn expect_read(&mut self, address: usize, value: u64) -> &mut Self {
        self.expect_next(Access::Read, address, value)
    }

    pub fn expect_write(&mut self, address: usize, value: u64) -> &mut Self {
        self.expect_next(Access::Write, address, value)
    }

    /// Asserts no write to `address` was recorded at all.
    pub fn expect_untouched(&mut self, address: usize) -> &mut Self {
        expect!(self.first_write(address)).to(be_none());
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::VolatileCell;

    #[test]
    fn records_only_while_started() {
        let cell = VolatileCell::new(0u32);
        cell.set(1);
        start();
        cell.set(2);
        let _ = cell.get();
        let replayer = finish();
        cell.set(3);

        expect!(replayer.records().len()).to(be_equal_to(2usize));
        expect!(replayer.writes_to(cell.address())).to(be_equal_to(vec![2u64]));
        expect!(recorded()).to(be_equal_to(0usize));
    }

    #[test]
    fn expectations_follow_order() {
        let a = VolatileCell::new(0u16);
        let b = VolatileCell::new(0u16);
        start();
        a.set(0xc520);
        b.set(1);
        a.set(0xd928);
        let mut replayer = finish();

        replayer
            .expect_write(a.address(), 0xc520)
            .expect_write(b.address(), 1)
            .expect_write(a.address(), 0xd928);
        expect!(replayer.last_access(a.address())).to(be_some().value(2usize));
    }

    #[test]
    #[should_panic]
    fn out_of_order_expectation_panics() {
        let a = VolatileCell::new(0u8);
        let b = VolatileCell::new(0u8);
        start();
        a.set(1);
        b.set(1);
        finish()
            .expect_write(b.address(), 1)
            .expect_write(a.address(), 1);
    }
}
