//! Mints the unique labels and scratch names the generator needs.
use rustc_hash::FxHashMap;

pub type Symbol<'s> = &'s str;

/// Stores per-key occurrence counts, used to generate unique names for
/// repeated code shapes (e.g. the `eq`/`gt`/`lt` comparison branches) and
/// two global counters used by call-site return labels and effective-address
/// scratch cells.
#[derive(Default)]
pub(crate) struct SymbolTable<'source> {
    table: FxHashMap<Symbol<'source>, u16>,
    call_counter: u16,
    scratch_counter: u16,
}

impl<'s> SymbolTable<'s> {
    pub fn new() -> Self {
        SymbolTable {
            table: FxHashMap::default(),
            call_counter: 0,
            scratch_counter: 0,
        }
    }

    /// Next occurrence index for `sym`, starting at 0.
    fn next_index(&mut self, sym: Symbol<'s>) -> u16 {
        let index = *self.table.entry(sym).and_modify(|e| *e += 1).or_insert(0);
        index
    }

    /// A comparison (`eq`/`gt`/`lt`) needs two labels sharing one counter
    /// value: the "jump here if true" target and the "fall through" target
    /// just past it. Minting both from a single index call keeps them paired.
    pub fn compare_labels(&mut self, op: Symbol<'s>) -> (String, String) {
        let index = self.next_index(op);
        (format!("{op}{index}"), format!("{op}cont{index}"))
    }

    /// Return-address label counter for `call`, global across the whole
    /// program so `<fn>$ret.N` is unique regardless of which function is
    /// calling.
    pub fn next_call_index(&mut self) -> u16 {
        let index = self.call_counter;
        self.call_counter += 1;
        index
    }

    /// Indexed scratch address cell for an effective-address spill
    /// (`addr0`, `addr1`, ...). Indexed rather than shared so that nested or
    /// repeated address computations can never alias each other.
    pub fn next_scratch_label(&mut self) -> String {
        let index = self.scratch_counter;
        self.scratch_counter += 1;
        format!("addr{index}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_labels_share_one_index_and_are_distinct() {
        let mut t = SymbolTable::new();

        let (true0, cont0) = t.compare_labels("eq");
        assert_eq!(true0, "eq0");
        assert_eq!(cont0, "eqcont0");

        let (true1, cont1) = t.compare_labels("eq");
        assert_eq!(true1, "eq1");
        assert_eq!(cont1, "eqcont1");

        let (gt0, gtcont0) = t.compare_labels("gt");
        assert_eq!(gt0, "gt0");
        assert_eq!(gtcont0, "gtcont0");
    }

    #[test]
    fn call_counter_is_global_and_monotonic() {
        let mut t = SymbolTable::new();
        assert_eq!(t.next_call_index(), 0);
        assert_eq!(t.next_call_index(), 1);
        assert_eq!(t.next_call_index(), 2);
    }

    #[test]
    fn scratch_labels_are_indexed_not_shared() {
        let mut t = SymbolTable::new();
        assert_eq!(t.next_scratch_label(), "addr0");
        assert_eq!(t.next_scratch_label(), "addr1");
    }
}
