//! Item table for the writer menu.
//!
//! The index of each entry is part of the control protocol: pressing `'0'`
//! always selects `ITEMS[0]`, and so on.

/// One writable item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Item {
    /// Full text written to the tag, e.g. `"ITEM:CIG"`.
    pub payload: &'static str,
    /// Human-readable name shown in the menu.
    pub name: &'static str,
}

pub const ITEM_COUNT: usize = 5;

pub static ITEMS: [Item; ITEM_COUNT] = [
    Item {
        payload: "ITEM:CIG",
        name: "Cigarette",
    },
    Item {
        payload: "ITEM:BEER",
        name: "Beer",
    },
    Item {
        payload: "ITEM:SAW",
        name: "Saw",
    },
    Item {
        payload: "ITEM:CUFF",
        name: "Handcuffs",
    },
    Item {
        payload: "ITEM:MAG",
        name: "MagnifyingGlass",
    },
];

/// Item at menu position `index`.
pub fn item(index: usize) -> Option<&'static Item> {
    ITEMS.get(index)
}
