//! Disposal knowledge base
//!
//! Static mapping from canonical item key (e.g. `bottle`) to the disposal
//! record shown to the user. Built once at startup, read-only afterwards.

use std::collections::BTreeMap;

/// Waste stream an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Recycle,
    Compost,
    Trash,
    CheckLocally,
}

impl Category {
    /// User-facing label
    pub fn display_label(&self) -> &'static str {
        match self {
            Category::Recycle => "Recycle ♻️",
            Category::Compost => "Compost 🌿",
            Category::Trash => "Trash 🗑️",
            Category::CheckLocally => "Check Locally ⚠️",
        }
    }

    /// CSS class name used by the web frontend
    pub fn class_name(&self) -> &'static str {
        match self {
            Category::Recycle => "recycle",
            Category::Compost => "compost",
            Category::Trash => "trash",
            Category::CheckLocally => "special",
        }
    }
}

/// How to dispose of one recognized item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisposalRecord {
    pub name: &'static str,
    pub category: Category,
    pub instructions: &'static str,
    pub tip: &'static str,
}

/// Returned when no classifier label resolves to a known item
pub const UNIDENTIFIED: DisposalRecord = DisposalRecord {
    name: "Unidentified Item",
    category: Category::CheckLocally,
    instructions: "Our AI couldn't identify this item. Please check your local recycling and waste disposal guidelines.",
    tip: "You can teach the classifier by adding the logged predictions to the [label_map] table in wdsp-cl.toml.",
};

const BUILTIN_RECORDS: [(&str, DisposalRecord); 6] = [
    (
        "bottle",
        DisposalRecord {
            name: "Plastic Bottle",
            category: Category::Recycle,
            instructions: "Empty the bottle, rinse it out, and put the cap back on before placing it in the recycling bin.",
            tip: "Recycling one plastic bottle can save enough energy to power a 60-watt bulb for 3 hours.",
        },
    ),
    (
        "can",
        DisposalRecord {
            name: "Aluminum Can",
            category: Category::Recycle,
            instructions: "Rinse the can and place it in your recycling bin. Aluminum is infinitely recyclable!",
            tip: "Recycling aluminum saves 95% of the energy needed to make it from raw materials.",
        },
    ),
    (
        "apple",
        DisposalRecord {
            name: "Apple",
            category: Category::Compost,
            instructions: "Place this in your compost bin. It will decompose and enrich the soil.",
            tip: "Composting food scraps reduces methane emissions from landfills.",
        },
    ),
    (
        "banana",
        DisposalRecord {
            name: "Banana",
            category: Category::Compost,
            instructions: "Place this in your compost bin with other fruit and vegetable scraps.",
            tip: "Banana peels are rich in potassium and great for garden soil.",
        },
    ),
    (
        "bag",
        DisposalRecord {
            name: "Plastic Bag",
            category: Category::Trash,
            instructions: "Most curbside programs do not accept plastic bags as they jam machinery. Dispose of them in the trash or find a special store drop-off.",
            tip: "Opt for reusable bags when shopping to reduce plastic waste.",
        },
    ),
    (
        "cup",
        DisposalRecord {
            name: "Paper Cup",
            category: Category::CheckLocally,
            instructions: "Many paper cups have a plastic lining. Check your local program's rules. If in doubt, trash it.",
            tip: "Using a reusable coffee cup prevents hundreds of disposable cups from entering the waste stream each year.",
        },
    ),
];

/// Canonical item key → disposal record
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    records: BTreeMap<&'static str, DisposalRecord>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KnowledgeBase {
    /// Knowledge base with the built-in item set
    pub fn builtin() -> Self {
        Self {
            records: BUILTIN_RECORDS.into_iter().collect(),
        }
    }

    /// Look up the record for a canonical item key
    pub fn lookup(&self, key: &str) -> Option<&DisposalRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Known item keys, in key order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.records.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
