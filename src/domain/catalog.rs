use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_CAPACITY: u32 = 60;

/// 本學期開設的選修課
pub const DEFAULT_ELECTIVES: [&str; 15] = [
    "Theory of Constraints",
    "Essentials of Internet and Web Technologies",
    "Behavioral Finance",
    "Pricing",
    "Conflict and Negotiation",
    "Integrated Marketing Communication",
    "Indian Kaleidoscope-Culture and Communication",
    "Marketing of Financial Services",
    "International Marketing",
    "Financial Modeling",
    "Machine learning",
    "Mergers and Acquisitions",
    "Entrepreneurship",
    "Venture and Private Equity Funding",
    "Sustainable Finance and Responsible Investment",
];

/// Stable identifier of an elective: its position in catalog declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElectiveId(pub usize);

impl fmt::Display for ElectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elective {
    pub id: ElectiveId,
    pub name: String,
    pub capacity: u32,
}

/// Immutable elective → capacity table, fixed for the lifetime of the process.
///
/// Declaration order is significant: seat listings and audits follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    electives: Vec<Elective>,
    by_name: HashMap<String, ElectiveId>,
}

impl Catalog {
    /// 以統一容量建立目錄，再套用個別課程的容量覆寫
    pub fn new<I, S>(names: I, default_capacity: u32, overrides: &HashMap<String, u32>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut electives = Vec::new();
        let mut by_name = HashMap::new();

        for name in names {
            let name = name.into();
            if by_name.contains_key(&name) {
                continue;
            }
            let id = ElectiveId(electives.len());
            let capacity = overrides.get(&name).copied().unwrap_or(default_capacity);
            by_name.insert(name.clone(), id);
            electives.push(Elective { id, name, capacity });
        }

        Self { electives, by_name }
    }

    pub fn electives(&self) -> &[Elective] {
        &self.electives
    }

    pub fn get(&self, id: ElectiveId) -> Option<&Elective> {
        self.electives.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<&Elective> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    pub fn capacity_of(&self, name: &str) -> Option<u32> {
        self.find(name).map(|e| e.capacity)
    }

    pub fn len(&self) -> usize {
        self.electives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.electives.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_ELECTIVES, DEFAULT_CAPACITY, &HashMap::new())
    }
}
