use crate::domain::catalog::{Catalog, ElectiveId};
use crate::domain::model::{EnrollmentRecord, Row};
use serde::Serialize;
use std::collections::HashMap;

/// Point-in-time view of the store: every record plus the per-elective usage
/// derived from them. Never persisted; rebuilt from rows on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<EnrollmentRecord>,
    usage: HashMap<String, u32>,
}

impl Snapshot {
    pub fn from_rows(rows: &[Row]) -> Self {
        Self::from_records(rows.iter().map(EnrollmentRecord::from_row).collect())
    }

    pub fn from_records(records: Vec<EnrollmentRecord>) -> Self {
        let mut usage: HashMap<String, u32> = HashMap::new();
        for record in &records {
            for elective in record.electives() {
                // 空白儲存格不算任何課程
                if elective.is_empty() {
                    continue;
                }
                *usage.entry(elective.to_string()).or_default() += 1;
            }
        }
        Self { records, usage }
    }

    pub fn records(&self) -> &[EnrollmentRecord] {
        &self.records
    }

    pub fn usage(&self, elective: &str) -> u32 {
        self.usage.get(elective).copied().unwrap_or(0)
    }

    pub fn usage_map(&self) -> &HashMap<String, u32> {
        &self.usage
    }

    pub fn contains_prn(&self, prn: &str) -> bool {
        self.records.iter().any(|r| r.prn == prn)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatListing {
    pub id: ElectiveId,
    pub name: String,
    pub capacity: u32,
    pub remaining: u32,
}

impl SeatListing {
    pub fn label(&self) -> String {
        format!(
            "{} (Seats Left: {}/{})",
            self.name, self.remaining, self.capacity
        )
    }
}

/// Electives that still have seats, in catalog order, with a lookup from id,
/// name, or rendered label back to the listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeatBoard {
    listings: Vec<SeatListing>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SeatBoard {
    pub fn build(snapshot: &Snapshot, catalog: &Catalog) -> Self {
        let listings: Vec<SeatListing> = catalog
            .electives()
            .iter()
            .filter_map(|elective| {
                let remaining = elective
                    .capacity
                    .saturating_sub(snapshot.usage(&elective.name));
                (remaining > 0).then(|| SeatListing {
                    id: elective.id,
                    name: elective.name.clone(),
                    capacity: elective.capacity,
                    remaining,
                })
            })
            .collect();

        // 課程名稱優先於標籤
        let mut index = HashMap::new();
        for (pos, listing) in listings.iter().enumerate() {
            index.insert(listing.label(), pos);
        }
        for (pos, listing) in listings.iter().enumerate() {
            index.insert(listing.name.clone(), pos);
        }

        Self { listings, index }
    }

    pub fn listings(&self) -> &[SeatListing] {
        &self.listings
    }

    pub fn by_id(&self, id: ElectiveId) -> Option<&SeatListing> {
        self.listings.iter().find(|l| l.id == id)
    }

    /// Resolves an exact name, a rendered label, or an id (`"3"`), in that
    /// order. A numeric elective name shadows the id with the same digits.
    pub fn resolve(&self, token: &str) -> Option<&SeatListing> {
        if let Some(pos) = self.index.get(token) {
            return self.listings.get(*pos);
        }
        token
            .parse::<usize>()
            .ok()
            .and_then(|id| self.by_id(ElectiveId(id)))
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overbooking {
    pub elective: String,
    pub capacity: u32,
    pub usage: u32,
}

impl Overbooking {
    pub fn excess(&self) -> u32 {
        self.usage.saturating_sub(self.capacity)
    }
}

/// 容量超賣的課程（依目錄順序）
pub fn overbookings(snapshot: &Snapshot, catalog: &Catalog) -> Vec<Overbooking> {
    catalog
        .electives()
        .iter()
        .filter_map(|elective| {
            let usage = snapshot.usage(&elective.name);
            (usage > elective.capacity).then(|| Overbooking {
                elective: elective.name.clone(),
                capacity: elective.capacity,
                usage,
            })
        })
        .collect()
}
