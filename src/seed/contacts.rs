use crate::db::models::NewContact;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const TITLES: &[&str] = &["Mr.", "Mrs.", "Ms.", "Dr.", "Prof."];

const FIRST_NAMES: &[&str] = &[
    "Aaliyah", "Adam", "Amelia", "Ben", "Carlos", "Chloe", "Daniel", "Diana", "Elena", "Ethan",
    "Farah", "Grace", "Hannah", "Hiro", "Isaac", "Jamal", "Julia", "Kai", "Liam", "Lucia", "Mateo",
    "Maya", "Noah", "Olivia", "Priya", "Quinn", "Ravi", "Sofia", "Tariq", "Uma", "Victor", "Wen",
    "Xavier", "Yara", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Baker", "Chen", "Diaz", "Edwards", "Fischer", "Garcia", "Hughes", "Ito",
    "Johnson", "Kowalski", "Lopez", "Martin", "Nguyen", "Okafor", "Patel", "Quintero", "Rossi",
    "Schmidt", "Tanaka", "Usman", "Varga", "Williams", "Xu", "Young", "Zimmerman",
];

const STREET_NAMES: &[&str] = &[
    "Maple", "Oak", "Pine", "Cedar", "Elm", "Birch", "Willow", "Lake", "Hill", "Park", "River",
    "Sunset", "Washington", "Lincoln", "Main",
];

const STREET_SUFFIXES: &[&str] = &["St.", "Ave.", "Blvd.", "Ln.", "Rd.", "Way", "Ct."];

const CITIES: &[&str] = &[
    "Redmond", "Seattle", "Portland", "Austin", "Denver", "Boston", "Chicago", "Phoenix",
    "Atlanta", "Raleigh", "Madison", "Tucson", "Omaha", "Spokane",
];

const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

/// Synthetic contact generator used to seed a fresh database.
pub struct SeedContacts {
    rng: StdRng,
}

impl Default for SeedContacts {
    fn default() -> Self {
        Self::new()
    }
}

impl SeedContacts {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, same seed yields the same contacts.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self, count: u32) -> Vec<NewContact> {
        (0..count).map(|_| self.next_contact()).collect()
    }

    fn next_contact(&mut self) -> NewContact {
        // roughly a third of contacts carry no title
        let title = if self.rng.gen_bool(0.35) {
            None
        } else {
            Some(self.pick(TITLES))
        };

        NewContact {
            title,
            first_name: self.pick(FIRST_NAMES),
            last_name: self.pick(LAST_NAMES),
            phone: format!(
                "({}) 555-{:04}",
                self.rng.gen_range(200..=999),
                self.rng.gen_range(0..=9999)
            ),
            street: format!(
                "{} {} {}",
                self.rng.gen_range(1..=9999),
                self.pick(STREET_NAMES),
                self.pick(STREET_SUFFIXES)
            ),
            city: self.pick(CITIES),
            state: self.pick(STATES),
            zip_code: format!("{:05}", self.rng.gen_range(501..=99950)),
        }
    }

    fn pick(&mut self, items: &[&str]) -> String {
        items
            .choose(&mut self.rng)
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_count_with_plausible_fields() {
        let contacts = SeedContacts::with_seed(7).generate(250);
        assert_eq!(contacts.len(), 250);

        for c in &contacts {
            assert!(FIRST_NAMES.contains(&c.first_name.as_str()));
            assert!(LAST_NAMES.contains(&c.last_name.as_str()));
            assert!(STATES.contains(&c.state.as_str()));
            assert_eq!(c.zip_code.len(), 5);
            assert!(c.phone.starts_with('(') && c.phone.contains(") 555-"));
            if let Some(title) = &c.title {
                assert!(TITLES.contains(&title.as_str()));
            }
        }
    }

    #[test]
    fn same_seed_same_contacts() {
        let a = SeedContacts::with_seed(42).generate(10);
        let b = SeedContacts::with_seed(42).generate(10);
        assert_eq!(a, b);
        assert!(SeedContacts::with_seed(1).generate(0).is_empty());
    }
}
