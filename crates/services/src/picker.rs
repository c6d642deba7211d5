use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::SeedableRng;
use std::sync::{Mutex, PoisonError};

use verbs_core::model::VerbEntry;
use verbs_core::VerbDictionary;

/// Random verb selection for `/random`, `/quiz` and big-quiz ordering.
pub struct VerbPicker {
    rng: Mutex<StdRng>,
}

impl VerbPicker {
    /// Picker seeded from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic picker for tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniformly picks one verb.
    pub fn pick<'a>(&self, dictionary: &'a VerbDictionary) -> Option<&'a VerbEntry> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        dictionary.entries().choose(&mut *rng)
    }

    /// Uniformly shuffled copy of the whole dictionary.
    pub fn shuffled(&self, dictionary: &VerbDictionary) -> Vec<VerbEntry> {
        let mut verbs = dictionary.entries().to_vec();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        verbs.shuffle(&mut *rng);
        verbs
    }
}

impl Default for VerbPicker {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn picks_stay_inside_dictionary() {
        let dict = VerbDictionary::irregular();
        let picker = VerbPicker::seeded(7);
        for _ in 0..200 {
            let verb = picker.pick(&dict).unwrap();
            assert_eq!(dict.lookup(verb.base_form()), Some(verb));
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let dict = VerbDictionary::irregular();
        let picker = VerbPicker::seeded(11);
        let shuffled = picker.shuffled(&dict);

        assert_eq!(shuffled.len(), dict.len());
        let bases: HashSet<_> = shuffled.iter().map(VerbEntry::base_form).collect();
        assert_eq!(bases.len(), dict.len());
        assert_ne!(shuffled.as_slice(), dict.entries());
    }

    #[test]
    fn same_seed_same_order() {
        let dict = VerbDictionary::irregular();
        assert_eq!(
            VerbPicker::seeded(3).shuffled(&dict),
            VerbPicker::seeded(3).shuffled(&dict)
        );
    }
}
