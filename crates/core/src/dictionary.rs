//! The irregular verb table.

use std::collections::HashMap;
use thiserror::Error;

use crate::model::{VerbEntry, VerbError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DictionaryError {
    #[error("dictionary has no verbs")]
    Empty,

    #[error("duplicate base form: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Verb(#[from] VerbError),
}

/// (base form, past tense, past participle)
const IRREGULAR_VERBS: &[(&str, &str, &str)] = &[
    ("arise", "arose", "arisen"),
    ("awake", "awoke", "awoken"),
    ("be", "was/were", "been"),
    ("bear", "bore", "borne"),
    ("beat", "beat", "beaten"),
    ("become", "became", "become"),
    ("begin", "began", "begun"),
    ("bend", "bent", "bent"),
    ("bet", "bet", "bet"),
    ("bind", "bound", "bound"),
    ("bite", "bit", "bitten"),
    ("bleed", "bled", "bled"),
    ("blow", "blew", "blown"),
    ("break", "broke", "broken"),
    ("breed", "bred", "bred"),
    ("bring", "brought", "brought"),
    ("build", "built", "built"),
    ("burn", "burned/burnt", "burnt"),
    ("burst", "burst", "burst"),
    ("buy", "bought", "bought"),
    ("catch", "caught", "caught"),
    ("choose", "chose", "chosen"),
    ("come", "came", "come"),
    ("cost", "cost", "cost"),
    ("creep", "crept", "crept"),
    ("cut", "cut", "cut"),
    ("deal", "dealt", "dealt"),
    ("dig", "dug", "dug"),
    ("do", "did", "done"),
    ("draw", "drew", "drawn"),
    ("dream", "dreamed/dreamt", "dreamt"),
    ("drink", "drank", "drunk"),
    ("drive", "drove", "driven"),
    ("eat", "ate", "eaten"),
    ("fall", "fell", "fallen"),
    ("feed", "fed", "fed"),
    ("feel", "felt", "felt"),
    ("fight", "fought", "fought"),
    ("find", "found", "found"),
    ("fly", "flew", "flown"),
    ("forbid", "forbade", "forbidden"),
    ("forget", "forgot", "forgotten"),
    ("forgive", "forgave", "forgiven"),
    ("freeze", "froze", "frozen"),
    ("get", "got", "got"),
    ("give", "gave", "given"),
    ("go", "went", "gone"),
    ("grow", "grew", "grown"),
    ("hang", "hung", "hung"),
    ("have", "had", "had"),
    ("hear", "heard", "heard"),
    ("hide", "hid", "hidden"),
    ("hit", "hit", "hit"),
    ("hold", "held", "held"),
    ("hurt", "hurt", "hurt"),
    ("keep", "kept", "kept"),
    ("know", "knew", "known"),
    ("lay", "laid", "laid"),
    ("lead", "led", "led"),
    ("learn", "learned/learnt", "learnt"),
    ("leave", "left", "left"),
    ("lend", "lent", "lent"),
    ("let", "let", "let"),
    ("lie", "lay", "lain"),
    ("light", "lit/lighted", "lit"),
    ("lose", "lost", "lost"),
    ("make", "made", "made"),
    ("mean", "meant", "meant"),
    ("meet", "met", "met"),
    ("pay", "paid", "paid"),
    ("put", "put", "put"),
    ("quit", "quit", "quit"),
    ("read", "read", "read"),
    ("ride", "rode", "ridden"),
    ("ring", "rang", "rung"),
    ("rise", "rose", "risen"),
    ("run", "ran", "run"),
    ("say", "said", "said"),
    ("see", "saw", "seen"),
    ("seek", "sought", "sought"),
    ("sell", "sold", "sold"),
    ("send", "sent", "sent"),
    ("set", "set", "set"),
    ("shake", "shook", "shaken"),
    ("shine", "shone", "shone"),
    ("shoot", "shot", "shot"),
    ("show", "showed", "shown"),
    ("shut", "shut", "shut"),
    ("sing", "sang", "sung"),
    ("sink", "sank", "sunk"),
    ("sit", "sat", "sat"),
    ("sleep", "slept", "slept"),
    ("slide", "slid", "slid"),
    ("speak", "spoke", "spoken"),
    ("spend", "spent", "spent"),
    ("spin", "spun", "spun"),
    ("spread", "spread", "spread"),
    ("stand", "stood", "stood"),
    ("steal", "stole", "stolen"),
    ("stick", "stuck", "stuck"),
    ("sting", "stung", "stung"),
    ("strike", "struck", "struck"),
    ("swear", "swore", "sworn"),
    ("sweep", "swept", "swept"),
    ("swim", "swam", "swum"),
    ("swing", "swung", "swung"),
    ("take", "took", "taken"),
    ("teach", "taught", "taught"),
    ("tear", "tore", "torn"),
    ("tell", "told", "told"),
    ("think", "thought", "thought"),
    ("throw", "threw", "thrown"),
    ("understand", "understood", "understood"),
    ("wake", "woke/waked", "woken"),
    ("wear", "wore", "worn"),
    ("weep", "wept", "wept"),
    ("win", "won", "won"),
    ("wind", "wound", "wound"),
    ("write", "wrote", "written"),
];

/// Read-only mapping from lowercase base form to verb, iterated in insertion order.
#[derive(Debug, Clone)]
pub struct VerbDictionary {
    entries: Vec<VerbEntry>,
    index: HashMap<String, usize>,
}

impl VerbDictionary {
    /// Builds a dictionary from the given verbs, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `DictionaryError::Empty` for an empty list and
    /// `DictionaryError::Duplicate` if a base form appears twice.
    pub fn new(entries: Vec<VerbEntry>) -> Result<Self, DictionaryError> {
        if entries.is_empty() {
            return Err(DictionaryError::Empty);
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            if index.insert(entry.base_form().to_owned(), pos).is_some() {
                return Err(DictionaryError::Duplicate(entry.base_form().to_owned()));
            }
        }

        Ok(Self { entries, index })
    }

    /// Builds a dictionary from `(base, past tense, past participle)` triples.
    ///
    /// # Errors
    ///
    /// Returns `DictionaryError` if a triple is blank or a base form repeats.
    pub fn from_triples<'a>(
        triples: impl IntoIterator<Item = &'a (&'a str, &'a str, &'a str)>,
    ) -> Result<Self, DictionaryError> {
        let entries = triples
            .into_iter()
            .map(|(base, tense, participle)| VerbEntry::new(*base, *tense, *participle))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// The built-in table of common English irregular verbs.
    ///
    /// # Panics
    ///
    /// Panics if the built-in table is invalid, which the tests rule out.
    #[must_use]
    pub fn irregular() -> Self {
        Self::from_triples(IRREGULAR_VERBS).expect("built-in verb table should be valid")
    }

    /// Looks up a verb by base form, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn lookup(&self, base_form: &str) -> Option<&VerbEntry> {
        let key = base_form.trim().to_lowercase();
        self.index.get(&key).map(|&pos| &self.entries[pos])
    }

    /// Entry at `pos` in insertion order.
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&VerbEntry> {
        self.entries.get(pos)
    }

    #[must_use]
    pub fn entries(&self) -> &[VerbEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &VerbEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
