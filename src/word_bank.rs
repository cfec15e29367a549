//! Words available for filling, grouped by length.
//!
//! Each group's order is fixed once at load time by a `SelectionPolicy`. During the search words
//! are reserved and released through a reservation table rather than being removed from the
//! group, so releasing a word always puts it back exactly where it was.

use std::collections::HashMap;

use bit_set::BitSet;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;

use crate::slots::SlotConstraint;
use crate::{WordId, MAX_SLOT_LENGTH, MIN_SLOT_LENGTH};

/// How candidates within each length group are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Highest letter-frequency score first; ties keep word-list order.
    LetterFrequency,
    /// A uniform shuffle, reproducible for a given seed.
    Shuffle { seed: u64 },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::LetterFrequency
    }
}

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
    pub score: f32,
}

impl Word {
    fn new(string: &str, score: f32) -> Word {
        Word { string: string.to_string(), glyphs: string.chars().collect(), score }
    }
}

/// All words of one length, in selection order, plus the set of ids currently reserved.
#[derive(Debug, Clone, PartialEq)]
pub struct WordGroup {
    length: usize,
    words: Vec<Word>,
    reserved: BitSet,
    ids_by_string: HashMap<String, WordId>,
}

impl WordGroup {
    fn new(length: usize, words: Vec<Word>) -> WordGroup {
        let ids_by_string =
            words.iter().enumerate().map(|(id, word)| (word.string.clone(), id)).collect();

        WordGroup {
            length,
            reserved: BitSet::with_capacity(words.len()),
            words,
            ids_by_string,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn is_reserved(&self, word_id: WordId) -> bool {
        self.reserved.contains(word_id)
    }

    pub fn id_of(&self, word: &str) -> Option<WordId> {
        self.ids_by_string.get(word).copied()
    }

    /// The unreserved words, in selection order.
    pub fn available_words(&self) -> Vec<&str> {
        self.words.iter().enumerate()
            .filter(|&(id, _)| !self.reserved.contains(id))
            .map(|(_, word)| word.string.as_str())
            .collect()
    }

    fn push(&mut self, word: Word) -> WordId {
        let id = self.words.len();
        self.ids_by_string.insert(word.string.clone(), id);
        self.words.push(word);
        id
    }
}

/// Proof of a reservation: the word's position in its group and the word itself, which is
/// enough to restore it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub length: usize,
    pub word_id: WordId,
    pub word: String,
}

/// Normalize a raw word list: one token per line, lowercased, alphabetic only, at least
/// `MIN_SLOT_LENGTH` characters, first occurrence wins. Lines of the form `word;score` or
/// `word,score` contribute just the word.
pub fn parse_word_list(contents: &str) -> Vec<String> {
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut skipped = 0usize;

    let words: Vec<String> = contents
        .lines()
        .filter_map(|line| {
            let token = line.split([';', ',']).next().unwrap_or("").trim().to_lowercase();

            if token.is_empty() {
                None
            } else if token.chars().count() < MIN_SLOT_LENGTH || !token.chars().all(char::is_alphabetic) {
                skipped += 1;
                None
            } else if seen.insert(token.clone()) {
                Some(token)
            } else {
                None
            }
        })
        .collect();

    debug!("Parsed {} words ({} tokens skipped)", words.len(), skipped);
    words
}

/// Read a word list file and normalize it with `parse_word_list`.
pub fn load_word_list<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Vec<String>> {
    let path_ref = path.as_ref();

    let data = std::fs::read_to_string(path_ref).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to read word list from '{}': {}", path_ref.display(), e),
        )
    })?;

    Ok(parse_word_list(&data))
}

/// Words partitioned by exact length, indexed by that length.
#[derive(Debug, Clone)]
pub struct WordBank {
    groups: Vec<WordGroup>,
    letter_frequencies: HashMap<char, f32>,
    policy: SelectionPolicy,
}

impl WordBank {
    /// Build a bank from already-normalized words (see `parse_word_list`).
    pub fn new(words: &[String], policy: SelectionPolicy) -> WordBank {
        // Relative frequency of each letter over the whole corpus. This is computed once and
        // stays fixed no matter which words get used.
        let mut letter_counts: HashMap<char, usize> = HashMap::new();
        let mut total_letters = 0usize;
        for word in words {
            for c in word.chars() {
                *letter_counts.entry(c).or_insert(0) += 1;
                total_letters += 1;
            }
        }
        let letter_frequencies: HashMap<char, f32> = letter_counts
            .iter()
            .map(|(&c, &count)| (c, count as f32 / total_letters as f32))
            .collect();

        let max_length = words.iter().map(|word| word.chars().count()).max().unwrap_or(0);
        let mut words_by_length: Vec<Vec<Word>> = (0..=max_length).map(|_| vec![]).collect();

        for word in words {
            // Summing counts before dividing keeps anagrams' scores exactly equal.
            let letter_total: usize = word.chars().map(|c| letter_counts[&c]).sum();
            let score = letter_total as f32 / total_letters as f32;
            words_by_length[word.chars().count()].push(Word::new(word, score));
        }

        let mut rng = match policy {
            SelectionPolicy::Shuffle { seed } => Some(ChaCha8Rng::seed_from_u64(seed)),
            SelectionPolicy::LetterFrequency => None,
        };

        for words_of_length in &mut words_by_length {
            match rng.as_mut() {
                Some(rng) => words_of_length.shuffle(rng),
                // `sort_by` is stable, so equal scores keep their word-list order.
                None => words_of_length.sort_by(|a, b| b.score.total_cmp(&a.score)),
            }
        }

        WordBank {
            groups: words_by_length
                .into_iter()
                .enumerate()
                .map(|(length, words)| WordGroup::new(length, words))
                .collect(),
            letter_frequencies,
            policy,
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Relative frequency of `c` across the corpus the bank was loaded from.
    pub fn letter_frequency(&self, c: char) -> f32 {
        self.letter_frequencies.get(&c).copied().unwrap_or(0.0)
    }

    pub fn group(&self, length: usize) -> Option<&WordGroup> {
        self.groups.get(length)
    }

    pub fn word(&self, length: usize, word_id: WordId) -> Option<&Word> {
        self.group(length)?.words.get(word_id)
    }

    pub fn available_count(&self, length: usize) -> usize {
        self.group(length).map(|group| group.len() - group.reserved.len()).unwrap_or(0)
    }

    /// Add a word that must be usable even if the list didn't contain it (e.g. an entry that's
    /// completely filled in the template). Returns its id.
    pub fn add_seed(&mut self, word: &str) -> WordId {
        let length = word.chars().count();
        while self.groups.len() <= length {
            let next_length = self.groups.len();
            self.groups.push(WordGroup::new(next_length, vec![]));
        }

        let group = &mut self.groups[length];
        match group.id_of(word) {
            Some(id) => id,
            None => {
                debug!("Adding seed entry {:?}", word);
                group.push(Word::new(word, 0.0))
            }
        }
    }

    /// Return the first available word of `length` that satisfies `constraint` and isn't in
    /// `tried`.
    pub fn select(&self, length: usize, constraint: &SlotConstraint, tried: &BitSet) -> Option<WordId> {
        let group = self.group(length)?;

        group.words.iter().enumerate().find_map(|(word_id, word)| {
            if group.reserved.contains(word_id) || tried.contains(word_id) {
                None
            } else if constraint.matches(&word.glyphs) {
                Some(word_id)
            } else {
                None
            }
        })
    }

    /// Mark a word as unavailable.
    ///
    /// # Panics
    ///
    /// Panics if there's no word `word_id` of this length. Ids come from `select` or
    /// `WordGroup::id_of`.
    pub fn reserve(&mut self, length: usize, word_id: WordId) -> Reservation {
        let group = &mut self.groups[length];
        group.reserved.insert(word_id);

        Reservation { length, word_id, word: group.words[word_id].string.clone() }
    }

    /// Make a reserved word available again, at its original position. The position in the
    /// reservation is only trusted if it still names the same word; otherwise we find the word
    /// by identity, and as a last resort re-insert it at the end of its group.
    pub fn release(&mut self, reservation: Reservation) {
        let Reservation { length, word_id, word } = reservation;

        while self.groups.len() <= length {
            let next_length = self.groups.len();
            self.groups.push(WordGroup::new(next_length, vec![]));
        }
        let group = &mut self.groups[length];

        if group.words.get(word_id).map(|w| w.string == word).unwrap_or(false) {
            group.reserved.remove(word_id);
        } else if let Some(id) = group.id_of(&word) {
            warn!("Stale reservation for {:?} (position {} is now {})", word, word_id, id);
            group.reserved.remove(id);
        } else {
            warn!("Released unknown word {:?}; re-inserting it", word);
            group.push(Word::new(&word, 0.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_parse_word_list_normalizes() {
        let parsed = parse_word_list("Cat\n  DOG \nab\n\ncat\nit's\nbird;50\nfish,12\n");

        assert_eq!(parsed, vec!["cat", "dog", "bird", "fish"]);
    }

    #[test]
    fn test_load_word_list_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Cat;50\nowl;10\nat").unwrap();

        assert_eq!(load_word_list(file.path()).unwrap(), vec!["cat", "owl"]);
        assert!(load_word_list(file.path().with_extension("missing")).is_err());
    }

    #[test]
    fn test_groups_by_length() {
        let bank = WordBank::new(&words(&["cat", "bird", "dog", "fish", "horse"]), SelectionPolicy::LetterFrequency);

        assert_eq!(bank.group(3).unwrap().len(), 2);
        assert_eq!(bank.group(4).unwrap().len(), 2);
        assert_eq!(bank.group(5).unwrap().len(), 1);
        assert!(bank.group(2).unwrap().is_empty());
        assert!(bank.group(9).is_none());
    }

    #[test]
    fn test_letter_frequency_ordering() {
        // a=2, c=2, t=2, d=1, o=1, g=1 over 9 letters.
        let bank = WordBank::new(&words(&["dog", "cat", "act"]), SelectionPolicy::LetterFrequency);

        assert!((bank.letter_frequency('a') - 2.0 / 9.0).abs() < 1e-6);
        assert_eq!(bank.letter_frequency('z'), 0.0);
        // "cat" and "act" tie, so they keep list order.
        assert_eq!(bank.group(3).unwrap().available_words(), vec!["cat", "act", "dog"]);
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let list: Vec<String> = (0..50)
            .map(|i| {
                let a = (b'a' + (i % 26) as u8) as char;
                let b = (b'a' + (i / 26) as u8) as char;
                format!("{a}{b}zz")
            })
            .collect();

        let first = WordBank::new(&list, SelectionPolicy::Shuffle { seed: 7 });
        let second = WordBank::new(&list, SelectionPolicy::Shuffle { seed: 7 });
        let other = WordBank::new(&list, SelectionPolicy::Shuffle { seed: 8 });

        assert_eq!(first.group(4), second.group(4));
        assert_ne!(first.group(4).unwrap().available_words(), other.group(4).unwrap().available_words());
    }

    #[test]
    fn test_select_respects_constraint_reservations_and_tried() {
        let mut bank = WordBank::new(&words(&["cat", "cot", "cut", "dog"]), SelectionPolicy::LetterFrequency);
        let group = bank.group(3).unwrap();
        let cat = group.id_of("cat").unwrap();
        let cot = group.id_of("cot").unwrap();
        let cut = group.id_of("cut").unwrap();

        let constraint = SlotConstraint::new([Some('c'), None, Some('t')]);
        let mut tried = BitSet::new();

        let first = bank.select(3, &constraint, &tried).unwrap();
        assert_ne!(bank.word(3, first).unwrap().string, "dog");
        assert!(bank.word(3, 99).is_none());
        assert!(bank.word(40, 0).is_none());

        let reservation = bank.reserve(3, cat);
        tried.insert(cot);
        assert_eq!(bank.select(3, &constraint, &tried), Some(cut));

        tried.insert(cut);
        assert_eq!(bank.select(3, &constraint, &tried), None);

        bank.release(reservation);
        assert_eq!(bank.select(3, &constraint, &tried), Some(cat));
        assert_eq!(bank.select(4, &constraint, &tried), None);
    }

    #[test]
    fn test_reserve_then_release_restores_group() {
        let mut bank = WordBank::new(&words(&["cat", "act", "tac", "dog"]), SelectionPolicy::LetterFrequency);
        let before = bank.group(3).unwrap().clone();

        let reservation = bank.reserve(3, 1);
        assert!(bank.group(3).unwrap().is_reserved(1));
        assert_eq!(bank.available_count(3), 3);
        assert_ne!(bank.group(3), Some(&before));

        bank.release(reservation);
        assert_eq!(bank.group(3), Some(&before));
    }

    #[test]
    fn test_interleaved_releases_restore_order() {
        let mut bank = WordBank::new(&words(&["cat", "act", "tac", "dog", "god"]), SelectionPolicy::LetterFrequency);
        let before = bank.group(3).unwrap().available_words().into_iter().map(String::from).collect::<Vec<_>>();

        let first = bank.reserve(3, 0);
        let second = bank.reserve(3, 3);
        let third = bank.reserve(3, 2);
        bank.release(second);
        bank.release(first);
        bank.release(third);

        assert_eq!(bank.group(3).unwrap().available_words(), before);
    }

    #[test]
    fn test_release_with_stale_position_uses_identity() {
        let mut bank = WordBank::new(&words(&["cat", "dog"]), SelectionPolicy::LetterFrequency);
        let dog = bank.group(3).unwrap().id_of("dog").unwrap();
        let mut reservation = bank.reserve(3, dog);
        reservation.word_id = 1 - dog;

        bank.release(reservation);
        assert_eq!(bank.available_count(3), 2);
    }

    #[test]
    fn test_release_of_unknown_word_reinserts_it() {
        let mut bank = WordBank::new(&words(&["cat"]), SelectionPolicy::LetterFrequency);
        bank.release(Reservation { length: 3, word_id: 5, word: "emu".to_string() });

        assert_eq!(bank.group(3).unwrap().available_words(), vec!["cat", "emu"]);
    }

    #[test]
    fn test_add_seed() {
        let mut bank = WordBank::new(&words(&["cat"]), SelectionPolicy::LetterFrequency);

        assert_eq!(bank.add_seed("cat"), 0);
        assert_eq!(bank.add_seed("zebra"), 0);
        assert_eq!(bank.group(5).unwrap().available_words(), vec!["zebra"]);
    }
}
