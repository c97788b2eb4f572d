//! Per-class counts for a single detection run.

pub const RESULT_PREFIX: &str = "TESPİT SONUÇLARI:  ";
pub const NOTHING_FOUND: &str = "Nesne bulunamadı.";

/// Label -> count, kept in the order labels were first seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub fn aggregate<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = Self::default();
        for label in labels {
            let label = label.as_ref();
            match tally.entries.iter_mut().find(|(l, _)| l == label) {
                Some((_, count)) => *count += 1,
                None => tally.entries.push((label.to_owned(), 1)),
            }
        }
        tally
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// `[USD: 2 adet]   [TL: 1 adet]   `, or the "nothing found" text.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return NOTHING_FOUND.to_owned();
        }
        self.iter()
            .map(|(label, count)| format!("[{label}: {count} adet]   "))
            .collect()
    }

    /// Full status line shown under the buttons.
    pub fn status_line(&self) -> String {
        format!("{RESULT_PREFIX}{}", self.summary())
    }
}
