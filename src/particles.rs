//! The particle-sense catalog and the classifier built on it.
//!
//! The catalog follows the numbering of a particle reference book: row `n`
//! is line `n` of the catalog file and lists every surface form that
//! particle takes, separated by `・`.

use std::{collections::HashMap, fs, path::Path};

use crate::{
    annotation::{ChinoMatch, Particle},
    context_cloze::ContextCloze,
    errors::LoadError,
    morpheme::Morpheme,
};

pub const FORM_SEPARATOR: char = '・';

/// Historical contraction of の, looked up under both spellings.
const NO_CONTRACTION: (&str, &str) = ("ん", "の");

#[derive(Clone, Debug, Default)]
pub struct ParticleCatalog {
    rows: Vec<ChinoMatch>,
    by_form: HashMap<String, Vec<usize>>,
}

impl ParticleCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let catalog = Self::from_rows(text.trim().lines());
        if catalog.is_empty() {
            return Err(LoadError::EmptyCatalog(path.to_path_buf()));
        }
        log::debug!("loaded {} particle rows from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// One row per line, numbered from 1; blank lines keep their number.
    pub fn from_rows<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut catalog = Self::default();
        for (i, line) in lines.into_iter().enumerate() {
            let forms: Vec<String> = line
                .trim()
                .split(FORM_SEPARATOR)
                .map(str::trim)
                .filter(|form| !form.is_empty())
                .map(str::to_string)
                .collect();
            for form in &forms {
                catalog.by_form.entry(form.clone()).or_default().push(i);
            }
            catalog.rows.push(ChinoMatch {
                index: i + 1,
                forms,
            });
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.rows.iter().filter(|row| !row.forms.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows listing any of `forms`, in catalog order.
    pub fn lookup(&self, forms: &[&str]) -> Vec<ChinoMatch> {
        let mut positions: Vec<usize> = forms
            .iter()
            .filter_map(|form| self.by_form.get(*form))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter().map(|i| self.rows[i].clone()).collect()
    }

    /// Catalog rows for one particle morpheme: its literal (with `ん` also
    /// read as `の`), then its lemma when that differs.
    pub fn lookup_particle(&self, morpheme: &Morpheme) -> Vec<ChinoMatch> {
        let literal = morpheme.literal.as_str();
        let mut matches = if literal == NO_CONTRACTION.0 {
            let mut own = self.lookup(&[literal]);
            merge_rows(&mut own, self.lookup(&[NO_CONTRACTION.1]));
            own
        } else {
            self.lookup(&[literal])
        };
        let lemma = morpheme.lemma_head();
        if !lemma.is_empty() && lemma != literal {
            merge_rows(&mut matches, self.lookup(&[lemma]));
        }
        matches
    }

    /// Compound particles spelled by up to `window` consecutive particles that
    /// are also adjacent in the morpheme stream.
    ///
    /// `particles` must be ordered by `start_idx`; `pieces` are the literals of
    /// the whole sentence.
    pub fn fuse(&self, particles: &[Particle], pieces: &[&str], window: usize) -> Vec<Particle> {
        let mut fused = Vec::new();
        for (i, first) in particles.iter().enumerate() {
            let mut literal: String = first.cloze.cloze().to_string();
            let mut morphemes = first.morphemes.clone();
            let mut end_idx = first.end_idx;
            for next in particles.iter().skip(i + 1).take(window.saturating_sub(1)) {
                if next.start_idx != end_idx {
                    break;
                }
                literal.push_str(next.cloze.cloze());
                morphemes.extend(next.morphemes.iter().cloned());
                end_idx = next.end_idx;

                let chino = self.lookup(&[literal.as_str()]);
                if chino.is_empty() {
                    continue;
                }
                log::debug!("fused particle {literal} at {}..{end_idx}", first.start_idx);
                fused.push(Particle {
                    chino,
                    cloze: ContextCloze::from_pieces(pieces, first.start_idx, end_idx),
                    start_idx: first.start_idx,
                    end_idx,
                    morphemes: morphemes.clone(),
                });
            }
        }
        fused
    }
}

fn merge_rows(into: &mut Vec<ChinoMatch>, rows: Vec<ChinoMatch>) {
    for row in rows {
        if !into.iter().any(|have| have.index == row.index) {
            into.push(row);
        }
    }
}

#[cfg(test)]
mod particles_tests {
    use super::*;
    use crate::test_utils::{morpheme, TEST_PARTICLES};
    use pretty_assertions::assert_eq;

    fn indexes(rows: &[ChinoMatch]) -> Vec<usize> {
        rows.iter().map(|row| row.index).collect()
    }

    #[test]
    fn rows_are_line_numbers() {
        let catalog = ParticleCatalog::from_rows(["は", "", "が・の"]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.lookup(&["の"]),
            [ChinoMatch {
                index: 3,
                forms: vec!["が".into(), "の".into()],
            }]
        );
        assert!(catalog.lookup(&["を"]).is_empty());
    }

    #[test]
    fn empty_catalog_is_a_load_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ParticleCatalog::from_path(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyCatalog(_)));
    }

    #[test]
    fn n_is_a_superset_of_no() {
        let n = morpheme("ん", "ノ", "の", "particle-nominal", "", "");
        let no = morpheme("の", "ノ", "の", "particle-case", "", "");
        let n_rows = indexes(&TEST_PARTICLES.lookup_particle(&n));
        let no_rows = indexes(&TEST_PARTICLES.lookup_particle(&no));
        assert!(!no_rows.is_empty());
        for row in &no_rows {
            assert!(n_rows.contains(row), "{n_rows:?} lacks {row}");
        }
    }

    #[test]
    fn lemma_rows_are_merged() {
        let catalog = ParticleCatalog::from_rows(["って", "と"]);
        let tte = morpheme("って", "ッテ", "と", "particle-case", "", "");
        assert_eq!(indexes(&catalog.lookup_particle(&tte)), [1, 2]);
    }

    fn particle(literal: &str, start_idx: usize) -> Particle {
        Particle {
            chino: Vec::new(),
            cloze: ContextCloze::new("", literal, ""),
            start_idx,
            end_idx: start_idx + 1,
            morphemes: vec![morpheme(literal, "", literal, "particle-case", "", "")],
        }
    }

    #[test]
    fn adjacent_particles_fuse() {
        let catalog = ParticleCatalog::from_rows(["に", "は", "には"]);
        let pieces = ["彼", "に", "は", "本", "に", "は"];
        let particles = [particle("に", 1), particle("は", 2), particle("に", 4)];
        let fused = catalog.fuse(&particles, &pieces, 4);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].cloze, ContextCloze::new("彼", "には", "本には"));
        assert_eq!((fused[0].start_idx, fused[0].end_idx), (1, 3));
        assert_eq!(fused[0].morphemes.len(), 2);
        assert_eq!(indexes(&fused[0].chino), [3]);
    }

    #[test]
    fn window_limits_fusion() {
        let catalog = ParticleCatalog::from_rows(["にはも"]);
        let pieces = ["に", "は", "も"];
        let particles = [particle("に", 0), particle("は", 1), particle("も", 2)];
        assert_eq!(catalog.fuse(&particles, &pieces, 3).len(), 1);
        assert!(catalog.fuse(&particles, &pieces, 2).is_empty());
    }
}
