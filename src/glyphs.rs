use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum GlyphSet {
    Adlam,
    Katakana,
    Ascii,
}

impl GlyphSet {
    pub(crate) fn chars(self) -> Vec<char> {
        let range = match self {
            GlyphSet::Adlam => 0x1E900..=0x1E921,
            GlyphSet::Katakana => 0xFF66..=0xFF9D,
            GlyphSet::Ascii => 0x21..=0x7E,
        };
        range.filter_map(char::from_u32).collect()
    }
}

/// Number of whole tiles that fit, zero for degenerate tile sizes.
pub(crate) fn tile_count(cols: u16, rows: u16, tile_w: u16, tile_h: u16) -> usize {
    if tile_w == 0 || tile_h == 0 {
        return 0;
    }
    (cols / tile_w) as usize * (rows / tile_h) as usize
}

/// Background glyphs in row-major order. Growing appends fresh random
/// glyphs and shrinking drops the tail, so a resize never reshuffles what is
/// already on screen.
pub(crate) struct GlyphField {
    alphabet: Vec<char>,
    glyphs: Vec<char>,
}

impl GlyphField {
    pub(crate) fn new(set: GlyphSet) -> Self {
        Self {
            alphabet: set.chars(),
            glyphs: Vec::new(),
        }
    }

    pub(crate) fn fit<R: Rng>(&mut self, count: usize, rng: &mut R) {
        if count <= self.glyphs.len() {
            self.glyphs.truncate(count);
            return;
        }
        if self.alphabet.is_empty() {
            return;
        }
        let extra = count - self.glyphs.len();
        self.glyphs.reserve(extra);
        for _ in 0..extra {
            let i = rng.gen_range(0..self.alphabet.len());
            self.glyphs.push(self.alphabet[i]);
        }
    }

    pub(crate) fn glyphs(&self) -> &[char] {
        &self.glyphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn tile_count_floors_each_axis() {
        assert_eq!(tile_count(80, 24, 2, 1), 40 * 24);
        assert_eq!(tile_count(81, 25, 2, 2), 40 * 12);
        assert_eq!(tile_count(1, 24, 2, 1), 0);
        assert_eq!(tile_count(80, 24, 0, 1), 0);
    }

    #[test]
    fn adlam_has_34_letters() {
        let a = GlyphSet::Adlam.chars();
        assert_eq!(a.len(), 34);
        assert_eq!(a[0], '\u{1E900}');
        assert_eq!(a[33], '\u{1E921}');
    }

    #[test]
    fn fit_keeps_existing_glyphs() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut f = GlyphField::new(GlyphSet::Ascii);
        f.fit(50, &mut rng);
        assert_eq!(f.glyphs().len(), 50);
        let first = f.glyphs().to_vec();

        f.fit(80, &mut rng);
        assert_eq!(&f.glyphs()[..50], first.as_slice());

        f.fit(20, &mut rng);
        assert_eq!(f.glyphs(), &first[..20]);

        let alphabet = GlyphSet::Ascii.chars();
        assert!(f.glyphs().iter().all(|c| alphabet.contains(c)));
    }
}
