/// Round `value` to `places` decimal places, halves away from zero
#[inline]
pub fn round(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percentage of `part` in `total`, rounded to 2 places. An empty total is
/// defined as 0%, not NaN.
#[inline]
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round(part as f64 / total as f64 * 100.0, 2)
}

/// Arithmetic mean of a slice, `None` if it is empty
#[inline]
pub fn mean(slice: &[f64]) -> Option<f64> {
    if slice.is_empty() {
        return None;
    }
    Some(slice.iter().sum::<f64>() / slice.len() as f64)
}

/// Running modified/total spectral counts.
///
/// INVARIANT: `modified <= total`, since every modified observation is also
/// counted in the total
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub modified: u64,
    pub total: u64,
}

impl Tally {
    #[inline]
    pub fn add(&mut self, spectra: u64, modified: bool) {
        self.total += spectra;
        if modified {
            self.modified += spectra;
        }
    }
}
