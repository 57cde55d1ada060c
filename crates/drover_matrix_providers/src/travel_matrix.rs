use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

/// Pairwise travel distances and durations for an ordered location list.
/// Stored as flat row-major vectors; `size` rows of `size` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelMatrix {
    size: usize,
    distances_km: Vec<f64>,
    durations: Vec<SignedDuration>,
}

impl TravelMatrix {
    pub fn zeroed(size: usize) -> Self {
        TravelMatrix {
            size,
            distances_km: vec![0.0; size * size],
            durations: vec![SignedDuration::ZERO; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn distance_km(&self, from: usize, to: usize) -> f64 {
        self.distances_km[self.cell(from, to)]
    }

    #[inline]
    pub fn duration(&self, from: usize, to: usize) -> SignedDuration {
        self.durations[self.cell(from, to)]
    }

    pub fn set(&mut self, from: usize, to: usize, distance_km: f64, duration: SignedDuration) {
        let cell = self.cell(from, to);
        self.distances_km[cell] = distance_km;
        self.durations[cell] = duration;
    }

    pub fn distance_rows(&self) -> Vec<Vec<f64>> {
        self.distances_km
            .chunks(self.size)
            .map(|row| row.to_vec())
            .collect()
    }

    pub fn duration_rows_secs(&self) -> Vec<Vec<f64>> {
        self.durations
            .chunks(self.size)
            .map(|row| row.iter().map(|cell| cell.as_secs_f64()).collect())
            .collect()
    }

    #[inline]
    fn cell(&self, from: usize, to: usize) -> usize {
        from * self.size + to
    }
}
