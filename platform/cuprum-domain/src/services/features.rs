use crate::value_objects::price_record::PriceRecord;

pub const FEATURE_NAMES: [&str; 4] = ["LME Copper stock", "year", "month", "day"];
pub const TARGET_NAME: &str = "LME Copper Cash-Settlement";

/// Dense row-major matrix of model inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_features: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, String> {
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len() * n_features);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != n_features {
                return Err(format!(
                    "feature row {idx} has {} values, expected {n_features}",
                    row.len()
                ));
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            n_rows: rows.len(),
            n_features,
            values,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        let start = idx * self.n_features;
        &self.values[start..start + self.n_features]
    }

    pub fn get(&self, row: usize, feature: usize) -> f64 {
        self.values[row * self.n_features + feature]
    }

    /// New matrix holding the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut values = Vec::with_capacity(indices.len() * self.n_features);
        for &idx in indices {
            values.extend_from_slice(self.row(idx));
        }
        Self {
            n_rows: indices.len(),
            n_features: self.n_features,
            values,
        }
    }
}

pub fn feature_row(record: &PriceRecord) -> Vec<f64> {
    vec![
        record.stock,
        f64::from(record.year()),
        f64::from(record.month()),
        f64::from(record.day()),
    ]
}

/// Predictors (stock, year, month, day) and the cash-settlement target.
pub fn build_dataset(records: &[PriceRecord]) -> Result<(FeatureMatrix, Vec<f64>), String> {
    let rows: Vec<Vec<f64>> = records.iter().map(feature_row).collect();
    let matrix = if rows.is_empty() {
        FeatureMatrix {
            n_rows: 0,
            n_features: FEATURE_NAMES.len(),
            values: Vec::new(),
        }
    } else {
        FeatureMatrix::from_rows(&rows)?
    };
    let target = records.iter().map(|r| r.cash_settlement).collect();
    Ok((matrix, target))
}

pub fn select_values(values: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|&idx| values[idx]).collect()
}
