/// A single-row input frame handed to a classifier.
///
/// Named rows carry one column name per value, in the order the caller
/// supplied them. Column order is significant: it must line up with the
/// order the model was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Option<Vec<String>>,
    values: Vec<f64>,
}

impl FeatureRow {
    /// Builds a row from `(name, value)` pairs, keeping their order.
    pub fn named<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<f64>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self {
            columns: Some(columns),
            values,
        }
    }

    /// Builds a positional row with no column names.
    pub fn unnamed(values: Vec<f64>) -> Self {
        Self {
            columns: None,
            values,
        }
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the column name at `index`, or its position for unnamed rows.
    pub fn column_name(&self, index: usize) -> String {
        self.columns
            .as_ref()
            .and_then(|c| c.get(index).cloned())
            .unwrap_or_else(|| index.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_row_keeps_insertion_order() {
        let row = FeatureRow::named([("zeta", 1.0), ("alpha", 2.0), ("mid", 3.0)]);
        assert_eq!(
            row.columns().unwrap(),
            &["zeta".to_string(), "alpha".to_string(), "mid".to_string()]
        );
        assert_eq!(row.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn unnamed_row_uses_positions_as_names() {
        let row = FeatureRow::unnamed(vec![4.0, 5.0]);
        assert!(row.columns().is_none());
        assert_eq!(row.column_name(1), "1");
    }

    #[test]
    fn empty_row() {
        assert!(FeatureRow::unnamed(Vec::new()).is_empty());
    }
}
