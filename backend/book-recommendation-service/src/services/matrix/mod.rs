use crate::models::{ItemId, Rating, UserId};
use ndarray::{Array2, ArrayView1};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Dense user × book rating matrix
///
/// Rows are the distinct users of the filtered ratings in ascending `UserId`
/// order, columns the distinct books in ascending `ItemId` order. A zero
/// cell means "not rated". The row order defined here is the one every
/// downstream stage indexes by.
#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    user_rows: HashMap<UserId, usize>,
    values: Array2<f64>,
    /// Ratings that replaced an earlier one for the same (user, book)
    repeated: usize,
}

impl InteractionMatrix {
    /// Pivot ratings into the matrix. Repeated (user, book) pairs resolve to
    /// the last rating in input order.
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let users: Vec<UserId> = ratings
            .iter()
            .map(|r| r.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let items: Vec<ItemId> = ratings
            .iter()
            .map(|r| r.item_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let user_rows: HashMap<UserId, usize> = users
            .iter()
            .enumerate()
            .map(|(row, id)| (id.clone(), row))
            .collect();
        let item_cols: HashMap<&ItemId, usize> = items
            .iter()
            .enumerate()
            .map(|(col, id)| (id, col))
            .collect();

        let mut values = Array2::<f64>::zeros((users.len(), items.len()));
        let mut filled: HashSet<(usize, usize)> = HashSet::with_capacity(ratings.len());
        let mut repeated = 0usize;

        for rating in ratings {
            let row = user_rows[&rating.user_id];
            let col = item_cols[&rating.item_id];
            if !filled.insert((row, col)) {
                repeated += 1;
            }
            values[[row, col]] = rating.value;
        }

        if repeated > 0 {
            debug!(repeated, "Repeated ratings resolved to last occurrence");
        }

        info!(
            rows = users.len(),
            cols = items.len(),
            "Built interaction matrix"
        );

        Self {
            users,
            items,
            user_rows,
            values,
            repeated,
        }
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row_of(&self, user_id: &UserId) -> Option<usize> {
        self.user_rows.get(user_id).copied()
    }

    pub fn row(&self, row: usize) -> ArrayView1<'_, f64> {
        self.values.row(row)
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn repeated_ratings(&self) -> usize {
        self.repeated
    }

    /// No users or no books survived filtering
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() || self.items.is_empty()
    }
}
