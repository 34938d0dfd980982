//! Read-only roster reports.

mod matrix;

pub use matrix::{
    MatrixBuilder, MatrixCell, MatrixFilter, MatrixRow, RosterMatrix, month_days,
};
