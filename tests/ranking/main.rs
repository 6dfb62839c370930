//! Ranking engine integration tests.

mod pagination;
