//! `SeaORM` entity definitions.

pub mod activity_accounting;
