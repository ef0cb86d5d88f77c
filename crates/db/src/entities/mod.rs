//! `SeaORM` entities.

pub mod post;
pub mod sea_orm_active_enums;
pub mod user;
