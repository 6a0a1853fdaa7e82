//! Data models for Biblion entities

pub mod book;
pub mod loan;
pub mod member;
pub mod staff;
