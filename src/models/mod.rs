pub mod bson_date;
pub mod domain;
pub mod dto;
