// Types layer - db entities, internal types, API DTOs
pub mod db;
pub mod dto;
pub mod internal;
