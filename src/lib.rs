pub mod config;
pub mod db;
pub mod drive;
pub mod glink;
pub mod model;
pub mod reconcile;
pub mod startup;
pub mod sync;
pub mod web;
