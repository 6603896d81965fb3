mod common;

mod concurrency;
mod driver;
mod scoring;
mod undo;
