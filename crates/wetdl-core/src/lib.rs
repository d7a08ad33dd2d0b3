pub mod config;
pub mod logging;

pub mod control;
pub mod downloader;
pub mod manifest;
pub mod scheduler;
pub mod storage;
pub mod unzip;
pub mod url_model;
