extern crate chrono;
extern crate data_encoding;
#[macro_use]
extern crate diesel;
extern crate filetime;
extern crate log;
extern crate r2d2;
extern crate ring;
extern crate serde;
extern crate serde_json;

pub mod history_db;
pub mod observer;
