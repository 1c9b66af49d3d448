#[macro_use]
extern crate log;

use thiserror::Error;

pub mod ir;

#[derive(Error, Debug)]
pub enum HwError {
    #[error("Could not initialize pwm carrier")]
    Initialization,
}
