mod breakdown;
mod common;
mod ranking;
