//! Interactive terminal input

pub mod prompter;
