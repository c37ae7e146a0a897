//! Input validators shared by the model and the console front end.

pub mod email;
