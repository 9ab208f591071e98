pub mod list;
pub mod moderate;
pub mod run;
pub mod submit;
pub mod watch;
