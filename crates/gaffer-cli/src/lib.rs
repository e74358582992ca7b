// Library root for the `gaffer` binary: argument parsing, dispatch and
// output rendering.

pub mod args;
pub mod output;
pub mod run;
