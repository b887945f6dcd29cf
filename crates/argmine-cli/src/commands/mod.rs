//! Command implementations.

pub mod annotate;
pub mod export;
pub mod graph;
pub mod run;
pub mod show;

pub use self::annotate::execute_annotate;
pub use self::export::execute_export_brat;
pub use self::graph::{execute_graph, load_graph};
pub use self::run::execute_run;
pub use self::show::{execute_component, execute_statement};
