pub mod file;
pub mod municipal;
pub mod sparql;

pub use file::{FileEventSource, InMemoryEventSource};
pub use municipal::{records_from_table, MunicipalEventSource, MUNICIPAL_EVENTS_QUERY};
pub use sparql::{Literal, SparqlClient, SparqlRow, SparqlTable, SPARQL_RESULTS_JSON};
